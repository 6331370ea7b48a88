//! `/api/therapists`

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use solace_core::{NewTherapist, Therapist};

use super::error::ApiError;
use crate::server::AppState;

/// Optional directory filters.
#[derive(Debug, Default, Deserialize)]
pub struct TherapistFilter {
    /// Substring of name or specialty.
    pub search: Option<String>,
    /// Substring of specialty; `all` matches everything.
    pub specialty: Option<String>,
}

impl TherapistFilter {
    fn matches(&self, therapist: &Therapist) -> bool {
        let search = self.search.as_deref().filter(|s| !s.is_empty());
        let specialty = self
            .specialty
            .as_deref()
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"));
        search.is_none_or(|term| therapist.matches_search(term))
            && specialty.is_none_or(|s| therapist.matches_specialty(s))
    }
}

/// GET /api/therapists
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TherapistFilter>,
) -> Result<Json<Vec<Therapist>>, ApiError> {
    let therapists = state
        .storage
        .therapists()
        .await
        .map_err(ApiError::internal("Failed to fetch therapists"))?;
    Ok(Json(
        therapists.into_iter().filter(|t| filter.matches(t)).collect(),
    ))
}

/// GET /api/therapists/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Therapist>, ApiError> {
    state
        .storage
        .therapist(&id)
        .await
        .map_err(ApiError::internal("Failed to fetch therapist"))?
        .map(Json)
        .ok_or(ApiError::NotFound {
            message: "Therapist not found",
        })
}

/// POST /api/therapists
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewTherapist>, JsonRejection>,
) -> Result<(StatusCode, Json<Therapist>), ApiError> {
    let Json(new) = body.map_err(ApiError::invalid("Invalid therapist data"))?;
    let therapist = state
        .storage
        .create_therapist(new)
        .await
        .map_err(ApiError::internal("Failed to create therapist"))?;
    Ok((StatusCode::CREATED, Json(therapist)))
}
