//! `SolaceServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use solace_store::Storage;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::metrics::WS_CONNECTIONS_REJECTED_TOTAL;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::{ChatRelay, RelayHandle, run_ws_session};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store.
    pub storage: Arc<dyn Storage>,
    /// Sender side of the chat relay.
    pub relay: RelayHandle,
    /// Runtime configuration.
    pub config: Arc<ServerConfig>,
    /// One permit per WebSocket slot, held for the life of the session.
    pub connection_slots: Arc<Semaphore>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle, if a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The Solace server.
pub struct SolaceServer {
    config: Arc<ServerConfig>,
    storage: Arc<dyn Storage>,
    relay: RelayHandle,
    relay_task: Mutex<Option<JoinHandle<()>>>,
    connection_slots: Arc<Semaphore>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl SolaceServer {
    /// Create a server and spawn its chat relay.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: ServerConfig, storage: Arc<dyn Storage>) -> Self {
        let config = config.sanitized();
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let (relay, handle) = ChatRelay::new(storage.clone(), &config);
        let relay_task = tokio::spawn(relay.run(shutdown.token()));
        let connection_slots = Arc::new(Semaphore::new(config.max_connections));
        Self {
            config: Arc::new(config),
            storage,
            relay: handle,
            relay_task: Mutex::new(Some(relay_task)),
            connection_slots,
            shutdown,
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            storage: self.storage.clone(),
            relay: self.relay.clone(),
            config: self.config.clone(),
            connection_slots: self.connection_slots.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .merge(api::routes())
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the shutdown token fires.
    ///
    /// The returned task finishes once the listener has drained and the relay
    /// has stopped.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();
        let relay_task = self.relay_task.lock().take();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(error = %e, "server error");
            }
            if let Some(task) = relay_task {
                let _ = task.await;
            }
            info!("server stopped");
        });

        info!(%addr, "listening");
        Ok((addr, handle))
    }

    /// Get the sender side of the chat relay.
    pub fn relay(&self) -> &RelayHandle {
        &self.relay
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.relay.connection_count(),
        state.relay.room_count(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let Ok(permit) = state.connection_slots.clone().try_acquire_owned() else {
        warn!(
            max = state.config.max_connections,
            "connection limit reached, refusing upgrade"
        );
        counter!(WS_CONNECTIONS_REJECTED_TOTAL).increment(1);
        return (StatusCode::SERVICE_UNAVAILABLE, "too many connections").into_response();
    };

    let AppState {
        relay,
        config,
        shutdown,
        ..
    } = state;
    ws.max_message_size(config.max_message_size)
        .on_upgrade(move |socket| async move {
            run_ws_session(socket, relay, config, shutdown.token()).await;
            drop(permit);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{Value, json};
    use solace_store::MemStorage;
    use tower::ServiceExt;

    fn make_server() -> SolaceServer {
        SolaceServer::new(
            ServerConfig::default(),
            Arc::new(MemStorage::with_seed_data()),
        )
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn server_with_default_config() {
        let server = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 0);
        assert!(!server.shutdown().is_shutting_down());
        assert_eq!(server.relay().connection_count(), 0);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server().router();
        let (status, body) = call(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["rooms"], 0);
    }

    #[tokio::test]
    async fn metrics_404_without_recorder() {
        let app = make_server().router();
        let (status, _) = call(&app, get("/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_renders_with_recorder() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let app = make_server().with_metrics(handle).router();
        let resp = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
    }

    #[tokio::test]
    async fn ws_without_upgrade_is_client_error() {
        let app = make_server().router();
        let (status, _) = call(&app, get("/ws")).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = make_server().router();
        let (status, _) = call(&app, get("/nonexistent")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = make_server().router();
        let req = Request::builder()
            .uri("/api/chat-rooms")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    // ── therapists ──

    #[tokio::test]
    async fn lists_seeded_therapists() {
        let app = make_server().router();
        let (status, body) = call(&app, get("/api/therapists")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert!(body[0]["imageUrl"].is_string());
    }

    #[tokio::test]
    async fn therapist_search_filters() {
        let app = make_server().router();
        let (_, body) = call(&app, get("/api/therapists?search=chen")).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Dr. Michael Chen"]);

        let (_, body) = call(&app, get("/api/therapists?specialty=all")).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = call(&app, get("/api/therapists?search=nobody")).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn therapist_by_id() {
        let app = make_server().router();
        let (_, list) = call(&app, get("/api/therapists")).await;
        let id = list[1]["id"].as_str().unwrap();

        let (status, body) = call(&app, get(&format!("/api/therapists/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);

        let (status, body) = call(&app, get("/api/therapists/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Therapist not found");
    }

    #[tokio::test]
    async fn create_therapist() {
        let app = make_server().router();
        let payload = json!({
            "name": "Dr. New",
            "specialty": "Grief Counseling",
            "education": "PsyD",
            "experience": "3 years",
            "rating": "5.0",
            "email": "new@example.com"
        });
        let (status, body) = call(&app, post_json("/api/therapists", &payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Dr. New");
        assert!(body["phone"].is_null());

        let (status, body) =
            call(&app, post_json("/api/therapists", &json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid therapist data");
    }

    // ── blog ──

    #[tokio::test]
    async fn create_post_assigns_server_fields() {
        let app = make_server().router();
        let payload = json!({
            "title": "First",
            "content": "Hello",
            "category": "general",
            "authorId": "chosen-by-client",
            "likes": 99
        });
        let (status, body) = call(&app, post_json("/api/blog-posts", &payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["likes"], 0);
        assert_ne!(body["authorId"], "chosen-by-client");
        assert!(body["createdAt"].is_string());
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn invalid_post_payloads_are_400() {
        let app = make_server().router();
        for payload in [
            json!({ "title": "t", "content": "c" }),
            json!({ "title": 1, "content": "c", "category": "g" }),
        ] {
            let (status, body) = call(&app, post_json("/api/blog-posts", &payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Invalid blog post data");
        }

        let req = Request::builder()
            .method("POST")
            .uri("/api/blog-posts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid blog post data");
    }

    #[tokio::test]
    async fn like_increments_by_one_each_call() {
        let app = make_server().router();
        let payload = json!({ "title": "t", "content": "c", "category": "general" });
        let (_, post) = call(&app, post_json("/api/blog-posts", &payload)).await;
        let id = post["id"].as_str().unwrap();
        let uri = format!("/api/blog-posts/{id}/like");

        let (status, body) = call(&app, post_empty(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["likes"], 1);
        let (_, body) = call(&app, post_empty(&uri)).await;
        assert_eq!(body["likes"], 2);

        let (_, body) = call(&app, get(&format!("/api/blog-posts/{id}"))).await;
        assert_eq!(body["likes"], 2);
    }

    #[tokio::test]
    async fn like_unknown_post_is_404() {
        let app = make_server().router();
        let (status, body) = call(&app, post_empty("/api/blog-posts/nope/like")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Blog post not found");

        let (status, _) = call(&app, get("/api/blog-posts/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn posts_list_newest_first() {
        let app = make_server().router();
        for title in ["one", "two", "three"] {
            let payload = json!({ "title": title, "content": "c", "category": "general" });
            let _ = call(&app, post_json("/api/blog-posts", &payload)).await;
        }
        let (_, body) = call(&app, get("/api/blog-posts")).await;
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn comments_on_any_post_id() {
        let app = make_server().router();
        let uri = "/api/blog-posts/not-a-real-post/comments";
        for content in ["first", "second"] {
            let (status, body) = call(&app, post_json(uri, &json!({ "content": content }))).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["postId"], "not-a-real-post");
        }
        let (status, body) = call(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, ["first", "second"]);

        let (status, body) = call(&app, post_json(uri, &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid comment data");
    }

    // ── chat ──

    #[tokio::test]
    async fn lists_seeded_chat_rooms() {
        let app = make_server().router();
        let (status, body) = call(&app, get("/api/chat-rooms")).await;
        assert_eq!(status, StatusCode::OK);
        let rooms = body.as_array().unwrap();
        assert!(!rooms.is_empty());
        for room in rooms {
            assert_eq!(room["isActive"], true);
            let active = room["activeUsers"].as_u64().unwrap();
            assert!((5..25).contains(&active));
        }

        let id = rooms[0]["id"].as_str().unwrap();
        let (status, _) = call(&app, get(&format!("/api/chat-rooms/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn chat_room_lookup_and_messages() {
        let app = make_server().router();
        let (status, body) = call(&app, get("/api/chat-rooms/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Chat room not found");

        let (status, body) = call(&app, get("/api/chat-rooms/missing/messages")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn listen_and_shutdown() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        let body: Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("shutdown timed out")
            .unwrap();
    }
}
