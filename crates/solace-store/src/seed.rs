//! Sample records loaded by [`MemStorage::with_seed_data`](crate::MemStorage::with_seed_data).

use solace_core::{NewChatRoom, NewTherapist};

const IMAGE_PARAMS: &str = "?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400";

struct TherapistSeed {
    name: &'static str,
    specialty: &'static str,
    education: &'static str,
    experience: &'static str,
    rating: &'static str,
    phone: &'static str,
    bio: &'static str,
    photo: &'static str,
}

const THERAPISTS: &[TherapistSeed] = &[
    TherapistSeed {
        name: "Dr. Sarah Johnson",
        specialty: "Anxiety & Depression Specialist",
        education: "PhD in Clinical Psychology",
        experience: "8 years experience",
        rating: "4.9 (127 reviews)",
        phone: "(555) 123-4567",
        bio: "Dr. Johnson specializes in cognitive behavioral therapy and has extensive \
              experience helping clients manage anxiety and depression.",
        photo: "photo-1559839734-2b71ea197ec2",
    },
    TherapistSeed {
        name: "Dr. Michael Chen",
        specialty: "Relationship & Family Therapy",
        education: "MA in Marriage & Family Therapy",
        experience: "12 years experience",
        rating: "4.8 (89 reviews)",
        phone: "(555) 234-5678",
        bio: "Dr. Chen focuses on relationship dynamics and family systems therapy, helping \
              couples and families build stronger connections.",
        photo: "photo-1612349317150-e413f6a5b16d",
    },
    TherapistSeed {
        name: "Dr. Emily Rodriguez",
        specialty: "Trauma & PTSD Specialist",
        education: "PsyD in Clinical Psychology",
        experience: "15 years experience",
        rating: "5.0 (156 reviews)",
        phone: "(555) 345-6789",
        bio: "Dr. Rodriguez specializes in trauma-informed therapy and EMDR, helping clients \
              heal from traumatic experiences.",
        photo: "photo-1594824709602-7b64f4c78ded",
    },
];

const CHAT_ROOMS: &[(&str, &str)] = &[
    (
        "Anxiety Support Circle",
        "A safe space to discuss anxiety and coping strategies",
    ),
    (
        "Depression Recovery",
        "Share experiences and find hope together",
    ),
    ("General Support", "Open conversation for any topic"),
];

/// Sample therapist directory entries.
pub fn therapists() -> Vec<NewTherapist> {
    THERAPISTS
        .iter()
        .map(|seed| NewTherapist {
            name: seed.name.to_owned(),
            specialty: seed.specialty.to_owned(),
            education: seed.education.to_owned(),
            experience: seed.experience.to_owned(),
            rating: seed.rating.to_owned(),
            email: "contact@example.com".to_owned(),
            phone: Some(seed.phone.to_owned()),
            bio: Some(seed.bio.to_owned()),
            image_url: Some(format!(
                "https://images.unsplash.com/{}{IMAGE_PARAMS}",
                seed.photo
            )),
        })
        .collect()
}

/// Sample chat rooms.
pub fn chat_rooms() -> Vec<NewChatRoom> {
    CHAT_ROOMS
        .iter()
        .map(|(name, description)| NewChatRoom::new(*name, *description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_complete_therapists() {
        let therapists = therapists();
        assert_eq!(therapists.len(), 3);
        for t in &therapists {
            assert!(!t.name.is_empty());
            assert!(t.bio.as_deref().is_some_and(|bio| !bio.contains("  ")));
            assert!(
                t.image_url
                    .as_deref()
                    .is_some_and(|url| url.starts_with("https://"))
            );
        }
    }

    #[test]
    fn room_names() {
        let names: Vec<String> = chat_rooms().into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["Anxiety Support Circle", "Depression Recovery", "General Support"]
        );
    }
}
