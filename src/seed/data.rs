use crate::model::{Class, ContactInfo, Instructor, Organization};
use crate::sync::DataSync;

/// The profile shown before an admin has saved one, and the offline-mode
/// default.
pub fn default_organization() -> Organization {
    Organization {
        name: "re: Play".to_string(),
        description:
            "A professional fitness academy offering the best exercise programs for a healthy life."
                .to_string(),
        organization_description: None,
        history: "Since opening in 2015 we have guided our members' healthy change with a \
                  professional teaching staff and structured, personalized programs."
            .to_string(),
        contact: ContactInfo {
            phone: "02-1234-5678".to_string(),
            email: "info@replay-fitness.com".to_string(),
            address: "123 Teheran-ro, Gangnam-gu, Seoul".to_string(),
        },
        registration_notice_title: None,
        registration_notice: None,
    }
}

/// Optional demo fixture for local development, gated by `LOAD_SEED_DATA`.
/// Only fills collections that are still empty.
pub async fn load_seed_data(sync: &DataSync) {
    if sync.instructors().is_empty() {
        sync.add_instructor(Instructor {
            id: "1715000000000".to_string(),
            name: "Kim Jiwoo".to_string(),
            bio: "Mat and equipment pilates specialist.".to_string(),
            images: vec![],
            specialties: vec!["pilates".to_string(), "rehabilitation".to_string()],
            experience: "8 years of coaching".to_string(),
            detailed_description: None,
        })
        .await;
    }

    if sync.classes().is_empty() {
        let date = match "2024-05-10T14:00:00Z".parse() {
            Ok(date) => date,
            Err(_) => return,
        };
        sync.add_class(Class {
            id: "1715349600000".to_string(),
            title: "Morning Pilates".to_string(),
            description: "Start the day with a full-body mat session.".to_string(),
            detailed_description: None,
            instructor: "Kim Jiwoo".to_string(),
            date,
            duration: 60,
            max_participants: 10,
            current_participants: 0,
            location: Some("Studio B".to_string()),
            google_form_url: None,
            images: None,
        })
        .await;
    }
}
