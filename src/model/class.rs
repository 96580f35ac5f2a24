use crate::model::{generate_id, Id};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled class. The `instructor` field is the instructor's display name
/// as free text, matched elsewhere by exact string equality; renaming or
/// deleting an instructor does not touch existing classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Id,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    pub instructor: String,
    /// Scheduled start instant; a Firestore timestamp on the wire.
    pub date: DateTime<Utc>,
    /// Duration in minutes.
    pub duration: u32,
    pub max_participants: u32,
    #[serde(default)]
    pub current_participants: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_form_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Class {
    /// Every wire field name, for merge-update masks. Must list the optional
    /// fields too: a mask entry with no matching value in the payload deletes
    /// the stored field, which is how a cleared optional propagates.
    pub const FIELD_PATHS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "detailedDescription",
        "instructor",
        "date",
        "duration",
        "maxParticipants",
        "currentParticipants",
        "location",
        "googleFormUrl",
        "images",
    ];

    /// Day-level calendar match: time-of-day is ignored.
    pub fn is_on_day(&self, day: NaiveDate) -> bool {
        self.date.date_naive() == day
    }

    /// Enrollment moved by `delta`, silently rejected (returning `None`)
    /// when the result would leave `[0, max_participants]`.
    pub fn with_enrollment_delta(&self, delta: i64) -> Option<Class> {
        let next = i64::from(self.current_participants) + delta;
        if next < 0 || next > i64::from(self.max_participants) {
            return None;
        }
        let mut updated = self.clone();
        updated.current_participants = next as u32;
        Some(updated)
    }
}

/// Payload for creating a class; the server assigns the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub detailed_description: Option<String>,
    pub instructor: String,
    pub date: DateTime<Utc>,
    pub duration: u32,
    pub max_participants: u32,
    #[serde(default)]
    pub current_participants: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub google_form_url: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl NewClass {
    pub fn into_class(self) -> Class {
        Class {
            id: generate_id(),
            title: self.title,
            description: self.description,
            detailed_description: self.detailed_description,
            instructor: self.instructor,
            date: self.date,
            duration: self.duration,
            max_participants: self.max_participants,
            current_participants: self.current_participants,
            location: self.location,
            google_form_url: self.google_form_url,
            images: self.images,
        }
    }
}
