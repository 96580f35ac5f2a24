use crate::model::{generate_id, Id};
use serde::{Deserialize, Serialize};

/// A member of the teaching roster. Created and deleted individually; updates
/// replace the whole record, keyed by the immutable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: Id,
    pub name: String,
    pub bio: String,
    /// Inline data URLs or blob-store download URLs, in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub experience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
}

impl Instructor {
    /// Every wire field name, for merge-update masks; see `Class::FIELD_PATHS`.
    pub const FIELD_PATHS: &'static [&'static str] = &[
        "id",
        "name",
        "bio",
        "images",
        "specialties",
        "experience",
        "detailedDescription",
    ];
}

/// Payload for creating an instructor; the server assigns the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstructor {
    pub name: String,
    pub bio: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub detailed_description: Option<String>,
}

impl NewInstructor {
    pub fn into_instructor(self) -> Instructor {
        Instructor {
            id: generate_id(),
            name: self.name,
            bio: self.bio,
            images: self.images,
            specialties: self.specialties,
            experience: self.experience,
            detailed_description: self.detailed_description,
        }
    }
}
