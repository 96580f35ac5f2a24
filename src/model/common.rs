use serde::{Deserialize, Serialize};

pub type Id = String;

/// Generate a collection-unique id the way the admin pages always have:
/// the current wall-clock instant in milliseconds, as a string. Once assigned
/// an id never changes.
pub fn generate_id() -> Id {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Image references on instructors and classes come in two shapes: inline
/// base64 data URLs produced by the compression utility, or download URLs
/// pointing into the blob store.
pub fn is_inline_image(reference: &str) -> bool {
    reference.starts_with("data:")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_timestamp_strings() {
        let id = generate_id();
        assert!(id.parse::<i64>().is_ok());
        assert!(id.len() >= 13);
    }

    #[test]
    fn inline_images_are_detected_by_scheme() {
        assert!(is_inline_image("data:image/jpeg;base64,/9j/4AAQ"));
        assert!(!is_inline_image(
            "https://firebasestorage.googleapis.com/v0/b/demo/o/instructors%2F1_a.jpg?alt=media"
        ));
    }
}
