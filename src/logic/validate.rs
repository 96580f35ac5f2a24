//! Form-level validation, surfaced to the caller before any data call runs.

use crate::model::{Class, Instructor, NewClass, NewInstructor, Organization};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
    #[error("current participants cannot exceed capacity")]
    EnrollmentOverCapacity,
}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_organization(organization: &Organization) -> ValidationResult {
    let mut errors = Vec::new();
    if organization.name.trim().is_empty() {
        errors.push(ValidationError::MissingField("name"));
    }
    if organization.contact.email.trim().is_empty() {
        errors.push(ValidationError::MissingField("contact email"));
    }
    finish(errors)
}

fn validate_instructor_fields(name: &str, bio: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(ValidationError::MissingField("name"));
    }
    if bio.trim().is_empty() {
        errors.push(ValidationError::MissingField("bio"));
    }
    errors
}

pub fn validate_new_instructor(instructor: &NewInstructor) -> ValidationResult {
    finish(validate_instructor_fields(&instructor.name, &instructor.bio))
}

pub fn validate_instructor(instructor: &Instructor) -> ValidationResult {
    finish(validate_instructor_fields(&instructor.name, &instructor.bio))
}

fn validate_class_fields(
    title: &str,
    instructor: &str,
    duration: u32,
    max_participants: u32,
    current_participants: u32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(ValidationError::MissingField("title"));
    }
    if instructor.trim().is_empty() {
        errors.push(ValidationError::MissingField("instructor"));
    }
    if duration == 0 {
        errors.push(ValidationError::NonPositive("duration"));
    }
    if max_participants == 0 {
        errors.push(ValidationError::NonPositive("maxParticipants"));
    }
    if current_participants > max_participants {
        errors.push(ValidationError::EnrollmentOverCapacity);
    }
    errors
}

pub fn validate_new_class(class: &NewClass) -> ValidationResult {
    finish(validate_class_fields(
        &class.title,
        &class.instructor,
        class.duration,
        class.max_participants,
        class.current_participants,
    ))
}

pub fn validate_class(class: &Class) -> ValidationResult {
    finish(validate_class_fields(
        &class.title,
        &class.instructor,
        class.duration,
        class.max_participants,
        class.current_participants,
    ))
}
