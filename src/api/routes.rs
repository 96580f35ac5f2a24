use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::handlers;
use crate::api::handlers::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Organization (singleton)
        .route("/organization", get(handlers::get_organization))
        .route("/organization", put(handlers::put_organization))
        // Instructor roster
        .route("/instructors", get(handlers::list_instructors))
        .route("/instructors", post(handlers::create_instructor))
        .route("/instructors/:id", get(handlers::get_instructor))
        .route("/instructors/:id", put(handlers::update_instructor))
        .route("/instructors/:id", delete(handlers::delete_instructor))
        // Classes
        .route("/classes", get(handlers::list_classes))
        .route("/classes", post(handlers::create_class))
        .route("/classes/:id", get(handlers::get_class))
        .route("/classes/:id", put(handlers::update_class))
        .route("/classes/:id", delete(handlers::delete_class))
        // Enrollment adjustments (admin)
        .route("/classes/:id/enroll", post(handlers::enroll_class))
        .route("/classes/:id/withdraw", post(handlers::withdraw_class))
        // Calendar
        .route("/schedule", get(handlers::get_schedule))
        .route("/schedule/:date", get(handlers::get_schedule_day))
        // Images
        .route("/images/:folder", post(handlers::upload_image))
        .route("/images", delete(handlers::delete_image))
        // Built site assets
        .fallback_service(ServeDir::new("public"))
}
