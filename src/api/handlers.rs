use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::images;
use crate::logic::validate::{
    validate_class, validate_instructor, validate_new_class, validate_new_instructor,
    validate_organization, ValidationError,
};
use crate::model::{Class, Id, Instructor, ListResponse, NewClass, NewInstructor, Organization};
use crate::sync::DataSync;

pub type AppState = Arc<DataSync>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: String,
    pub loading: bool,
    pub timestamp: String,
}

pub async fn health_check(State(sync): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        mode: if sync.is_offline() {
            "offline".to_string()
        } else {
            "connected".to_string()
        },
        loading: sync.is_loading(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }

    fn from_errors(errors: &[ValidationError]) -> Self {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self { error: joined }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn unprocessable(errors: &[ValidationError]) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::from_errors(errors)),
    )
}

fn not_found(what: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("{what} not found"))),
    )
}

// ----- organization -----

pub async fn get_organization(State(sync): State<AppState>) -> Json<Organization> {
    Json(sync.organization())
}

pub async fn put_organization(
    State(sync): State<AppState>,
    RequestJson(organization): RequestJson<Organization>,
) -> Result<Json<Organization>, ApiError> {
    validate_organization(&organization).map_err(|e| unprocessable(&e))?;
    sync.update_organization(organization.clone()).await;
    Ok(Json(organization))
}

// ----- instructors -----

pub async fn list_instructors(State(sync): State<AppState>) -> Json<ListResponse<Instructor>> {
    Json(ListResponse::new(sync.instructors()))
}

pub async fn get_instructor(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Instructor>, ApiError> {
    sync.instructor(&id)
        .map(Json)
        .ok_or_else(|| not_found("Instructor"))
}

pub async fn create_instructor(
    State(sync): State<AppState>,
    RequestJson(new_instructor): RequestJson<NewInstructor>,
) -> Result<(StatusCode, Json<Instructor>), ApiError> {
    validate_new_instructor(&new_instructor).map_err(|e| unprocessable(&e))?;
    let instructor = new_instructor.into_instructor();
    sync.add_instructor(instructor.clone()).await;
    Ok((StatusCode::CREATED, Json(instructor)))
}

pub async fn update_instructor(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
    RequestJson(mut instructor): RequestJson<Instructor>,
) -> Result<Json<Instructor>, ApiError> {
    if sync.instructor(&id).is_none() {
        return Err(not_found("Instructor"));
    }
    // Ids are immutable; the path wins over whatever the payload carries.
    instructor.id = id.clone();
    validate_instructor(&instructor).map_err(|e| unprocessable(&e))?;
    sync.update_instructor(&id, instructor.clone()).await;
    Ok(Json(instructor))
}

pub async fn delete_instructor(State(sync): State<AppState>, Path(id): Path<Id>) -> StatusCode {
    sync.delete_instructor(&id).await;
    StatusCode::NO_CONTENT
}

// ----- classes -----

pub async fn list_classes(State(sync): State<AppState>) -> Json<ListResponse<Class>> {
    Json(ListResponse::new(sync.classes()))
}

pub async fn get_class(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Class>, ApiError> {
    sync.class(&id).map(Json).ok_or_else(|| not_found("Class"))
}

pub async fn create_class(
    State(sync): State<AppState>,
    RequestJson(new_class): RequestJson<NewClass>,
) -> Result<(StatusCode, Json<Class>), ApiError> {
    validate_new_class(&new_class).map_err(|e| unprocessable(&e))?;
    let class = new_class.into_class();
    sync.add_class(class.clone()).await;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update_class(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
    RequestJson(mut class): RequestJson<Class>,
) -> Result<Json<Class>, ApiError> {
    if sync.class(&id).is_none() {
        return Err(not_found("Class"));
    }
    class.id = id.clone();
    validate_class(&class).map_err(|e| unprocessable(&e))?;
    sync.update_class(&id, class.clone()).await;
    Ok(Json(class))
}

pub async fn delete_class(State(sync): State<AppState>, Path(id): Path<Id>) -> StatusCode {
    sync.delete_class(&id).await;
    StatusCode::NO_CONTENT
}

pub async fn enroll_class(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Class>, ApiError> {
    sync.increment_participants(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found("Class"))
}

pub async fn withdraw_class(
    State(sync): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Class>, ApiError> {
    sync.decrement_participants(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found("Class"))
}

// ----- schedule -----

pub async fn get_schedule(State(sync): State<AppState>) -> Json<Vec<DateTime<Utc>>> {
    Json(sync.class_schedule())
}

pub async fn get_schedule_day(
    State(sync): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<ListResponse<Class>>, ApiError> {
    let day: NaiveDate = date.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("expected date as YYYY-MM-DD")),
        )
    })?;
    Ok(Json(ListResponse::new(sync.classes_on_day(day))))
}

// ----- images -----

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
    /// Compress to an inline data URL instead of uploading to the blob store.
    pub inline: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload_image(
    State(sync): State<AppState>,
    Path(folder): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if !images::validate_image_size(body.len()) {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::new("image exceeds the 10 MB upload limit")),
        ));
    }

    let url = if query.inline.unwrap_or(false) {
        images::compress_image(&body, &images::CompressOptions::default())
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse::new(&e.to_string()))))?
    } else {
        sync.store_image(&body, &query.file_name, &folder)
            .await
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse::new(&e.to_string()))))?
    };

    Ok(Json(UploadResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub deleted: bool,
}

pub async fn delete_image(
    State(sync): State<AppState>,
    Query(query): Query<DeleteImageQuery>,
) -> Json<DeleteImageResponse> {
    let deleted = sync.remove_image(&query.url).await;
    Json(DeleteImageResponse { deleted })
}
