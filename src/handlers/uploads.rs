use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::UploadResponse,
    uploads::{self, UploadError, UploadPolicy},
};

type UploadResult = AppResult<(StatusCode, Json<UploadResponse>)>;

/// store_upload
///
/// Shared body of every upload route: receive and check the file against `policy`,
/// name it, hand it to the storage backend and report where it is served from.
async fn store_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    policy: &UploadPolicy,
) -> UploadResult {
    let multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;
    let file = uploads::receive(multipart, policy).await?;

    let key = uploads::object_key(
        policy,
        &file,
        Utc::now().timestamp_millis(),
        &uploads::random_suffix(),
    );
    let size = file.bytes.len();
    let stored = state
        .storage
        .put_object(&key, &file.content_type, file.bytes)
        .await
        .map_err(AppError::from)?;

    tracing::info!(key = %stored.key, size, content_type = %file.content_type, "Upload stored");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            path: stored.url.clone(),
            url: stored.url,
        }),
    ))
}

/// upload_avatar
///
/// Member portrait. The optional `slug` form field prefixes the object name.
#[utoipa::path(
    post,
    path = "/api/uploads/avatar",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (png, jpeg, webp, gif, svg; at most 5 MB) and optional `slug`"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::AVATAR).await
}

/// upload_news_image
#[utoipa::path(
    post,
    path = "/api/uploads/news",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (png, jpeg, webp, gif; at most 5 MB)"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_news_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::NEWS_IMAGE).await
}

/// upload_journal_pdf
#[utoipa::path(
    post,
    path = "/api/uploads/journals/pdf",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (application/pdf; at most 25 MB)"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_journal_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::JOURNAL_PDF).await
}

/// upload_journal_thumb
#[utoipa::path(
    post,
    path = "/api/uploads/journals/thumb",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (png, jpeg, webp, gif; at most 5 MB)"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_journal_thumb(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::JOURNAL_THUMB).await
}

/// upload_project_image
///
/// Thumbnails, banners, QR codes and gallery images all go through here.
#[utoipa::path(
    post,
    path = "/api/uploads/projects",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (any image type; at most 5 MB)"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_project_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::PROJECT_IMAGE).await
}

/// upload_collaboration_logo
///
/// The optional `name` form field prefixes the object name.
#[utoipa::path(
    post,
    path = "/api/uploads/collaborations",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "`file` (png, jpeg, webp, gif, svg; at most 2 MB) and optional `name`"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_collaboration_logo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    store_upload(&state, multipart, &UploadPolicy::COLLABORATION_LOGO).await
}
