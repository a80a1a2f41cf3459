//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: parse and validate the request, resolve pagination and slugs,
//! call the repository (or storage) through `AppState`, and shape the response.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::HealthResponse,
    pagination, slug,
};

pub mod collaborations;
pub mod journals;
pub mod members;
pub mod news;
pub mod projects;
pub mod uploads;

// --- Extractors ---

/// ValidatedJson
///
/// JSON body extractor that runs the payload's `validator` rules before the handler sees
/// it. Unparseable bodies and rule violations are both rejected as 400 `VALIDATION_ERROR`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

// --- Shared Helpers ---

/// Query strings treat an empty value the same as an absent one.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lenient integer filter (`year=2024`, `year=2024.0`); garbage is ignored.
pub(crate) fn int_filter(value: Option<&str>) -> Option<i32> {
    pagination::coerce(value).and_then(|v| i32::try_from(v).ok())
}

/// derive_slug
///
/// Uses the supplied slug when present, otherwise derives one from `source`. A supplied
/// slug must already be well-formed; a derived one only has to be non-empty.
pub(crate) fn derive_slug(supplied: Option<&str>, source: &str) -> AppResult<String> {
    let supplied = supplied.map(str::trim).filter(|s| !s.is_empty());
    let slug = slug::resolve(supplied, source);

    if supplied.is_some() && !slug::is_valid_slug(&slug) {
        return Err(AppError::Validation(format!(
            "slug '{slug}' must be at least 3 characters of a-z, 0-9 or '-'"
        )));
    }
    if slug.is_empty() {
        return Err(AppError::Validation(
            "unable to derive a slug, provide one explicitly".to_string(),
        ));
    }
    Ok(slug)
}

// --- Handlers ---

/// health
///
/// Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
