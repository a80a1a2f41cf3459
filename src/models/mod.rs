//! Request and response schemas.
//!
//! Database rows, API payloads and the shared response envelopes. JSON-valued columns
//! are held as TEXT in `*Row` structs and decoded into the public structs through
//! [`crate::codec`].

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::pagination::Pagination;

pub mod collaboration;
pub mod journal;
pub mod member;
pub mod news;
pub mod project;

pub use collaboration::*;
pub use journal::*;
pub use member::*;
pub use news::*;
pub use project::*;

/// Page
///
/// Envelope of every paginated list endpoint. `count` is the total number of rows
/// matching the filters, independent of the requested page.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub count: i64,
    pub page: i64,
    #[serde(rename = "perPage")]
    pub per_page: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, count: i64, pagination: Pagination) -> Self {
        Self {
            data,
            count,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages: pagination.total_pages(count),
        }
    }
}

/// DataResponse
///
/// `{ "data": [...] }` envelope for unpaginated collections.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// MutationResponse
///
/// Confirmation body of create/update/delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct MutationResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl MutationResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn created(message: impl Into<String>, created: Created) -> Self {
        Self {
            message: message.into(),
            id: Some(created.id),
            slug: Some(created.slug),
        }
    }
}

/// Created
///
/// Identity of a freshly inserted parent record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: i64,
    pub slug: String,
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`) in PATCH
/// payloads. Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// UploadResponse
///
/// Public location of a stored upload. `path` repeats `url`; the admin forms read either.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
    pub path: String,
}

/// HealthResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct HealthResponse {
    pub ok: bool,
}
