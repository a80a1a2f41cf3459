/// Router Module Index
///
/// Groups the API surface by audience. Every module returns a `Router<AppState>` that
/// `create_router` nests under `/api`.

/// Read endpoints of the public site, plus the member directory's write endpoints.
pub mod public;

/// Content management endpoints, nested under `/admin`. These bypass publication filters.
pub mod admin;

/// Multipart upload endpoints with their own request body ceiling.
pub mod uploads;
