use crate::{AppState, handlers::uploads, uploads::UploadPolicy};
use axum::{Router, extract::DefaultBodyLimit, routing::post};

/// Upload Router Module
///
/// One route per upload purpose; MIME allow-list, size ceiling and object naming come
/// from the matching [`UploadPolicy`]. The body limit layer only replaces axum's 2 MB
/// default so the 25 MB journal PDFs fit; per-purpose ceilings are enforced while
/// streaming.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/uploads/avatar", post(uploads::upload_avatar))
        .route("/uploads/news", post(uploads::upload_news_image))
        .route("/uploads/journals/pdf", post(uploads::upload_journal_pdf))
        .route("/uploads/journals/thumb", post(uploads::upload_journal_thumb))
        .route("/uploads/projects", post(uploads::upload_project_image))
        .route(
            "/uploads/collaborations",
            post(uploads::upload_collaboration_logo),
        )
        .layer(DefaultBodyLimit::max(UploadPolicy::BODY_LIMIT))
}
