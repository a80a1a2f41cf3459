use crate::{
    AppState,
    handlers::{collaborations, journals, news, projects},
};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Content management for news, journals, projects and collaborations. Listings here
/// include unpublished records and use larger page sizes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/news
        // POST /admin/news
        .route("/news", get(news::admin_list_news).post(news::create_news))
        // PATCH | DELETE /admin/news/{slug}
        .route(
            "/news/{slug}",
            patch(news::update_news).delete(news::delete_news),
        )
        .route(
            "/journals",
            get(journals::admin_list_journals).post(journals::create_journal),
        )
        .route(
            "/journals/{slug}",
            patch(journals::update_journal).delete(journals::delete_journal),
        )
        // GET /admin/projects lists drafts too; create and update answer with the stored project.
        .route(
            "/projects",
            get(projects::admin_list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{slug}",
            get(projects::admin_get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/collaborations",
            get(collaborations::admin_list_collaborations)
                .post(collaborations::create_collaboration),
        )
        .route(
            "/collaborations/{slug}",
            get(collaborations::admin_get_collaboration)
                .patch(collaborations::update_collaboration)
                .delete(collaborations::delete_collaboration),
        )
}
