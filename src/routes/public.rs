use crate::{
    AppState,
    handlers::{collaborations, journals, members, news, projects},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints consumed by the public site. Project listings and details only ever expose
/// published projects; the filter is applied in the repository query.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /members?q=&position=&faculty=&program=&page=&perPage=
        // POST /members
        // Paginated directory; creation inserts the member with all child collections.
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        // GET | PATCH | DELETE /members/{slug}
        .route(
            "/members/{slug}",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::delete_member),
        )
        // GET /news?q=&category=&page=&perPage=
        .route("/news", get(news::list_news))
        .route("/news/{slug}", get(news::get_news))
        // GET /journals?q=&year=&type=&page=&perPage=
        .route("/journals", get(journals::list_journals))
        .route("/journals/{slug}", get(journals::get_journal))
        // GET /projects?q=&category=&status=&year=&featured=true&page=&perPage=
        .route("/projects", get(projects::list_projects))
        // Static segments win over `{slug}`, so these two never shadow a project.
        .route("/projects/featured", get(projects::featured_projects))
        .route("/projects/categories", get(projects::project_categories))
        .route("/projects/{slug}", get(projects::get_project))
        // GET /collaborations
        // Unpaginated, for the partner logo wall.
        .route("/collaborations", get(collaborations::list_collaborations))
}
