use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{ValidatedJson, derive_slug, int_filter, non_blank};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        CreateProjectRequest, DataResponse, MutationResponse, Page, Project, ProjectCategory,
        ProjectMutationResponse, UpdateProjectRequest,
    },
    pagination::{self, PageLimits, Pagination},
    repository::{ProjectFilter, ProjectScope},
};

const PUBLIC_LIMITS: PageLimits = PageLimits::new(12, 100);
const ADMIN_LIMITS: PageLimits = PageLimits::new(20, 100);
const FEATURED_DEFAULT: i64 = 6;
const FEATURED_MAX: i64 = 24;

/// ProjectListQuery
///
/// Shared by the public and admin listings. The public one additionally hides drafts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Case-insensitive substring match on title or short description.
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub year: Option<String>,
    /// `true` restricts the listing to featured projects.
    pub featured: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedQuery {
    /// Number of projects to return (default 6, at most 24).
    pub limit: Option<String>,
}

async fn list(
    state: &AppState,
    query: ProjectListQuery,
    scope: ProjectScope,
) -> AppResult<Json<Page<Project>>> {
    let limits = match scope {
        ProjectScope::Public => PUBLIC_LIMITS,
        ProjectScope::Admin => ADMIN_LIMITS,
    };
    let page = Pagination::resolve(query.page.as_deref(), query.per_page.as_deref(), limits);
    let filter = ProjectFilter {
        q: non_blank(query.q),
        category: non_blank(query.category),
        status: non_blank(query.status),
        year: int_filter(query.year.as_deref()),
        featured_only: query.featured.as_deref().map(str::trim) == Some("true"),
        scope,
    };

    let (items, count) = state.repo.list_projects(&filter, page).await?;
    Ok(Json(Page::new(items, count, page)))
}

/// list_projects
///
/// Published projects: featured first, then by display order and most recent date.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    params(ProjectListQuery),
    responses((status = 200, description = "Project page", body = Page<Project>))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<Page<Project>>> {
    list(&state, query, ProjectScope::Public).await
}

/// featured_projects
#[utoipa::path(
    get,
    path = "/api/projects/featured",
    tag = "projects",
    params(FeaturedQuery),
    responses((status = 200, description = "Featured projects", body = DataResponse<Project>))
)]
pub async fn featured_projects(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> AppResult<Json<DataResponse<Project>>> {
    let limit = pagination::coerce(query.limit.as_deref())
        .unwrap_or(FEATURED_DEFAULT)
        .clamp(1, FEATURED_MAX);
    let data = state.repo.featured_projects(limit).await?;
    Ok(Json(DataResponse { data }))
}

/// project_categories
#[utoipa::path(
    get,
    path = "/api/projects/categories",
    tag = "projects",
    responses((status = 200, description = "Project categories", body = DataResponse<ProjectCategory>))
)]
pub async fn project_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ProjectCategory>>> {
    let data = state.repo.project_categories().await?;
    Ok(Json(DataResponse { data }))
}

/// get_project
///
/// Unpublished projects are reported as not found here.
#[utoipa::path(
    get,
    path = "/api/projects/{slug}",
    tag = "projects",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project detail with team", body = Project),
        (status = 404, description = "No published project with this slug")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Project>> {
    state
        .repo
        .get_project(&slug, true)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("project", slug))
}

/// admin_list_projects
///
/// Every project including drafts, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/projects",
    tag = "admin",
    params(ProjectListQuery),
    responses((status = 200, description = "Project page", body = Page<Project>))
)]
pub async fn admin_list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<Page<Project>>> {
    list(&state, query, ProjectScope::Admin).await
}

/// admin_get_project
#[utoipa::path(
    get,
    path = "/api/admin/projects/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project detail with team", body = Project),
        (status = 404, description = "No project with this slug")
    )
)]
pub async fn admin_get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Project>> {
    state
        .repo
        .get_project(&slug, false)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("project", slug))
}

/// create_project
///
/// Returns the stored project, team included.
#[utoipa::path(
    post,
    path = "/api/admin/projects",
    tag = "admin",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectMutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectMutationResponse>)> {
    let slug = derive_slug(payload.slug.as_deref(), &payload.title)?;
    let project = state.repo.create_project(&slug, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectMutationResponse {
            message: "Project created".to_string(),
            id: project.id,
            slug: project.slug.clone(),
            project,
        }),
    ))
}

/// update_project
#[utoipa::path(
    patch,
    path = "/api/admin/projects/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Project slug")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectMutationResponse),
        (status = 404, description = "No project with this slug")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProjectRequest>,
) -> AppResult<Json<ProjectMutationResponse>> {
    let project = state
        .repo
        .update_project(&slug, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("project", slug))?;

    Ok(Json(ProjectMutationResponse {
        message: "Project updated".to_string(),
        id: project.id,
        slug: project.slug.clone(),
        project,
    }))
}

/// delete_project
///
/// The team rows go with it through the foreign key cascade.
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project deleted", body = MutationResponse),
        (status = 404, description = "No project with this slug")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.delete_project(&slug).await? {
        return Err(AppError::not_found("project", slug));
    }
    tracing::info!(slug = %slug, "Project deleted");
    Ok(Json(MutationResponse::message("Project deleted")))
}
