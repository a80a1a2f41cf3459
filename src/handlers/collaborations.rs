use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{ValidatedJson, derive_slug, non_blank};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        Collaboration, CreateCollaborationRequest, DataResponse, MutationResponse, Page,
        UpdateCollaborationRequest,
    },
    pagination::{PageLimits, Pagination},
    repository::CollaborationFilter,
};

const ADMIN_LIMITS: PageLimits = PageLimits::new(10, 50);

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CollaborationListQuery {
    /// Case-insensitive substring match on name or organization.
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

/// list_collaborations
///
/// Every partner at once, for the public logo wall.
#[utoipa::path(
    get,
    path = "/api/collaborations",
    tag = "collaborations",
    responses((status = 200, description = "All collaborations", body = DataResponse<Collaboration>))
)]
pub async fn list_collaborations(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Collaboration>>> {
    let data = state.repo.all_collaborations().await?;
    Ok(Json(DataResponse { data }))
}

/// admin_list_collaborations
#[utoipa::path(
    get,
    path = "/api/admin/collaborations",
    tag = "admin",
    params(CollaborationListQuery),
    responses((status = 200, description = "Collaboration page", body = Page<Collaboration>))
)]
pub async fn admin_list_collaborations(
    State(state): State<AppState>,
    Query(query): Query<CollaborationListQuery>,
) -> AppResult<Json<Page<Collaboration>>> {
    let page = Pagination::resolve(query.page.as_deref(), query.per_page.as_deref(), ADMIN_LIMITS);
    let filter = CollaborationFilter {
        q: non_blank(query.q),
        kind: non_blank(query.kind),
    };

    let (items, count) = state.repo.list_collaborations(&filter, page).await?;
    Ok(Json(Page::new(items, count, page)))
}

/// admin_get_collaboration
#[utoipa::path(
    get,
    path = "/api/admin/collaborations/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Collaboration slug")),
    responses(
        (status = 200, description = "Collaboration", body = Collaboration),
        (status = 404, description = "No collaboration with this slug")
    )
)]
pub async fn admin_get_collaboration(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Collaboration>> {
    state
        .repo
        .get_collaboration(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("collaboration", slug))
}

/// create_collaboration
///
/// The slug defaults to the slugified name.
#[utoipa::path(
    post,
    path = "/api/admin/collaborations",
    tag = "admin",
    request_body = CreateCollaborationRequest,
    responses(
        (status = 201, description = "Collaboration created", body = MutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_collaboration(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCollaborationRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let slug = derive_slug(payload.slug.as_deref(), &payload.name)?;
    let created = state.repo.create_collaboration(&slug, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created("Collaboration created", created)),
    ))
}

/// update_collaboration
#[utoipa::path(
    patch,
    path = "/api/admin/collaborations/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Collaboration slug")),
    request_body = UpdateCollaborationRequest,
    responses(
        (status = 200, description = "Collaboration updated", body = MutationResponse),
        (status = 404, description = "No collaboration with this slug")
    )
)]
pub async fn update_collaboration(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCollaborationRequest>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.update_collaboration(&slug, &payload).await? {
        return Err(AppError::not_found("collaboration", slug));
    }
    Ok(Json(MutationResponse::message("Collaboration updated")))
}

/// delete_collaboration
#[utoipa::path(
    delete,
    path = "/api/admin/collaborations/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Collaboration slug")),
    responses(
        (status = 200, description = "Collaboration deleted", body = MutationResponse),
        (status = 404, description = "No collaboration with this slug")
    )
)]
pub async fn delete_collaboration(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.delete_collaboration(&slug).await? {
        return Err(AppError::not_found("collaboration", slug));
    }
    tracing::info!(slug = %slug, "Collaboration deleted");
    Ok(Json(MutationResponse::message("Collaboration deleted")))
}
