use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{ValidatedJson, non_blank};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{CreateMemberRequest, Member, MemberDetail, MutationResponse, Page, UpdateMemberRequest},
    pagination::{PageLimits, Pagination},
    repository::MemberFilter,
};

const LIMITS: PageLimits = PageLimits::new(6, 50);

/// MemberListQuery
///
/// Query parameters of `GET /api/members`. Everything arrives as text; numbers are
/// coerced leniently and blank values count as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberListQuery {
    /// Case-insensitive substring match on name or email.
    pub q: Option<String>,
    pub position: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

/// list_members
///
/// Paginated member directory, newest first.
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "members",
    params(MemberListQuery),
    responses((status = 200, description = "Member page", body = Page<Member>))
)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> AppResult<Json<Page<Member>>> {
    let page = Pagination::resolve(query.page.as_deref(), query.per_page.as_deref(), LIMITS);
    let filter = MemberFilter {
        q: non_blank(query.q),
        position: non_blank(query.position),
        faculty: non_blank(query.faculty),
        program: non_blank(query.program),
    };

    let (items, count) = state.repo.list_members(&filter, page).await?;
    Ok(Json(Page::new(items, count, page)))
}

/// get_member
///
/// A member with specialists, skills, experiences, educations, certifications and socials.
#[utoipa::path(
    get,
    path = "/api/members/{slug}",
    tag = "members",
    params(("slug" = String, Path, description = "Member slug")),
    responses(
        (status = 200, description = "Member detail", body = MemberDetail),
        (status = 404, description = "No member with this slug")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MemberDetail>> {
    state
        .repo
        .get_member(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("member", slug))
}

/// create_member
///
/// Inserts the member and all child collections in one transaction.
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created", body = MutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMemberRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let created = state.repo.create_member(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created("Member created", created)),
    ))
}

/// update_member
///
/// Partial update. Collections present in the body replace the stored ones; an explicit
/// `null` clears a nullable field.
#[utoipa::path(
    patch,
    path = "/api/members/{slug}",
    tag = "members",
    params(("slug" = String, Path, description = "Member slug")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No member with this slug")
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateMemberRequest>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.update_member(&slug, &payload).await? {
        return Err(AppError::not_found("member", slug));
    }
    Ok(Json(MutationResponse::message("Member updated")))
}

/// delete_member
#[utoipa::path(
    delete,
    path = "/api/members/{slug}",
    tag = "members",
    params(("slug" = String, Path, description = "Member slug")),
    responses(
        (status = 200, description = "Member deleted", body = MutationResponse),
        (status = 404, description = "No member with this slug")
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.delete_member(&slug).await? {
        return Err(AppError::not_found("member", slug));
    }
    tracing::info!(slug = %slug, "Member deleted");
    Ok(Json(MutationResponse::message("Member deleted")))
}
