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
        CreateJournalRequest, Journal, JournalSummary, MutationResponse, Page,
        UpdateJournalRequest,
    },
    pagination::{PageLimits, Pagination},
    repository::JournalFilter,
};

const PUBLIC_LIMITS: PageLimits = PageLimits::new(9, 50);
const ADMIN_LIMITS: PageLimits = PageLimits::new(20, 100);

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JournalListQuery {
    /// Case-insensitive substring match on title, abstract or authors.
    pub q: Option<String>,
    /// Publication year; non-numeric values are ignored.
    pub year: Option<String>,
    /// Publication type, e.g. "Journal" or "Conference".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

async fn list(
    state: &AppState,
    query: JournalListQuery,
    limits: PageLimits,
) -> AppResult<Json<Page<JournalSummary>>> {
    let page = Pagination::resolve(query.page.as_deref(), query.per_page.as_deref(), limits);
    let filter = JournalFilter {
        q: non_blank(query.q),
        year: int_filter(query.year.as_deref()),
        kind: non_blank(query.kind),
    };

    let (items, count) = state.repo.list_journals(&filter, page).await?;
    Ok(Json(Page::new(items, count, page)))
}

/// list_journals
///
/// Publications, newest year first (undated last).
#[utoipa::path(
    get,
    path = "/api/journals",
    tag = "journals",
    params(JournalListQuery),
    responses((status = 200, description = "Journal page", body = Page<JournalSummary>))
)]
pub async fn list_journals(
    State(state): State<AppState>,
    Query(query): Query<JournalListQuery>,
) -> AppResult<Json<Page<JournalSummary>>> {
    list(&state, query, PUBLIC_LIMITS).await
}

/// get_journal
///
/// Includes the abstract and the decoded author and keyword arrays.
#[utoipa::path(
    get,
    path = "/api/journals/{slug}",
    tag = "journals",
    params(("slug" = String, Path, description = "Journal slug")),
    responses(
        (status = 200, description = "Journal detail", body = Journal),
        (status = 404, description = "No journal with this slug")
    )
)]
pub async fn get_journal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Journal>> {
    state
        .repo
        .get_journal(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("journal", slug))
}

/// admin_list_journals
#[utoipa::path(
    get,
    path = "/api/admin/journals",
    tag = "admin",
    params(JournalListQuery),
    responses((status = 200, description = "Journal page", body = Page<JournalSummary>))
)]
pub async fn admin_list_journals(
    State(state): State<AppState>,
    Query(query): Query<JournalListQuery>,
) -> AppResult<Json<Page<JournalSummary>>> {
    list(&state, query, ADMIN_LIMITS).await
}

/// create_journal
///
/// Without an explicit slug, one is derived from "{title}-{year}".
#[utoipa::path(
    post,
    path = "/api/admin/journals",
    tag = "admin",
    request_body = CreateJournalRequest,
    responses(
        (status = 201, description = "Journal created", body = MutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_journal(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateJournalRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let slug = derive_slug(payload.slug.as_deref(), &payload.slug_source())?;
    let created = state.repo.create_journal(&slug, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created("Journal created", created)),
    ))
}

/// update_journal
///
/// `authors` rewrites both the searchable text and the JSON array.
#[utoipa::path(
    patch,
    path = "/api/admin/journals/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Journal slug")),
    request_body = UpdateJournalRequest,
    responses(
        (status = 200, description = "Journal updated", body = MutationResponse),
        (status = 404, description = "No journal with this slug")
    )
)]
pub async fn update_journal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateJournalRequest>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.update_journal(&slug, &payload).await? {
        return Err(AppError::not_found("journal", slug));
    }
    Ok(Json(MutationResponse::message("Journal updated")))
}

/// delete_journal
#[utoipa::path(
    delete,
    path = "/api/admin/journals/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "Journal slug")),
    responses(
        (status = 200, description = "Journal deleted", body = MutationResponse),
        (status = 404, description = "No journal with this slug")
    )
)]
pub async fn delete_journal(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.delete_journal(&slug).await? {
        return Err(AppError::not_found("journal", slug));
    }
    tracing::info!(slug = %slug, "Journal deleted");
    Ok(Json(MutationResponse::message("Journal deleted")))
}
