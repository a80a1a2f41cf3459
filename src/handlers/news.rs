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
    models::{CreateNewsRequest, MutationResponse, News, NewsSummary, Page, UpdateNewsRequest},
    pagination::{PageLimits, Pagination},
    repository::NewsFilter,
};

const PUBLIC_LIMITS: PageLimits = PageLimits::new(6, 24);
const ADMIN_LIMITS: PageLimits = PageLimits::new(20, 100);

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewsListQuery {
    /// Case-insensitive substring match on title or excerpt.
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

async fn list(
    state: &AppState,
    query: NewsListQuery,
    limits: PageLimits,
) -> AppResult<Json<Page<NewsSummary>>> {
    let page = Pagination::resolve(query.page.as_deref(), query.per_page.as_deref(), limits);
    let filter = NewsFilter {
        q: non_blank(query.q),
        category: non_blank(query.category),
    };

    let (items, count) = state.repo.list_news(&filter, page).await?;
    Ok(Json(Page::new(items, count, page)))
}

/// list_news
///
/// Public news feed, most recently published first. Article bodies are omitted.
#[utoipa::path(
    get,
    path = "/api/news",
    tag = "news",
    params(NewsListQuery),
    responses((status = 200, description = "News page", body = Page<NewsSummary>))
)]
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> AppResult<Json<Page<NewsSummary>>> {
    list(&state, query, PUBLIC_LIMITS).await
}

/// get_news
#[utoipa::path(
    get,
    path = "/api/news/{slug}",
    tag = "news",
    params(("slug" = String, Path, description = "News slug")),
    responses(
        (status = 200, description = "News article", body = News),
        (status = 404, description = "No article with this slug")
    )
)]
pub async fn get_news(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<News>> {
    state
        .repo
        .get_news(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("news", slug))
}

/// admin_list_news
///
/// Same filters as the public feed with larger pages.
#[utoipa::path(
    get,
    path = "/api/admin/news",
    tag = "admin",
    params(NewsListQuery),
    responses((status = 200, description = "News page", body = Page<NewsSummary>))
)]
pub async fn admin_list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> AppResult<Json<Page<NewsSummary>>> {
    list(&state, query, ADMIN_LIMITS).await
}

/// create_news
///
/// The slug defaults to the slugified title; `category` defaults to "Berita" and
/// `published_at` to now.
#[utoipa::path(
    post,
    path = "/api/admin/news",
    tag = "admin",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "News created", body = MutationResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_news(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateNewsRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse>)> {
    let slug = derive_slug(payload.slug.as_deref(), &payload.title)?;
    let created = state.repo.create_news(&slug, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::created("News created", created)),
    ))
}

/// update_news
#[utoipa::path(
    patch,
    path = "/api/admin/news/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "News slug")),
    request_body = UpdateNewsRequest,
    responses(
        (status = 200, description = "News updated", body = MutationResponse),
        (status = 404, description = "No article with this slug")
    )
)]
pub async fn update_news(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateNewsRequest>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.update_news(&slug, &payload).await? {
        return Err(AppError::not_found("news", slug));
    }
    Ok(Json(MutationResponse::message("News updated")))
}

/// delete_news
#[utoipa::path(
    delete,
    path = "/api/admin/news/{slug}",
    tag = "admin",
    params(("slug" = String, Path, description = "News slug")),
    responses(
        (status = 200, description = "News deleted", body = MutationResponse),
        (status = 404, description = "No article with this slug")
    )
)]
pub async fn delete_news(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MutationResponse>> {
    if !state.repo.delete_news(&slug).await? {
        return Err(AppError::not_found("news", slug));
    }
    tracing::info!(slug = %slug, "News deleted");
    Ok(Json(MutationResponse::message("News deleted")))
}
