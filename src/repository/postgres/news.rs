use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{lock_by_slug, push_assign, push_eq, push_page, push_search};
use crate::{
    models::{
        CreateNewsRequest, Created, DEFAULT_NEWS_CATEGORY, News, NewsSummary, UpdateNewsRequest,
    },
    pagination::Pagination,
    repository::{NewsFilter, RepoResult, RepositoryError},
};

const SUMMARY_COLUMNS: &str = "id, slug, title, excerpt, image_url, category, published_at, created_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &NewsFilter) {
    push_search(builder, &["title", "excerpt"], filter.q.as_deref());
    push_eq(builder, "category", filter.category.clone());
}

pub(super) async fn list(
    pool: &PgPool,
    filter: &NewsFilter,
    page: Pagination,
) -> RepoResult<(Vec<NewsSummary>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM news WHERE TRUE");
    push_filter(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::new(format!("SELECT {SUMMARY_COLUMNS} FROM news WHERE TRUE"));
    push_filter(&mut rows, filter);
    rows.push(" ORDER BY published_at DESC, id DESC");
    push_page(&mut rows, page);
    let items = rows.build_query_as::<NewsSummary>().fetch_all(pool).await?;

    Ok((items, total))
}

pub(super) async fn detail(pool: &PgPool, slug: &str) -> RepoResult<Option<News>> {
    let news = sqlx::query_as::<_, News>(
        "SELECT id, slug, title, excerpt, content, image_url, category, published_at, created_at \
         FROM news WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(news)
}

pub(super) async fn create(pool: &PgPool, slug: &str, req: &CreateNewsRequest) -> RepoResult<Created> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO news (slug, title, excerpt, content, image_url, category, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW())) RETURNING id",
    )
    .bind(slug)
    .bind(&req.title)
    .bind(&req.excerpt)
    .bind(&req.content)
    .bind(&req.image_url)
    .bind(req.category.as_deref().unwrap_or(DEFAULT_NEWS_CATEGORY))
    .bind(req.published_at)
    .fetch_one(pool)
    .await
    .map_err(|e| RepositoryError::from(e).for_slug("news", slug))?;

    tracing::info!(news_id = id, slug, "News created");
    Ok(Created {
        id,
        slug: slug.to_string(),
    })
}

pub(super) async fn update(pool: &PgPool, slug: &str, req: &UpdateNewsRequest) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let Some(id) = lock_by_slug(&mut tx, "news", slug).await? else {
        return Ok(false);
    };

    if req.is_empty() {
        return Ok(true);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE news SET ");
    let mut set = builder.separated(", ");
    push_assign(&mut set, "title", req.title.clone());
    push_assign(&mut set, "excerpt", req.excerpt.clone());
    push_assign(&mut set, "content", req.content.clone());
    push_assign(&mut set, "image_url", req.image_url.clone());
    push_assign(&mut set, "category", req.category.clone());
    push_assign(&mut set, "published_at", req.published_at);
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.build().execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(true)
}
