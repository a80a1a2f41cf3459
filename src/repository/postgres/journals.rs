use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{lock_by_slug, push_assign, push_eq, push_page, push_search};
use crate::{
    codec,
    models::{
        CreateJournalRequest, Created, DEFAULT_JOURNAL_TYPE, Journal, JournalRow, JournalSummary,
        UpdateJournalRequest, join_authors,
    },
    pagination::Pagination,
    repository::{JournalFilter, RepoResult, RepositoryError},
};

const SUMMARY_COLUMNS: &str =
    "id, slug, title, authors_text, venue, year, type, doi, pdf_url, thumb_url, created_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &JournalFilter) {
    push_search(
        builder,
        &["title", "abstract", "authors_text"],
        filter.q.as_deref(),
    );
    push_eq(builder, "year", filter.year);
    push_eq(builder, "type", filter.kind.clone());
}

pub(super) async fn list(
    pool: &PgPool,
    filter: &JournalFilter,
    page: Pagination,
) -> RepoResult<(Vec<JournalSummary>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM journals WHERE TRUE");
    push_filter(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::new(format!("SELECT {SUMMARY_COLUMNS} FROM journals WHERE TRUE"));
    push_filter(&mut rows, filter);
    rows.push(" ORDER BY year DESC NULLS LAST, id DESC");
    push_page(&mut rows, page);
    let items = rows.build_query_as::<JournalSummary>().fetch_all(pool).await?;

    Ok((items, total))
}

pub(super) async fn detail(pool: &PgPool, slug: &str) -> RepoResult<Option<Journal>> {
    let row = sqlx::query_as::<_, JournalRow>(
        "SELECT id, slug, title, authors_text, authors_json, venue, year, type, doi, pdf_url, \
                thumb_url, abstract, keywords_json, created_at \
         FROM journals WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(JournalRow::decode).transpose()?)
}

pub(super) async fn create(
    pool: &PgPool,
    slug: &str,
    req: &CreateJournalRequest,
) -> RepoResult<Created> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO journals (slug, title, authors_text, authors_json, venue, year, type, doi, \
                               pdf_url, thumb_url, abstract, keywords_json) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
    )
    .bind(slug)
    .bind(&req.title)
    .bind(join_authors(&req.authors))
    .bind(codec::encode(&req.authors))
    .bind(&req.venue)
    .bind(req.year)
    .bind(req.kind.as_deref().unwrap_or(DEFAULT_JOURNAL_TYPE))
    .bind(&req.doi)
    .bind(&req.pdf_url)
    .bind(&req.thumb_url)
    .bind(&req.abstract_text)
    .bind(codec::encode(&req.keywords))
    .fetch_one(pool)
    .await
    .map_err(|e| RepositoryError::from(e).for_slug("journal", slug))?;

    tracing::info!(journal_id = id, slug, "Journal created");
    Ok(Created {
        id,
        slug: slug.to_string(),
    })
}

/// `authors` rewrites both the display text and the JSON array; `keywords` rewrites
/// `keywords_json`.
pub(super) async fn update(
    pool: &PgPool,
    slug: &str,
    req: &UpdateJournalRequest,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let Some(id) = lock_by_slug(&mut tx, "journals", slug).await? else {
        return Ok(false);
    };

    if req.is_empty() {
        return Ok(true);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE journals SET ");
    let mut set = builder.separated(", ");
    push_assign(&mut set, "title", req.title.clone());
    push_assign(&mut set, "authors_text", req.authors.as_deref().map(join_authors));
    push_assign(&mut set, "authors_json", req.authors.as_ref().map(codec::encode));
    push_assign(&mut set, "venue", req.venue.clone());
    push_assign(&mut set, "year", req.year);
    push_assign(&mut set, "type", req.kind.clone());
    push_assign(&mut set, "doi", req.doi.clone());
    push_assign(&mut set, "pdf_url", req.pdf_url.clone());
    push_assign(&mut set, "thumb_url", req.thumb_url.clone());
    push_assign(&mut set, "abstract", req.abstract_text.clone());
    push_assign(&mut set, "keywords_json", req.keywords.as_ref().map(codec::encode));
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.build().execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(true)
}
