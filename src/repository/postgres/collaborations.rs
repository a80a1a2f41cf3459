use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{lock_by_slug, push_assign, push_eq, push_page, push_search};
use crate::{
    models::{
        Collaboration, CreateCollaborationRequest, Created, DEFAULT_COLLABORATION_TYPE,
        UpdateCollaborationRequest,
    },
    pagination::Pagination,
    repository::{CollaborationFilter, RepoResult, RepositoryError},
};

const COLUMNS: &str =
    "id, slug, name, organization, type, country, logo_url, description, link, created_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CollaborationFilter) {
    push_search(builder, &["name", "organization"], filter.q.as_deref());
    push_eq(builder, "type", filter.kind.clone());
}

pub(super) async fn list(
    pool: &PgPool,
    filter: &CollaborationFilter,
    page: Pagination,
) -> RepoResult<(Vec<Collaboration>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM collaborations WHERE TRUE");
    push_filter(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::new(format!("SELECT {COLUMNS} FROM collaborations WHERE TRUE"));
    push_filter(&mut rows, filter);
    rows.push(" ORDER BY created_at DESC, id DESC");
    push_page(&mut rows, page);
    let items = rows.build_query_as::<Collaboration>().fetch_all(pool).await?;

    Ok((items, total))
}

pub(super) async fn all(pool: &PgPool) -> RepoResult<Vec<Collaboration>> {
    let items = sqlx::query_as::<_, Collaboration>(&format!(
        "SELECT {COLUMNS} FROM collaborations ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub(super) async fn detail(pool: &PgPool, slug: &str) -> RepoResult<Option<Collaboration>> {
    let item = sqlx::query_as::<_, Collaboration>(&format!(
        "SELECT {COLUMNS} FROM collaborations WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub(super) async fn create(
    pool: &PgPool,
    slug: &str,
    req: &CreateCollaborationRequest,
) -> RepoResult<Created> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO collaborations (slug, name, organization, type, country, logo_url, description, link) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(slug)
    .bind(&req.name)
    .bind(&req.organization)
    .bind(req.kind.as_deref().unwrap_or(DEFAULT_COLLABORATION_TYPE))
    .bind(&req.country)
    .bind(&req.logo_url)
    .bind(&req.description)
    .bind(&req.link)
    .fetch_one(pool)
    .await
    .map_err(|e| RepositoryError::from(e).for_slug("collaboration", slug))?;

    tracing::info!(collaboration_id = id, slug, "Collaboration created");
    Ok(Created {
        id,
        slug: slug.to_string(),
    })
}

pub(super) async fn update(
    pool: &PgPool,
    slug: &str,
    req: &UpdateCollaborationRequest,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let Some(id) = lock_by_slug(&mut tx, "collaborations", slug).await? else {
        return Ok(false);
    };

    if req.is_empty() {
        return Ok(true);
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE collaborations SET ");
    let mut set = builder.separated(", ");
    push_assign(&mut set, "name", req.name.clone());
    push_assign(&mut set, "organization", req.organization.clone());
    push_assign(&mut set, "type", req.kind.clone());
    push_assign(&mut set, "country", req.country.clone());
    push_assign(&mut set, "logo_url", req.logo_url.clone());
    push_assign(&mut set, "description", req.description.clone());
    push_assign(&mut set, "link", req.link.clone());
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.build().execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(true)
}
