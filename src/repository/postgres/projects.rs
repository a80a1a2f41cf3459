use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{lock_by_slug, push_assign, push_eq, push_page, push_search};
use crate::{
    codec,
    models::{
        CreateProjectRequest, DEFAULT_PROJECT_STATUS, Project, ProjectCategory, ProjectMember,
        ProjectRow, UpdateProjectRequest,
    },
    pagination::Pagination,
    repository::{ProjectFilter, ProjectScope, RepoResult, RepositoryError, blank_to_null},
};

const COLUMNS: &str = "id, slug, title, category, status, thumbnail_url, banner_url, qr_code_url, \
                       short_description, full_description, demo_url, repo_url, paper_url, \
                       video_url, metadata, gallery, features, tags, content_blocks, project_date, \
                       year, is_featured, is_published, display_order, created_at, updated_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    if filter.scope == ProjectScope::Public {
        builder.push(" AND is_published = TRUE");
    }
    if filter.featured_only {
        builder.push(" AND is_featured = TRUE");
    }
    push_search(builder, &["title", "short_description"], filter.q.as_deref());
    push_eq(builder, "category", filter.category.clone());
    push_eq(builder, "status", filter.status.clone());
    push_eq(builder, "year", filter.year);
}

fn decode_all(rows: Vec<ProjectRow>) -> RepoResult<Vec<Project>> {
    Ok(rows
        .into_iter()
        .map(ProjectRow::decode)
        .collect::<Result<Vec<_>, _>>()?)
}

pub(super) async fn list(
    pool: &PgPool,
    filter: &ProjectFilter,
    page: Pagination,
) -> RepoResult<(Vec<Project>, i64)> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM projects WHERE TRUE");
    push_filter(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut rows = QueryBuilder::new(format!("SELECT {COLUMNS} FROM projects WHERE TRUE"));
    push_filter(&mut rows, filter);
    match filter.scope {
        ProjectScope::Public => rows.push(
            " ORDER BY is_featured DESC, display_order ASC, project_date DESC NULLS LAST, id ASC",
        ),
        ProjectScope::Admin => rows.push(" ORDER BY created_at DESC, id DESC"),
    };
    push_page(&mut rows, page);
    let rows = rows.build_query_as::<ProjectRow>().fetch_all(pool).await?;

    Ok((decode_all(rows)?, total))
}

pub(super) async fn featured(pool: &PgPool, limit: i64) -> RepoResult<Vec<Project>> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {COLUMNS} FROM projects \
         WHERE is_featured = TRUE AND is_published = TRUE \
         ORDER BY display_order ASC, id ASC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    decode_all(rows)
}

pub(super) async fn categories(pool: &PgPool) -> RepoResult<Vec<ProjectCategory>> {
    let items = sqlx::query_as::<_, ProjectCategory>(
        "SELECT id, name, slug, description, icon, color, display_order \
         FROM project_categories ORDER BY display_order ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub(super) async fn detail(
    pool: &PgPool,
    slug: &str,
    published_only: bool,
) -> RepoResult<Option<Project>> {
    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM projects WHERE slug = "));
    query.push_bind(slug);
    if published_only {
        query.push(" AND is_published = TRUE");
    }

    let Some(row) = query.build_query_as::<ProjectRow>().fetch_optional(pool).await? else {
        return Ok(None);
    };

    let mut project = row.decode()?;
    let team = sqlx::query_as::<_, ProjectMember>(
        "SELECT member_slug, role FROM project_members WHERE project_id = $1 ORDER BY id",
    )
    .bind(project.id)
    .fetch_all(pool)
    .await?;
    project.team_members = Some(team);

    Ok(Some(project))
}

/// Re-reads a project that was just written; its absence means a concurrent delete won.
async fn reload(pool: &PgPool, slug: &str) -> RepoResult<Project> {
    detail(pool, slug, false)
        .await?
        .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
}

pub(super) async fn create(
    pool: &PgPool,
    slug: &str,
    req: &CreateProjectRequest,
) -> RepoResult<Project> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO projects (slug, title, category, status, thumbnail_url, banner_url, \
                               qr_code_url, short_description, full_description, demo_url, \
                               repo_url, paper_url, video_url, metadata, gallery, features, tags, \
                               content_blocks, project_date, year, is_featured, is_published, \
                               display_order) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22, $23) \
         RETURNING id",
    )
    .bind(slug)
    .bind(&req.title)
    .bind(&req.category)
    .bind(req.status.as_deref().unwrap_or(DEFAULT_PROJECT_STATUS))
    .bind(&req.thumbnail_url)
    .bind(&req.banner_url)
    .bind(&req.qr_code_url)
    .bind(&req.short_description)
    .bind(&req.full_description)
    .bind(&req.demo_url)
    .bind(&req.repo_url)
    .bind(&req.paper_url)
    .bind(&req.video_url)
    .bind(codec::encode(&req.metadata.clone().unwrap_or_default()))
    .bind(codec::encode(&req.gallery.clone().unwrap_or_default()))
    .bind(codec::encode(&req.features.clone().unwrap_or_default()))
    .bind(codec::encode(&req.tags.clone().unwrap_or_default()))
    .bind(codec::encode(&req.content_blocks.clone().unwrap_or_default()))
    .bind(req.project_date)
    .bind(req.year)
    .bind(req.is_featured.unwrap_or(false))
    .bind(req.is_published.unwrap_or(true))
    .bind(req.display_order.unwrap_or(0))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| RepositoryError::from(e).for_slug("project", slug))?;

    replace_team(&mut tx, id, &req.team_members).await?;
    tx.commit().await?;

    tracing::info!(project_id = id, slug, "Project created");
    reload(pool, slug).await
}

pub(super) async fn update(
    pool: &PgPool,
    slug: &str,
    req: &UpdateProjectRequest,
) -> RepoResult<Option<Project>> {
    let mut tx = pool.begin().await?;

    let Some(id) = lock_by_slug(&mut tx, "projects", slug).await? else {
        return Ok(None);
    };

    if !req.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE projects SET ");
        let mut set = builder.separated(", ");
        push_assign(&mut set, "title", req.title.clone());
        push_assign(&mut set, "category", req.category.clone());
        push_assign(&mut set, "status", req.status.clone());
        push_assign(&mut set, "thumbnail_url", req.thumbnail_url.clone());
        push_assign(&mut set, "banner_url", req.banner_url.clone());
        push_assign(&mut set, "qr_code_url", req.qr_code_url.clone());
        push_assign(&mut set, "short_description", req.short_description.clone());
        push_assign(&mut set, "full_description", req.full_description.clone());
        push_assign(&mut set, "demo_url", req.demo_url.clone());
        push_assign(&mut set, "repo_url", req.repo_url.clone());
        push_assign(&mut set, "paper_url", req.paper_url.clone());
        push_assign(&mut set, "video_url", req.video_url.clone());
        push_assign(&mut set, "metadata", req.metadata.as_ref().map(codec::encode));
        push_assign(&mut set, "gallery", req.gallery.as_ref().map(codec::encode));
        push_assign(&mut set, "features", req.features.as_ref().map(codec::encode));
        push_assign(&mut set, "tags", req.tags.as_ref().map(codec::encode));
        push_assign(&mut set, "content_blocks", req.content_blocks.as_ref().map(codec::encode));
        push_assign(&mut set, "project_date", req.project_date);
        push_assign(&mut set, "year", req.year);
        push_assign(&mut set, "is_featured", req.is_featured);
        push_assign(&mut set, "is_published", req.is_published);
        push_assign(&mut set, "display_order", req.display_order);
        set.push("updated_at = NOW()");
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.build().execute(&mut *tx).await?;

        if let Some(team) = &req.team_members {
            replace_team(&mut tx, id, team).await?;
        }
    }

    tx.commit().await?;
    reload(pool, slug).await.map(Some)
}

async fn replace_team(
    tx: &mut Transaction<'_, Postgres>,
    project_id: i64,
    team: &[ProjectMember],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_members WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut **tx)
        .await?;

    for member in team {
        sqlx::query(
            "INSERT INTO project_members (project_id, member_slug, role) VALUES ($1, $2, $3)",
        )
        .bind(project_id)
        .bind(member.member_slug.trim())
        .bind(member.role.as_deref().and_then(blank_to_null))
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
