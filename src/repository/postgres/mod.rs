//! PostgreSQL implementation of [`Repository`].
//!
//! Every query goes through `sqlx::query*` or `QueryBuilder` with bound parameters;
//! table and column names are always literals from this module. Mutations that touch a
//! parent and its children run in one transaction, and partial updates first lock the
//! parent row with `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction, query_builder::Separated};

use super::{
    CollaborationFilter, JournalFilter, MemberFilter, NewsFilter, ProjectFilter, RepoResult,
    Repository,
};
use crate::{
    models::{
        Collaboration, CreateCollaborationRequest, CreateJournalRequest, CreateMemberRequest,
        CreateNewsRequest, CreateProjectRequest, Created, Journal, JournalSummary, Member,
        MemberDetail, News, NewsSummary, Project, ProjectCategory, UpdateCollaborationRequest,
        UpdateJournalRequest, UpdateMemberRequest, UpdateNewsRequest, UpdateProjectRequest,
    },
    pagination::Pagination,
};

mod collaborations;
mod journals;
mod members;
mod news;
mod projects;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// --- Query Building Helpers ---

/// `ILIKE` pattern matching `q` as a literal substring, for use with `ESCAPE '\'`.
pub fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends ` AND (c1 ILIKE $n ESCAPE '\' OR ...)` for a free-text search.
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], q: Option<&str>) {
    let Some(q) = q else { return };
    let pattern = contains_pattern(q);

    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column);
        builder.push(" ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\'");
    }
    builder.push(")");
}

/// Appends ` AND column = $n` when a filter value is present.
fn push_eq<'args, T>(builder: &mut QueryBuilder<'args, Postgres>, column: &str, value: Option<T>)
where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = value {
        builder.push(" AND ");
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value);
    }
}

/// Appends `column = $n` to the SET list of a partial update when the patch carries a value.
fn push_assign<'args, T>(
    set: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = value {
        set.push(format!("{column} = "));
        set.push_bind_unseparated(value);
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: Pagination) {
    builder.push(" LIMIT ");
    builder.push_bind(page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(page.offset());
}

/// Locks the parent row addressed by `slug` for the rest of the transaction.
async fn lock_by_slug(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    slug: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT id FROM {table} WHERE slug = $1 FOR UPDATE"))
        .bind(slug)
        .fetch_optional(&mut **tx)
        .await
}

/// Single-statement delete; children go through `ON DELETE CASCADE`.
async fn delete_by_slug(pool: &PgPool, table: &'static str, slug: &str) -> RepoResult<bool> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE slug = $1"))
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_members(
        &self,
        filter: &MemberFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Member>, i64)> {
        members::list(&self.pool, filter, page).await
    }

    async fn get_member(&self, slug: &str) -> RepoResult<Option<MemberDetail>> {
        members::detail(&self.pool, slug).await
    }

    async fn create_member(&self, req: &CreateMemberRequest) -> RepoResult<Created> {
        members::create(&self.pool, req).await
    }

    async fn update_member(&self, slug: &str, req: &UpdateMemberRequest) -> RepoResult<bool> {
        members::update(&self.pool, slug, req).await
    }

    async fn delete_member(&self, slug: &str) -> RepoResult<bool> {
        delete_by_slug(&self.pool, "members", slug).await
    }

    async fn list_news(
        &self,
        filter: &NewsFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<NewsSummary>, i64)> {
        news::list(&self.pool, filter, page).await
    }

    async fn get_news(&self, slug: &str) -> RepoResult<Option<News>> {
        news::detail(&self.pool, slug).await
    }

    async fn create_news(&self, slug: &str, req: &CreateNewsRequest) -> RepoResult<Created> {
        news::create(&self.pool, slug, req).await
    }

    async fn update_news(&self, slug: &str, req: &UpdateNewsRequest) -> RepoResult<bool> {
        news::update(&self.pool, slug, req).await
    }

    async fn delete_news(&self, slug: &str) -> RepoResult<bool> {
        delete_by_slug(&self.pool, "news", slug).await
    }

    async fn list_journals(
        &self,
        filter: &JournalFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<JournalSummary>, i64)> {
        journals::list(&self.pool, filter, page).await
    }

    async fn get_journal(&self, slug: &str) -> RepoResult<Option<Journal>> {
        journals::detail(&self.pool, slug).await
    }

    async fn create_journal(&self, slug: &str, req: &CreateJournalRequest) -> RepoResult<Created> {
        journals::create(&self.pool, slug, req).await
    }

    async fn update_journal(&self, slug: &str, req: &UpdateJournalRequest) -> RepoResult<bool> {
        journals::update(&self.pool, slug, req).await
    }

    async fn delete_journal(&self, slug: &str) -> RepoResult<bool> {
        delete_by_slug(&self.pool, "journals", slug).await
    }

    async fn list_projects(
        &self,
        filter: &ProjectFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Project>, i64)> {
        projects::list(&self.pool, filter, page).await
    }

    async fn featured_projects(&self, limit: i64) -> RepoResult<Vec<Project>> {
        projects::featured(&self.pool, limit).await
    }

    async fn project_categories(&self) -> RepoResult<Vec<ProjectCategory>> {
        projects::categories(&self.pool).await
    }

    async fn get_project(&self, slug: &str, published_only: bool) -> RepoResult<Option<Project>> {
        projects::detail(&self.pool, slug, published_only).await
    }

    async fn create_project(&self, slug: &str, req: &CreateProjectRequest) -> RepoResult<Project> {
        projects::create(&self.pool, slug, req).await
    }

    async fn update_project(
        &self,
        slug: &str,
        req: &UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        projects::update(&self.pool, slug, req).await
    }

    async fn delete_project(&self, slug: &str) -> RepoResult<bool> {
        delete_by_slug(&self.pool, "projects", slug).await
    }

    async fn list_collaborations(
        &self,
        filter: &CollaborationFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Collaboration>, i64)> {
        collaborations::list(&self.pool, filter, page).await
    }

    async fn all_collaborations(&self) -> RepoResult<Vec<Collaboration>> {
        collaborations::all(&self.pool).await
    }

    async fn get_collaboration(&self, slug: &str) -> RepoResult<Option<Collaboration>> {
        collaborations::detail(&self.pool, slug).await
    }

    async fn create_collaboration(
        &self,
        slug: &str,
        req: &CreateCollaborationRequest,
    ) -> RepoResult<Created> {
        collaborations::create(&self.pool, slug, req).await
    }

    async fn update_collaboration(
        &self,
        slug: &str,
        req: &UpdateCollaborationRequest,
    ) -> RepoResult<bool> {
        collaborations::update(&self.pool, slug, req).await
    }

    async fn delete_collaboration(&self, slug: &str) -> RepoResult<bool> {
        delete_by_slug(&self.pool, "collaborations", slug).await
    }
}
