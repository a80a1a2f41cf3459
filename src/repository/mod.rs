use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    codec::DecodeError,
    models::{
        Collaboration, CreateCollaborationRequest, CreateJournalRequest, CreateMemberRequest,
        CreateNewsRequest, CreateProjectRequest, Created, Journal, JournalSummary, Member,
        MemberDetail, News, NewsSummary, Project, ProjectCategory, UpdateCollaborationRequest,
        UpdateJournalRequest, UpdateMemberRequest, UpdateNewsRequest, UpdateProjectRequest,
    },
    pagination::Pagination,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Failures of the persistence layer. Not-found is never an error here: lookups return
/// `Option` and mutations report whether a row was addressed.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint (in practice the slug) rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                RepositoryError::Conflict(format!(
                    "duplicate value violates {}",
                    db.constraint().unwrap_or("a unique constraint")
                ))
            }
            _ => RepositoryError::Database(error),
        }
    }
}

impl RepositoryError {
    pub fn slug_taken(entity: &str, slug: &str) -> Self {
        RepositoryError::Conflict(format!("{entity} slug '{slug}' is already taken"))
    }

    /// Re-labels a unique violation with the slug that caused it.
    pub(crate) fn for_slug(self, entity: &str, slug: &str) -> Self {
        match self {
            RepositoryError::Conflict(_) => Self::slug_taken(entity, slug),
            other => other,
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

// --- List Filters ---
// Blank strings are dropped by the handlers before these are built.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFilter {
    pub q: Option<String>,
    pub position: Option<String>,
    pub faculty: Option<String>,
    pub program: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFilter {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalFilter {
    pub q: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
}

/// Which visibility rules and ordering a project listing follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectScope {
    /// Published projects only, featured first.
    #[default]
    Public,
    /// Every project, newest first.
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub featured_only: bool,
    pub scope: ProjectScope,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollaborationFilter {
    pub q: Option<String>,
    pub kind: Option<String>,
}

/// Repository
///
/// The persistence contract behind every handler. Two implementations exist:
/// [`PostgresRepository`] for deployments and [`MemoryRepository`] for demos and tests.
/// Both must behave identically as seen through the HTTP API.
///
/// Paginated listings return the page together with the filter-wide total. Mutations
/// addressed by slug return `false` / `None` when no row has that slug.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Members ---
    async fn list_members(
        &self,
        filter: &MemberFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Member>, i64)>;
    async fn get_member(&self, slug: &str) -> RepoResult<Option<MemberDetail>>;
    // Parent row and every child collection are written atomically.
    async fn create_member(&self, req: &CreateMemberRequest) -> RepoResult<Created>;
    // Present collections replace the stored ones wholesale.
    async fn update_member(&self, slug: &str, req: &UpdateMemberRequest) -> RepoResult<bool>;
    async fn delete_member(&self, slug: &str) -> RepoResult<bool>;

    // --- News ---
    async fn list_news(
        &self,
        filter: &NewsFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<NewsSummary>, i64)>;
    async fn get_news(&self, slug: &str) -> RepoResult<Option<News>>;
    async fn create_news(&self, slug: &str, req: &CreateNewsRequest) -> RepoResult<Created>;
    async fn update_news(&self, slug: &str, req: &UpdateNewsRequest) -> RepoResult<bool>;
    async fn delete_news(&self, slug: &str) -> RepoResult<bool>;

    // --- Journals ---
    async fn list_journals(
        &self,
        filter: &JournalFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<JournalSummary>, i64)>;
    async fn get_journal(&self, slug: &str) -> RepoResult<Option<Journal>>;
    async fn create_journal(&self, slug: &str, req: &CreateJournalRequest) -> RepoResult<Created>;
    async fn update_journal(&self, slug: &str, req: &UpdateJournalRequest) -> RepoResult<bool>;
    async fn delete_journal(&self, slug: &str) -> RepoResult<bool>;

    // --- Projects ---
    async fn list_projects(
        &self,
        filter: &ProjectFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Project>, i64)>;
    async fn featured_projects(&self, limit: i64) -> RepoResult<Vec<Project>>;
    async fn project_categories(&self) -> RepoResult<Vec<ProjectCategory>>;
    // `published_only` hides drafts from the public detail route.
    async fn get_project(&self, slug: &str, published_only: bool) -> RepoResult<Option<Project>>;
    async fn create_project(&self, slug: &str, req: &CreateProjectRequest) -> RepoResult<Project>;
    async fn update_project(
        &self,
        slug: &str,
        req: &UpdateProjectRequest,
    ) -> RepoResult<Option<Project>>;
    async fn delete_project(&self, slug: &str) -> RepoResult<bool>;

    // --- Collaborations ---
    async fn list_collaborations(
        &self,
        filter: &CollaborationFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Collaboration>, i64)>;
    async fn all_collaborations(&self) -> RepoResult<Vec<Collaboration>>;
    async fn get_collaboration(&self, slug: &str) -> RepoResult<Option<Collaboration>>;
    async fn create_collaboration(
        &self,
        slug: &str,
        req: &CreateCollaborationRequest,
    ) -> RepoResult<Created>;
    async fn update_collaboration(
        &self,
        slug: &str,
        req: &UpdateCollaborationRequest,
    ) -> RepoResult<bool>;
    async fn delete_collaboration(&self, slug: &str) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Optional child text columns are stored as NULL rather than as empty strings.
pub(crate) fn blank_to_null(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed, non-empty names in input order with duplicates removed.
pub(crate) fn distinct_names(names: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}
