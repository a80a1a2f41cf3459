use axum::{
    Json, Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod slug;
pub mod storage;
pub mod uploads;

// Route groups (public site, admin, uploads), all nested under `/api`.
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, S3StorageClient, StorageState};

use config::StorageBackend;
use error::{AppError, ErrorCode};
use handlers::{collaborations, journals, members, news, projects};

/// ApiDoc
///
/// OpenAPI document of the whole API, served at `/api-docs/openapi.json` and rendered by
/// the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        members::list_members, members::get_member, members::create_member,
        members::update_member, members::delete_member,
        news::list_news, news::get_news, news::admin_list_news, news::create_news,
        news::update_news, news::delete_news,
        journals::list_journals, journals::get_journal, journals::admin_list_journals,
        journals::create_journal, journals::update_journal, journals::delete_journal,
        projects::list_projects, projects::featured_projects, projects::project_categories,
        projects::get_project, projects::admin_list_projects, projects::admin_get_project,
        projects::create_project, projects::update_project, projects::delete_project,
        collaborations::list_collaborations, collaborations::admin_list_collaborations,
        collaborations::admin_get_collaboration, collaborations::create_collaboration,
        collaborations::update_collaboration, collaborations::delete_collaboration,
        handlers::uploads::upload_avatar, handlers::uploads::upload_news_image,
        handlers::uploads::upload_journal_pdf, handlers::uploads::upload_journal_thumb,
        handlers::uploads::upload_project_image, handlers::uploads::upload_collaboration_logo,
    ),
    components(
        schemas(
            models::Member, models::MemberDetail, models::CreateMemberRequest,
            models::UpdateMemberRequest, models::ExperienceInput, models::EducationInput,
            models::SocialInput, models::SocialKind,
            models::News, models::NewsSummary, models::CreateNewsRequest, models::UpdateNewsRequest,
            models::Journal, models::JournalSummary, models::CreateJournalRequest,
            models::UpdateJournalRequest,
            models::Project, models::ProjectMember, models::ProjectCategory,
            models::CreateProjectRequest, models::UpdateProjectRequest,
            models::ProjectMutationResponse,
            models::Collaboration, models::CreateCollaborationRequest,
            models::UpdateCollaborationRequest,
            models::MutationResponse, models::UploadResponse, models::HealthResponse,
        )
    ),
    tags(
        (name = "members", description = "Lab member directory"),
        (name = "news", description = "Public news feed"),
        (name = "journals", description = "Publications"),
        (name = "projects", description = "Published projects"),
        (name = "collaborations", description = "Partner organizations"),
        (name = "admin", description = "Content management"),
        (name = "uploads", description = "File uploads"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single immutable container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (Postgres or in-memory), chosen at startup.
    pub repo: RepositoryState,
    /// Upload sink (local directory or S3-compatible bucket).
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// redact_internal_errors
///
/// In production, replaces the body of every 5xx response with a generic message while
/// keeping the status and the error code. The original message has already been logged
/// by `AppError::into_response`.
pub async fn redact_internal_errors(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if config.exposes_internal_errors() || !response.status().is_server_error() {
        return response;
    }

    let code = response
        .extensions()
        .get::<ErrorCode>()
        .map_or("INTERNAL_ERROR", |c| c.0);
    let mut redacted = (
        response.status(),
        Json(json!({ "error": "Internal server error", "code": code })),
    )
        .into_response();
    redacted.extensions_mut().insert(ErrorCode(code));
    redacted
}

/// Rewrites the request path to the part after `prefix`; hands the request back untouched
/// when it is not below that prefix.
fn strip_path_prefix(request: Request, prefix: &str) -> Result<Request, Request> {
    let rewritten = request
        .uri()
        .path()
        .strip_prefix(prefix)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| match request.uri().query() {
            Some(query) => format!("{rest}?{query}"),
            None => rest.to_string(),
        })
        .and_then(|path| path.parse::<Uri>().ok());

    match rewritten {
        Some(uri) => {
            let (mut parts, body) = request.into_parts();
            parts.uri = uri;
            Ok(Request::from_parts(parts, body))
        }
        None => Err(request),
    }
}

/// static_fallback
///
/// Everything no route matched: uploaded files (local backend) under the public uploads
/// prefix, a JSON 404 for any other `/api` path, and otherwise the SPA bundle with
/// `index.html` for client-side routes.
async fn static_fallback(State(config): State<AppConfig>, request: Request) -> Response {
    let request = match &config.storage {
        StorageBackend::Local { dir } => {
            match strip_path_prefix(request, &config.uploads_public_prefix) {
                Ok(stripped) => {
                    return match ServeDir::new(dir).oneshot(stripped).await {
                        Ok(response) => response.into_response(),
                        Err(never) => match never {},
                    };
                }
                Err(request) => request,
            }
        }
        StorageBackend::S3 { .. } => request,
    };

    let path = request.uri().path();
    if path == "/api" || path.starts_with("/api/") {
        return AppError::not_found("route", path).into_response();
    }

    // Client-side routes get the SPA shell with a 200.
    let index = ServeFile::new(config.static_dir.join("index.html"));
    match ServeDir::new(&config.static_dir)
        .fallback(index)
        .oneshot(request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// create_router
///
/// Assembles the routing structure, applies the middleware stack and registers the
/// application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. API Router Assembly
    let api = Router::new()
        .merge(public::public_routes())
        .merge(routes::uploads::upload_routes())
        .nest("/admin", admin::admin_routes());

    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback(static_fallback)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            redact_internal_errors,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                // 3b. Request Tracing: one span per request, carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` header, so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
