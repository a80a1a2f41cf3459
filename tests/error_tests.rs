use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use lab_portal::{
    AppConfig,
    codec::DecodeError,
    config::Env,
    error::{AppError, ErrorCode},
    redact_internal_errors,
    repository::RepositoryError,
};
use serde_json::Value;
use tower::util::ServiceExt;

fn decode_failure() -> AppError {
    let source = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
    AppError::Repository(RepositoryError::Decode(DecodeError {
        entity: "journals",
        field: "authors_json",
        source,
    }))
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Router whose only route fails with a stored-JSON decode error.
fn failing_router(env: Env) -> Router {
    let config = AppConfig {
        env,
        ..AppConfig::default()
    };
    Router::new()
        .route("/journal", get(|| async { Err::<(), _>(decode_failure()) }))
        .layer(middleware::from_fn_with_state(config, redact_internal_errors))
}

async fn get_journal(router: Router) -> Response {
    router
        .oneshot(Request::builder().uri("/journal").body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[test]
fn test_decode_error_classification() {
    assert_eq!(
        decode_failure().classify(),
        (StatusCode::INTERNAL_SERVER_ERROR, "DECODE_ERROR")
    );
}

#[tokio::test]
async fn test_decode_error_response_carries_code() {
    let response = decode_failure().into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.extensions().get::<ErrorCode>(),
        Some(&ErrorCode("DECODE_ERROR"))
    );
    let json = body_json(response).await;
    assert_eq!(json["code"], "DECODE_ERROR");
    assert_ne!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_decode_error_is_redacted_in_production() {
    let response = get_journal(failing_router(Env::Production)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.extensions().get::<ErrorCode>(),
        Some(&ErrorCode("DECODE_ERROR"))
    );
    let json = body_json(response).await;
    assert_eq!(json["error"], "Internal server error");
    assert_eq!(json["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn test_decode_error_detail_kept_locally() {
    let response = get_journal(failing_router(Env::Local)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DECODE_ERROR");
    assert_ne!(json["error"], "Internal server error");
}
