use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::ApiKeys;
use crate::error::{JobError, Result};
use crate::jobs::processor::{
    self, CreateJobRequest, CreateJobResponse, JobDeps, ProcessTaskRequest,
};
use crate::rate_limit::RateLimiterMode;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<JobDeps>,
    pub api_keys: ApiKeys,
    pub rate_limiter: Option<RateLimiterMode>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn create_job_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Response> {
    let job = processor::create_job(&state.deps, req).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(CreateJobResponse { job_id: job.id }),
    )
        .into_response())
}

async fn get_job_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response> {
    if job_id.is_empty() {
        return Err(JobError::InvalidRequest("jobId required".into()));
    }
    let job = processor::get_job(&state.deps, &job_id).await?;
    Ok(Json(job).into_response())
}

async fn process_job_handler(
    State(state): State<AppState>,
    Json(req): Json<ProcessTaskRequest>,
) -> Result<Response> {
    processor::handle_process_delivery(&state.deps, &req.job_id).await?;
    Ok(StatusCode::OK.into_response())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create and configure the HTTP router: job lifecycle endpoints behind
/// the shared API key, CORS open for all origins (adjust for a production
/// deployment with a known client set).
pub fn create_router(state: AppState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_keys_for_middleware = state.api_keys.clone();
    let rate_limiter = state.rate_limiter.clone();

    let mut router = Router::new()
        .route("/jobs", post(create_job_handler))
        .route("/jobs/:job_id", get(get_job_handler))
        .route("/jobs/process", post(process_job_handler))
        .route("/health", get(health_check));

    if let Some(limiter) = rate_limiter {
        router = router.layer(middleware::from_fn_with_state(
            limiter,
            crate::rate_limit::rate_limit_middleware,
        ));
    }

    router
        .layer(middleware::from_fn_with_state(
            api_keys_for_middleware,
            crate::auth::auth_middleware,
        ))
        .layer(middleware::from_fn(crate::logging::access_log_middleware))
        .layer(middleware::from_fn(
            crate::logging::middleware::request_id_middleware,
        ))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::generator::SilentTtsGenerator;
    use crate::jobs::notifier::RecordingNotifier;
    use crate::jobs::queue::RecordingTaskQueue;
    use crate::jobs::storage::InMemoryAudioStorage;
    use crate::jobs::store::InMemoryJobStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            deps: Arc::new(JobDeps {
                store: Arc::new(InMemoryJobStore::new()),
                queue: Arc::new(RecordingTaskQueue::new()),
                generator: Arc::new(SilentTtsGenerator::default()),
                storage: Arc::new(InMemoryAudioStorage::new("https://audio.test")),
                notifier: Arc::new(RecordingNotifier::new()),
                http_client: reqwest::Client::new(),
            }),
            api_keys: ApiKeys::empty(),
            rate_limiter: None,
        }
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_job_returns_202_with_job_id() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":"hello world"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn create_job_with_empty_text_returns_400() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_job_returns_404_with_plain_error_body() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/jobs/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "job not found"}));
    }

    #[tokio::test]
    async fn process_unknown_job_still_returns_200() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs/process")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"jobId":"does-not-exist"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_get_process_get_end_to_end() {
        let app = create_router(test_state());

        let create_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":"hello there"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(create_response.status(), StatusCode::ACCEPTED);
        let body = axum::body::to_bytes(create_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: CreateJobResponse = serde_json::from_slice(&body).unwrap();

        let process_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs/process")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"jobId":"{}"}}"#, created.job_id)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(process_response.status(), StatusCode::OK);

        let get_response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/jobs/{}", created.job_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(get_response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(get_response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json["audioUrl"].is_string());
    }
}
