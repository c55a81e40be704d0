use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// The error kinds a job-pipeline operation can surface. `InvalidRequest`,
/// `Unauthorized` and `NotFound` flow straight to the HTTP response; the
/// remaining kinds are raised during `process_job` and are converted to a
/// `set_failed` rather than returned to the caller of `POST /jobs/process`,
/// which always answers 200 once the job has been accepted.
#[derive(Debug)]
pub enum JobError {
    InvalidRequest(String),
    Unauthorized,
    NotFound(String),

    UpstreamTtsFailure(String),
    StorageFailure(String),
    StoreFailure(String),
    QueueFailure(String),
    NotifierFailure(String),

    Io(std::io::Error),
    Json(serde_json::Error),
    TaskJoin(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            JobError::Unauthorized => write!(f, "unauthorized"),
            JobError::NotFound(msg) => write!(f, "not found: {}", msg),
            JobError::UpstreamTtsFailure(msg) => write!(f, "upstream TTS failure: {}", msg),
            JobError::StorageFailure(msg) => write!(f, "storage failure: {}", msg),
            JobError::StoreFailure(msg) => write!(f, "store failure: {}", msg),
            JobError::QueueFailure(msg) => write!(f, "queue failure: {}", msg),
            JobError::NotifierFailure(msg) => write!(f, "notifier failure: {}", msg),
            JobError::Io(e) => write!(f, "I/O error: {}", e),
            JobError::Json(e) => write!(f, "JSON error: {}", e),
            JobError::TaskJoin(msg) => write!(f, "task join error: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

impl From<std::io::Error> for JobError {
    fn from(err: std::io::Error) -> Self {
        JobError::Io(err)
    }
}

impl From<serde_json::Error> for JobError {
    fn from(err: serde_json::Error) -> Self {
        JobError::Json(err)
    }
}

impl From<tokio::task::JoinError> for JobError {
    fn from(err: tokio::task::JoinError) -> Self {
        JobError::TaskJoin(err.to_string())
    }
}

impl From<reqwest::Error> for JobError {
    fn from(err: reqwest::Error) -> Self {
        JobError::UpstreamTtsFailure(err.to_string())
    }
}

/// HTTP status mapping. Bodies are the plain `{"error": "..."}` shape the
/// entry points use rather than a generic envelope, matching the literal
/// `{"error":"job not found"}` body `GET /jobs/<unknown>` returns.
impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            JobError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            JobError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            JobError::NotFound(_) => (StatusCode::NOT_FOUND, "job not found".to_string()),
            _ => {
                tracing::error!("internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_returns_400() {
        let err = JobError::InvalidRequest("missing text".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_returns_401() {
        let response = JobError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_returns_404() {
        let response = JobError::NotFound("abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failure_returns_500() {
        let response = JobError::UpstreamTtsFailure("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_failure_returns_500() {
        let response = JobError::StoreFailure("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display_messages_are_nonempty() {
        for err in [
            JobError::InvalidRequest("x".into()),
            JobError::Unauthorized,
            JobError::NotFound("x".into()),
            JobError::UpstreamTtsFailure("x".into()),
            JobError::StorageFailure("x".into()),
            JobError::StoreFailure("x".into()),
            JobError::QueueFailure("x".into()),
            JobError::NotifierFailure("x".into()),
        ] {
            assert!(!err.to_string().is_empty());
        }
    }
}
