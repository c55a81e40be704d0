use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use porua_tts_jobs::auth::ApiKeys;
use porua_tts_jobs::jobs::generator::SilentTtsGenerator;
use porua_tts_jobs::jobs::notifier::RecordingNotifier;
use porua_tts_jobs::jobs::processor::JobDeps;
use porua_tts_jobs::jobs::queue::RecordingTaskQueue;
use porua_tts_jobs::jobs::storage::InMemoryAudioStorage;
use porua_tts_jobs::jobs::store::InMemoryJobStore;
use porua_tts_jobs::rate_limit::{PerKeyRateLimiter, RateLimitConfig, RateLimiterMode};
use porua_tts_jobs::server::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app(rate_config: RateLimitConfig, with_auth: bool) -> axum::Router {
    let api_keys = if with_auth {
        use std::collections::HashSet;
        let mut keys = HashSet::new();
        keys.insert("test-key".to_string());
        keys.insert("test-key-1".to_string());
        keys.insert("test-key-2".to_string());
        keys.insert("key1".to_string());
        keys.insert("key2".to_string());
        keys.insert("same-key".to_string());
        keys.insert("bearer-token-123".to_string());
        ApiKeys::from_keys(keys)
    } else {
        ApiKeys::empty()
    };

    let rate_limiter = if with_auth {
        Some(RateLimiterMode::PerKey(PerKeyRateLimiter::new(rate_config)))
    } else {
        None
    };

    let deps = Arc::new(JobDeps {
        store: Arc::new(InMemoryJobStore::new()),
        queue: Arc::new(RecordingTaskQueue::new()),
        generator: Arc::new(SilentTtsGenerator::default()),
        storage: Arc::new(InMemoryAudioStorage::new("https://audio.test")),
        notifier: Arc::new(RecordingNotifier::new()),
        http_client: reqwest::Client::new(),
    });

    let state = AppState {
        deps,
        api_keys,
        rate_limiter,
    };

    create_router(state)
}

#[tokio::test]
async fn test_rate_limit_allows_requests_within_limit() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 3,
    };

    let app = create_test_app(config, true);

    for i in 0..3 {
        let request = Request::builder()
            .uri("/health")
            .header("x-api-key", "test-key-1")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Request {} should succeed within burst limit",
            i + 1
        );
    }
}

#[tokio::test]
async fn test_rate_limit_rejects_requests_over_limit() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 2,
    };

    let app = create_test_app(config, true);

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .header("x-api-key", "test-key-2")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", "test-key-2")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "Request over burst should be rate limited"
    );

    let retry_after = response.headers().get("retry-after");
    assert!(retry_after.is_some(), "Should have Retry-After header");
}

#[tokio::test]
async fn test_rate_limit_separate_keys_independent() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 2,
    };

    let app = create_test_app(config, true);

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .header("x-api-key", "key1")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", "key1")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    for i in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .header("x-api-key", "key2")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "key2 request {} should succeed",
            i + 1
        );
    }

    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", "key2")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_unauthenticated_requests() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 2,
    };

    let app = create_test_app(config, true);

    for _ in 0..3 {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Unauthenticated requests should be rejected when auth is enabled"
        );
    }
}

#[tokio::test]
async fn test_rate_limit_bearer_token() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 2,
    };

    let app = create_test_app(config, true);

    for _ in 0..2 {
        let request = Request::builder()
            .uri("/health")
            .header("authorization", "Bearer bearer-token-123")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/health")
        .header("authorization", "Bearer bearer-token-123")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "Bearer token requests should be rate limited"
    );
}

#[tokio::test]
async fn test_rate_limit_all_endpoints() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 1,
    };

    let app = create_test_app(config, true);

    // "/jobs/process" always answers 200 regardless of whether the job id
    // exists, so it is a stable 200-path alongside "/health".
    let requests: Vec<(&str, &str, Option<&str>)> = vec![
        ("GET", "/health", None),
        (
            "POST",
            "/jobs/process",
            Some(r#"{"jobId":"does-not-exist"}"#),
        ),
    ];

    for (method, endpoint, body) in requests {
        let make_request = |body: Option<&str>| {
            let mut builder = Request::builder()
                .method(method)
                .uri(endpoint)
                .header("x-api-key", "same-key");
            if body.is_some() {
                builder = builder.header("content-type", "application/json");
            }
            builder
                .body(body.map(Body::from).unwrap_or_else(Body::empty))
                .unwrap()
        };

        let response = app.clone().oneshot(make_request(body)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "First request to {} should succeed",
            endpoint
        );

        let response = app.clone().oneshot(make_request(body)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::TOO_MANY_REQUESTS,
            "Second request to {} should be rate limited",
            endpoint
        );

        tokio::time::sleep(tokio::time::Duration::from_millis(150)).await;
    }
}

#[tokio::test]
async fn test_rate_limit_response_format() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 1,
    };

    let app = create_test_app(config, true);

    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", "test-key")
        .body(Body::empty())
        .unwrap();
    let _ = app.clone().oneshot(request).await.unwrap();

    let request = Request::builder()
        .uri("/health")
        .header("x-api-key", "test-key")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after = response.headers().get("retry-after");
    assert!(retry_after.is_some(), "Should have Retry-After header");

    let retry_after_str = retry_after.unwrap().to_str().unwrap();
    let _retry_seconds: u64 = retry_after_str.parse().unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Rate limit exceeded"));
}

#[tokio::test]
async fn test_rate_limit_disabled_without_api_keys() {
    let config = RateLimitConfig {
        per_second: 10,
        burst_size: 1,
    };

    let app = create_test_app(config, false);

    for i in 0..5 {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Request {} should succeed when rate limiting is disabled",
            i + 1
        );
    }
}
