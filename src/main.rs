mod audio;
mod auth;
mod config;
mod error;
mod jobs;
mod logging;
mod rate_limit;
mod server;
mod utils;
mod voices;

use auth::load_api_keys;
use config::Config;
use jobs::generator::{HttpTtsGenerator, SilentTtsGenerator, TtsGenerator};
use jobs::notifier::{HttpNotifier, Notifier};
use jobs::processor::JobDeps;
use jobs::queue::HttpTaskQueue;
use jobs::storage::FileSystemAudioStorage;
use jobs::store::InMemoryJobStore;
use rate_limit::{PerIpRateLimiter, PerKeyRateLimiter, RateLimitConfig, RateLimiterMode};
use server::{create_router, AppState};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() -> error::Result<()> {
    let _ = dotenvy::dotenv();

    let log_config = logging::LogConfig::from_env();
    logging::init_logging(&log_config).expect("failed to initialize logging");
    logging::log_platform_info();

    let config = Config::from_env();

    println!("Porua Server v{}", env!("CARGO_PKG_VERSION"));
    println!("Starting TTS job pipeline on port {}...", config.port);

    let api_keys = if config.auth_enabled() {
        auth::from_config(&config.api_key)
    } else {
        load_api_keys()
    };

    let rate_limiter = load_rate_limit_config(api_keys.is_enabled());

    println!("\nAuthentication:");
    if api_keys.is_enabled() {
        println!("  Status: ENABLED ({} key(s) configured)", api_keys.count());
        println!("  Use X-API-Key or Authorization: Bearer header");
    } else {
        println!("  Status: DISABLED");
    }

    println!("\nRate Limiting:");
    if let Some(ref limiter) = rate_limiter {
        let cfg = limiter.config();
        println!("  Status: ENABLED ({}), {} req/s, burst {}", limiter.mode_description(), cfg.per_second, cfg.burst_size);
    } else {
        println!("  Status: DISABLED");
    }

    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .expect("failed to build HTTP client");

    let audio_root = PathBuf::from(if config.storage_bucket_name.is_empty() {
        "public-audio".to_string()
    } else {
        config.storage_bucket_name.clone()
    });
    tokio::fs::create_dir_all(&audio_root).await?;

    let public_base_url = format!(
        "{}/audio",
        config.service_url.trim_end_matches('/')
    );
    let storage = Arc::new(FileSystemAudioStorage::new(audio_root.clone(), public_base_url));

    let generator: Arc<dyn TtsGenerator> = if config.tts_provider_endpoint.is_empty() {
        println!("\nTTS provider: none configured, using silent offline generator");
        Arc::new(SilentTtsGenerator::default())
    } else {
        println!("\nTTS provider: {}", config.tts_provider_endpoint);
        Arc::new(HttpTtsGenerator::new(
            http_client.clone(),
            config.tts_provider_endpoint.clone(),
        ))
    };

    let notifier: Arc<dyn Notifier> = if config.push_notification_endpoint.is_empty() {
        Arc::new(jobs::notifier::RecordingNotifier::new())
    } else {
        Arc::new(HttpNotifier::new(
            http_client.clone(),
            config.push_notification_endpoint.clone(),
        ))
    };

    let queue = Arc::new(HttpTaskQueue::new(
        http_client.clone(),
        &config.service_url,
        config.api_key.clone(),
    ));

    let deps = Arc::new(JobDeps {
        store: Arc::new(InMemoryJobStore::new()),
        queue,
        generator,
        storage: storage.clone(),
        notifier,
        http_client,
    });

    let state = AppState {
        deps,
        api_keys,
        rate_limiter,
    };

    let app = create_router(state).nest_service("/audio", ServeDir::new(audio_root));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("\nServer listening on http://{}", addr);
    println!("Available endpoints:");
    println!("  POST   /jobs          - Submit a new synthesis job");
    println!("  GET    /jobs/:id      - Fetch a job's current state");
    println!("  POST   /jobs/process  - Task-queue delivery, drives synthesis");
    println!("  GET    /health        - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load rate limit configuration based on environment variables and API key status
fn load_rate_limit_config(api_keys_enabled: bool) -> Option<RateLimiterMode> {
    let mode = env::var("RATE_LIMIT_MODE")
        .unwrap_or_else(|_| "auto".to_string())
        .to_lowercase();

    match mode.as_str() {
        "disabled" => None,
        "per-key" => Some(RateLimiterMode::PerKey(PerKeyRateLimiter::new(
            load_authenticated_config(),
        ))),
        "per-ip" => Some(RateLimiterMode::PerIp(PerIpRateLimiter::new(
            load_unauthenticated_config(),
        ))),
        _ => {
            if api_keys_enabled {
                Some(RateLimiterMode::PerKey(PerKeyRateLimiter::new(
                    load_authenticated_config(),
                )))
            } else {
                Some(RateLimiterMode::PerIp(PerIpRateLimiter::new(
                    load_unauthenticated_config(),
                )))
            }
        }
    }
}

fn load_authenticated_config() -> RateLimitConfig {
    let per_second = env::var("RATE_LIMIT_AUTHENTICATED_PER_SECOND")
        .or_else(|_| env::var("RATE_LIMIT_PER_SECOND"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let burst_size = env::var("RATE_LIMIT_AUTHENTICATED_BURST_SIZE")
        .or_else(|_| env::var("RATE_LIMIT_BURST_SIZE"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);

    RateLimitConfig {
        per_second,
        burst_size,
    }
}

fn load_unauthenticated_config() -> RateLimitConfig {
    let per_second = env::var("RATE_LIMIT_UNAUTHENTICATED_PER_SECOND")
        .or_else(|_| env::var("RATE_LIMIT_PER_SECOND"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    let burst_size = env::var("RATE_LIMIT_UNAUTHENTICATED_BURST_SIZE")
        .or_else(|_| env::var("RATE_LIMIT_BURST_SIZE"))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    RateLimitConfig {
        per_second,
        burst_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_mode_picks_per_key_when_auth_enabled() {
        env::set_var("RATE_LIMIT_MODE", "auto");
        let limiter = load_rate_limit_config(true).unwrap();
        assert!(matches!(limiter, RateLimiterMode::PerKey(_)));
        env::remove_var("RATE_LIMIT_MODE");
    }

    #[test]
    fn auto_mode_picks_per_ip_when_auth_disabled() {
        env::set_var("RATE_LIMIT_MODE", "auto");
        let limiter = load_rate_limit_config(false).unwrap();
        assert!(matches!(limiter, RateLimiterMode::PerIp(_)));
        env::remove_var("RATE_LIMIT_MODE");
    }

    #[test]
    fn disabled_mode_returns_none() {
        env::set_var("RATE_LIMIT_MODE", "disabled");
        assert!(load_rate_limit_config(true).is_none());
        env::remove_var("RATE_LIMIT_MODE");
    }
}
