pub mod constants;

use std::env;
use std::time::Duration;

/// Process-wide configuration loaded once at startup from environment
/// variables: `PORT`, `STORAGE_BUCKET_NAME`, `API_KEY`,
/// `GOOGLE_CLOUD_PROJECT`, `CLOUD_TASKS_LOCATION`, `CLOUD_TASKS_QUEUE`,
/// `SERVICE_URL`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port for the HTTP server.
    pub port: u16,
    /// Name of the public-audio directory (filesystem storage adapter) or
    /// bucket name (cloud storage adapter).
    pub storage_bucket_name: String,
    /// Shared secret for `Authorization: Bearer` / `X-API-Key`. Empty
    /// disables authentication.
    pub api_key: String,
    /// Project id used to namespace the task queue / document store.
    pub google_cloud_project: String,
    /// Task queue coordinates (region).
    pub cloud_tasks_location: String,
    /// Task queue coordinates (queue name).
    pub cloud_tasks_queue: String,
    /// Base URL the task queue calls back into for `/jobs/process`.
    pub service_url: String,
    /// Endpoint of the upstream TTS synthesis provider. Empty selects the
    /// silent/offline generator, useful for local development and tests.
    pub tts_provider_endpoint: String,
    /// Endpoint of the push-notification gateway. Empty disables outbound
    /// notifications (failures are already best-effort and swallowed).
    pub push_notification_endpoint: String,
    /// Per-request timeout applied to downstream calls.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// documented defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let request_timeout = env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        Self {
            port,
            storage_bucket_name: env::var("STORAGE_BUCKET_NAME").unwrap_or_default(),
            api_key: env::var("API_KEY").unwrap_or_default(),
            google_cloud_project: env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_default(),
            cloud_tasks_location: env::var("CLOUD_TASKS_LOCATION").unwrap_or_default(),
            cloud_tasks_queue: env::var("CLOUD_TASKS_QUEUE").unwrap_or_default(),
            service_url: env::var("SERVICE_URL").unwrap_or_default(),
            tts_provider_endpoint: env::var("TTS_PROVIDER_ENDPOINT").unwrap_or_default(),
            push_notification_endpoint: env::var("PUSH_NOTIFICATION_ENDPOINT")
                .unwrap_or_default(),
            request_timeout,
        }
    }

    /// Whether authentication is enabled for protected endpoints.
    pub fn auth_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}
