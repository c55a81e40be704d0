use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::utils::header_utils::extract_api_key;

#[derive(Debug, Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    /// Create a new empty ApiKeys instance (no authentication)
    pub fn empty() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Create a new ApiKeys instance from a set of keys (for testing)
    #[allow(dead_code)]
    pub fn from_keys(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    /// Load API keys from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut keys = HashSet::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            keys.insert(trimmed.to_string());
        }

        Ok(Self { keys })
    }

    /// Check if authentication is enabled (i.e., keys are configured)
    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Validate if a key is valid
    pub fn validate(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Get the number of configured keys
    pub fn count(&self) -> usize {
        self.keys.len()
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Try to load API keys from various locations
pub fn load_api_keys() -> ApiKeys {
    // Check environment variable first
    if let Ok(key_file_path) = std::env::var("TTS_API_KEY_FILE") {
        match ApiKeys::from_file(&key_file_path) {
            Ok(keys) => {
                if keys.count() > 0 {
                    println!(
                        "✓ Loaded {} API key(s) from: {}",
                        keys.count(),
                        key_file_path
                    );
                    return keys;
                } else {
                    println!("⚠ Warning: API key file is empty: {}", key_file_path);
                }
            }
            Err(e) => {
                println!(
                    "⚠ Warning: Could not read API key file '{}': {}",
                    key_file_path, e
                );
            }
        }
    }

    // Try default locations
    let mut default_locations = vec![
        PathBuf::from("./api_keys.txt"),
        PathBuf::from("/etc/tts-server/api_keys.txt"),
    ];

    // Add home directory location if available
    if let Some(home) = dirs::home_dir() {
        default_locations.insert(1, home.join(".tts-server/api_keys.txt"));
    }

    for location in default_locations {
        if location.exists() {
            match ApiKeys::from_file(&location) {
                Ok(keys) => {
                    if keys.count() > 0 {
                        println!(
                            "✓ Loaded {} API key(s) from: {}",
                            keys.count(),
                            location.display()
                        );
                        return keys;
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not read key file {:?}: {}", location, e);
                }
            }
        }
    }

    // No keys found - run without authentication
    println!("ℹ No API key file found - authentication disabled");
    ApiKeys::empty()
}

/// Middleware to check API key authentication
pub async fn auth_middleware(
    State(keys): State<ApiKeys>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    // If no keys configured, skip authentication
    if !keys.is_enabled() {
        return next.run(request).await;
    }

    // Try to extract API key from headers
    let api_key = extract_api_key(&headers);

    match api_key {
        Some(key) if keys.validate(&key) => {
            // Valid key - proceed
            next.run(request).await
        }
        Some(_) | None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
                message: "Invalid or missing API key".to_string(),
            }),
        )
            .into_response(),
    }
}

/// Build an `ApiKeys` holding the single shared secret from [`crate::config::Config`].
/// An empty key disables authentication, matching `Config::auth_enabled`.
pub fn from_config(api_key: &str) -> ApiKeys {
    if api_key.is_empty() {
        ApiKeys::empty()
    } else {
        let mut keys = HashSet::new();
        keys.insert(api_key.to_string());
        ApiKeys::from_keys(keys)
    }
}
