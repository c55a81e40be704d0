use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::Serialize;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::utils::header_utils::{extract_api_key, extract_client_ip};

/// Type alias for the in-memory rate limiter
type InMemoryRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second allowed
    pub per_second: u32,
    /// Burst size (max requests in a single burst)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst_size: 20,
        }
    }
}

/// Rate limiter that tracks limits per API key
#[derive(Clone)]
pub struct PerKeyRateLimiter {
    /// Rate limiters indexed by API key
    limiters: Arc<DashMap<String, Arc<InMemoryRateLimiter>>>,
    /// Configuration for new rate limiters
    config: RateLimitConfig,
    /// Clock for rate limiting
    clock: DefaultClock,
}

impl PerKeyRateLimiter {
    /// Create a new per-key rate limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiters: Arc::new(DashMap::new()),
            config,
            clock: DefaultClock::default(),
        }
    }

    /// Get or create a rate limiter for the given API key
    fn get_or_create_limiter(
        &self,
        api_key: &str,
    ) -> Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>> {
        self.limiters
            .entry(api_key.to_string())
            .or_insert_with(|| {
                // Create quota: burst_size requests per (burst_size / per_second) seconds
                // This allows burst_size requests immediately, then refills at per_second rate
                let quota = Quota::per_second(NonZeroU32::new(self.config.per_second).unwrap())
                    .allow_burst(NonZeroU32::new(self.config.burst_size).unwrap());

                Arc::new(RateLimiter::direct(quota))
            })
            .clone()
    }

    /// Check if a request should be allowed for the given API key
    pub fn check_rate_limit(&self, api_key: &str) -> Result<(), std::time::Duration> {
        let limiter = self.get_or_create_limiter(api_key);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                // Calculate wait time until rate limit resets
                let wait_duration = not_until.wait_time_from(self.clock.now());
                Err(wait_duration)
            }
        }
    }

    /// Get the number of tracked API keys
    #[cfg(test)]
    pub fn tracked_keys_count(&self) -> usize {
        self.limiters.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Rate limiter that tracks limits per IP address
#[derive(Clone)]
pub struct PerIpRateLimiter {
    /// Rate limiters indexed by IP address
    limiters: Arc<DashMap<IpAddr, Arc<InMemoryRateLimiter>>>,
    /// Configuration for new rate limiters
    config: RateLimitConfig,
    /// Clock for rate limiting
    clock: DefaultClock,
}

impl PerIpRateLimiter {
    /// Create a new per-IP rate limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiters: Arc::new(DashMap::new()),
            config,
            clock: DefaultClock::default(),
        }
    }

    /// Get or create a rate limiter for the given IP address
    fn get_or_create_limiter(&self, ip: IpAddr) -> Arc<InMemoryRateLimiter> {
        self.limiters
            .entry(ip)
            .or_insert_with(|| {
                // Create quota: burst_size requests per (burst_size / per_second) seconds
                // This allows burst_size requests immediately, then refills at per_second rate
                let quota = Quota::per_second(NonZeroU32::new(self.config.per_second).unwrap())
                    .allow_burst(NonZeroU32::new(self.config.burst_size).unwrap());

                Arc::new(RateLimiter::direct(quota))
            })
            .clone()
    }

    /// Check if a request should be allowed for the given IP address
    pub fn check_rate_limit(&self, ip: IpAddr) -> Result<(), std::time::Duration> {
        let limiter = self.get_or_create_limiter(ip);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                // Calculate wait time until rate limit resets
                let wait_duration = not_until.wait_time_from(self.clock.now());
                Err(wait_duration)
            }
        }
    }

    /// Get the number of tracked IP addresses
    #[cfg(test)]
    pub fn tracked_ips_count(&self) -> usize {
        self.limiters.len()
    }

    /// Get the configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

/// Dual-mode rate limiter supporting both per-key and per-IP strategies
#[derive(Clone)]
pub enum RateLimiterMode {
    /// Rate limiting per API key (each key has independent limits)
    PerKey(PerKeyRateLimiter),
    /// Rate limiting per IP address (each IP has independent limits)
    PerIp(PerIpRateLimiter),
}

impl RateLimiterMode {
    /// Get the configuration for the current mode
    pub fn config(&self) -> &RateLimitConfig {
        match self {
            RateLimiterMode::PerKey(limiter) => limiter.config(),
            RateLimiterMode::PerIp(limiter) => limiter.config(),
        }
    }

    /// Get a description of the current mode
    pub fn mode_description(&self) -> &'static str {
        match self {
            RateLimiterMode::PerKey(_) => "PER-API-KEY",
            RateLimiterMode::PerIp(_) => "PER-IP-ADDRESS",
        }
    }
}

/// Middleware to enforce rate limiting (supports both per-key and per-IP modes)
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterMode>,
    request: Request,
    next: Next,
) -> Response {
    // Check rate limit based on the mode
    let rate_limit_result = match &limiter {
        RateLimiterMode::PerKey(key_limiter) => {
            // Extract API key from headers
            let headers = request.headers();
            let api_key = match extract_api_key(headers) {
                Some(key) => key,
                None => {
                    // No API key - use a default key for unauthenticated requests
                    "anonymous".to_string()
                }
            };

            // Check rate limit for this API key
            match key_limiter.check_rate_limit(&api_key) {
                Ok(_) => Ok(()),
                Err(wait_duration) => {
                    let retry_after = wait_duration.as_secs();
                    tracing::warn!(
                        "Rate limit exceeded for API key: {} (retry after {} seconds)",
                        if api_key == "anonymous" {
                            "unauthenticated"
                        } else {
                            &api_key
                        },
                        retry_after
                    );
                    Err(retry_after)
                }
            }
        }
        RateLimiterMode::PerIp(ip_limiter) => {
            // Extract IP address from request
            match extract_client_ip(&request) {
                Ok(ip) => {
                    // Check rate limit for this IP
                    match ip_limiter.check_rate_limit(ip) {
                        Ok(_) => Ok(()),
                        Err(wait_duration) => {
                            let retry_after = wait_duration.as_secs();
                            tracing::warn!(
                                "Rate limit exceeded for IP: {} (retry after {} seconds)",
                                ip,
                                retry_after
                            );
                            Err(retry_after)
                        }
                    }
                }
                Err(err) => {
                    tracing::error!("Failed to extract client IP: {}", err);
                    // Allow request if we can't extract IP (fail open)
                    Ok(())
                }
            }
        }
    };

    // Handle the result
    match rate_limit_result {
        Ok(_) => {
            // Request allowed - proceed
            next.run(request).await
        }
        Err(retry_after) => {
            // Rate limit exceeded
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: format!(
                        "Rate limit exceeded. Please retry after {} seconds.",
                        retry_after
                    ),
                }),
            )
                .into_response();

            // Add Retry-After header
            response
                .headers_mut()
                .insert("Retry-After", retry_after.to_string().parse().unwrap());

            response
        }
    }
}
