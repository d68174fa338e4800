//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Publicly reachable base URL of this service, used to build the
    /// webhook URL registered with the render farm at dispatch time.
    pub public_base_url: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: "http://localhost:3000".to_string(),
            webhook_secret: "change-me-in-production".to_string(),
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB, webhook and dispatch bodies are small
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            public_base_url: std::env::var("API_BASE_URL").unwrap_or(defaults.public_base_url),
            webhook_secret: std::env::var("WEBHOOK_SECRET").unwrap_or(defaults.webhook_secret),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// The webhook URL this service registers with the render farm.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.public_base_url.trim_end_matches('/'))
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url_strips_trailing_slash() {
        let config = ApiConfig {
            public_base_url: "https://api.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.webhook_url(), "https://api.example.com/webhook");
    }
}
