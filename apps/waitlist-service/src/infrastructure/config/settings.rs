//! Service Configuration Settings
//!
//! Configuration types for the waitlist service, loaded from environment variables.

use std::net::IpAddr;
use std::time::Duration;

use crate::domain::waitlist::DEFAULT_RECENT_LIMIT;

/// Default Neynar API base URL.
pub const DEFAULT_NEYNAR_BASE_URL: &str = "https://api.neynar.com";

/// Neynar API credentials and client settings.
#[derive(Clone)]
pub struct NeynarSettings {
    api_key: String,
    /// API base URL (no trailing slash).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetrySettings,
}

impl NeynarSettings {
    /// Create settings with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_NEYNAR_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: RetrySettings::default(),
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for NeynarSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeynarSettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Exponential backoff policy.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
    /// Jitter as a fraction of each delay (0.1 = ±10%).
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Admin secret used to gate the signup listing.
#[derive(Clone)]
pub struct AdminSecret(String);

impl AdminSecret {
    /// Wrap a secret value.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self(secret)
    }

    /// Get the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret([REDACTED])")
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Bind address.
    pub bind_addr: IpAddr,
    /// HTTP port.
    pub http_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            http_port: 3000,
        }
    }
}

/// Waitlist query policy.
#[derive(Debug, Clone)]
pub struct WaitlistSettings {
    /// Number of records in the stats `recentUsers` list.
    pub recent_limit: usize,
    /// Admin secret; the admin listing is disabled when unset.
    pub admin_secret: Option<AdminSecret>,
}

impl Default for WaitlistSettings {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            admin_secret: None,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Waitlist policy.
    pub waitlist: WaitlistSettings,
    /// Neynar client settings.
    pub neynar: NeynarSettings,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// a bind address cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("NEYNAR_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("NEYNAR_API_KEY".to_string()))?;

        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("NEYNAR_API_KEY".to_string()));
        }

        let bind_addr = match std::env::var("WAITLIST_BIND_ADDR") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WAITLIST_BIND_ADDR".to_string(), v))?,
            Err(_) => ServerSettings::default().bind_addr,
        };

        let server = ServerSettings {
            bind_addr,
            http_port: parse_env_u16("WAITLIST_HTTP_PORT", ServerSettings::default().http_port),
        };

        let admin_secret = std::env::var("WAITLIST_ADMIN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(AdminSecret::new);

        let waitlist = WaitlistSettings {
            recent_limit: parse_env_usize(
                "WAITLIST_RECENT_LIMIT",
                WaitlistSettings::default().recent_limit,
            ),
            admin_secret,
        };

        let defaults = RetrySettings::default();
        let retry = RetrySettings {
            max_attempts: parse_env_u32("NEYNAR_MAX_ATTEMPTS", defaults.max_attempts).max(1),
            initial_backoff: parse_env_duration_millis(
                "NEYNAR_INITIAL_BACKOFF_MS",
                defaults.initial_backoff,
            ),
            max_backoff: parse_env_duration_secs("NEYNAR_MAX_BACKOFF_SECS", defaults.max_backoff),
            multiplier: defaults.multiplier,
            jitter_factor: defaults.jitter_factor,
        };

        let mut neynar = NeynarSettings::new(api_key).with_retry(retry);
        if let Ok(base_url) = std::env::var("NEYNAR_BASE_URL") {
            neynar = neynar.with_base_url(base_url);
        }
        neynar.timeout = parse_env_duration_secs("NEYNAR_TIMEOUT_SECS", neynar.timeout);

        Ok(Self {
            server,
            waitlist,
            neynar,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be parsed.
    #[error("environment variable {0} has invalid value: {1}")]
    InvalidValue(String, String),
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
