use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CopperError;

pub const DEFAULT_BASE_URL: &str = "https://api.copper.com/developer_api/v1";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

/// First key that resolves wins; later keys are legacy aliases.
fn profiled_env_any(profile: &str, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| profiled_env_opt(profile, k))
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub copper: CopperConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `COPPER_PROFILE`. When set (e.g. `SANDBOX`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("COPPER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            copper: CopperConfig::from_env_profiled(p),
            server: ServerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  copper:  base_url={}, user={}, api_key={}",
            self.copper.base_url,
            self.copper.user_email.as_deref().unwrap_or("(none)"),
            if self.copper.api_key.is_some() { "(set)" } else { "(none)" },
        );
        tracing::info!(
            "  retry:   max_retries={}, base_delay={}ms, timeout={}s",
            self.copper.max_retries,
            self.copper.retry_delay_ms,
            self.copper.timeout_secs,
        );
        tracing::info!("  server:  {}:{}", self.server.host, self.server.port);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "copper": {
                "base_url": self.copper.base_url,
                "user_email": self.copper.user_email,
                "configured": self.copper.is_configured(),
                "max_retries": self.copper.max_retries,
            },
            "server": { "host": self.server.host, "port": self.server.port },
        })
    }
}

// ── Copper API ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopperConfig {
    pub api_key: Option<String>,
    pub user_email: Option<String>,
    pub base_url: String,
    /// Value of the `X-PW-Application` header.
    pub application: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

/// Credentials resolved from a [`CopperConfig`], both guaranteed present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub user_email: String,
}

impl CopperConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_any(p, &["COPPER_API_KEY", "COPPER_API_TOKEN"]),
            user_email: profiled_env_any(p, &["COPPER_USER_EMAIL", "COPPER_EMAIL"]),
            base_url: profiled_env_or(p, "COPPER_API_BASE_URL", DEFAULT_BASE_URL),
            application: profiled_env_or(p, "COPPER_APPLICATION", "developer_api"),
            max_retries: profiled_env_parse(p, "COPPER_MAX_RETRIES", 3),
            retry_delay_ms: profiled_env_parse(p, "COPPER_RETRY_DELAY_MS", 500),
            timeout_secs: profiled_env_parse(p, "COPPER_TIMEOUT_SECS", 30),
        }
    }

    /// Config pointing at `base_url` with the given credentials and default retry settings.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            user_email: Some(user_email.into()),
            base_url: base_url.into(),
            application: "developer_api".to_string(),
            max_retries: 3,
            retry_delay_ms: 500,
            timeout_secs: 30,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.user_email.is_some()
    }

    /// Both credentials, or an authentication error naming what is missing.
    pub fn credentials(&self) -> Result<Credentials, CopperError> {
        match (&self.api_key, &self.user_email) {
            (Some(api_key), Some(user_email)) => Ok(Credentials {
                api_key: api_key.clone(),
                user_email: user_email.clone(),
            }),
            _ => Err(CopperError::Authentication(
                "Copper API credentials not found; set COPPER_API_KEY and COPPER_USER_EMAIL".into(),
            )),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "127.0.0.1"),
            port: profiled_env_parse(p, "PORT", 8080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_values() {
        let mut cfg = CopperConfig::new("http://localhost", "key", "me@example.com");
        assert!(cfg.credentials().is_ok());

        cfg.user_email = None;
        let err = cfg.credentials().unwrap_err();
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");
        assert!(!cfg.is_configured());
    }

    #[test]
    fn redacted_summary_hides_api_key() {
        let cfg = Config {
            profile: String::new(),
            copper: CopperConfig::new("http://localhost", "secret-token", "me@example.com"),
            server: ServerConfig { host: "127.0.0.1".into(), port: 8080 },
        };
        let summary = cfg.redacted_summary().to_string();
        assert!(!summary.contains("secret-token"));
        assert!(summary.contains("\"configured\":true"));
        assert_eq!(cfg.profile_label(), "default");
    }

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        // Unique key names so parallel tests do not collide.
        env::set_var("CFGTEST_COPPER_RETRY_X", "7");
        env::set_var("COPPER_RETRY_X", "2");
        assert_eq!(profiled_env_parse("CFGTEST", "COPPER_RETRY_X", 0u32), 7);
        assert_eq!(profiled_env_parse("", "COPPER_RETRY_X", 0u32), 2);
        env::set_var("COPPER_EMPTY_X", "");
        assert_eq!(profiled_env_opt("", "COPPER_EMPTY_X"), None);
    }
}
