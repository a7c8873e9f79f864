//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so `Config::from_env` works out of the box on a laptop. Values that need
//! parsing (numbers, the summary mode) are validated here and reported as
//! `ConfigError` instead of surfacing later as odd runtime behavior.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::summarizer::SummaryMode;

/// Environment variable names. Public so tests and binaries can refer to them.
pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_HOST: &str = "BIND_HOST";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
pub const ENV_MIN_CONTENT_LENGTH: &str = "MIN_CONTENT_LENGTH";
pub const ENV_SUMMARY_INPUT_CAP: &str = "SUMMARY_INPUT_CAP";
pub const ENV_DOMAIN_DENYLIST: &str = "DOMAIN_DENYLIST";
pub const ENV_SUMMARY_MODE: &str = "SUMMARY_MODE";

/// Default development values used when environment variables are absent.
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_MIN_CONTENT_LENGTH: usize = 200;
const DEFAULT_SUMMARY_INPUT_CAP: usize = 5_000;
const DEFAULT_DOMAIN_DENYLIST: &[&str] = &["twitter.com", "x.com"];

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_host: String,
    port: u16,
    gemini_api_key: Option<String>,
    gemini_model: String,
    gemini_base_url: String,
    request_timeout: Duration,
    min_content_length: usize,
    summary_input_cap: usize,
    domain_denylist: Vec<String>,
    summary_mode: SummaryMode,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_host = env::var(ENV_BIND_HOST).unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
        let port = parse_var(ENV_PORT, DEFAULT_PORT)?;
        let gemini_api_key = env::var(ENV_GEMINI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_model =
            env::var(ENV_GEMINI_MODEL).unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url =
            env::var(ENV_GEMINI_BASE_URL).unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        let timeout_ms = parse_var(ENV_REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS)?;
        let min_content_length = parse_var(ENV_MIN_CONTENT_LENGTH, DEFAULT_MIN_CONTENT_LENGTH)?;
        let summary_input_cap = parse_var(ENV_SUMMARY_INPUT_CAP, DEFAULT_SUMMARY_INPUT_CAP)?;
        let domain_denylist = match env::var(ENV_DOMAIN_DENYLIST) {
            Ok(raw) => parse_denylist(&raw),
            Err(_) => default_denylist(),
        };
        let summary_mode = parse_var(ENV_SUMMARY_MODE, SummaryMode::Off)?;

        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_REQUEST_TIMEOUT_MS,
                reason: "must be greater than zero".to_string(),
            });
        }
        if summary_input_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_SUMMARY_INPUT_CAP,
                reason: "must be greater than zero".to_string(),
            });
        }
        if summary_mode == SummaryMode::Generative && gemini_api_key.is_none() {
            return Err(ConfigError::InvalidValue {
                field: ENV_GEMINI_API_KEY,
                reason: "required when SUMMARY_MODE=generative".to_string(),
            });
        }

        Ok(Self {
            bind_host,
            port,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            min_content_length,
            summary_input_cap,
            domain_denylist,
            summary_mode,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    /// API key for the generative summarizer, if one is configured.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }
    pub fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }
    /// Upper bound for every outbound request (page fetch and summarization).
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    /// Minimum number of characters of body text for an article to count.
    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }
    /// Maximum number of characters handed to a summarizer.
    pub fn summary_input_cap(&self) -> usize {
        self.summary_input_cap
    }
    /// Domain substrings that are rejected before any fetch happens.
    pub fn domain_denylist(&self) -> &[String] {
        &self.domain_denylist
    }
    pub fn summary_mode(&self) -> SummaryMode {
        self.summary_mode
    }

    /// Builder-style override used by the CLI and tests.
    pub fn with_summary_mode(mut self, mode: SummaryMode) -> Self {
        self.summary_mode = mode;
        self
    }
}

impl Default for Config {
    /// Development defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            summary_input_cap: DEFAULT_SUMMARY_INPUT_CAP,
            domain_denylist: default_denylist(),
            summary_mode: SummaryMode::Off,
        }
    }
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    field: key,
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn parse_denylist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DOMAIN_DENYLIST
        .iter()
        .map(|domain| domain.to_string())
        .collect()
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_PORT,
            ENV_BIND_HOST,
            ENV_GEMINI_API_KEY,
            ENV_GEMINI_MODEL,
            ENV_GEMINI_BASE_URL,
            ENV_REQUEST_TIMEOUT_MS,
            ENV_MIN_CONTENT_LENGTH,
            ENV_SUMMARY_INPUT_CAP,
            ENV_DOMAIN_DENYLIST,
            ENV_SUMMARY_MODE,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(20));
        assert_eq!(cfg.min_content_length(), 200);
        assert_eq!(cfg.summary_input_cap(), 5000);
        assert_eq!(cfg.domain_denylist(), ["twitter.com", "x.com"]);
        assert_eq!(cfg.summary_mode(), SummaryMode::Off);
        assert!(cfg.gemini_api_key().is_none());
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_PORT, "8081");
            env::set_var(ENV_BIND_HOST, "127.0.0.1");
            env::set_var(ENV_REQUEST_TIMEOUT_MS, "1500");
            env::set_var(ENV_MIN_CONTENT_LENGTH, "50");
            env::set_var(ENV_SUMMARY_INPUT_CAP, "1000");
            env::set_var(ENV_DOMAIN_DENYLIST, " Facebook.com, ,instagram.com ");
            env::set_var(ENV_SUMMARY_MODE, "generative");
            env::set_var(ENV_GEMINI_API_KEY, "test-key");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.request_timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.min_content_length(), 50);
        assert_eq!(cfg.summary_input_cap(), 1000);
        assert_eq!(cfg.domain_denylist(), ["facebook.com", "instagram.com"]);
        assert_eq!(cfg.summary_mode(), SummaryMode::Generative);
        assert_eq!(cfg.gemini_api_key(), Some("test-key"));
        clear_env();
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_PORT, "not-a-port");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
        clear_env();
    }

    #[test]
    fn generative_mode_requires_api_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SUMMARY_MODE, "generative");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_GEMINI_API_KEY));
        clear_env();
    }

    #[test]
    fn rejects_unknown_summary_mode() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SUMMARY_MODE, "abstractive");
        }
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
