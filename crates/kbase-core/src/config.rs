//! Configuration module
//!
//! Client configuration read from `KBASE_*` environment variables (a `.env`
//! file is honoured through dotenvy).

use std::env;
use std::time::Duration;

use crate::error::KbError;

// Common constants
const DEFAULT_API_URL: &str = "http://localhost:7777";
const POLL_INTERVAL_SECS: u64 = 5;
const POLL_MAX_ATTEMPTS: u32 = 12;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Settings shared by the API client and the intake workflow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Sent as `Authorization: Bearer {key}` when set
    pub api_key: Option<String>,
    /// Database preselected for new intake sessions
    pub default_db_id: Option<String>,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            default_db_id: None,
            poll_interval_secs: POLL_INTERVAL_SECS,
            poll_max_attempts: POLL_MAX_ATTEMPTS,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, KbError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank variables fall
    /// back to defaults; unparsable numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = ClientConfig {
            api_url: var("KBASE_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: var("KBASE_API_KEY"),
            default_db_id: var("KBASE_DB_ID"),
            poll_interval_secs: parse_number(
                "KBASE_POLL_INTERVAL_SECS",
                var("KBASE_POLL_INTERVAL_SECS"),
                POLL_INTERVAL_SECS,
            )?,
            poll_max_attempts: parse_number(
                "KBASE_POLL_MAX_ATTEMPTS",
                var("KBASE_POLL_MAX_ATTEMPTS"),
                POLL_MAX_ATTEMPTS,
            )?,
            request_timeout_secs: parse_number(
                "KBASE_REQUEST_TIMEOUT_SECS",
                var("KBASE_REQUEST_TIMEOUT_SECS"),
                REQUEST_TIMEOUT_SECS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KbError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(KbError::InvalidConfig(format!(
                "KBASE_API_URL must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }

        if self.poll_interval_secs == 0 {
            return Err(KbError::InvalidConfig(
                "KBASE_POLL_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        if self.poll_max_attempts == 0 {
            return Err(KbError::InvalidConfig(
                "KBASE_POLL_MAX_ATTEMPTS must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(KbError::InvalidConfig(
                "KBASE_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, KbError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| KbError::InvalidConfig(format!("{} must be a valid number", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.poll_max_attempts, 12);
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("KBASE_API_URL", "https://kb.example.com/"),
            ("KBASE_API_KEY", "secret"),
            ("KBASE_DB_ID", "docs"),
            ("KBASE_POLL_INTERVAL_SECS", "2"),
            ("KBASE_POLL_MAX_ATTEMPTS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://kb.example.com");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.default_db_id.as_deref(), Some("docs"));
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.poll_max_attempts, 30);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config =
            ClientConfig::from_lookup(lookup(&[("KBASE_API_KEY", "  "), ("KBASE_DB_ID", "")]))
                .unwrap();
        assert!(config.api_key.is_none());
        assert!(config.default_db_id.is_none());
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = ClientConfig::from_lookup(lookup(&[("KBASE_POLL_MAX_ATTEMPTS", "many")]))
            .unwrap_err();
        assert!(matches!(err, KbError::InvalidConfig(_)));

        let err =
            ClientConfig::from_lookup(lookup(&[("KBASE_POLL_INTERVAL_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("KBASE_POLL_INTERVAL_SECS"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = ClientConfig::from_lookup(lookup(&[("KBASE_API_URL", "ftp://kb")])).unwrap_err();
        assert!(matches!(err, KbError::InvalidConfig(_)));
    }
}
