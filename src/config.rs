//! Runtime configuration read from environment variables (and `.env`).
//!
//! | Variable                  | Default                 |
//! |---------------------------|-------------------------|
//! | `PLASTISCAN_API_URL`      | `http://localhost:8002` |
//! | `PLASTISCAN_REPORT_LIMIT` | `50`                    |
//! | `PLASTISCAN_API_KEY`      | unset                   |
//! | `PLASTISCAN_TIMEOUT_SECS` | `30`                    |

use anyhow::{Context, Result, bail};
use std::time::Duration;

pub const API_URL_VAR: &str = "PLASTISCAN_API_URL";
pub const REPORT_LIMIT_VAR: &str = "PLASTISCAN_REPORT_LIMIT";
pub const API_KEY_VAR: &str = "PLASTISCAN_API_KEY";
pub const TIMEOUT_VAR: &str = "PLASTISCAN_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8002";
pub const DEFAULT_REPORT_LIMIT: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub report_limit: usize,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            report_limit: DEFAULT_REPORT_LIMIT,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(url) = get(API_URL_VAR) {
            config.api_base_url = url;
        }

        if let Some(raw) = get(REPORT_LIMIT_VAR) {
            let limit: usize = raw
                .parse()
                .with_context(|| format!("{REPORT_LIMIT_VAR} must be a positive integer, got '{raw}'"))?;
            if limit == 0 {
                bail!("{REPORT_LIMIT_VAR} must be at least 1");
            }
            config.report_limit = limit;
        }

        config.api_key = get(API_KEY_VAR);

        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{TIMEOUT_VAR} must be a number of seconds, got '{raw}'"))?;
            config.timeout = Duration::from_secs(secs.max(1));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:8002");
        assert_eq!(config.report_limit, 50);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.example.org"),
            (REPORT_LIMIT_VAR, "200"),
            (API_KEY_VAR, " token "),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.org");
        assert_eq!(config.report_limit, 200);
        assert_eq!(config.api_key.as_deref(), Some("token"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, "  "), (API_URL_VAR, "")])).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(Config::from_lookup(lookup(&[(REPORT_LIMIT_VAR, "lots")])).is_err());
        assert!(Config::from_lookup(lookup(&[(REPORT_LIMIT_VAR, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(TIMEOUT_VAR, "-1")])).is_err());
    }
}
