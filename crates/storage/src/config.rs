//! Connection settings of the hosted backend, read from the environment.

use std::{env, time::Duration};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const BACKEND_URL: &str = "FITLOG_BACKEND_URL";
const BACKEND_KEY: &str = "FITLOG_BACKEND_KEY";
const REQUEST_TIMEOUT: &str = "FITLOG_REQUEST_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the backend, e.g. `https://project.example.co`
    pub backend_url: String,
    /// Public API key sent with every request
    pub api_key: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Load the configuration from environment variables, honoring a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = var(BACKEND_URL)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(BACKEND_URL))?;

        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ConfigError::Invalid(BACKEND_URL, backend_url));
        }

        let api_key = var(BACKEND_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(BACKEND_KEY))?;

        let request_timeout = match var(REQUEST_TIMEOUT) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid(REQUEST_TIMEOUT, value))?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            backend_url,
            api_key,
            request_timeout,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn vars(entries: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_vars() {
        assert_eq!(
            Config::from_vars(vars(&[
                (BACKEND_URL, " https://fitlog.example.co/ "),
                (BACKEND_KEY, "anon-key"),
                (REQUEST_TIMEOUT, "3"),
            ])),
            Ok(Config {
                backend_url: "https://fitlog.example.co".to_string(),
                api_key: "anon-key".to_string(),
                request_timeout: Duration::from_secs(3),
            })
        );
    }

    #[test]
    fn test_from_vars_default_timeout() {
        assert_eq!(
            Config::from_vars(vars(&[
                (BACKEND_URL, "http://localhost:54321"),
                (BACKEND_KEY, "anon-key"),
            ]))
            .map(|config| config.request_timeout),
            Ok(DEFAULT_REQUEST_TIMEOUT)
        );
    }

    #[rstest]
    #[case::no_url(&[(BACKEND_KEY, "key")], ConfigError::Missing(BACKEND_URL))]
    #[case::empty_url(&[(BACKEND_URL, " "), (BACKEND_KEY, "key")], ConfigError::Missing(BACKEND_URL))]
    #[case::no_key(&[(BACKEND_URL, "https://a.co")], ConfigError::Missing(BACKEND_KEY))]
    #[case::no_scheme(
        &[(BACKEND_URL, "a.co"), (BACKEND_KEY, "key")],
        ConfigError::Invalid(BACKEND_URL, "a.co".to_string())
    )]
    #[case::invalid_timeout(
        &[(BACKEND_URL, "https://a.co"), (BACKEND_KEY, "key"), (REQUEST_TIMEOUT, "10s")],
        ConfigError::Invalid(REQUEST_TIMEOUT, "10s".to_string())
    )]
    fn test_from_vars_error(#[case] entries: &[(&str, &str)], #[case] expected: ConfigError) {
        assert_eq!(Config::from_vars(vars(entries)), Err(expected));
    }
}
