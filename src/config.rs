//! Client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::network::DEFAULT_API_URL;

/// Timeout applied when the configuration leaves it unset.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable holding the base address of the default client.
pub const ENV_BASE_URL: &str = "API_BASE_URL";

/// Environment variable overriding the default client's timeout, in ms.
pub const ENV_TIMEOUT_MS: &str = "API_TIMEOUT_MS";

/// Settings fixing one client's behavior. Immutable once the client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address every relative request URL is resolved against.
    pub base_url: String,
    /// Request timeout in milliseconds. `None` or `0` means [`DEFAULT_TIMEOUT_MS`].
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Headers sent with every request, on top of `Content-Type: application/json`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Load from `API_BASE_URL` / `API_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_ms = lookup(ENV_TIMEOUT_MS)
            .filter(|v| !v.trim().is_empty())
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(ms) => Some(ms),
                Err(e) => {
                    tracing::warn!(
                        value = %raw,
                        error = %e,
                        "Ignoring unparsable {}, using default timeout",
                        ENV_TIMEOUT_MS
                    );
                    None
                }
            });

        Self {
            base_url,
            timeout_ms,
            headers: BTreeMap::new(),
        }
    }

    /// Timeout the client will actually use.
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_millis(
            self.timeout_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        )
    }

    /// Default header set: `Content-Type: application/json` overlaid with the
    /// configured headers. Names compare case-insensitively, configured
    /// values win.
    pub fn header_map(&self) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let header_name = HeaderName::try_from(name)
        .map_err(|e| HttpError::InvalidHeader(format!("Invalid header name '{}': {}", name, e)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| HttpError::InvalidHeader(format!("Invalid header value for '{}': {}", name, e)))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_unset_timeout_defaults_to_10s() {
        let config = ClientConfig::new("https://api.test");
        assert_eq!(config.timeout_ms, None);
        assert_eq!(config.effective_timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_explicit_timeout() {
        let config = ClientConfig::new("https://api.test").with_timeout_ms(2500);
        assert_eq!(config.effective_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_zero_timeout_falls_back_to_10s() {
        let config = ClientConfig::new("https://api.test").with_timeout_ms(0);
        assert_eq!(config.effective_timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_header_map_has_json_content_type() {
        let headers = ClientConfig::new("https://api.test").header_map().unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_caller_content_type_wins() {
        let headers = ClientConfig::new("https://api.test")
            .with_header("content-type", "text/plain")
            .with_header("X-Trace", "abc")
            .header_map()
            .unwrap();
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers["x-trace"], "abc");
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let err = ClientConfig::new("https://api.test")
            .with_header("bad header", "x")
            .header_map()
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader(_)));
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://api.test"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("https://api.test"));
    }

    #[test]
    fn test_from_lookup_falls_back_to_default_url() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://staging.test"),
            (ENV_TIMEOUT_MS, "1500"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://staging.test");
        assert_eq!(config.timeout_ms, Some(1500));
    }

    #[test]
    fn test_from_lookup_ignores_bad_timeout_and_empty_url() {
        let config = ClientConfig::from_lookup(|k| match k {
            ENV_BASE_URL => Some("  ".to_string()),
            ENV_TIMEOUT_MS => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_from_lookup_zero_timeout_uses_default() {
        let config = ClientConfig::from_lookup(|k| match k {
            ENV_TIMEOUT_MS => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.effective_timeout(), Duration::from_millis(10_000));
    }
}
