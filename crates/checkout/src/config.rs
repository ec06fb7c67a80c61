//! Application configuration loaded from environment variables.

use std::time::Duration;

use settlement::SettlementConfig;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parses a format name; anything but `json` is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Client configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `BACKEND_URL`: marketplace backend (default: `"http://localhost:8000"`)
/// - `REQUEST_TIMEOUT_MS`: per-call timeout (default: `5000`)
/// - `PAYMENT_SHEET_DWELL_MS`: payment sheet display time before charging (default: `0`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `"text"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub request_timeout: Duration,
    pub payment_sheet_dwell: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            backend_url: lookup("BACKEND_URL").unwrap_or(defaults.backend_url),
            request_timeout: millis("REQUEST_TIMEOUT_MS", defaults.request_timeout),
            payment_sheet_dwell: millis("PAYMENT_SHEET_DWELL_MS", defaults.payment_sheet_dwell),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Returns the workflow tunables.
    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            payment_sheet_dwell: self.payment_sheet_dwell,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_millis(5000),
            payment_sheet_dwell: Duration::ZERO,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.payment_sheet_dwell, Duration::ZERO);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_lookup_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BACKEND_URL", "http://market.test"),
            ("REQUEST_TIMEOUT_MS", "250"),
            ("PAYMENT_SHEET_DWELL_MS", "1500"),
            ("LOG_FORMAT", "JSON"),
        ]);
        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url, "http://market.test");
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(
            config.settlement().payment_sheet_dwell,
            Duration::from_millis(1500)
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "REQUEST_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
