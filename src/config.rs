use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WAIT_INTERVAL_SECS: f64 = 30.0;
pub const DEFAULT_LIMIT: u32 = 1000;
pub const DEFAULT_CACHE_LIMIT: usize = 10000;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("unknown EXPORT_TYPE: {0} (expected one of: spot, margin, future, deposit, withdrawal)")]
    UnknownExportKind(String),

    #[error("invalid wait interval: {0} (must be a non-negative number of seconds)")]
    InvalidWaitInterval(f64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Tunables for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Sleep between retries of a transient failure
    pub wait_interval: Duration,
    /// Records requested per page
    pub limit: u32,
    /// Size of the id de-duplication window
    pub cache_limit: usize,
    /// Upper-cased currency filter for deposit/withdrawal exports
    pub currencies: Option<Vec<String>>,
    /// Retry ceiling per request; `None` retries forever
    pub max_retries: Option<u32>,
    /// Client-side request pacing
    pub requests_per_second: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            wait_interval: Duration::from_secs_f64(DEFAULT_WAIT_INTERVAL_SECS),
            limit: DEFAULT_LIMIT,
            cache_limit: DEFAULT_CACHE_LIMIT,
            currencies: None,
            max_retries: None,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::Zero("--limit"));
        }
        if self.cache_limit == 0 {
            return Err(ConfigError::Zero("--cache-limit"));
        }
        if self.requests_per_second == 0 {
            return Err(ConfigError::Zero("--requests-per-second"));
        }
        Ok(())
    }

    /// Whether `currency` passes the `--currencies` filter
    pub fn includes_currency(&self, currency: &str) -> bool {
        match &self.currencies {
            Some(allowed) => allowed.iter().any(|c| c == &currency.to_uppercase()),
            None => true,
        }
    }
}

pub fn wait_interval_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidWaitInterval(secs))
}

/// Parse `btc, Jpy,,xem` into `["BTC", "JPY", "XEM"]`; `None` when nothing
/// remains
pub fn parse_currencies(list: &str) -> Option<Vec<String>> {
    let currencies: Vec<String> = list
        .split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();

    if currencies.is_empty() {
        None
    } else {
        Some(currencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wait_interval, Duration::from_secs(30));
        assert_eq!(config.limit, 1000);
        assert_eq!(config.cache_limit, 10000);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = ExportConfig {
            limit: 0,
            ..ExportConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("--limit")));

        let config = ExportConfig {
            cache_limit: 0,
            ..ExportConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("--cache-limit")));
    }

    #[test]
    fn test_wait_interval_parsing() {
        assert_eq!(wait_interval_from_secs(0.5).unwrap(), Duration::from_millis(500));
        assert_eq!(wait_interval_from_secs(0.0).unwrap(), Duration::ZERO);
        assert!(wait_interval_from_secs(-1.0).is_err());
        assert!(wait_interval_from_secs(f64::NAN).is_err());
    }

    #[test]
    fn test_currency_filter() {
        let config = ExportConfig {
            currencies: parse_currencies("btc, Jpy,,"),
            ..ExportConfig::default()
        };
        assert_eq!(config.currencies, Some(vec!["BTC".to_string(), "JPY".to_string()]));
        assert!(config.includes_currency("btc"));
        assert!(config.includes_currency("JPY"));
        assert!(!config.includes_currency("xem"));

        assert!(ExportConfig::default().includes_currency("xem"));
        assert_eq!(parse_currencies(" , "), None);
    }
}
