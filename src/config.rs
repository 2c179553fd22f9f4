use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::Timeframe;

/// Runtime configuration, fixed at process start
///
/// Read from the environment once; nothing is reloaded while the loop
/// runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub symbol: String,
    pub volume: f64,
    pub timeframe: Timeframe,
    pub sma_period: u32,
    /// Maximum allowed slippage for order requests, in points.
    pub deviation: u32,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub bridge_url: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            symbol: env_or("TRADE_SYMBOL", "EURUSD"),
            volume: parse_or("TRADE_VOLUME", 1.0),
            timeframe: parse_or("TRADE_TIMEFRAME", Timeframe::M1),
            sma_period: parse_or("SMA_PERIOD", 10),
            deviation: parse_or("ORDER_DEVIATION", 20),
            poll_interval: Duration::from_secs(parse_or("POLL_INTERVAL_SECS", 1)),
            error_backoff: Duration::from_secs(parse_or("ERROR_BACKOFF_SECS", 5)),
            bridge_url: env_or("BRIDGE_URL", "http://127.0.0.1:8077"),
            log_dir: PathBuf::from(env_or("LOG_DIR", "logs")),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_on_missing_var() {
        assert_eq!(parse_or("AUTOTRADER_TEST_UNSET_VAR", 10u32), 10);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        std::env::set_var("AUTOTRADER_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(parse_or("AUTOTRADER_TEST_GARBAGE_VAR", 7u32), 7);
        std::env::remove_var("AUTOTRADER_TEST_GARBAGE_VAR");
    }

    #[test]
    fn test_parse_or_reads_timeframe() {
        std::env::set_var("AUTOTRADER_TEST_TIMEFRAME_VAR", "M5");
        assert_eq!(
            parse_or("AUTOTRADER_TEST_TIMEFRAME_VAR", Timeframe::M1),
            Timeframe::M5
        );
        std::env::remove_var("AUTOTRADER_TEST_TIMEFRAME_VAR");
    }
}
