use crate::gateway::MarketDataGateway;
use crate::indicators::calculate_sma;
use crate::models::{Direction, Signal, Timeframe};

/// SMA-crossover signal evaluator
///
/// Compares the close of the most recent completed bar against the simple
/// moving average of the last `period` completed closes. Close above the
/// average reads as an uptrend, below as a downtrend, exactly equal as
/// flat.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    period: u32,
}

impl SmaCrossover {
    pub fn new(period: u32) -> Self {
        Self { period }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Evaluate the signal for one instrument.
    ///
    /// Fails soft: when the gateway cannot supply bars the result is a
    /// flat signal with no price fields, never an error to the caller.
    pub async fn evaluate(
        &self,
        market: &dyn MarketDataGateway,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Signal {
        // Offset 1 excludes the bar still forming.
        let bars = match market.recent_bars(symbol, timeframe, 1, self.period).await {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                tracing::error!("no historical bars returned for {}", symbol);
                return Signal::flat();
            }
            Err(e) => {
                tracing::error!("failed to get historical data for {}: {}", symbol, e);
                return Signal::flat();
            }
        };

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let signal = signal_from_closes(&closes, self.period as usize);

        if let (Some(last_close), Some(sma)) = (signal.last_close, signal.sma) {
            tracing::info!(
                symbol,
                timeframe = %timeframe,
                last_close,
                sma,
                direction = %signal.direction,
                distance = last_close - sma,
                "signal analysis"
            );
        }

        signal
    }
}

/// Pure crossover rule over a chronological close series.
///
/// The average covers the most recent `period` closes, or every close
/// present when the series is shorter than that.
pub fn signal_from_closes(closes: &[f64], period: usize) -> Signal {
    let (Some(&last_close), Some(sma)) = (closes.last(), calculate_sma(closes, period)) else {
        return Signal::flat();
    };

    let direction = if last_close > sma {
        Direction::Buy
    } else if last_close < sma {
        Direction::Sell
    } else {
        Direction::Flat
    };

    Signal {
        last_close: Some(last_close),
        sma: Some(sma),
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_closes_signal_buy() {
        let closes: Vec<f64> = (1..=10).map(|i| 100.0 + i as f64).collect();
        let signal = signal_from_closes(&closes, 10);
        assert_eq!(signal.direction, Direction::Buy);
    }

    #[test]
    fn test_decreasing_closes_signal_sell() {
        let closes: Vec<f64> = (1..=10).map(|i| 100.0 - i as f64).collect();
        let signal = signal_from_closes(&closes, 10);
        assert_eq!(signal.direction, Direction::Sell);
    }

    #[test]
    fn test_equal_close_and_average_signal_flat() {
        let closes = vec![1.25; 10];
        let signal = signal_from_closes(&closes, 10);
        assert_eq!(signal.direction, Direction::Flat);
        assert_eq!(signal.last_close, Some(1.25));
        assert_eq!(signal.sma, Some(1.25));
    }

    #[test]
    fn test_empty_series_is_flat() {
        let signal = signal_from_closes(&[], 10);
        assert_eq!(signal, Signal::flat());
    }

    #[test]
    fn test_short_series_averages_what_exists() {
        // Period 10 but only 4 closes available
        let closes = vec![1.0, 2.0, 3.0, 4.0];
        let signal = signal_from_closes(&closes, 10);
        assert_eq!(signal.sma, Some(2.5));
        assert_eq!(signal.direction, Direction::Buy);
    }

    #[test]
    fn test_eurusd_scenario() {
        // Nine closes at 1.1000 followed by 1.1050
        let mut closes = vec![1.1000; 9];
        closes.push(1.1050);

        let signal = signal_from_closes(&closes, 10);
        assert_eq!(signal.last_close, Some(1.1050));
        let sma = signal.sma.unwrap();
        assert!((sma - 1.1005).abs() < 1e-9);
        assert_eq!(signal.direction, Direction::Buy);
    }
}
