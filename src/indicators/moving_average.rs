/// Calculate Simple Moving Average (SMA) over the most recent `period`
/// values.
///
/// When fewer than `period` values are available the mean of whatever is
/// present is returned; only an empty slice yields `None`.
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if prices.is_empty() || period == 0 {
        return None;
    }

    let window = prices.len().min(period);
    let sum: f64 = prices.iter().rev().take(window).sum();
    Some(sum / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_uses_most_recent_window() {
        let prices = vec![1.0, 1.0, 100.0, 102.0, 104.0];
        let sma = calculate_sma(&prices, 3);
        assert_eq!(sma, Some(102.0));
    }

    #[test]
    fn test_sma_short_history_averages_what_exists() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(101.0));
    }

    #[test]
    fn test_sma_empty() {
        assert!(calculate_sma(&[], 5).is_none());
    }
}
