// Trading-terminal gateway module
pub mod bridge;

pub use bridge::BridgeGateway;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AccountSnapshot, Bar, OrderRequest, OrderResult, Position, Tick, Timeframe};

/// Retcode the terminal reports for a filled deal
pub const TRADE_RETCODE_DONE: u32 = 10009;

/// Retcode for a close that references an already-closed position
pub const TRADE_RETCODE_POSITION_CLOSED: u32 = 10036;

/// Tagged failure outcomes for gateway round-trips
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("session initialization failed: {0}")]
    Session(String),

    #[error("no market data for {symbol}: {detail}")]
    DataUnavailable { symbol: String, detail: String },

    #[error("order rejected with retcode {retcode}: {detail}")]
    OrderRejected { retcode: u32, detail: String },

    #[error("ticket {0} is not open")]
    UnknownTicket(u64),

    #[error("gateway transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Read side of the terminal: quotes and historical bars
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Latest quote for one instrument.
    async fn current_tick(&self, symbol: &str) -> GatewayResult<Tick>;

    /// The `count` most recent bars starting `offset` bars back from the
    /// newest one. Offset 1 skips the bar still forming.
    async fn recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        offset: u32,
        count: u32,
    ) -> GatewayResult<Vec<Bar>>;
}

/// Trade side of the terminal: orders, positions, account state
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit a market order. Closes reuse this call with the ticket set
    /// in the request.
    async fn submit_order(&self, request: &OrderRequest) -> GatewayResult<OrderResult>;

    /// Open positions, optionally filtered to one instrument, in the
    /// order the terminal reports them.
    async fn open_positions(&self, symbol: Option<&str>) -> GatewayResult<Vec<Position>>;

    /// Balance, equity, floating profit, margin level.
    async fn account_info(&self) -> GatewayResult<AccountSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_retcode() {
        let err = GatewayError::OrderRejected {
            retcode: 10013,
            detail: "invalid request".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10013"));
        assert!(msg.contains("invalid request"));
    }

    #[test]
    fn test_unknown_ticket_display() {
        let err = GatewayError::UnknownTicket(42);
        assert!(err.to_string().contains("42"));
    }
}
