use crate::gateway::{GatewayError, MarketDataGateway, OrderGateway};
use crate::models::{Direction, OrderRequest, Position, Side};

/// Magic number stamped on every order this process submits
const MAGIC: u32 = 100;

/// Outcome of one reconciliation pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcileSummary {
    pub closes_attempted: usize,
    pub closes_filled: usize,
    pub opened_ticket: Option<u64>,
}

/// Converges open positions toward the signal direction
///
/// Opposite-side tickets are closed first, each independently; a fresh
/// market order is only submitted once the gateway confirms the instrument
/// has no open positions left. A flat signal leaves existing positions
/// untouched.
pub struct Reconciler {
    symbol: String,
    volume: f64,
    deviation: u32,
}

impl Reconciler {
    pub fn new(symbol: impl Into<String>, volume: f64, deviation: u32) -> Self {
        Self {
            symbol: symbol.into(),
            volume,
            deviation,
        }
    }

    /// One convergence pass for the configured instrument.
    ///
    /// Position-query failures propagate to the loop boundary; individual
    /// close or open failures are logged and absorbed here.
    pub async fn reconcile(
        &self,
        market: &dyn MarketDataGateway,
        orders: &dyn OrderGateway,
        direction: Direction,
    ) -> Result<ReconcileSummary, GatewayError> {
        let mut summary = ReconcileSummary::default();

        let Some(target_side) = direction.as_side() else {
            // Flat: no closes and no opens at all.
            return Ok(summary);
        };

        let positions = orders.open_positions(Some(&self.symbol)).await?;
        for position in positions.iter().filter(|p| p.side != target_side) {
            summary.closes_attempted += 1;
            if self.close_position(market, orders, position).await {
                summary.closes_filled += 1;
            }
        }

        let remaining = orders.open_positions(Some(&self.symbol)).await?;
        if remaining.is_empty() {
            summary.opened_ticket = self.open_market(market, orders, target_side).await;
        }

        Ok(summary)
    }

    /// Close one ticket. Failures are logged and reported as `false` so
    /// the remaining tickets still get their close attempts.
    async fn close_position(
        &self,
        market: &dyn MarketDataGateway,
        orders: &dyn OrderGateway,
        position: &Position,
    ) -> bool {
        let close_side = position.side.opposite();
        let Some(price) = self.quote_price(market, close_side).await else {
            tracing::error!("skipping close of ticket {}: no quote", position.ticket);
            return false;
        };

        let request = OrderRequest {
            symbol: position.symbol.clone(),
            volume: position.volume,
            side: close_side,
            price,
            deviation: self.deviation,
            magic: MAGIC,
            comment: "sma-cross close".to_string(),
            position: Some(position.ticket),
        };

        tracing::info!(
            "sending close order request: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        match orders.submit_order(&request).await {
            Ok(result) => {
                tracing::info!(
                    "position closed: ticket={}, price={}, profit={:.2}",
                    position.ticket,
                    result.price,
                    position.profit
                );
                true
            }
            Err(GatewayError::UnknownTicket(ticket)) => {
                tracing::warn!("ticket {} does not exist", ticket);
                false
            }
            Err(e) => {
                tracing::error!("close order failed for ticket {}: {}", position.ticket, e);
                false
            }
        }
    }

    /// Open one market order in `side` for the configured volume.
    async fn open_market(
        &self,
        market: &dyn MarketDataGateway,
        orders: &dyn OrderGateway,
        side: Side,
    ) -> Option<u64> {
        let price = self.quote_price(market, side).await?;

        let request = OrderRequest {
            symbol: self.symbol.clone(),
            volume: self.volume,
            side,
            price,
            deviation: self.deviation,
            magic: MAGIC,
            comment: "sma-cross open".to_string(),
            position: None,
        };

        tracing::info!(
            "sending order request: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        match orders.submit_order(&request).await {
            Ok(result) => {
                tracing::info!(
                    "opened {} position: volume={}, price={}",
                    side,
                    self.volume,
                    result.price
                );
                Some(result.order)
            }
            Err(e) => {
                tracing::error!("order failed: {}", e);
                None
            }
        }
    }

    /// Buy orders fill at the ask, sell orders at the bid.
    async fn quote_price(&self, market: &dyn MarketDataGateway, side: Side) -> Option<f64> {
        match market.current_tick(&self.symbol).await {
            Ok(tick) => Some(match side {
                Side::Buy => tick.ask,
                Side::Sell => tick.bid,
            }),
            Err(e) => {
                tracing::error!("failed to fetch tick for {}: {}", self.symbol, e);
                None
            }
        }
    }
}
