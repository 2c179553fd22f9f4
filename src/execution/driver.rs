use chrono::Utc;
use tokio::time::sleep;

use super::Reconciler;
use crate::config::Config;
use crate::gateway::{MarketDataGateway, OrderGateway};
use crate::models::TradeLogRecord;
use crate::strategy::SmaCrossover;
use crate::telemetry::TradeLog;

/// Sequential polling loop tying signal evaluation to order reconciliation
///
/// Iterations never overlap; the loop suspends only at the sleep after
/// each pass (short when healthy, longer after a caught error).
pub struct Driver {
    config: Config,
    evaluator: SmaCrossover,
    reconciler: Reconciler,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        let evaluator = SmaCrossover::new(config.sma_period);
        let reconciler = Reconciler::new(&config.symbol, config.volume, config.deviation);
        Self {
            config,
            evaluator,
            reconciler,
        }
    }

    /// Run until the process is killed. A failed iteration is logged and
    /// followed by the backoff delay; it never stops the loop.
    pub async fn run(
        &self,
        market: &dyn MarketDataGateway,
        orders: &dyn OrderGateway,
        trade_log: &mut TradeLog,
    ) {
        loop {
            match self.run_iteration(market, orders, trade_log).await {
                Ok(()) => sleep(self.config.poll_interval).await,
                Err(e) => {
                    tracing::error!("error in main loop: {}", e);
                    sleep(self.config.error_backoff).await;
                }
            }
        }
    }

    /// One polling pass: account snapshot, market conditions, exposure,
    /// signal, trade data row, reconciliation.
    pub async fn run_iteration(
        &self,
        market: &dyn MarketDataGateway,
        orders: &dyn OrderGateway,
        trade_log: &mut TradeLog,
    ) -> crate::Result<()> {
        let now = Utc::now();

        let account = orders.account_info().await?;
        tracing::info!(
            balance = account.balance,
            equity = account.equity,
            profit = account.profit,
            margin_level = account.margin_level,
            "account snapshot"
        );

        self.log_market_conditions(market).await;

        let exposure = self.exposure(orders).await;
        let signal = self
            .evaluator
            .evaluate(market, &self.config.symbol, self.config.timeframe)
            .await;

        trade_log.append(&TradeLogRecord {
            timestamp: now,
            symbol: self.config.symbol.clone(),
            exposure,
            last_close: signal.last_close,
            sma: signal.sma,
            signal: signal.direction,
            account_balance: account.balance,
            account_equity: account.equity,
        })?;

        tracing::info!(
            symbol = %self.config.symbol,
            exposure,
            signal = %signal.direction,
            "iteration state"
        );

        self.reconciler
            .reconcile(market, orders, signal.direction)
            .await?;

        Ok(())
    }

    /// Total open volume for the configured instrument. A positions fetch
    /// failure reads as zero exposure rather than killing the iteration.
    async fn exposure(&self, orders: &dyn OrderGateway) -> f64 {
        match orders.open_positions(Some(&self.config.symbol)).await {
            Ok(positions) if positions.is_empty() => {
                tracing::info!("no open positions for {}", self.config.symbol);
                0.0
            }
            Ok(positions) => {
                let exposure: f64 = positions.iter().map(|p| p.volume).sum();
                tracing::info!("current {} exposure: {}", self.config.symbol, exposure);
                for position in &positions {
                    tracing::debug!(
                        ticket = position.ticket,
                        side = %position.side,
                        volume = position.volume,
                        price_open = position.price_open,
                        profit = position.profit,
                        "open position"
                    );
                }
                exposure
            }
            Err(e) => {
                tracing::error!(
                    "failed to fetch positions for {}: {}",
                    self.config.symbol,
                    e
                );
                0.0
            }
        }
    }

    async fn log_market_conditions(&self, market: &dyn MarketDataGateway) {
        match market.current_tick(&self.config.symbol).await {
            Ok(tick) => {
                tracing::info!(
                    symbol = %self.config.symbol,
                    bid = tick.bid,
                    ask = tick.ask,
                    spread = tick.spread(),
                    last = tick.last,
                    volume = tick.volume,
                    "market conditions"
                );
            }
            Err(e) => {
                tracing::warn!("failed to fetch tick for {}: {}", self.config.symbol, e);
            }
        }
    }
}
