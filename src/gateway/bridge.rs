use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{
    GatewayError, GatewayResult, MarketDataGateway, OrderGateway, TRADE_RETCODE_DONE,
    TRADE_RETCODE_POSITION_CLOSED,
};
use crate::models::{AccountSnapshot, Bar, OrderRequest, OrderResult, Position, Side, Tick, Timeframe};

/// HTTP client for a trading-terminal bridge
///
/// The bridge exposes the terminal's session, market data, and trade calls
/// as plain REST endpoints; one instance holds one terminal session.
#[derive(Clone)]
pub struct BridgeGateway {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    success: bool,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct TickResponse {
    bid: f64,
    ask: f64,
    last: f64,
    volume: u64,
    time: i64,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    tick_volume: u64,
}

#[derive(Debug, Deserialize)]
struct OrderSendResponse {
    retcode: u32,
    #[serde(default)]
    order: u64,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    comment: String,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    ticket: u64,
    symbol: String,
    #[serde(rename = "type")]
    position_type: u8,
    volume: f64,
    price_open: f64,
    profit: f64,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balance: f64,
    equity: f64,
    profit: f64,
    margin_level: f64,
}

fn timestamp_to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl BridgeGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Establish the terminal session. A failure here is fatal to the
    /// process; there is no point polling a terminal we never reached.
    pub async fn initialize(&self) -> GatewayResult<()> {
        let url = format!("{}/initialize", self.base_url);
        let response: InitResponse = self.client.post(&url).send().await?.json().await?;

        if response.success {
            tracing::info!("terminal session established at {}", self.base_url);
            Ok(())
        } else {
            Err(GatewayError::Session(response.error))
        }
    }
}

#[async_trait]
impl MarketDataGateway for BridgeGateway {
    async fn current_tick(&self, symbol: &str) -> GatewayResult<Tick> {
        let url = format!("{}/symbol_info_tick", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::DataUnavailable {
                symbol: symbol.to_string(),
                detail: format!("tick request returned {}", response.status()),
            });
        }

        let tick: TickResponse = response.json().await?;
        Ok(Tick {
            symbol: symbol.to_string(),
            bid: tick.bid,
            ask: tick.ask,
            last: tick.last,
            volume: tick.volume,
            time: timestamp_to_utc(tick.time),
        })
    }

    async fn recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        offset: u32,
        count: u32,
    ) -> GatewayResult<Vec<Bar>> {
        let url = format!("{}/copy_rates_from_pos", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("timeframe", timeframe.as_str()),
                ("offset", &offset.to_string()),
                ("count", &count.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::DataUnavailable {
                symbol: symbol.to_string(),
                detail: format!("rates request returned {}", response.status()),
            });
        }

        let rates: Vec<RateResponse> = response.json().await?;
        if rates.is_empty() {
            return Err(GatewayError::DataUnavailable {
                symbol: symbol.to_string(),
                detail: "terminal returned no bars".to_string(),
            });
        }

        Ok(rates
            .into_iter()
            .map(|r| Bar {
                time: timestamp_to_utc(r.time),
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                tick_volume: r.tick_volume,
            })
            .collect())
    }
}

#[async_trait]
impl OrderGateway for BridgeGateway {
    async fn submit_order(&self, request: &OrderRequest) -> GatewayResult<OrderResult> {
        let url = format!("{}/order_send", self.base_url);
        let response: OrderSendResponse = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        match response.retcode {
            TRADE_RETCODE_DONE => Ok(OrderResult {
                retcode: response.retcode,
                order: response.order,
                price: response.price,
                comment: response.comment,
            }),
            TRADE_RETCODE_POSITION_CLOSED => {
                Err(GatewayError::UnknownTicket(request.position.unwrap_or(0)))
            }
            retcode => Err(GatewayError::OrderRejected {
                retcode,
                detail: response.comment,
            }),
        }
    }

    async fn open_positions(&self, symbol: Option<&str>) -> GatewayResult<Vec<Position>> {
        let url = format!("{}/positions", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(symbol) = symbol {
            request = request.query(&[("symbol", symbol)]);
        }

        let positions: Vec<PositionResponse> = request.send().await?.json().await?;

        Ok(positions
            .into_iter()
            .map(|p| Position {
                ticket: p.ticket,
                symbol: p.symbol,
                // Terminal position type: 0 = buy, 1 = sell
                side: if p.position_type == 0 { Side::Buy } else { Side::Sell },
                volume: p.volume,
                price_open: p.price_open,
                profit: p.profit,
            })
            .collect())
    }

    async fn account_info(&self) -> GatewayResult<AccountSnapshot> {
        let url = format!("{}/account_info", self.base_url);
        let account: AccountResponse = self.client.get(&url).send().await?.json().await?;

        Ok(AccountSnapshot {
            balance: account.balance,
            equity: account.equity,
            profit: account.profit,
            margin_level: account.margin_level,
        })
    }
}
