use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart timeframe for bar requests, mirroring the terminal's fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub fn minutes(self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "M1" => Ok(Timeframe::M1),
            "M5" => Ok(Timeframe::M5),
            "M15" => Ok(Timeframe::M15),
            "M30" => Ok(Timeframe::M30),
            "H1" => Ok(Timeframe::H1),
            "H4" => Ok(Timeframe::H4),
            "D1" => Ok(Timeframe::D1),
            other => Err(format!("unknown timeframe: {}", other)),
        }
    }
}

/// Best bid/ask quote for one instrument at an instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    pub volume: u64,
    pub time: DateTime<Utc>,
}

impl Tick {
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// One OHLC sample at a fixed timeframe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: u64,
}

/// Trend direction derived from the signal evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    Flat,
}

impl Direction {
    /// The order side this direction maps to. Flat maps to none.
    pub fn as_side(self) -> Option<Side> {
        match self {
            Direction::Buy => Some(Side::Buy),
            Direction::Sell => Some(Side::Sell),
            Direction::Flat => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::Flat => "flat",
        };
        f.write_str(s)
    }
}

/// Side of an open position or order request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        };
        f.write_str(s)
    }
}

/// Signal produced once per polling tick. Never persisted, only logged.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub last_close: Option<f64>,
    pub sma: Option<f64>,
    pub direction: Direction,
}

impl Signal {
    /// Neutral signal with no price fields; the fail-soft value when bar
    /// data is unavailable.
    pub fn flat() -> Self {
        Self {
            last_close: None,
            sma: None,
            direction: Direction::Flat,
        }
    }
}

/// Open trade as reported by the order gateway
///
/// Tickets are assigned by the terminal; this process never mints its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticket: u64,
    pub symbol: String,
    pub side: Side,
    pub volume: f64,
    pub price_open: f64,
    pub profit: f64,
}

/// Account state polled once per iteration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub equity: f64,
    pub profit: f64,
    pub margin_level: f64,
}

/// Market order request sent to the order gateway
///
/// The same shape is reused for closes: set `position` to the ticket being
/// closed and `side` to the opposite of the position's side.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub volume: f64,
    pub side: Side,
    pub price: f64,
    pub deviation: u32,
    pub magic: u32,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}

/// Fill report returned by the order gateway
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResult {
    pub retcode: u32,
    pub order: u64,
    pub price: f64,
    pub comment: String,
}

/// One row of the per-iteration trade data file. Append-only, chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub exposure: f64,
    pub last_close: Option<f64>,
    pub sma: Option<f64>,
    pub signal: Direction,
    pub account_balance: f64,
    pub account_equity: f64,
}
