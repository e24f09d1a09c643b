//! # Core Data Model
//!
//! Typed records for everything the quote endpoints return, plus the
//! output/encoding selectors shared by the CLI and the frame cache. All
//! records serialize with `serde` and render as table rows.

use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use tabled::Tabled;

/// Exchange identifier with its wire id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Market {
    /// Shenzhen Stock Exchange (wire id 0).
    Sz,
    /// Shanghai Stock Exchange (wire id 1).
    Sh,
    /// Beijing Stock Exchange (wire id 2).
    Bj,
}

impl Market {
    /// Numeric id used by the protocol.
    pub fn wire_id(&self) -> u16 {
        match self {
            Market::Sz => 0,
            Market::Sh => 1,
            Market::Bj => 2,
        }
    }

    pub fn from_wire_id(id: u16) -> Option<Market> {
        match id {
            0 => Some(Market::Sz),
            1 => Some(Market::Sh),
            2 => Some(Market::Bj),
            _ => None,
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::Sz => write!(f, "sz"),
            Market::Sh => write!(f, "sh"),
            Market::Bj => write!(f, "bj"),
        }
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sz" | "0" => Ok(Market::Sz),
            "sh" | "1" => Ok(Market::Sh),
            "bj" | "2" => Ok(Market::Bj),
            _ => Err(format!("Invalid market: {}", s)),
        }
    }
}

/// Realtime snapshot for a single security carrying five bid/ask levels.
/// Text tables show the top of book only; the deeper levels stay in the
/// JSON and binary encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct Quote {
    pub market: Market,
    pub code: String,
    pub price: f64,
    pub last_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub servertime: String,
    pub vol: u64,
    pub amount: f64,
    pub bid1: f64,
    pub ask1: f64,
    pub bid_vol1: u64,
    pub ask_vol1: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid2: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask2: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid_vol2: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask_vol2: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid3: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask3: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid_vol3: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask_vol3: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid4: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask4: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid_vol4: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask_vol4: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid5: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask5: f64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub bid_vol5: u64,
    #[cfg_attr(feature = "cli", tabled(skip))]
    pub ask_vol5: u64,
}

/// OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct Bar {
    pub code: String,
    pub datetime: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: u64,
    pub amount: f64,
}

/// Intraday minute tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct MinuteBar {
    pub time: String,
    pub price: f64,
    pub avg_price: f64,
    pub vol: u64,
}

/// Tick-by-tick trade. `buyorsell` is 0 for buy, 1 for sell, 2 for neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct Transaction {
    pub time: String,
    pub price: f64,
    pub vol: u64,
    pub num: u32,
    pub buyorsell: u8,
}

/// One row of the exchange listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct StockInfo {
    pub code: String,
    pub name: String,
    pub volunit: u16,
    pub decimal_point: u8,
    pub pre_close: f64,
}

/// Dividend / split event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct XdxrEvent {
    pub date: String,
    pub category: u8,
    pub label: String,
    pub cash_dividend: f64,
    pub share_dividend: f64,
}

/// Fundamental snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct FinanceInfo {
    pub code: String,
    pub total_shares: f64,
    pub circulating_shares: f64,
    pub net_assets: f64,
    pub net_profit: f64,
    pub eps: f64,
    pub bvps: f64,
}

/// Entry of the company information (F10) directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct CompanySection {
    pub name: String,
    pub filename: String,
    pub start: u32,
    pub length: u32,
}

/// Resolved company information section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct CompanyReport {
    pub name: String,
    pub content: String,
}

/// Extended-market descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct MarketInfo {
    pub market: u16,
    pub name: String,
    pub category: u16,
}

/// Extended-market instrument row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct InstrumentInfo {
    pub market: u16,
    pub code: String,
    pub name: String,
}

/// Connection traffic counters reported by the binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Tabled))]
pub struct TrafficStats {
    pub sent_bytes: u64,
    pub received_bytes: u64,
    pub requests: u64,
}

/// Frame payload stored in the cache and rendered by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Quotes(Vec<Quote>),
    Bars(Vec<Bar>),
    Minutes(Vec<MinuteBar>),
    Transactions(Vec<Transaction>),
    Stocks(Vec<StockInfo>),
    Xdxr(Vec<XdxrEvent>),
    Finance(Vec<FinanceInfo>),
    Company(Vec<CompanyReport>),
    Markets(Vec<MarketInfo>),
    Instruments(Vec<InstrumentInfo>),
}

impl Payload {
    /// Number of rows carried by the frame.
    pub fn len(&self) -> usize {
        match self {
            Payload::Quotes(rows) => rows.len(),
            Payload::Bars(rows) => rows.len(),
            Payload::Minutes(rows) => rows.len(),
            Payload::Transactions(rows) => rows.len(),
            Payload::Stocks(rows) => rows.len(),
            Payload::Xdxr(rows) => rows.len(),
            Payload::Finance(rows) => rows.len(),
            Payload::Company(rows) => rows.len(),
            Payload::Markets(rows) => rows.len(),
            Payload::Instruments(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Bincode,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Bincode => write!(f, "bincode"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEncoding {
    Bincode,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_wire_ids() {
        assert_eq!(Market::Sz.wire_id(), 0);
        assert_eq!(Market::Sh.wire_id(), 1);
        assert_eq!(Market::Bj.wire_id(), 2);
        assert_eq!(Market::from_wire_id(1), Some(Market::Sh));
        assert_eq!(Market::from_wire_id(7), None);
    }

    #[test]
    fn test_market_parsing() {
        assert_eq!("sh".parse::<Market>().unwrap(), Market::Sh);
        assert_eq!("0".parse::<Market>().unwrap(), Market::Sz);
        assert!("hk".parse::<Market>().is_err());
    }

    #[test]
    fn test_payload_len() {
        let payload = Payload::Minutes(vec![MinuteBar {
            time: "09:30".into(),
            price: 10.2,
            avg_price: 10.1,
            vol: 1200,
        }]);
        assert_eq!(payload.len(), 1);
        assert!(!payload.is_empty());
    }
}
