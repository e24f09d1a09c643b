//! # Protocol Seam
//!
//! Traits describing the wire operations the quote facade needs. The wire
//! codec itself is not part of this crate; a concrete binding (the bundled
//! simulated source, or an external protocol implementation) provides
//! these traits. Everything above this seam is transport-agnostic.

use super::frequency::Frequency;
use super::types::{
    Bar, CompanySection, FinanceInfo, InstrumentInfo, Market, MarketInfo, MinuteBar, Quote,
    StockInfo, TrafficStats, Transaction, XdxrEvent,
};
use crate::utils::error::Result;

/// Standard (HQ) market operations.
pub trait HqProtocol {
    /// Realtime snapshots for up to 80 `(market, code)` pairs.
    fn security_quotes(&mut self, symbols: &[(Market, String)]) -> Result<Vec<Quote>>;

    fn security_bars(
        &mut self,
        frequency: Frequency,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>>;

    fn index_bars(
        &mut self,
        frequency: Frequency,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>>;

    fn minute_time_data(&mut self, market: Market, code: &str) -> Result<Vec<MinuteBar>>;

    fn history_minute_time_data(
        &mut self,
        market: Market,
        code: &str,
        date: u32,
    ) -> Result<Vec<MinuteBar>>;

    fn transaction_data(
        &mut self,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>>;

    fn history_transaction_data(
        &mut self,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
        date: u32,
    ) -> Result<Vec<Transaction>>;

    fn security_count(&mut self, market: Market) -> Result<u32>;

    /// One page of the exchange listing, at most 1000 rows from `start`.
    fn security_list(&mut self, market: Market, start: u32) -> Result<Vec<StockInfo>>;

    fn xdxr_info(&mut self, market: Market, code: &str) -> Result<Vec<XdxrEvent>>;

    fn finance_info(&mut self, market: Market, code: &str) -> Result<Vec<FinanceInfo>>;

    fn company_category(&mut self, market: Market, code: &str) -> Result<Vec<CompanySection>>;

    fn company_content(
        &mut self,
        market: Market,
        code: &str,
        filename: &str,
        start: u32,
        length: u32,
    ) -> Result<String>;

    fn traffic(&self) -> Result<TrafficStats>;

    fn is_closed(&self) -> bool;

    fn reconnect(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Extended (EX) market operations: futures, options, HK through-train.
pub trait ExtProtocol {
    fn markets(&mut self) -> Result<Vec<MarketInfo>>;

    fn instrument_count(&mut self) -> Result<u32>;

    /// One page of the instrument directory, at most `count` rows.
    fn instrument_info(&mut self, start: u32, count: u16) -> Result<Vec<InstrumentInfo>>;

    fn instrument_quote(&mut self, market: u16, code: &str) -> Result<Vec<Quote>>;

    fn instrument_bars(
        &mut self,
        frequency: Frequency,
        market: u16,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>>;

    fn minute_time_data(&mut self, market: u16, code: &str) -> Result<Vec<MinuteBar>>;

    fn history_minute_time_data(
        &mut self,
        market: u16,
        code: &str,
        date: u32,
    ) -> Result<Vec<MinuteBar>>;

    fn transaction_data(
        &mut self,
        market: u16,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>>;

    fn history_transaction_data(
        &mut self,
        market: u16,
        code: &str,
        date: u32,
        start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>>;

    fn is_closed(&self) -> bool;

    fn reconnect(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
