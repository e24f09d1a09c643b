//! # Simulated Protocol Binding
//!
//! Deterministic random-walk implementation of the protocol traits. This
//! is the bundled data source behind the `fetch` feature: it lets every
//! facade operation and CLI command run end to end without a live wire
//! binding. Prices walk around a per-symbol base derived from the seed,
//! so runs with the same seed reproduce the same frames.

use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::frequency::Frequency;
use super::protocol::{ExtProtocol, HqProtocol};
use super::types::{
    Bar, CompanySection, FinanceInfo, InstrumentInfo, Market, MarketInfo, MinuteBar, Quote,
    StockInfo, TrafficStats, Transaction, XdxrEvent,
};
use crate::utils::error::{Error, Result};

const DEFAULT_SEED: u64 = 0x6d6f_6f74;

/// Listing sizes per exchange; chosen to exercise pagination.
fn listing_size(market: Market) -> u32 {
    match market {
        Market::Sz => 1500,
        Market::Sh => 1600,
        Market::Bj => 200,
    }
}

fn symbol_hash(code: &str) -> u64 {
    code.bytes().fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
        (acc ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Simulated standard-market binding.
pub struct SimHq {
    seed: u64,
    traffic: TrafficStats,
    closed: bool,
}

impl SimHq {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            traffic: TrafficStats::default(),
            closed: false,
        }
    }

    fn rng(&self, tag: &str, code: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ symbol_hash(tag) ^ symbol_hash(code))
    }

    fn base_price(&self, code: &str) -> f64 {
        5.0 + (symbol_hash(code) % 9_500) as f64 / 100.0
    }

    fn note(&mut self, bytes: u64) {
        self.traffic.requests += 1;
        self.traffic.sent_bytes += 64;
        self.traffic.received_bytes += bytes;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Protocol("connection closed".to_string()));
        }
        Ok(())
    }
}

impl Default for SimHq {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

fn bar_datetime(frequency: Frequency, steps_back: u32) -> String {
    let now = Utc::now().naive_utc();

    match frequency {
        Frequency::Day => {
            let date = now.date() - ChronoDuration::days(steps_back as i64);
            format!("{} 15:00", date.format("%Y-%m-%d"))
        }
        Frequency::Week => {
            let date = now.date() - ChronoDuration::weeks(steps_back as i64);
            format!("{} 15:00", date.format("%Y-%m-%d"))
        }
        Frequency::Month | Frequency::Quarter | Frequency::Year => {
            let date = now.date() - ChronoDuration::days(30 * steps_back as i64);
            format!("{} 15:00", date.format("%Y-%m-%d"))
        }
        _ => {
            let minutes = match frequency {
                Frequency::Min1 | Frequency::Tick => 1,
                Frequency::Min5 => 5,
                Frequency::Min15 => 15,
                Frequency::Min30 => 30,
                Frequency::Hour1 => 60,
                _ => unreachable!(),
            };
            let at = now - ChronoDuration::minutes((minutes * steps_back) as i64);
            at.format("%Y-%m-%d %H:%M").to_string()
        }
    }
}

/// Trading-minute label for index `i` of a session (09:30-11:30, 13:00-15:00).
fn session_minute(i: u32) -> String {
    let minutes = if i < 120 {
        9 * 60 + 30 + i
    } else {
        13 * 60 + (i - 120)
    };

    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn walk_bars(
    rng: &mut StdRng,
    code: &str,
    base: f64,
    frequency: Frequency,
    start: u32,
    count: u16,
) -> Vec<Bar> {
    let mut price = base;
    let mut bars = Vec::with_capacity(count as usize);

    for i in 0..count as u32 {
        let step: f64 = rng.random_range(-0.02..0.02);
        let open = price;
        price = (price * (1.0 + step)).max(0.01);
        let close = price;
        let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
        let vol = 10_000 + rng.random_range(0..90_000);

        // Oldest first; `start` counts back from the latest bar.
        let steps_back = start + (count as u32 - 1 - i);
        bars.push(Bar {
            code: code.to_string(),
            datetime: bar_datetime(frequency, steps_back),
            open: round2(open),
            high: round2(high),
            low: round2(low),
            close: round2(close),
            vol,
            amount: round2(close * vol as f64),
        });
    }

    bars
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl HqProtocol for SimHq {
    fn security_quotes(&mut self, symbols: &[(Market, String)]) -> Result<Vec<Quote>> {
        self.ensure_open()?;
        self.note(symbols.len() as u64 * 128);

        let servertime = Utc::now().format("%H:%M:%S.%3f").to_string();

        Ok(symbols
            .iter()
            .map(|(market, code)| {
                let mut rng = self.rng("quotes", code);
                let base = self.base_price(code);

                let last_close = round2(base);
                let price = round2(base * (1.0 + rng.random_range(-0.05..0.05)));
                let spread = (price * 0.001).max(0.01);
                let vol = 100_000 + rng.random_range(0..900_000);

                // One spread step per book level, so bids fall and asks
                // rise monotonically away from the last price.
                let level = |depth: f64| {
                    (
                        round2(price - spread * depth),
                        round2(price + spread * depth),
                    )
                };
                let (bid1, ask1) = level(1.0);
                let (bid2, ask2) = level(2.0);
                let (bid3, ask3) = level(3.0);
                let (bid4, ask4) = level(4.0);
                let (bid5, ask5) = level(5.0);

                Quote {
                    market: *market,
                    code: code.clone(),
                    price,
                    last_close,
                    open: round2(last_close * (1.0 + rng.random_range(-0.01..0.01))),
                    high: round2(price.max(last_close) * 1.01),
                    low: round2(price.min(last_close) * 0.99),
                    servertime: servertime.clone(),
                    vol,
                    amount: round2(price * vol as f64),
                    bid1,
                    ask1,
                    bid_vol1: rng.random_range(100..10_000),
                    ask_vol1: rng.random_range(100..10_000),
                    bid2,
                    ask2,
                    bid_vol2: rng.random_range(100..10_000),
                    ask_vol2: rng.random_range(100..10_000),
                    bid3,
                    ask3,
                    bid_vol3: rng.random_range(100..10_000),
                    ask_vol3: rng.random_range(100..10_000),
                    bid4,
                    ask4,
                    bid_vol4: rng.random_range(100..10_000),
                    ask_vol4: rng.random_range(100..10_000),
                    bid5,
                    ask5,
                    bid_vol5: rng.random_range(100..10_000),
                    ask_vol5: rng.random_range(100..10_000),
                }
            })
            .collect())
    }

    fn security_bars(
        &mut self,
        frequency: Frequency,
        _market: Market,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>> {
        self.ensure_open()?;
        self.note(count as u64 * 32);

        let mut rng = self.rng("bars", code);
        let base = self.base_price(code);
        Ok(walk_bars(&mut rng, code, base, frequency, start, count))
    }

    fn index_bars(
        &mut self,
        frequency: Frequency,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>> {
        self.security_bars(frequency, market, code, start, count)
    }

    fn minute_time_data(&mut self, _market: Market, code: &str) -> Result<Vec<MinuteBar>> {
        self.ensure_open()?;
        self.note(240 * 16);

        let mut rng = self.rng("minute", code);
        let mut price = self.base_price(code);
        let mut sum = 0.0;

        Ok((0..240)
            .map(|i| {
                price = (price * (1.0 + rng.random_range(-0.005..0.005))).max(0.01);
                sum += price;

                MinuteBar {
                    time: session_minute(i),
                    price: round2(price),
                    avg_price: round2(sum / (i + 1) as f64),
                    vol: 100 + rng.random_range(0..5_000),
                }
            })
            .collect())
    }

    fn history_minute_time_data(
        &mut self,
        market: Market,
        code: &str,
        date: u32,
    ) -> Result<Vec<MinuteBar>> {
        self.ensure_open()?;

        // Same shape as today's intraday data, seeded by the date as well.
        let salted = format!("{}@{}", code, date);
        let mut salted_source = SimHq::new(self.seed ^ symbol_hash(&salted));
        let rows = salted_source.minute_time_data(market, code)?;
        self.note(rows.len() as u64 * 16);

        Ok(rows)
    }

    fn transaction_data(
        &mut self,
        _market: Market,
        code: &str,
        _start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>> {
        self.ensure_open()?;
        self.note(count as u64 * 16);

        let mut rng = self.rng("transaction", code);
        let mut price = self.base_price(code);

        Ok((0..count as u32)
            .map(|i| {
                price = (price * (1.0 + rng.random_range(-0.002..0.002))).max(0.01);

                Transaction {
                    time: session_minute(i % 240),
                    price: round2(price),
                    vol: 1 + rng.random_range(0..500),
                    num: 1 + rng.random_range(0..50),
                    buyorsell: rng.random_range(0..3) as u8,
                }
            })
            .collect())
    }

    fn history_transaction_data(
        &mut self,
        market: Market,
        code: &str,
        start: u32,
        count: u16,
        date: u32,
    ) -> Result<Vec<Transaction>> {
        self.ensure_open()?;

        let salted = format!("{}@{}", code, date);
        let mut salted_source = SimHq::new(self.seed ^ symbol_hash(&salted));
        let rows = salted_source.transaction_data(market, code, start, count)?;
        self.note(rows.len() as u64 * 16);

        Ok(rows)
    }

    fn security_count(&mut self, market: Market) -> Result<u32> {
        self.ensure_open()?;
        self.note(8);

        Ok(listing_size(market))
    }

    fn security_list(&mut self, market: Market, start: u32) -> Result<Vec<StockInfo>> {
        self.ensure_open()?;

        let total = listing_size(market);
        if start >= total {
            return Ok(Vec::new());
        }

        let page = (total - start).min(1000);
        self.note(page as u64 * 24);

        Ok((start..start + page)
            .map(|i| {
                let code = match market {
                    Market::Sz => format!("{:06}", i),
                    Market::Sh => format!("6{:05}", i),
                    Market::Bj => format!("83{:04}", i),
                };
                let base = self.base_price(&code);

                StockInfo {
                    code,
                    name: format!("SIM {} {:04}", market, i),
                    volunit: 100,
                    decimal_point: 2,
                    pre_close: round2(base),
                }
            })
            .collect())
    }

    fn xdxr_info(&mut self, _market: Market, code: &str) -> Result<Vec<XdxrEvent>> {
        self.ensure_open()?;
        self.note(3 * 40);

        let mut rng = self.rng("xdxr", code);
        let today = Utc::now().date_naive();

        Ok((1..=3)
            .map(|i| XdxrEvent {
                date: (today - ChronoDuration::days(365 * i))
                    .format("%Y-%m-%d")
                    .to_string(),
                category: 1,
                label: "dividend".to_string(),
                cash_dividend: round2(rng.random_range(0.05..3.0)),
                share_dividend: 0.0,
            })
            .collect())
    }

    fn finance_info(&mut self, _market: Market, code: &str) -> Result<Vec<FinanceInfo>> {
        self.ensure_open()?;
        self.note(64);

        let mut rng = self.rng("finance", code);
        let total_shares = (1_000_000.0f64 + rng.random_range(0.0..9_000_000.0)).round();

        Ok(vec![FinanceInfo {
            code: code.to_string(),
            total_shares,
            circulating_shares: (total_shares * rng.random_range(0.3..1.0)).round(),
            net_assets: round2(total_shares * rng.random_range(1.0..8.0)),
            net_profit: round2(total_shares * rng.random_range(0.05..0.8)),
            eps: round2(rng.random_range(0.01..4.0)),
            bvps: round2(rng.random_range(1.0..20.0)),
        }])
    }

    fn company_category(&mut self, _market: Market, code: &str) -> Result<Vec<CompanySection>> {
        self.ensure_open()?;
        self.note(4 * 32);

        Ok(["profile", "shareholders", "announcements", "financials"]
            .iter()
            .enumerate()
            .map(|(i, name)| CompanySection {
                name: name.to_string(),
                filename: format!("{}.txt", code),
                start: (i as u32) * 4096,
                length: 4096,
            })
            .collect())
    }

    fn company_content(
        &mut self,
        _market: Market,
        code: &str,
        filename: &str,
        start: u32,
        _length: u32,
    ) -> Result<String> {
        self.ensure_open()?;
        self.note(4096);

        Ok(format!(
            "simulated company report for {} ({} @ {})",
            code, filename, start
        ))
    }

    fn traffic(&self) -> Result<TrafficStats> {
        Ok(self.traffic.clone())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn reconnect(&mut self) -> Result<()> {
        self.closed = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Simulated extended-market binding.
pub struct SimEx {
    inner: SimHq,
}

impl SimEx {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SimHq::new(seed),
        }
    }

    const INSTRUMENTS: u32 = 230;
}

impl Default for SimEx {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl ExtProtocol for SimEx {
    fn markets(&mut self) -> Result<Vec<MarketInfo>> {
        self.inner.ensure_open()?;
        self.inner.note(4 * 24);

        Ok([
            (1u16, "CZCE futures", 1u16),
            (28, "CFFEX futures", 1),
            (29, "DCE futures", 1),
            (47, "SHFE futures", 1),
        ]
        .iter()
        .map(|(market, name, category)| MarketInfo {
            market: *market,
            name: name.to_string(),
            category: *category,
        })
        .collect())
    }

    fn instrument_count(&mut self) -> Result<u32> {
        self.inner.ensure_open()?;
        self.inner.note(8);

        Ok(Self::INSTRUMENTS)
    }

    fn instrument_info(&mut self, start: u32, count: u16) -> Result<Vec<InstrumentInfo>> {
        self.inner.ensure_open()?;

        if start >= Self::INSTRUMENTS {
            return Ok(Vec::new());
        }

        let page = (Self::INSTRUMENTS - start).min(count as u32);
        self.inner.note(page as u64 * 24);

        Ok((start..start + page)
            .map(|i| InstrumentInfo {
                market: 47,
                code: format!("SIM{:04}", i),
                name: format!("sim instrument {:04}", i),
            })
            .collect())
    }

    fn instrument_quote(&mut self, _market: u16, code: &str) -> Result<Vec<Quote>> {
        self.inner
            .security_quotes(&[(Market::Sh, code.to_string())])
    }

    fn instrument_bars(
        &mut self,
        frequency: Frequency,
        _market: u16,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Bar>> {
        self.inner
            .security_bars(frequency, Market::Sh, code, start, count)
    }

    fn minute_time_data(&mut self, _market: u16, code: &str) -> Result<Vec<MinuteBar>> {
        self.inner.minute_time_data(Market::Sh, code)
    }

    fn history_minute_time_data(
        &mut self,
        _market: u16,
        code: &str,
        date: u32,
    ) -> Result<Vec<MinuteBar>> {
        self.inner.history_minute_time_data(Market::Sh, code, date)
    }

    fn transaction_data(
        &mut self,
        _market: u16,
        code: &str,
        start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>> {
        self.inner.transaction_data(Market::Sh, code, start, count)
    }

    fn history_transaction_data(
        &mut self,
        _market: u16,
        code: &str,
        date: u32,
        start: u32,
        count: u16,
    ) -> Result<Vec<Transaction>> {
        self.inner
            .history_transaction_data(Market::Sh, code, start, count, date)
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn reconnect(&mut self) -> Result<()> {
        self.inner.reconnect()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
