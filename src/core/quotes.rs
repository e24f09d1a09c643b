//! # Quote Facade
//!
//! High-level entry points over the protocol seam: [`StdQuotes`] for the
//! standard stock market and [`ExtQuotes`] for the extended market. The
//! facade owns symbol-to-market routing, offset clamping, listing
//! pagination, the date-ranged `k` window and the retry policy; the wire
//! work stays behind the traits in [`super::protocol`].

use chrono::{NaiveDate, Utc};

use super::frequency::Frequency;
use super::protocol::{ExtProtocol, HqProtocol};
use super::retry::RetryPolicy;
use super::server::{self, Endpoint};
use super::symbol::{market_of, split_ext, validate_server};
use super::types::{
    Bar, CompanyReport, CompanySection, FinanceInfo, InstrumentInfo, Market, MarketInfo,
    MinuteBar, Quote, StockInfo, TrafficStats, Transaction, XdxrEvent,
};
use crate::utils::error::{Error, Result};

/// Hard protocol limit on rows per bar/transaction request.
const MAX_OFFSET: u32 = 800;

/// Instrument directory page size used by [`ExtQuotes::instruments`].
const INSTRUMENT_PAGE: u16 = 100;

/// Construction options shared by both facades.
#[derive(Debug, Clone)]
pub struct QuoteOptions {
    /// Explicit `IP:PORT` server; when unset the persisted bestip or the
    /// pool head is used.
    pub server: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Probe the pool and persist the fastest server before connecting.
    pub bestip: bool,
}

impl Default for QuoteOptions {
    fn default() -> Self {
        Self {
            server: None,
            timeout: 15,
            bestip: false,
        }
    }
}

/// Facade factory, mirroring the two market families.
pub struct Quotes;

impl Quotes {
    pub fn std_with(client: Box<dyn HqProtocol>, options: QuoteOptions) -> Result<StdQuotes> {
        StdQuotes::new(client, options)
    }

    pub fn ext_with(client: Box<dyn ExtProtocol>, options: QuoteOptions) -> Result<ExtQuotes> {
        ExtQuotes::new(client, options)
    }

    /// Standard-market facade over the bundled simulated source.
    #[cfg(feature = "fetch")]
    pub fn std(options: QuoteOptions) -> Result<StdQuotes> {
        StdQuotes::new(Box::new(super::sim::SimHq::default()), options)
    }

    /// Extended-market facade over the bundled simulated source.
    #[cfg(feature = "fetch")]
    pub fn ext(options: QuoteOptions) -> Result<ExtQuotes> {
        ExtQuotes::new(Box::new(super::sim::SimEx::default()), options)
    }
}

fn resolve_server(endpoint: Endpoint, options: &QuoteOptions) -> Result<Option<(String, u16)>> {
    if let Some(explicit) = &options.server {
        return Ok(Some(validate_server(explicit)?));
    }

    if options.bestip {
        server::bestip(endpoint, std::time::Duration::from_secs(options.timeout))?;
    }

    // Configuration may be absent in embedded/library use.
    Ok(server::default_server(endpoint).ok())
}

fn parse_date(date: &str) -> Result<u32> {
    NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|_| Error::Validation(format!("invalid date, expected YYYYMMDD: {}", date)))?;

    date.parse::<u32>()
        .map_err(|_| Error::Validation(format!("invalid date: {}", date)))
}

fn clamp_offset(offset: u32) -> u16 {
    offset.min(MAX_OFFSET) as u16
}

/// Standard stock market realtime facade.
pub struct StdQuotes {
    client: Box<dyn HqProtocol>,
    server: Option<(String, u16)>,
    timeout: u64,
}

impl StdQuotes {
    pub fn new(client: Box<dyn HqProtocol>, options: QuoteOptions) -> Result<Self> {
        let server = resolve_server(Endpoint::Hq, &options)?;

        log::debug!("std facade server: {:?}, timeout: {}s", server, options.timeout);

        Ok(Self {
            client,
            server,
            timeout: options.timeout,
        })
    }

    pub fn server(&self) -> Option<&(String, u16)> {
        self.server.as_ref()
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    fn ensure_connected(&mut self) -> Result<()> {
        if self.client.is_closed() {
            log::debug!("connection lost, reconnecting");
            self.client.reconnect()?;
        }

        Ok(())
    }

    fn check_empty<T>(&mut self, rows: Vec<T>) -> Vec<T> {
        if rows.is_empty() {
            log::warn!("server returned an empty frame");
            if self.client.is_closed() {
                let _ = self.client.reconnect();
            }
        }

        rows
    }

    /// Realtime snapshots. Each symbol is routed to its exchange; an empty
    /// symbol list short-circuits to an empty frame.
    pub fn quotes(&mut self, symbols: &[String]) -> Result<Vec<Quote>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let routed = symbols
            .iter()
            .map(|s| Ok((market_of(s)?, s.clone())))
            .collect::<Result<Vec<_>>>()?;

        self.ensure_connected()?;
        let rows = self.client.security_quotes(&routed)?;

        Ok(self.check_empty(rows))
    }

    /// K-line bars for a security. `offset` clamps to the protocol limit.
    pub fn bars(
        &mut self,
        symbol: &str,
        frequency: Frequency,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Bar>> {
        let market = market_of(symbol)?;

        self.ensure_connected()?;
        let rows =
            self.client
                .security_bars(frequency, market, symbol, start, clamp_offset(offset))?;

        Ok(self.check_empty(rows))
    }

    /// Index k-line. Index codes starting with 00/88/99 live in Shanghai,
    /// everything else in Shenzhen.
    pub fn index_bars(
        &mut self,
        symbol: &str,
        frequency: Frequency,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Bar>> {
        let market = match symbol.get(..2) {
            Some("00") | Some("88") | Some("99") => Market::Sh,
            _ => Market::Sz,
        };

        self.ensure_connected()?;
        let rows =
            self.client
                .index_bars(frequency, market, symbol, start, clamp_offset(offset))?;

        Ok(self.check_empty(rows))
    }

    /// Today's intraday minute data.
    pub fn minute(&mut self, symbol: &str) -> Result<Vec<MinuteBar>> {
        let market = require_sh_sz(symbol)?;

        self.ensure_connected()?;
        let rows = self.client.minute_time_data(market, symbol)?;

        Ok(self.check_empty(rows))
    }

    /// Historical intraday minute data for a date (`YYYYMMDD`).
    pub fn minutes(&mut self, symbol: &str, date: &str) -> Result<Vec<MinuteBar>> {
        let market = require_sh_sz(symbol)?;
        let date = parse_date(date)?;

        self.ensure_connected()?;
        let rows = self
            .client
            .history_minute_time_data(market, symbol, date)?;

        Ok(self.check_empty(rows))
    }

    /// Today's tick-by-tick trades.
    pub fn transaction(
        &mut self,
        symbol: &str,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        let market = market_of(symbol)?;

        self.ensure_connected()?;
        let rows =
            self.client
                .transaction_data(market, symbol, start, clamp_offset(offset))?;

        Ok(self.check_empty(rows))
    }

    /// Historical tick-by-tick trades for a date (`YYYYMMDD`).
    pub fn transactions(
        &mut self,
        symbol: &str,
        date: &str,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        let market = require_sh_sz(symbol)?;
        let date = parse_date(date)?;

        self.ensure_connected()?;
        let rows = self.client.history_transaction_data(
            market,
            symbol,
            start,
            clamp_offset(offset),
            date,
        )?;

        Ok(self.check_empty(rows))
    }

    /// Number of listed securities on an exchange.
    pub fn stock_count(&mut self, market: Market) -> Result<u32> {
        self.ensure_connected()?;
        self.client.security_count(market)
    }

    /// Full listing of an exchange, paged and concatenated.
    pub fn stocks(&mut self, market: Market) -> Result<Vec<StockInfo>> {
        if market == Market::Bj {
            return Err(Error::Validation(
                "only the SH/SZ listings are supported".to_string(),
            ));
        }

        let count = self.stock_count(market)?;
        let mut stocks = Vec::with_capacity(count as usize);

        // Page size is driven by the binding, capped at 1000 rows.
        let mut start = 0;
        while start < count {
            log::debug!("fetching listing {}: {}/{}", market, start, count);
            let page = self.client.security_list(market, start)?;
            if page.is_empty() {
                break;
            }

            start += page.len() as u32;
            stocks.extend(page);
        }

        Ok(self.check_empty(stocks))
    }

    /// Listings of both exchanges, concatenated.
    pub fn stock_all(&mut self) -> Result<Vec<StockInfo>> {
        let mut all = self.stocks(Market::Sz)?;
        all.extend(self.stocks(Market::Sh)?);

        Ok(all)
    }

    /// Dividend / split events for a symbol.
    pub fn xdxr(&mut self, symbol: &str) -> Result<Vec<XdxrEvent>> {
        let market = market_of(symbol)?;

        self.ensure_connected()?;
        let rows = self.client.xdxr_info(market, symbol)?;

        Ok(self.check_empty(rows))
    }

    /// Fundamental snapshot for a symbol.
    pub fn finance(&mut self, symbol: &str) -> Result<Vec<FinanceInfo>> {
        let market = market_of(symbol)?;

        self.ensure_connected()?;
        let rows = self.client.finance_info(market, symbol)?;

        Ok(self.check_empty(rows))
    }

    /// Company information (F10) directory.
    pub fn f10_category(&mut self, symbol: &str) -> Result<Vec<CompanySection>> {
        let market = require_sh_sz(symbol)?;

        self.ensure_connected()?;
        self.client.company_category(market, symbol)
    }

    /// Company information content: the named section, or every section.
    pub fn f10(&mut self, symbol: &str, name: Option<&str>) -> Result<Vec<CompanyReport>> {
        let market = require_sh_sz(symbol)?;

        self.ensure_connected()?;
        let category = self.client.company_category(market, symbol)?;

        let wanted: Vec<&CompanySection> = match name {
            Some(name) => category.iter().filter(|s| s.name == name).collect(),
            None => category.iter().collect(),
        };

        let mut reports = Vec::with_capacity(wanted.len());
        for section in wanted {
            let content = self.client.company_content(
                market,
                symbol,
                &section.filename,
                section.start,
                section.length,
            )?;

            reports.push(CompanyReport {
                name: section.name.clone(),
                content,
            });
        }

        Ok(reports)
    }

    /// Date-ranged daily bars for `[begin, end)`.
    ///
    /// The bar-index window is estimated from the calendar distance to
    /// today, discounted for non-trading days (roughly a third of the
    /// year), then fetched backwards in 800-bar pages and filtered.
    pub fn k(&mut self, symbol: &str, begin: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        if begin >= end {
            return Err(Error::Validation(
                "begin date must precede end date".to_string(),
            ));
        }

        let market = market_of(symbol)?;
        let today = Utc::now().date_naive();

        let first = (today - end).num_days().max(0);
        let last = (today - begin).num_days().max(0);

        // Non-trading days shrink the index distance.
        let first = first - (first as f64 / 2.8) as i64;
        let last = last - (last as f64 / 3.5) as i64;

        let span = (last - first).max(1) as u32;
        let pages = span.div_ceil(MAX_OFFSET);

        self.ensure_connected()?;

        let mut bars = Vec::new();
        for page in 0..pages {
            let start = first as u32 + page * MAX_OFFSET;
            let chunk = self.client.security_bars(
                Frequency::Day,
                market,
                symbol,
                start,
                MAX_OFFSET as u16,
            )?;

            if chunk.is_empty() {
                break;
            }
            bars.extend(chunk);
        }

        let begin_str = begin.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();

        let mut bars: Vec<Bar> = bars
            .into_iter()
            .filter(|bar| {
                let date = &bar.datetime[..10.min(bar.datetime.len())];
                date >= begin_str.as_str() && date < end_str.as_str()
            })
            .collect();

        bars.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        bars.dedup_by(|a, b| a.datetime == b.datetime);

        Ok(bars)
    }

    /// Alias for [`StdQuotes::k`].
    pub fn ohlc(&mut self, symbol: &str, begin: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        self.k(symbol, begin, end)
    }

    /// Connection traffic counters.
    pub fn traffic(&self) -> Result<TrafficStats> {
        self.client.traffic()
    }

    pub fn close(&mut self) -> Result<()> {
        log::debug!("closing std facade");
        self.client.close()
    }
}

impl Drop for StdQuotes {
    fn drop(&mut self) {
        let _ = self.client.close();
    }
}

fn require_sh_sz(symbol: &str) -> Result<Market> {
    let market = market_of(symbol)?;

    if market == Market::Bj {
        return Err(Error::Validation(
            "only the SH/SZ markets are supported for this endpoint".to_string(),
        ));
    }

    Ok(market)
}

/// Extended market facade (futures, options, HK through-train). Every
/// operation runs under the transient-failure retry policy.
pub struct ExtQuotes {
    client: Box<dyn ExtProtocol>,
    retry: RetryPolicy,
    server: Option<(String, u16)>,
}

impl ExtQuotes {
    pub fn new(client: Box<dyn ExtProtocol>, options: QuoteOptions) -> Result<Self> {
        let server = resolve_server(Endpoint::Ex, &options)?;

        log::debug!("ext facade server: {:?}", server);

        Ok(Self {
            client,
            retry: RetryPolicy::default(),
            server,
        })
    }

    /// Replace the retry policy (tests use sub-second waits).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn server(&self) -> Option<&(String, u16)> {
        self.server.as_ref()
    }

    /// Extended market directory.
    pub fn markets(&mut self) -> Result<Vec<MarketInfo>> {
        let client = &mut self.client;
        self.retry.run(|| client.markets())
    }

    /// Number of instruments across all extended markets.
    pub fn instrument_count(&mut self) -> Result<u32> {
        let client = &mut self.client;
        self.retry.run_value(|| client.instrument_count())
    }

    /// One page of the instrument directory.
    pub fn instrument_info(&mut self, start: u32, offset: u16) -> Result<Vec<InstrumentInfo>> {
        let client = &mut self.client;
        self.retry
            .run(|| client.instrument_info(start, offset.min(INSTRUMENT_PAGE * 8)))
    }

    /// The complete instrument directory, paged and concatenated.
    pub fn instruments(&mut self) -> Result<Vec<InstrumentInfo>> {
        let client = &mut self.client;
        self.retry.run(|| {
            let count = client.instrument_count()?;
            let pages = count.div_ceil(INSTRUMENT_PAGE as u32);

            let mut rows = Vec::with_capacity(count as usize);
            for page in 0..pages {
                log::debug!("fetching instruments page {}/{}", page + 1, pages);
                rows.extend(client.instrument_info(page * INSTRUMENT_PAGE as u32, INSTRUMENT_PAGE)?);
            }

            Ok(rows)
        })
    }

    /// Five-level quote for one instrument.
    pub fn quote(&mut self, market: Option<u16>, symbol: &str) -> Result<Vec<Quote>> {
        let (market, code) = split_ext(market, symbol)?;

        let client = &mut self.client;
        self.retry.run(|| client.instrument_quote(market, &code))
    }

    /// Today's intraday minute data.
    pub fn minute(&mut self, market: Option<u16>, symbol: &str) -> Result<Vec<MinuteBar>> {
        let (market, code) = split_ext(market, symbol)?;

        let client = &mut self.client;
        self.retry.run(|| client.minute_time_data(market, &code))
    }

    /// Historical intraday minute data for a date (`YYYYMMDD`).
    pub fn minutes(
        &mut self,
        market: Option<u16>,
        symbol: &str,
        date: &str,
    ) -> Result<Vec<MinuteBar>> {
        let (market, code) = split_ext(market, symbol)?;
        let date = parse_date(date)?;

        let client = &mut self.client;
        self.retry
            .run(|| client.history_minute_time_data(market, &code, date))
    }

    /// K-line bars for one instrument.
    pub fn bars(
        &mut self,
        frequency: Frequency,
        market: Option<u16>,
        symbol: &str,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Bar>> {
        let (market, code) = split_ext(market, symbol)?;
        let count = clamp_offset(offset);

        let client = &mut self.client;
        self.retry
            .run(|| client.instrument_bars(frequency, market, &code, start, count))
    }

    /// Today's tick-by-tick trades for one instrument.
    pub fn transaction(
        &mut self,
        market: Option<u16>,
        symbol: &str,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        let (market, code) = split_ext(market, symbol)?;
        let count = clamp_offset(offset);

        let client = &mut self.client;
        self.retry
            .run(|| client.transaction_data(market, &code, start, count))
    }

    /// Historical tick-by-tick trades for one instrument.
    pub fn transactions(
        &mut self,
        market: Option<u16>,
        symbol: &str,
        date: &str,
        start: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        let (market, code) = split_ext(market, symbol)?;
        let date = parse_date(date)?;
        let count = clamp_offset(offset);

        let client = &mut self.client;
        self.retry
            .run(|| client.history_transaction_data(market, &code, date, start, count))
    }

    pub fn close(&mut self) -> Result<()> {
        log::debug!("closing ext facade");
        self.client.close()
    }
}

impl Drop for ExtQuotes {
    fn drop(&mut self) {
        let _ = self.client.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Call log shared with the test body.
    type CallLog = Rc<RefCell<Vec<String>>>;

    struct FakeHq {
        calls: CallLog,
        list_total: u32,
        closed: bool,
    }

    impl FakeHq {
        fn new(calls: CallLog) -> Self {
            Self {
                calls,
                list_total: 2500,
                closed: false,
            }
        }

        fn daily_bars(code: &str, start: u32, count: u16) -> Vec<Bar> {
            let today = Utc::now().date_naive();

            (0..count.min(60) as u32)
                .map(|i| {
                    let steps_back = start + (count.min(60) as u32 - 1 - i);
                    let date = today - ChronoDuration::days(steps_back as i64);

                    Bar {
                        code: code.to_string(),
                        datetime: format!("{} 15:00", date.format("%Y-%m-%d")),
                        open: 10.0,
                        high: 11.0,
                        low: 9.0,
                        close: 10.5,
                        vol: 1000,
                        amount: 10500.0,
                    }
                })
                .collect()
        }
    }

    impl HqProtocol for FakeHq {
        fn security_quotes(&mut self, symbols: &[(Market, String)]) -> Result<Vec<Quote>> {
            self.calls.borrow_mut().push(format!(
                "quotes:{}",
                symbols
                    .iter()
                    .map(|(m, c)| format!("{}{}", m, c))
                    .collect::<Vec<_>>()
                    .join(",")
            ));

            Ok(symbols
                .iter()
                .map(|(market, code)| Quote {
                    market: *market,
                    code: code.clone(),
                    price: 10.0,
                    last_close: 9.9,
                    open: 9.95,
                    high: 10.2,
                    low: 9.8,
                    servertime: "10:00:00.000".into(),
                    vol: 100,
                    amount: 1000.0,
                    bid1: 9.99,
                    ask1: 10.01,
                    bid_vol1: 10,
                    ask_vol1: 10,
                    bid2: 9.98,
                    ask2: 10.02,
                    bid_vol2: 20,
                    ask_vol2: 20,
                    bid3: 9.97,
                    ask3: 10.03,
                    bid_vol3: 30,
                    ask_vol3: 30,
                    bid4: 9.96,
                    ask4: 10.04,
                    bid_vol4: 40,
                    ask_vol4: 40,
                    bid5: 9.95,
                    ask5: 10.05,
                    bid_vol5: 50,
                    ask_vol5: 50,
                })
                .collect())
        }

        fn security_bars(
            &mut self,
            _frequency: Frequency,
            _market: Market,
            code: &str,
            start: u32,
            count: u16,
        ) -> Result<Vec<Bar>> {
            self.calls
                .borrow_mut()
                .push(format!("bars:{}:{}:{}", code, start, count));

            Ok(Self::daily_bars(code, start, count))
        }

        fn index_bars(
            &mut self,
            _frequency: Frequency,
            market: Market,
            code: &str,
            start: u32,
            count: u16,
        ) -> Result<Vec<Bar>> {
            self.calls
                .borrow_mut()
                .push(format!("index_bars:{}:{}", market, code));

            Ok(Self::daily_bars(code, start, count))
        }

        fn minute_time_data(&mut self, _market: Market, _code: &str) -> Result<Vec<MinuteBar>> {
            Ok(Vec::new())
        }

        fn history_minute_time_data(
            &mut self,
            market: Market,
            code: &str,
            date: u32,
        ) -> Result<Vec<MinuteBar>> {
            self.calls
                .borrow_mut()
                .push(format!("minutes:{}:{}:{}", market, code, date));

            Ok(vec![MinuteBar {
                time: "09:30".into(),
                price: 10.0,
                avg_price: 10.0,
                vol: 100,
            }])
        }

        fn transaction_data(
            &mut self,
            _market: Market,
            code: &str,
            start: u32,
            count: u16,
        ) -> Result<Vec<Transaction>> {
            self.calls
                .borrow_mut()
                .push(format!("transaction:{}:{}:{}", code, start, count));

            Ok(vec![Transaction {
                time: "09:30".into(),
                price: 10.0,
                vol: 1,
                num: 1,
                buyorsell: 0,
            }])
        }

        fn history_transaction_data(
            &mut self,
            _market: Market,
            code: &str,
            _start: u32,
            count: u16,
            date: u32,
        ) -> Result<Vec<Transaction>> {
            self.calls
                .borrow_mut()
                .push(format!("transactions:{}:{}:{}", code, date, count));

            Ok(Vec::new())
        }

        fn security_count(&mut self, _market: Market) -> Result<u32> {
            Ok(self.list_total)
        }

        fn security_list(&mut self, market: Market, start: u32) -> Result<Vec<StockInfo>> {
            self.calls
                .borrow_mut()
                .push(format!("list:{}:{}", market, start));

            if start >= self.list_total {
                return Ok(Vec::new());
            }

            let page = (self.list_total - start).min(1000);
            Ok((0..page)
                .map(|i| StockInfo {
                    code: format!("{:06}", start + i),
                    name: "stub".into(),
                    volunit: 100,
                    decimal_point: 2,
                    pre_close: 1.0,
                })
                .collect())
        }

        fn xdxr_info(&mut self, _market: Market, _code: &str) -> Result<Vec<XdxrEvent>> {
            Ok(Vec::new())
        }

        fn finance_info(&mut self, _market: Market, code: &str) -> Result<Vec<FinanceInfo>> {
            Ok(vec![FinanceInfo {
                code: code.to_string(),
                total_shares: 1.0,
                circulating_shares: 1.0,
                net_assets: 1.0,
                net_profit: 1.0,
                eps: 1.0,
                bvps: 1.0,
            }])
        }

        fn company_category(&mut self, _market: Market, code: &str) -> Result<Vec<CompanySection>> {
            Ok(vec![
                CompanySection {
                    name: "profile".into(),
                    filename: format!("{}.txt", code),
                    start: 0,
                    length: 64,
                },
                CompanySection {
                    name: "financials".into(),
                    filename: format!("{}.txt", code),
                    start: 64,
                    length: 64,
                },
            ])
        }

        fn company_content(
            &mut self,
            _market: Market,
            _code: &str,
            _filename: &str,
            start: u32,
            _length: u32,
        ) -> Result<String> {
            Ok(format!("content@{}", start))
        }

        fn traffic(&self) -> Result<TrafficStats> {
            Ok(TrafficStats::default())
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

    fn std_facade(calls: &CallLog) -> StdQuotes {
        Quotes::std_with(Box::new(FakeHq::new(calls.clone())), QuoteOptions::default()).unwrap()
    }

    #[test]
    fn test_quotes_routes_symbols_to_markets() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let rows = facade
            .quotes(&["600036".to_string(), "000001".to_string()])
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(calls.borrow()[0], "quotes:sh600036,sz000001");

        let book = &rows[0];
        assert_eq!(book.bid5, 9.95);
        assert_eq!(book.ask5, 10.05);
        assert_eq!(book.bid_vol5, 50);
        assert_eq!(book.ask_vol5, 50);
    }

    #[test]
    fn test_quotes_empty_symbols_short_circuit() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        assert!(facade.quotes(&[]).unwrap().is_empty());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_bars_clamps_offset() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        facade.bars("600036", Frequency::Day, 0, 5000).unwrap();
        assert_eq!(calls.borrow()[0], "bars:600036:0:800");
    }

    #[test]
    fn test_index_bars_prefix_routing() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        facade.index_bars("880001", Frequency::Day, 0, 10).unwrap();
        facade.index_bars("399001", Frequency::Day, 0, 10).unwrap();

        let log = calls.borrow();
        assert_eq!(log[0], "index_bars:sh:880001");
        assert_eq!(log[1], "index_bars:sz:399001");
    }

    #[test]
    fn test_minutes_rejects_beijing_market() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let result = facade.minutes("430047", "20240105");
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_minutes_rejects_bad_date() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        assert!(facade.minutes("600036", "2024-01-05").is_err());
        assert!(facade.minutes("600036", "20241399").is_err());
    }

    #[test]
    fn test_stocks_pages_and_concatenates() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let rows = facade.stocks(Market::Sz).unwrap();

        assert_eq!(rows.len(), 2500);
        let log = calls.borrow();
        let pages: Vec<&String> = log.iter().filter(|c| c.starts_with("list:")).collect();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "list:sz:0");
        assert_eq!(pages[2], "list:sz:2000");
    }

    #[test]
    fn test_stocks_rejects_beijing() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        assert!(matches!(
            facade.stocks(Market::Bj),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_stock_all_concatenates_both_exchanges() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let rows = facade.stock_all().unwrap();
        assert_eq!(rows.len(), 5000);
    }

    #[test]
    fn test_k_filters_and_sorts() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let today = Utc::now().date_naive();
        let begin = today - ChronoDuration::days(30);
        let end = today - ChronoDuration::days(1);

        let bars = facade.k("600036", begin, end).unwrap();

        assert!(!bars.is_empty());
        let begin_str = begin.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();
        for bar in &bars {
            let date = &bar.datetime[..10];
            assert!(date >= begin_str.as_str());
            assert!(date < end_str.as_str());
        }
        for pair in bars.windows(2) {
            assert!(pair[0].datetime < pair[1].datetime);
        }
    }

    #[test]
    fn test_k_rejects_inverted_range() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let today = Utc::now().date_naive();
        assert!(facade.k("600036", today, today).is_err());
    }

    #[test]
    fn test_f10_named_section() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = std_facade(&calls);

        let reports = facade.f10("600036", Some("financials")).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "financials");
        assert_eq!(reports[0].content, "content@64");

        let all = facade.f10("600036", None).unwrap();
        assert_eq!(all.len(), 2);
    }

    struct FakeEx {
        markets_failures: usize,
        markets_calls: usize,
        count_failures: usize,
        count_calls: usize,
        instrument_pages: CallLog,
    }

    impl FakeEx {
        fn new() -> Self {
            Self {
                markets_failures: 0,
                markets_calls: 0,
                count_failures: 0,
                count_calls: 0,
                instrument_pages: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn with_pages(pages: CallLog) -> Self {
            Self {
                instrument_pages: pages,
                ..Self::new()
            }
        }
    }

    impl ExtProtocol for FakeEx {
        fn markets(&mut self) -> Result<Vec<MarketInfo>> {
            self.markets_calls += 1;
            if self.markets_calls <= self.markets_failures {
                return Err(Error::Protocol("flaky".into()));
            }

            Ok(vec![MarketInfo {
                market: 47,
                name: "SHFE".into(),
                category: 1,
            }])
        }

        fn instrument_count(&mut self) -> Result<u32> {
            self.count_calls += 1;
            if self.count_calls <= self.count_failures {
                return Err(Error::Protocol("flaky".into()));
            }

            Ok(230)
        }

        fn instrument_info(&mut self, start: u32, count: u16) -> Result<Vec<InstrumentInfo>> {
            self.instrument_pages
                .borrow_mut()
                .push(format!("{}:{}", start, count));

            let page = (230u32.saturating_sub(start)).min(count as u32);
            Ok((0..page)
                .map(|i| InstrumentInfo {
                    market: 47,
                    code: format!("I{:04}", start + i),
                    name: "stub".into(),
                })
                .collect())
        }

        fn instrument_quote(&mut self, market: u16, code: &str) -> Result<Vec<Quote>> {
            self.instrument_pages
                .borrow_mut()
                .push(format!("quote:{}:{}", market, code));

            Ok(vec![Quote {
                market: Market::Sh,
                code: code.to_string(),
                price: 1.0,
                last_close: 1.0,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                servertime: "10:00:00.000".into(),
                vol: 1,
                amount: 1.0,
                bid1: 0.99,
                ask1: 1.01,
                bid_vol1: 1,
                ask_vol1: 1,
                bid2: 0.98,
                ask2: 1.02,
                bid_vol2: 2,
                ask_vol2: 2,
                bid3: 0.97,
                ask3: 1.03,
                bid_vol3: 3,
                ask_vol3: 3,
                bid4: 0.96,
                ask4: 1.04,
                bid_vol4: 4,
                ask_vol4: 4,
                bid5: 0.95,
                ask5: 1.05,
                bid_vol5: 5,
                ask_vol5: 5,
            }])
        }

        fn instrument_bars(
            &mut self,
            _frequency: Frequency,
            _market: u16,
            _code: &str,
            _start: u32,
            _count: u16,
        ) -> Result<Vec<Bar>> {
            Ok(Vec::new())
        }

        fn minute_time_data(&mut self, _market: u16, _code: &str) -> Result<Vec<MinuteBar>> {
            Ok(Vec::new())
        }

        fn history_minute_time_data(
            &mut self,
            _market: u16,
            _code: &str,
            _date: u32,
        ) -> Result<Vec<MinuteBar>> {
            Ok(Vec::new())
        }

        fn transaction_data(
            &mut self,
            _market: u16,
            _code: &str,
            _start: u32,
            _count: u16,
        ) -> Result<Vec<Transaction>> {
            Ok(Vec::new())
        }

        fn history_transaction_data(
            &mut self,
            _market: u16,
            _code: &str,
            _date: u32,
            _start: u32,
            _count: u16,
        ) -> Result<Vec<Transaction>> {
            Ok(Vec::new())
        }

        fn is_closed(&self) -> bool {
            false
        }

        fn reconnect(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn ext_facade(fake: FakeEx) -> ExtQuotes {
        Quotes::ext_with(Box::new(fake), QuoteOptions::default())
            .unwrap()
            .with_policy(RetryPolicy::new(3, 1, 2))
    }

    #[test]
    fn test_ext_markets_retries_transient_failures() {
        let mut fake = FakeEx::new();
        fake.markets_failures = 2;
        let mut facade = ext_facade(fake);

        let markets = facade.markets().unwrap();
        assert_eq!(markets.len(), 1);
    }

    #[test]
    fn test_ext_instrument_count_retries_transient_failures() {
        let mut fake = FakeEx::new();
        fake.count_failures = 2;
        let mut facade = ext_facade(fake);

        assert_eq!(facade.instrument_count().unwrap(), 230);
    }

    #[test]
    fn test_ext_instrument_count_surfaces_exhausted_failure() {
        let mut fake = FakeEx::new();
        fake.count_failures = 3;
        let mut facade = ext_facade(fake);

        assert!(matches!(
            facade.instrument_count(),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_ext_instruments_pages_of_100() {
        let pages: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = ext_facade(FakeEx::with_pages(pages.clone()));

        let rows = facade.instruments().unwrap();

        assert_eq!(rows.len(), 230);
        let log = pages.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0], "0:100");
        assert_eq!(log[2], "200:100");
    }

    #[test]
    fn test_ext_quote_requires_market() {
        let mut facade = ext_facade(FakeEx::new());

        assert!(matches!(
            facade.quote(None, "IF2212"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_ext_quote_splits_inline_market() {
        let pages: CallLog = Rc::new(RefCell::new(Vec::new()));
        let mut facade = ext_facade(FakeEx::with_pages(pages.clone()));

        facade.quote(None, "47#TS2209").unwrap();
        assert_eq!(pages.borrow()[0], "quote:47:TS2209");
    }
}
