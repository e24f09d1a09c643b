//! # Symbol Routing
//!
//! Maps security codes to their exchange, splits extended-market
//! `MARKET#CODE` identifiers and validates server addresses. Prefix rules
//! follow the upstream exchange numbering: 6xx/5xx funds, 11x/13x bonds
//! and 90x B-shares trade in Shanghai, 0xx/3xx/1xx/20x in Shenzhen,
//! 4xx/8xx/92x in Beijing. Unmatched 5/6/7/9 codes default to Shanghai.

use std::net::IpAddr;

use super::types::Market;
use crate::utils::error::{Error, Result};

const SH_PREFIXES: &[&str] = &[
    "50", "51", "58", "60", "68", "90", "110", "113", "118", "132", "204", "5", "6", "7", "9",
];

const SZ_PREFIXES: &[&str] = &[
    "00", "12", "13", "15", "16", "17", "18", "20", "30", "39",
];

const BJ_PREFIXES: &[&str] = &["92", "4", "8"];

/// Infer the exchange for a security code.
///
/// Longer prefixes win, so `"204001"` (Shanghai repo) is matched before the
/// Beijing single-digit rules. Codes must be six ASCII digits.
pub fn market_of(symbol: &str) -> Result<Market> {
    validate_code(symbol)?;

    // Three-character prefixes take priority over two-character ones.
    for prefixes in [3usize, 2, 1] {
        let head = &symbol[..prefixes];

        if SH_PREFIXES.contains(&head) {
            return Ok(Market::Sh);
        }
        if SZ_PREFIXES.contains(&head) {
            return Ok(Market::Sz);
        }
        if BJ_PREFIXES.contains(&head) {
            return Ok(Market::Bj);
        }
    }

    Err(Error::Validation(format!(
        "cannot infer market for symbol: {}",
        symbol
    )))
}

/// Check that a code looks like a security code: six ASCII digits.
pub fn validate_code(symbol: &str) -> Result<()> {
    if symbol.len() != 6 || !symbol.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "invalid symbol, expected six digits: {:?}",
            symbol
        )));
    }

    Ok(())
}

/// Split an extended-market identifier of the form `MARKET#CODE`.
///
/// When `market` is already given it wins; otherwise the identifier must
/// carry the market id inline. A missing market is a validation error.
pub fn split_ext(market: Option<u16>, symbol: &str) -> Result<(u16, String)> {
    if let Some(id) = market {
        return Ok((id, symbol.to_string()));
    }

    if let Some((head, tail)) = symbol.split_once('#') {
        let id = head.parse::<u16>().map_err(|_| {
            Error::Validation(format!("invalid market id in symbol: {}", symbol))
        })?;

        return Ok((id, tail.to_string()));
    }

    Err(Error::Validation(
        "market is required, pass it explicitly or use MARKET#CODE".to_string(),
    ))
}

/// Parse a `host:port` server address into its parts.
///
/// Only literal IP addresses are accepted, matching the upstream behavior.
pub fn validate_server(server: &str) -> Result<(String, u16)> {
    let (host, port) = server.rsplit_once(':').ok_or_else(|| {
        Error::Validation(format!(
            "invalid server, expected IP:PORT (e.g. 127.0.0.1:7709): {}",
            server
        ))
    })?;

    host.parse::<IpAddr>().map_err(|_| {
        Error::Validation(format!("invalid server address: {}", host))
    })?;

    let port = port.parse::<u16>().map_err(|_| {
        Error::Validation(format!("invalid server port: {}", port))
    })?;

    Ok((host.to_string(), port))
}
