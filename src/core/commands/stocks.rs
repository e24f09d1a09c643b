use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::types::{CacheEncoding, Market, OutputFormat, Payload};
use crate::utils::error::Result;

/// Exchange listing; one exchange or both when none is given.
pub(crate) fn run(
    market: Option<Market>, server: Option<&str>, offline: bool, format: &OutputFormat,
    cache_file: Option<&Path>, encoding: CacheEncoding,
) -> Result<()> {
    let settings = FrameSettings::resolve(cache_file, offline)?;

    let scope = market.map(|m| m.to_string()).unwrap_or_else(|| "all".to_string());
    let key = FrameKey::new("hq", &scope, "stocks");

    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        let rows = match market {
            Some(market) => source.stocks(market)?,
            None => source.stock_all()?,
        };

        Ok(Payload::Stocks(rows))
    })?;

    emit(&payload, format)
}
