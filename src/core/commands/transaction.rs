use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::types::{CacheEncoding, OutputFormat, Payload};
use crate::utils::error::Result;

/// Tick-by-tick trades, today's session or a historical date.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    symbol: &str, date: Option<&str>, start: u32, offset: u32, server: Option<&str>,
    offline: bool, format: &OutputFormat, cache_file: Option<&Path>, encoding: CacheEncoding,
) -> Result<()> {
    let settings = FrameSettings::resolve(cache_file, offline)?;

    let params = format!("transaction:{}:{}:{}", date.unwrap_or("today"), start, offset);
    let key = FrameKey::new("hq", symbol, &params);

    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        let rows = match date {
            Some(date) => source.transactions(symbol, date, start, offset)?,
            None => source.transaction(symbol, start, offset)?,
        };

        Ok(Payload::Transactions(rows))
    })?;

    emit(&payload, format)
}
