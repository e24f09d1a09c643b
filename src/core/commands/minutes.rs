use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::types::{CacheEncoding, OutputFormat, Payload};
use crate::utils::error::Result;

/// Intraday minute data, today's session or a historical date.
pub(crate) fn run(
    symbol: &str, date: Option<&str>, server: Option<&str>, offline: bool,
    format: &OutputFormat, cache_file: Option<&Path>, encoding: CacheEncoding,
) -> Result<()> {
    let settings = FrameSettings::resolve(cache_file, offline)?;

    let params = format!("minutes:{}", date.unwrap_or("today"));
    let key = FrameKey::new("hq", symbol, &params);

    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        let rows = match date {
            Some(date) => source.minutes(symbol, date)?,
            None => source.minute(symbol)?,
        };

        Ok(Payload::Minutes(rows))
    })?;

    emit(&payload, format)
}
