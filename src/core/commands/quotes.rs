use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::types::{CacheEncoding, OutputFormat, Payload};
use crate::utils::error::Result;

/// Realtime snapshots for one or more symbols.
pub(crate) fn run(
    symbols: &[String], server: Option<&str>, offline: bool, format: &OutputFormat,
    cache_file: Option<&Path>, encoding: CacheEncoding,
) -> Result<()> {
    let settings = FrameSettings::resolve(cache_file, offline)?;

    let key = FrameKey::new("hq", &symbols.join(","), "quotes");
    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        Ok(Payload::Quotes(source.quotes(symbols)?))
    })?;

    emit(&payload, format)
}
