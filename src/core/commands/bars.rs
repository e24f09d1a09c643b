use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::frequency::Frequency;
use crate::core::types::{CacheEncoding, OutputFormat, Payload};
use crate::utils::error::Result;

/// K-line bars for a security or an index.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    symbol: &str, frequency: Frequency, start: u32, offset: u32, index: bool,
    server: Option<&str>, offline: bool, format: &OutputFormat, cache_file: Option<&Path>,
    encoding: CacheEncoding,
) -> Result<()> {
    let settings = FrameSettings::resolve(cache_file, offline)?;

    let params = format!("bars:{}:{}:{}:{}", frequency, start, offset, index);
    let key = FrameKey::new("hq", symbol, &params);

    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        let rows = if index {
            source.index_bars(symbol, frequency, start, offset)?
        } else {
            source.bars(symbol, frequency, start, offset)?
        };

        Ok(Payload::Bars(rows))
    })?;

    emit(&payload, format)
}
