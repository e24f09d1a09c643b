//! CLI command handlers.
//!
//! Each submodule implements one subcommand: resolve the market source,
//! serve the frame through the on-disk cache, and emit it in the requested
//! output format.

pub(crate) mod bars;
pub(crate) mod bestip;
pub(crate) mod company;
pub(crate) mod config;
pub(crate) mod finance;
pub(crate) mod minutes;
pub(crate) mod quotes;
pub(crate) mod stocks;
pub(crate) mod transaction;
pub(crate) mod xdxr;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::display::render_table;
use crate::core::quotes::StdQuotes;
#[cfg(feature = "fetch")]
use crate::core::quotes::{QuoteOptions, Quotes};
use crate::core::types::{OutputFormat, Payload};
use crate::utils::app_config::AppConfig;
use crate::utils::error::{Error, Result};

/// Cache ttl that never expires, used by `--offline`.
const TTL_FOREVER: u64 = u64::MAX;

/// Resolved cache location and freshness window for one command run.
pub(crate) struct FrameSettings {
    pub cache_file: PathBuf,
    pub ttl: u64,
    pub offline: bool,
}

impl FrameSettings {
    pub(crate) fn resolve(cache_file: Option<&Path>, offline: bool) -> Result<Self> {
        let config = AppConfig::fetch()?;

        Ok(Self {
            cache_file: cache_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(config.cache.file)),
            ttl: if offline { TTL_FOREVER } else { config.cache.ttl },
            offline,
        })
    }

    /// Error returned when `--offline` misses the cache.
    pub(crate) fn offline_miss(&self) -> Error {
        Error::new("frame is not cached, run once without --offline first")
    }
}

/// Build the standard-market facade from command arguments.
#[cfg(feature = "fetch")]
pub(crate) fn std_source(server: Option<&str>) -> Result<StdQuotes> {
    let config = AppConfig::fetch()?;

    Quotes::std_with(
        Box::new(crate::core::sim::SimHq::default()),
        QuoteOptions {
            server: server.map(str::to_string),
            timeout: config.timeout,
            bestip: false,
        },
    )
}

#[cfg(not(feature = "fetch"))]
pub(crate) fn std_source(server: Option<&str>) -> Result<StdQuotes> {
    let _ = server;

    Err(Error::Protocol(
        "no market source compiled in, rebuild with the fetch feature".to_string(),
    ))
}

/// Emit a frame on stdout in the requested format.
pub(crate) fn emit(payload: &Payload, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let table = match payload {
                Payload::Quotes(rows) => render_table(rows.iter().cloned()),
                Payload::Bars(rows) => render_table(rows.iter().cloned()),
                Payload::Minutes(rows) => render_table(rows.iter().cloned()),
                Payload::Transactions(rows) => render_table(rows.iter().cloned()),
                Payload::Stocks(rows) => render_table(rows.iter().cloned()),
                Payload::Xdxr(rows) => render_table(rows.iter().cloned()),
                Payload::Finance(rows) => render_table(rows.iter().cloned()),
                Payload::Company(rows) => render_table(rows.iter().cloned()),
                Payload::Markets(rows) => render_table(rows.iter().cloned()),
                Payload::Instruments(rows) => render_table(rows.iter().cloned()),
            };

            println!("{}", table);
            println!("Total: {} rows", payload.len());
        }
        OutputFormat::Json => {
            let rendered = match payload {
                Payload::Quotes(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Bars(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Minutes(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Transactions(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Stocks(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Xdxr(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Finance(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Company(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Markets(rows) => serde_json::to_string_pretty(rows)?,
                Payload::Instruments(rows) => serde_json::to_string_pretty(rows)?,
            };

            println!("{}", rendered);
        }
        OutputFormat::Bincode => {
            let encoded = bincode::serde::encode_to_vec(payload, bincode::config::standard())?;

            // Raw binary bytes on stdout, meant for piping.
            io::stdout()
                .write_all(&encoded)
                .map_err(|e| Error::new(&format!("IO error: {}", e)))?;
        }
    }

    Ok(())
}
