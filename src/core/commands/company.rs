use std::io::{self, Write};
use std::path::Path;

use super::{emit, std_source, FrameSettings};
use crate::core::cache::{sync_frame, FrameKey};
use crate::core::display::{render_table, truncate_string};
use crate::core::types::{CacheEncoding, CompanyReport, OutputFormat, Payload};
use crate::utils::error::{Error, Result};

/// Company information (F10): the section directory, or section contents.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    symbol: &str, name: Option<&str>, list: bool, server: Option<&str>, offline: bool,
    format: &OutputFormat, cache_file: Option<&Path>, encoding: CacheEncoding,
) -> Result<()> {
    if list {
        return run_list(symbol, server, format);
    }

    let settings = FrameSettings::resolve(cache_file, offline)?;

    let params = format!("company:{}", name.unwrap_or("all"));
    let key = FrameKey::new("hq", symbol, &params);

    let payload = sync_frame(&settings.cache_file, key, settings.ttl, encoding, || {
        if settings.offline {
            return Err(settings.offline_miss());
        }

        let mut source = std_source(server)?;
        Ok(Payload::Company(source.f10(symbol, name)?))
    })?;

    // Reports carry full documents, keep the table readable.
    if let (OutputFormat::Text, Payload::Company(reports)) = (format, &payload) {
        let preview: Vec<CompanyReport> = reports
            .iter()
            .map(|report| CompanyReport {
                name: report.name.clone(),
                content: truncate_string(&report.content, 200),
            })
            .collect();

        println!("{}", render_table(preview));
        println!("Total: {} sections", reports.len());

        return Ok(());
    }

    emit(&payload, format)
}

/// Section directory is small and always fetched live.
fn run_list(symbol: &str, server: Option<&str>, format: &OutputFormat) -> Result<()> {
    let mut source = std_source(server)?;
    let sections = source.f10_category(symbol)?;

    match format {
        OutputFormat::Text => {
            println!("{}", render_table(sections.iter().cloned()));
            println!("Total: {} sections", sections.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }
        OutputFormat::Bincode => {
            let encoded = bincode::serde::encode_to_vec(&sections, bincode::config::standard())?;
            io::stdout()
                .write_all(&encoded)
                .map_err(|e| Error::new(&format!("IO error: {}", e)))?;
        }
    }

    Ok(())
}
