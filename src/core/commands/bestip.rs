use std::io::{self, Write};
use std::time::Duration;

use crate::core::display::render_table;
use crate::core::server::{self, Endpoint};
use crate::core::types::OutputFormat;
use crate::utils::app_config::AppConfig;
use crate::utils::error::{Error, Result};

/// Probe the configured server pool and rank it by connect latency.
///
/// With `write` the fastest reachable server is persisted as the default
/// for later commands.
pub(crate) fn run(endpoint: Endpoint, write: bool, format: &OutputFormat) -> Result<()> {
    let config = AppConfig::fetch()?;
    let timeout = Duration::from_secs(config.timeout);

    let probes = if write {
        server::bestip(endpoint, timeout)?
    } else {
        let pool = match endpoint {
            Endpoint::Hq => &config.server.hq,
            Endpoint::Ex => &config.server.ex,
        };

        server::check_server(pool, timeout)
    };

    match format {
        OutputFormat::Text => {
            println!("{}", render_table(probes.iter().cloned()));
            println!("Total: {} servers", probes.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&probes)?);
        }
        OutputFormat::Bincode => {
            let encoded = bincode::serde::encode_to_vec(&probes, bincode::config::standard())?;
            io::stdout()
                .write_all(&encoded)
                .map_err(|e| Error::new(&format!("IO error: {}", e)))?;
        }
    }

    Ok(())
}
