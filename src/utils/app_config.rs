//! # Application Configuration
//!
//! Global configuration store backed by the `config` crate. Defaults are
//! embedded at build time (`resources/default_config.toml`), may be merged
//! with a user-supplied configuration file and command-line arguments, and
//! can be overridden from the environment with the `MOOTDX` prefix.

use std::path::Path;
use std::sync::RwLock;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::types::LogLevel;

lazy_static! {
    static ref CONFIG: RwLock<ConfigBuilder<DefaultState>> =
        RwLock::new(Config::builder());
}

/// Host:port pools for the standard and extended market endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPools {
    pub hq: Vec<String>,
    pub ex: Vec<String>,
}

/// Preferred servers selected by `mootdx bestip`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BestIp {
    #[serde(default)]
    pub hq: Option<String>,
    #[serde(default)]
    pub ex: Option<String>,
}

/// Local frame cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub file: String,
    pub ttl: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub debug: bool,
    pub log_level: LogLevel,
    pub timeout: u64,
    pub server: ServerPools,
    #[serde(default)]
    pub bestip: BestIp,
    pub cache: CacheSettings,
}

impl AppConfig {
    /// Initialize the global configuration from the embedded defaults.
    pub fn init(default_config: Option<&str>) -> Result<()> {
        let mut builder = Config::builder();

        // Embedded defaults are the base layer.
        if let Some(contents) = default_config {
            builder = builder.add_source(File::from_str(contents, FileFormat::Toml));
        }

        // Environment variables override everything below them,
        // e.g. MOOTDX_DEBUG=true or MOOTDX_CACHE__TTL=60.
        builder = builder.add_source(Environment::with_prefix("MOOTDX").separator("__"));

        *CONFIG.write()? = builder;

        Ok(())
    }

    /// Merge a configuration file into the global store.
    pub fn merge_config(config_file: Option<&Path>) -> Result<()> {
        if let Some(path) = config_file {
            let mut guard = CONFIG.write()?;
            *guard = guard.clone().add_source(File::from(path.to_path_buf()));
        }

        Ok(())
    }

    /// Merge settings passed on the command line into the global store.
    #[cfg(feature = "cli")]
    pub fn merge_args(args: clap::ArgMatches) -> Result<()> {
        if let Some(debug) = args.get_one::<bool>("debug") {
            AppConfig::set("debug", *debug)?;
        }

        if let Some(level) = args.get_one::<LogLevel>("log_level") {
            AppConfig::set("log_level", level.to_string())?;
        }

        Ok(())
    }

    /// Override a single configuration key.
    pub fn set<T>(key: &str, value: T) -> Result<()>
    where
        T: Into<config::Value>,
    {
        let mut guard = CONFIG.write()?;
        *guard = guard.clone().set_override(key, value)?;

        Ok(())
    }

    /// Read a single configuration key.
    pub fn get<'de, T: Deserialize<'de>>(key: &str) -> Result<T> {
        Ok(CONFIG.read()?.build_cloned()?.get::<T>(key)?)
    }

    /// Materialize the current configuration.
    pub fn fetch() -> Result<AppConfig> {
        Ok(CONFIG.read()?.build_cloned()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_CONFIG: &str = include_str!("../resources/default_config.toml");

    // Single test: the store is process-global, parallel tests would race.
    #[test]
    fn test_init_fetch_and_override() {
        AppConfig::init(Some(DEFAULT_CONFIG)).unwrap();

        let config = AppConfig::fetch().unwrap();
        assert!(!config.debug);
        assert_eq!(config.timeout, 15);
        assert_eq!(config.cache.file, ".mootdx.cache");
        assert!(!config.server.hq.is_empty());

        AppConfig::set("bestip.hq", "127.0.0.1:7709").unwrap();
        let bestip: String = AppConfig::get("bestip.hq").unwrap();
        assert_eq!(bestip, "127.0.0.1:7709");
    }
}
