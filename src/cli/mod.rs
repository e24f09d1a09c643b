//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for the quote client.
//! It uses the `clap` crate to parse arguments and subcommands, and then
//! dispatches to the appropriate handlers in the `core::commands` module.
//!
//! The main components are:
//! - `Cli`: The top-level struct representing the CLI arguments.
//! - `Commands`: An enum defining the subcommands (e.g., `quotes`, `bars`, `bestip`).
//! - `CompletionSubcommand`: An enum for generating shell completion scripts.
//! - `cli_match()`: The main function that parses CLI input and executes the matched command.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use std::path::PathBuf;

use crate::core::{
    commands,
    frequency::Frequency,
    server::Endpoint,
    types::{CacheEncoding, Market, OutputFormat},
};
use crate::utils::app_config::AppConfig;
use crate::utils::error::Result;
use crate::utils::types::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "mootdx", author, about, long_about = "market quote CLI", version)]
/// Represents the command-line interface arguments for the application.
pub struct Cli {
    /// Specifies a custom configuration file path.
    /// If not provided, the application will look for a default configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enables or disables debug mode.
    #[arg(name = "debug", short, long = "debug", value_name = "DEBUG")]
    pub debug: Option<bool>,

    /// Sets the logging level for the application.
    #[arg(
        name = "log_level",
        short,
        long = "log-level",
        value_name = "LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// The subcommand to execute.
    #[clap(subcommand)]
    command: Commands,
}

/// Defines the main subcommands available in the CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetches realtime level-1 snapshots for one or more securities.
    #[clap(name = "quotes", about = "Fetch realtime quotes for one or more symbols")]
    Quotes {
        /// Security codes, e.g. 600036 000001.
        #[arg(required = true, value_name = "SYMBOL")]
        symbols: Vec<String>,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches k-line bars for a security or an index.
    #[clap(name = "bars", about = "Fetch k-line bars for a security or an index")]
    Bars {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Bar frequency: 1m, 5m, 15m, 30m, 1h, day, week, mon, quarter, year.
        #[arg(long, value_name = "FREQ", default_value = "day", value_parser = parse_frequency)]
        frequency: Frequency,

        /// Index of the first bar, counted back from the latest.
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Number of bars to fetch, capped at 800 by the protocol.
        #[arg(long, default_value_t = 100)]
        offset: u32,

        /// Treat the symbol as an index code.
        #[arg(long)]
        index: bool,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches intraday minute data, today's session or a historical date.
    #[clap(name = "minutes", about = "Fetch intraday minute data")]
    Minutes {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Session date as YYYYMMDD; defaults to today.
        #[arg(long, value_name = "DATE")]
        date: Option<String>,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches tick-by-tick trades, today's session or a historical date.
    #[clap(name = "transaction", about = "Fetch tick-by-tick trades")]
    Transaction {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Session date as YYYYMMDD; defaults to today.
        #[arg(long, value_name = "DATE")]
        date: Option<String>,

        /// Index of the first trade, counted back from the latest.
        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Number of trades to fetch, capped at 800 by the protocol.
        #[arg(long, default_value_t = 100)]
        offset: u32,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches the exchange listing, one exchange or both.
    #[clap(name = "stocks", about = "Fetch the exchange listing")]
    Stocks {
        /// Exchange to list: `sz` or `sh`. Lists both when omitted.
        #[arg(long, value_name = "MARKET", value_parser = parse_market)]
        market: Option<Market>,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches the fundamental snapshot for a security.
    #[clap(name = "finance", about = "Fetch the fundamental snapshot for a symbol")]
    Finance {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches dividend and split events for a security.
    #[clap(name = "xdxr", about = "Fetch dividend/split events for a symbol")]
    Xdxr {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Fetches company information (F10) sections.
    #[clap(name = "company", about = "Fetch company information (F10) sections")]
    Company {
        /// Security code, e.g. 600036.
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Fetch only the named section; all sections when omitted.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// List the section directory instead of fetching contents.
        #[arg(long)]
        list: bool,

        /// Server to query as IP:PORT; overrides the configured pool.
        #[arg(long, value_name = "ADDR")]
        server: Option<String>,

        /// Serve the frame from the cache without touching the network.
        #[arg(long)]
        offline: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Specifies a custom location for the cache file.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,

        /// The format for storing the cache: `json` or `bincode`. Defaults to `bincode`.
        #[arg(long, value_name = "FORMAT", default_value = "bincode", value_parser = parse_cache_encoding)]
        cache_encoding: CacheEncoding,
    },

    /// Probes the configured server pool and ranks it by latency.
    #[clap(name = "bestip", about = "Probe the server pool and rank it by latency")]
    Bestip {
        /// Pool to probe: `hq` (stocks) or `ex` (extended market).
        #[arg(value_name = "POOL", default_value = "hq", value_parser = parse_endpoint)]
        endpoint: Endpoint,

        /// Persist the fastest reachable server as the default.
        #[arg(long)]
        write: bool,

        /// The output format: `text`, `json`, or `bincode`. Defaults to `text`.
        #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,
    },

    /// Subcommands for generating shell completion scripts.
    #[clap(name = "completion", about = "Generate completion scripts", long_about = None)]
    Completion {
        /// The specific `CompletionSubcommand` (shell type) for which to generate the script.
        #[clap(subcommand)]
        subcommand: CompletionSubcommand,
    },

    /// Displays the current application configuration.
    ///
    /// This command prints the active configuration, which is a result of merging
    /// default settings, configuration file values, and command-line arguments.
    #[clap(name = "config", about = "Show Configuration", long_about = None)]
    Config,
}

/// Defines subcommands for shell completion script generation.
#[derive(Subcommand, PartialEq, Debug)]
enum CompletionSubcommand {
    /// Generates the autocompletion script for Bash.
    #[clap(about = "generate the autocompletion script for bash")]
    Bash,
    /// Generates the autocompletion script for Zsh.
    #[clap(about = "generate the autocompletion script for zsh")]
    Zsh,
    /// Generates the autocompletion script for Fish.
    #[clap(about = "generate the autocompletion script for fish")]
    Fish,
}

/// Parses command-line arguments, merges configurations, and executes the
/// appropriate command.
pub fn cli_match() -> Result<()> {
    // Parse the command line arguments
    let cli = Cli::parse();

    // Merge clap config file if the value is set
    AppConfig::merge_config(cli.config.as_deref())?;

    let app = Cli::command();
    let matches = app.get_matches();

    AppConfig::merge_args(matches)?;

    // Execute the subcommand
    match &cli.command {
        Commands::Quotes {
            symbols,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::quotes::run(
            symbols,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Bars {
            symbol,
            frequency,
            start,
            offset,
            index,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::bars::run(
            symbol,
            *frequency,
            *start,
            *offset,
            *index,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Minutes {
            symbol,
            date,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::minutes::run(
            symbol,
            date.as_deref(),
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Transaction {
            symbol,
            date,
            start,
            offset,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::transaction::run(
            symbol,
            date.as_deref(),
            *start,
            *offset,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Stocks {
            market,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::stocks::run(
            *market,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Finance {
            symbol,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::finance::run(
            symbol,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Xdxr {
            symbol,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::xdxr::run(
            symbol,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Company {
            symbol,
            name,
            list,
            server,
            offline,
            format,
            cache_file,
            cache_encoding,
        } => commands::company::run(
            symbol,
            name.as_deref(),
            *list,
            server.as_deref(),
            *offline,
            format,
            cache_file.as_deref(),
            *cache_encoding,
        )?,
        Commands::Bestip {
            endpoint,
            write,
            format,
        } => commands::bestip::run(*endpoint, *write, format)?,
        Commands::Completion { subcommand } => {
            let mut app = Cli::command();
            match subcommand {
                CompletionSubcommand::Bash => {
                    generate(Bash, &mut app, "mootdx", &mut std::io::stdout());
                }
                CompletionSubcommand::Zsh => {
                    generate(Zsh, &mut app, "mootdx", &mut std::io::stdout());
                }
                CompletionSubcommand::Fish => {
                    generate(Fish, &mut app, "mootdx", &mut std::io::stdout());
                }
            }
        }
        Commands::Config => commands::config::run()?,
    }

    Ok(())
}

/// Parses a string slice into an `OutputFormat` enum.
///
/// Used by `clap` as a value parser for arguments that specify an output
/// format (case-insensitive "text", "json", "bincode").
fn parse_output_format(s: &str) -> std::result::Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "bincode" => Ok(OutputFormat::Bincode),
        _ => Err(format!("Invalid output format: {}", s)),
    }
}

/// Parses a string slice into a `CacheEncoding` enum.
///
/// Used by `clap` as a value parser for arguments that specify a cache
/// encoding (case-insensitive "bincode", "json").
fn parse_cache_encoding(s: &str) -> std::result::Result<CacheEncoding, String> {
    match s.to_lowercase().as_str() {
        "bincode" => Ok(CacheEncoding::Bincode),
        "json" => Ok(CacheEncoding::Json),
        _ => Err(format!("Invalid cache encoding: {}", s)),
    }
}

/// Parses a bar frequency mnemonic or numeric protocol category.
fn parse_frequency(s: &str) -> std::result::Result<Frequency, String> {
    Frequency::parse(s).map_err(|e| e.to_string())
}

/// Parses an exchange name (`sz`, `sh`, `bj` or the wire id).
fn parse_market(s: &str) -> std::result::Result<Market, String> {
    s.parse()
}

/// Parses the pool selector for `bestip`.
fn parse_endpoint(s: &str) -> std::result::Result<Endpoint, String> {
    match s.to_lowercase().as_str() {
        "hq" | "std" => Ok(Endpoint::Hq),
        "ex" | "ext" => Ok(Endpoint::Ex),
        _ => Err(format!("Invalid pool: {}", s)),
    }
}
