use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use munq_fmp::endp::historical::Granularity;
use munq_fmp::export::DEFAULT_FILE_NAME;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of logging (overridden by RUST_LOG)
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info, global = true)]
    pub log: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for a ticker by symbol or company name.
    Search {
        query: Vec<String>,
    },

    /// Fetch a historical series and export it as CSV.
    Fetch(FetchArgs),

    /// Day-over-day price change cards.
    Changes {
        /// Tickers to show; defaults to the landing-page set.
        tickers: Vec<String>,
    },

    /// Interactive session: search, select, pick a range, download.
    Browse {
        /// Where downloads are written.
        #[arg(long, default_value = DEFAULT_FILE_NAME)]
        out: PathBuf,
    },

    /// List the available granularities and their URL templates.
    Templates,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Ticker symbol, e.g. TSLA.
    #[arg(long, short)]
    pub symbol: String,

    /// One of 1min, 5min, 15min, 30min, 1hour, eod.
    #[arg(long, short, default_value = "eod")]
    pub granularity: Granularity,

    /// First day, YYYY-MM-DD.
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day, YYYY-MM-DD.
    #[arg(long)]
    pub to: NaiveDate,

    /// Where the CSV is written.
    #[arg(long, short, default_value = DEFAULT_FILE_NAME)]
    pub out: PathBuf,

    /// Print the raw response as well.
    #[arg(long)]
    pub show: bool,

    /// Skip the CSV export.
    #[arg(long)]
    pub no_export: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
