//! Client for the Financial Modeling Prep API: ticker search, historical
//! series, day-over-day price change, and the CSV export of historical data.
//!
//! ```rust,no_run
//! use munq_fmp::prelude::*;
//! use munq_fmp::endp::historical::{DateRange, Granularity, HistoricalRequest};
//! use munq_fmp::schema::{normalize, RowOrder};
//!
//! # async fn run() -> munq_fmp::Result<()> {
//! let config = Config::from_env()?;
//! let client = build_client(&config)?;
//!
//! let range = DateRange::parse("2021-01-01", "2021-01-05")?;
//! let request = HistoricalRequest::new(Granularity::Eod, "TSLA", range);
//! let response = client.historical(&config, &request).await?;
//! let table = normalize(&response, RowOrder::Chronological)?;
//! # Ok(())
//! # }
//! ```
pub mod client_ext;
pub mod config;
pub mod endp;
pub mod error;
pub mod export;
pub mod schema;

pub use config::Config;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::client_ext::fmp::ClientFmpExt as Fmp;
    #[allow(unused_imports)]
    pub use reqwest::Client;

    pub use crate::{Config, Error, Result};

    pub fn build_client(config: &Config) -> Result<Client> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(client)
    }
}
