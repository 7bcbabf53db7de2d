use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Percentage change of one symbol over several horizons.
///
/// Only the day-over-day figure is required; the API omits horizons a young
/// listing has not lived through yet.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceChange {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "1D")]
    pub one_day: f64,
    #[serde(rename = "5D", default)]
    pub five_day: Option<f64>,
    #[serde(rename = "1M", default)]
    pub one_month: Option<f64>,
    #[serde(rename = "3M", default)]
    pub three_month: Option<f64>,
    #[serde(rename = "6M", default)]
    pub six_month: Option<f64>,
    #[serde(default)]
    pub ytd: Option<f64>,
    #[serde(rename = "1Y", default)]
    pub one_year: Option<f64>,
    #[serde(rename = "3Y", default)]
    pub three_year: Option<f64>,
    #[serde(rename = "5Y", default)]
    pub five_year: Option<f64>,
    #[serde(rename = "10Y", default)]
    pub ten_year: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// `GET {base}/stock-price-change/{symbol}?apikey={key}`
pub fn url(config: &Config, symbol: &str) -> Result<Url> {
    let mut url = config.endpoint(&["stock-price-change", symbol.trim()])?;
    url.query_pairs_mut().append_pair("apikey", config.api_key());
    Ok(url)
}

/// Takes the first element of the response array.
pub fn parse(body: &[u8]) -> Result<PriceChange> {
    let changes: Vec<PriceChange> = serde_json::from_slice(body)?;
    changes
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedShape("price change response is an empty array".into()))
}

// -------------------------------------------------------------------------------------------------
// Presentation

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    /// Zero counts here, not as positive.
    NonPositive,
}

pub fn tone(change: f64) -> Tone {
    if change > 0.0 {
        Tone::Positive
    } else {
        Tone::NonPositive
    }
}

/// Signed, two decimals, percent suffix: `+0.57%`, `-1.23%`, `0.00%`.
pub fn format_change(change: f64) -> String {
    let sign = if change > 0.0 { "+" } else { "" };
    format!("{sign}{change:.2}%")
}
