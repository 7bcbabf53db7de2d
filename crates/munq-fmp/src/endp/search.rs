use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// The search endpoint never returns more than this many matches.
pub const SEARCH_LIMIT: usize = 9;

/// One hit from the ticker search, in the order the API ranked it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMatch {
    pub symbol: String,
    #[serde(default, deserialize_with = "de_nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "de_nullable")]
    pub stock_exchange: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl StockMatch {
    pub fn new(symbol: &str, name: &str, stock_exchange: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            stock_exchange: stock_exchange.to_string(),
            exchange_short_name: None,
            currency: None,
        }
    }
}

impl std::fmt::Display for StockMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.symbol, self.stock_exchange)
    }
}

// FMP sends `null` for names and exchanges of delisted securities
fn de_nullable<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// A query is blank when nothing but whitespace was typed; blank queries are
/// never sent.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// `GET {base}/search?query={q}&limit=9&apikey={key}`
pub fn url(config: &Config, query: &str) -> Result<Url> {
    let mut url = config.endpoint(&["search"])?;
    url.query_pairs_mut()
        .append_pair("query", query.trim())
        .append_pair("limit", &SEARCH_LIMIT.to_string())
        .append_pair("apikey", config.api_key());
    Ok(url)
}

/// Decodes a search body, keeping the API's ranking and at most
/// [`SEARCH_LIMIT`] entries.
pub fn parse(body: &[u8]) -> Result<Vec<StockMatch>> {
    let mut matches: Vec<StockMatch> = serde_json::from_slice(body)?;
    matches.truncate(SEARCH_LIMIT);
    Ok(matches)
}
