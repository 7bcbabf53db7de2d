use crate::config::{redact, Config};
use crate::endp::historical::HistoricalRequest;
use crate::endp::search::{self, StockMatch};
use crate::endp::price_change::{self, PriceChange};
use crate::error::{Error, Result};
use crate::schema::ApiResponse;
use log::{debug, error, trace};
use reqwest::Client;
use std::future::Future;
use url::Url;

/// Financial Modeling Prep calls, as add-on methods for [`reqwest::Client`].
///
/// Every method issues at most one request; there is no retry and no timeout
/// beyond whatever the client was built with.
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
pub trait ClientFmpExt {
    /// Up to nine matches for `query`, in the API's ranking. A blank query
    /// returns an empty list without touching the network.
    fn search(
        &self,
        config: &Config,
        query: &str,
    ) -> impl Future<Output = Result<Vec<StockMatch>>> + Send;

    /// The raw historical payload; shape detection is left to
    /// [`normalize`](crate::schema::normalize).
    fn historical(
        &self,
        config: &Config,
        request: &HistoricalRequest,
    ) -> impl Future<Output = Result<ApiResponse>> + Send;

    fn price_change(
        &self,
        config: &Config,
        symbol: &str,
    ) -> impl Future<Output = Result<PriceChange>> + Send;

    /// GET `url` and hand back the body of a successful response.
    fn fetch_body(&self, url: Url) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

impl ClientFmpExt for Client {
    async fn search(&self, config: &Config, query: &str) -> Result<Vec<StockMatch>> {
        if search::is_blank(query) {
            debug!("blank search query; nothing sent");
            return Ok(Vec::new());
        }

        let body = self.fetch_body(search::url(config, query)?).await?;
        let matches = search::parse(&body).map_err(|e| {
            error!("failed deserializing search results for `{query}`: {e}");
            e
        })?;
        debug!("search `{query}` returned {} matches", matches.len());
        Ok(matches)
    }

    async fn historical(&self, config: &Config, request: &HistoricalRequest) -> Result<ApiResponse> {
        let time = std::time::Instant::now();
        let body = self.fetch_body(request.url(config)?).await?;
        let response = ApiResponse::from_slice(&body).map_err(|e| {
            error!(
                "[{}] {} response is not JSON: {e}",
                request.symbol, request.granularity
            );
            e
        })?;
        debug!(
            "[{}] {} data fetched. Elapsed time: {} ms",
            request.symbol,
            request.granularity,
            time.elapsed().as_millis()
        );
        Ok(response)
    }

    async fn price_change(&self, config: &Config, symbol: &str) -> Result<PriceChange> {
        let body = self.fetch_body(price_change::url(config, symbol)?).await?;
        price_change::parse(&body).map_err(|e| {
            error!("[{symbol}] price change unreadable: {e}");
            e
        })
    }

    async fn fetch_body(&self, url: Url) -> Result<Vec<u8>> {
        let endpoint = redact(&url);
        trace!("GET {endpoint}");

        let response = self.get(url).send().await.map_err(|e| {
            error!("failed fetching response from {endpoint}: {e}");
            Error::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("failed reading response body from {endpoint}: {e}");
            Error::from(e)
        })?;

        if !status.is_success() {
            error!("{status} returned from {endpoint}");
            return Err(status_error(status, endpoint, &body));
        }
        Ok(body.to_vec())
    }
}

// FMP explains rejected keys and exhausted quotas in an `Error Message` field
fn status_error(status: reqwest::StatusCode, endpoint: String, body: &[u8]) -> Error {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("Error Message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .map(Error::Api)
        .unwrap_or(Error::Http { endpoint, status })
}
