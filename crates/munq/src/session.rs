use log::{debug, error, warn};
use munq_fmp::endp::historical::{HistoricalRequest, Selection};
use munq_fmp::endp::search::{self, StockMatch};
use munq_fmp::export::csv_text;
use munq_fmp::prelude::{Client, Config, Fmp};
use munq_fmp::schema::{normalize, ApiResponse, RowOrder, Table};
use std::future::Future;
use std::path::{Path, PathBuf};

pub const SEARCH_FAILED: &str = "Failed to fetch data. Please try again.";

// Requests are not cancelled. `run_search` and `run_fetch` borrow their state
// mutably across the await, so one request per state is in flight at a time.

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Search
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<StockMatch>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    /// `false` for a blank query: nothing is sent and nothing changes.
    pub fn begin(&mut self) -> bool {
        if search::is_blank(&self.query) {
            debug!("blank search query; nothing sent");
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    /// Applies an outcome; a failure only sets the error, previous results stay.
    pub fn finish(&mut self, outcome: munq_fmp::Result<Vec<StockMatch>>) {
        self.loading = false;
        match outcome {
            Ok(results) => self.results = results,
            Err(e) => {
                error!("Failed to fetch search results: {e}");
                self.error = Some(SEARCH_FAILED.to_string());
            }
        }
    }

    /// Picks one result; the result list and the query are cleared.
    pub fn select(&mut self, index: usize) -> Option<StockMatch> {
        let stock = self.results.get(index).cloned()?;
        self.results.clear();
        self.query.clear();
        Some(stock)
    }
}

/// Returns whether a request was sent.
pub async fn run_search<F, Fut>(state: &mut SearchState, fetch: F) -> bool
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = munq_fmp::Result<Vec<StockMatch>>>,
{
    if !state.begin() {
        return false;
    }
    let outcome = fetch(state.query.clone()).await;
    state.finish(outcome);
    true
}

/// One search against the API; any failure ends up in `error`, never as `Err`.
pub async fn search_stocks(client: &Client, config: &Config, query: &str) -> SearchState {
    let mut state = SearchState {
        query: query.to_string(),
        ..Default::default()
    };
    run_search(&mut state, |query| async move { client.search(config, &query).await }).await;
    state
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Historical data
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// What the result area currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum View {
    #[default]
    Empty,
    Data(ApiResponse),
    Error(String),
}

#[derive(Debug, Default)]
pub struct FetchState {
    pub selection: Selection,
    pub view: View,
}

impl FetchState {
    pub fn begin(&mut self) -> Option<HistoricalRequest> {
        match self.selection.request() {
            Ok(Some(request)) => Some(request),
            Ok(None) => {
                warn!("pick a stock, a data type and both dates first");
                None
            }
            Err(e) => {
                self.view = View::Error(format!("Error: {e}"));
                None
            }
        }
    }

    pub fn finish(&mut self, outcome: munq_fmp::Result<ApiResponse>) {
        self.view = match outcome {
            Ok(response) => View::Data(response),
            Err(e) => {
                error!("Error fetching data: {e}");
                View::Error(format!("Error: {e}"))
            }
        };
    }

    pub fn response(&self) -> Option<&ApiResponse> {
        match &self.view {
            View::Data(response) => Some(response),
            _ => None,
        }
    }
}

/// Returns whether a request was sent.
pub async fn run_fetch<F, Fut>(state: &mut FetchState, fetch: F) -> bool
where
    F: FnOnce(HistoricalRequest) -> Fut,
    Fut: Future<Output = munq_fmp::Result<ApiResponse>>,
{
    let Some(request) = state.begin() else {
        return false;
    };
    let outcome = fetch(request).await;
    state.finish(outcome);
    true
}

/// Pretty JSON for data, the message for errors.
pub fn render(view: &View) -> String {
    match view {
        View::Empty => String::new(),
        View::Data(response) => serde_json::to_string_pretty(response)
            .unwrap_or_else(|e| format!("Error: response could not be displayed: {e}")),
        View::Error(message) => message.clone(),
    }
}

pub fn summary(table: &Table) -> String {
    if table.is_empty() {
        return "no rows".to_string();
    }
    match table.points() {
        Ok(points) => {
            let (Some(first), Some(last)) = (points.first(), points.last()) else {
                return "no rows".to_string();
            };
            let low = points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
            let high = points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
            format!(
                "{} rows from {} to {}; low {low:.2}, high {high:.2}, last close {:.2}",
                points.len(),
                first.date,
                last.date,
                last.close
            )
        }
        Err(_) => format!("{} rows, columns: {}", table.len(), table.columns().join(", ")),
    }
}

// -------------------------------------------------------------------------------------------------

/// Normalizes `response` and saves it as CSV at `path`.
///
/// `Ok(None)` when there is nothing to export (unrecognised payload or no
/// rows); no file is touched in that case.
pub async fn download_csv(response: &ApiResponse, path: &Path) -> anyhow::Result<Option<PathBuf>> {
    let table = match normalize(response, RowOrder::Chronological) {
        Ok(table) => table,
        Err(e) => {
            error!("Unexpected API response format: {e}");
            return Ok(None);
        }
    };
    let Some(text) = csv_text(&table)? else {
        warn!("response holds no rows; nothing exported");
        return Ok(None);
    };
    let saved = munq_common::save(path, text.as_bytes()).await?;
    Ok(Some(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use munq_fmp::endp::historical::Granularity;
    use serde_json::json;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn tesla() -> StockMatch {
        StockMatch::new("TSLA", "Tesla, Inc.", "NASDAQ Global Select")
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn complete_selection() -> Selection {
        Selection {
            granularity: Some(Granularity::Eod),
            stock: Some(tesla()),
            from: Some(ymd(2021, 1, 1)),
            to: Some(ymd(2021, 1, 5)),
        }
    }

    #[tokio::test]
    async fn blank_query_sends_nothing() {
        let calls = Cell::new(0);
        let mut state = SearchState {
            query: "   ".into(),
            ..Default::default()
        };

        let sent = run_search(&mut state, |_| {
            calls.set(calls.get() + 1);
            async { Ok(vec![tesla()]) }
        })
        .await;

        assert!(!sent);
        assert_eq!(calls.get(), 0);
        assert!(state.results.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn query_sends_exactly_one_request() {
        let calls = Cell::new(0);
        let mut state = SearchState {
            query: "tesla".into(),
            ..Default::default()
        };

        run_search(&mut state, |query| {
            calls.set(calls.get() + 1);
            assert_eq!(query, "tesla");
            async { Ok(vec![tesla()]) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert_eq!(state.results, [tesla()]);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failure_only_sets_the_error() {
        let mut state = SearchState {
            query: "tesla".into(),
            results: vec![tesla()],
            ..Default::default()
        };

        run_search(&mut state, |_| async {
            Err(munq_fmp::Error::Api("Limit Reach".into()))
        })
        .await;

        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED));
        assert_eq!(state.results, [tesla()]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn unreachable_api_yields_the_fixed_message() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = Config::new(&format!("http://127.0.0.1:{port}/api/v3"), "XYZ").unwrap();
        let client = Client::builder().no_proxy().build().unwrap();

        let state = search_stocks(&client, &config, "tesla").await;

        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED));
        assert!(state.results.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn blank_search_leaves_a_clean_state() {
        let config = Config::new("http://127.0.0.1:9/api/v3", "XYZ").unwrap();
        let state = search_stocks(&Client::new(), &config, "  ").await;
        assert_eq!(state.error, None);
        assert!(state.results.is_empty());
    }

    #[test]
    fn selecting_clears_results_and_query() {
        let mut state = SearchState {
            query: "tesla".into(),
            results: vec![tesla(), StockMatch::new("TL0.DE", "Tesla, Inc.", "XETRA")],
            ..Default::default()
        };
        assert_eq!(state.select(5), None);
        assert_eq!(state.select(1).unwrap().symbol, "TL0.DE");
        assert!(state.results.is_empty());
        assert!(state.query.is_empty());
    }

    #[tokio::test]
    async fn incomplete_selection_is_a_no_op() {
        let calls = Cell::new(0);
        let mut state = FetchState::default();
        state.selection.stock = Some(tesla());

        let sent = run_fetch(&mut state, |_| {
            calls.set(calls.get() + 1);
            async { Ok(ApiResponse::Series(vec![])) }
        })
        .await;

        assert!(!sent);
        assert_eq!(calls.get(), 0);
        assert_eq!(state.view, View::Empty);
    }

    #[tokio::test]
    async fn inverted_range_shows_an_error_without_a_request() {
        let calls = Cell::new(0);
        let mut state = FetchState {
            selection: Selection {
                from: Some(ymd(2021, 2, 1)),
                ..complete_selection()
            },
            ..Default::default()
        };

        run_fetch(&mut state, |_| {
            calls.set(calls.get() + 1);
            async { Ok(ApiResponse::Series(vec![])) }
        })
        .await;

        assert_eq!(calls.get(), 0);
        assert!(matches!(&state.view, View::Error(m) if m.starts_with("Error: ")));
    }

    #[tokio::test]
    async fn failed_fetch_replaces_the_view_with_the_message() {
        let mut state = FetchState {
            selection: complete_selection(),
            view: View::Data(ApiResponse::Series(vec![])),
            ..Default::default()
        };

        run_fetch(&mut state, |request| {
            assert_eq!(request.symbol, "TSLA");
            async { Err(munq_fmp::Error::Api("Invalid API KEY.".into())) }
        })
        .await;

        assert_eq!(state.view, View::Error("Error: Invalid API KEY.".into()));
        assert_eq!(state.response(), None);
        assert_eq!(render(&state.view), "Error: Invalid API KEY.");
    }

    #[tokio::test]
    async fn successful_fetch_is_rendered_as_json() {
        let mut state = FetchState {
            selection: complete_selection(),
            ..Default::default()
        };
        let payload = json!({"symbol": "TSLA", "historical": [{"date": "2021-01-04", "close": 729.77}]});

        run_fetch(&mut state, |_| async move { Ok(ApiResponse::from(payload)) }).await;

        let rendered = render(&state.view);
        assert!(rendered.contains("\"historical\""));
        assert!(rendered.contains("729.77"));
        assert!(state.response().is_some());
    }

    #[tokio::test]
    async fn unrecognised_response_exports_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stock_data.csv");

        for response in [
            ApiResponse::from(json!("Error: Network Error")),
            ApiResponse::from(json!({"Error Message": "Invalid API KEY."})),
            ApiResponse::from(json!([])),
        ] {
            assert_eq!(download_csv(&response, &path).await.unwrap(), None);
            assert!(!path.exists());
        }
    }

    #[tokio::test]
    async fn series_is_exported_oldest_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stock_data.csv");
        let response = ApiResponse::from(json!([
            {"date": "2021-01-05", "close": 735.11},
            {"date": "2021-01-04", "close": 729.77}
        ]));

        let saved = download_csv(&response, &path).await.unwrap();

        assert_eq!(saved.as_deref(), Some(path.as_path()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "date,close\n2021-01-04,729.77\n2021-01-05,735.11"
        );
    }

    #[test]
    fn summary_of_ohlcv_rows() {
        let response = ApiResponse::from(json!([
            {"date": "2021-01-05", "open": 723.66, "high": 740.84, "low": 719.2, "close": 735.11, "volume": 32245200},
            {"date": "2021-01-04", "open": 719.46, "high": 744.49, "low": 717.19, "close": 729.77, "volume": 48638200}
        ]));
        let table = normalize(&response, RowOrder::Chronological).unwrap();
        assert_eq!(
            summary(&table),
            "2 rows from 2021-01-04 to 2021-01-05; low 717.19, high 744.49, last close 735.11"
        );
    }

    #[test]
    fn summary_of_other_rows_lists_columns() {
        let table = normalize(&ApiResponse::from(json!([{"date": "2021-01-04", "eps": 1.2}])), RowOrder::AsReceived)
            .unwrap();
        assert_eq!(summary(&table), "1 rows, columns: date, eps");
    }
}
