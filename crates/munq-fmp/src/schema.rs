use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream record, keys kept in the order the API sent them.
pub type Row = Map<String, Value>;

/// Every shape the historical endpoints are known to answer with.
///
/// Intraday series arrive as a bare array, EOD series inside a
/// `{"symbol": ..., "historical": [...]}` envelope, and failures as either a
/// string or an object such as `{"Error Message": "..."}`.
/// ```rust
/// use munq_fmp::schema::ApiResponse;
///
/// let bare: ApiResponse = serde_json::from_str(r#"[{"date": "2021-01-04", "close": 729.77}]"#)?;
/// assert!(matches!(bare, ApiResponse::Series(_)));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ApiResponse {
    Series(Vec<Row>),
    Envelope(Envelope),
    Message(String),
    Unrecognized(Value),
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical: Option<Vec<Row>>,
    #[serde(flatten)]
    pub other: Row,
}

impl ApiResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Rows of a recognised shape.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            ApiResponse::Series(rows) => Some(rows),
            ApiResponse::Envelope(Envelope {
                historical: Some(rows),
                ..
            }) => Some(rows),
            _ => None,
        }
    }

    /// The API's own complaint, when it sent one instead of data.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ApiResponse::Message(message) => Some(message),
            ApiResponse::Envelope(envelope) if envelope.historical.is_none() => envelope
                .other
                .get("Error Message")
                .and_then(Value::as_str),
            ApiResponse::Unrecognized(value) => value.get("Error Message").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<Value> for ApiResponse {
    fn from(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(ApiResponse::Unrecognized(value))
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Normalization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Order of the normalised rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowOrder {
    /// Oldest first. Rows are stably sorted on their `date` string when every
    /// row has one; otherwise the newest-first upstream order is reversed.
    #[default]
    Chronological,
    AsReceived,
}

/// Rows in output order plus the column names of the first of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Typed view of the rows; fails on the first row missing an OHLCV field.
    pub fn points(&self) -> Result<Vec<HistoricalDataPoint>> {
        self.rows.iter().map(HistoricalDataPoint::try_from).collect()
    }
}

/// Flattens either recognised shape into a [`Table`].
///
/// Strings, nulls, error objects and envelopes without a `historical` array
/// are rejected, so callers never export a half-understood payload.
pub fn normalize(response: &ApiResponse, order: RowOrder) -> Result<Table> {
    let Some(rows) = response.rows() else {
        let reason = match response.error_message() {
            Some(message) => format!("API answered with an error: {message}"),
            None => format!("expected an array or a `historical` array, got {}", kind(response)),
        };
        return Err(Error::UnexpectedShape(reason));
    };

    let rows = match order {
        RowOrder::Chronological => chronological(rows.to_vec()),
        RowOrder::AsReceived => rows.to_vec(),
    };

    // header follows the first row of the output, not of the payload
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    log::debug!("normalized {} rows, columns: {columns:?}", rows.len());

    Ok(Table { columns, rows })
}

fn chronological(mut rows: Vec<Row>) -> Vec<Row> {
    let dated = rows
        .iter()
        .all(|row| row.get("date").is_some_and(Value::is_string));
    if dated {
        rows.sort_by(|a, b| date_of(a).cmp(date_of(b)));
    } else {
        rows.reverse();
    }
    rows
}

fn date_of(row: &Row) -> &str {
    row.get("date").and_then(Value::as_str).unwrap_or_default()
}

fn kind(response: &ApiResponse) -> &'static str {
    match response {
        ApiResponse::Series(_) => "an array",
        ApiResponse::Envelope(_) => "an object without `historical`",
        ApiResponse::Message(_) => "a string",
        ApiResponse::Unrecognized(Value::Null) => "null",
        ApiResponse::Unrecognized(_) => "an unrecognised value",
    }
}

// -------------------------------------------------------------------------------------------------

/// One OHLCV bar as served by both the intraday and the EOD series.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HistoricalDataPoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl TryFrom<&Row> for HistoricalDataPoint {
    type Error = Error;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(row.clone()))?)
    }
}
