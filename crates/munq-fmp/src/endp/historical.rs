use crate::config::{Config, DEFAULT_BASE_URL};
use crate::endp::search::StockMatch;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use url::Url;

const DATE_FORMAT: &str = "%Y-%m-%d";

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Granularity
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// The six historical series offered by FMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    OneMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    OneHour,
    /// End-of-day; served by `historical-price-full` inside a `{historical: [...]}` envelope.
    Eod,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::OneMin,
        Granularity::FiveMin,
        Granularity::FifteenMin,
        Granularity::ThirtyMin,
        Granularity::OneHour,
        Granularity::Eod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::OneMin => "1min",
            Granularity::FiveMin => "5min",
            Granularity::FifteenMin => "15min",
            Granularity::ThirtyMin => "30min",
            Granularity::OneHour => "1hour",
            Granularity::Eod => "eod",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::OneMin => "1 min data",
            Granularity::FiveMin => "5 min data",
            Granularity::FifteenMin => "15 min data",
            Granularity::ThirtyMin => "30 min data",
            Granularity::OneHour => "1 hour data",
            Granularity::Eod => "EOD data",
        }
    }

    fn path<'a>(&self, symbol: &'a str) -> Vec<&'a str> {
        match self {
            Granularity::Eod => vec!["historical-price-full", symbol],
            intraday => vec!["historical-chart", intraday.as_str(), symbol],
        }
    }

    /// The sentinel template for this series against the public API base,
    /// e.g. `.../historical-chart/1min/AAPL?from=2018-03-12&to=2019-03-12&apikey=YOUR_API_KEY`.
    pub fn template(&self) -> String {
        let path = match self {
            Granularity::Eod => format!("historical-price-full/{SENTINEL_SYMBOL}"),
            intraday => format!("historical-chart/{}/{SENTINEL_SYMBOL}", intraday.as_str()),
        };
        format!("{DEFAULT_BASE_URL}/{path}?{SENTINEL_FROM}&{SENTINEL_TO}&apikey={SENTINEL_API_KEY}")
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1min" | "1m" => Ok(Granularity::OneMin),
            "5min" | "5m" => Ok(Granularity::FiveMin),
            "15min" | "15m" => Ok(Granularity::FifteenMin),
            "30min" | "30m" => Ok(Granularity::ThirtyMin),
            "1hour" | "1h" => Ok(Granularity::OneHour),
            "eod" | "1d" | "daily" => Ok(Granularity::Eod),
            other => Err(Error::Validation(format!(
                "unknown granularity `{other}`; expected one of 1min, 5min, 15min, 30min, 1hour, eod"
            ))),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Date range
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Inclusive `from..=to` window; `from` may equal `to` but never exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::Validation(format!(
                "date range is inverted: {from} is after {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Parses two `YYYY-MM-DD` bounds.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::Validation(format!("`{s}` is not a YYYY-MM-DD date: {e}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Requests
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// A fully specified historical request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRequest {
    pub granularity: Granularity,
    pub symbol: String,
    pub range: DateRange,
}

impl HistoricalRequest {
    pub fn new(granularity: Granularity, symbol: &str, range: DateRange) -> Self {
        Self {
            granularity,
            symbol: symbol.trim().to_string(),
            range,
        }
    }

    /// `GET {base}/historical-chart/{g}/{symbol}?from&to&apikey` for intraday series,
    /// `GET {base}/historical-price-full/{symbol}?from&to&apikey` for EOD.
    pub fn url(&self, config: &Config) -> Result<Url> {
        let mut url = config.endpoint(&self.granularity.path(&self.symbol))?;
        url.query_pairs_mut()
            .append_pair("from", &format_date(self.range.from))
            .append_pair("to", &format_date(self.range.to))
            .append_pair("apikey", config.api_key());
        Ok(url)
    }
}

/// What the user has picked so far. Any field may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub granularity: Option<Granularity>,
    pub stock: Option<StockMatch>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Selection {
    /// `Ok(None)` while the selection is incomplete, so nothing is sent;
    /// an error only when every field is present but the range is inverted.
    pub fn request(&self) -> Result<Option<HistoricalRequest>> {
        let (Some(granularity), Some(stock), Some(from), Some(to)) =
            (self.granularity, self.stock.as_ref(), self.from, self.to)
        else {
            log::debug!("selection incomplete: {self:?}");
            return Ok(None);
        };
        let range = DateRange::new(from, to)?;
        Ok(Some(HistoricalRequest::new(granularity, &stock.symbol, range)))
    }
}

// -------------------------------------------------------------------------------------------------
// Sentinel templates

pub const SENTINEL_SYMBOL: &str = "AAPL";
pub const SENTINEL_FROM: &str = "from=2018-03-12";
pub const SENTINEL_TO: &str = "to=2019-03-12";
pub const SENTINEL_API_KEY: &str = "YOUR_API_KEY";

/// Resolves a sentinel template by plain text substitution.
///
/// Only the first occurrence of each sentinel is replaced and every other
/// character is left untouched, which is why [`HistoricalRequest::url`] is the
/// preferred path: a template whose host or path happens to contain `AAPL`
/// resolves wrongly here.
pub fn resolve_template(template: &str, symbol: &str, range: &DateRange, api_key: &str) -> String {
    template
        .replacen(SENTINEL_SYMBOL, symbol, 1)
        .replacen(SENTINEL_FROM, &format!("from={}", format_date(range.from)), 1)
        .replacen(SENTINEL_TO, &format!("to={}", format_date(range.to)), 1)
        .replacen(SENTINEL_API_KEY, api_key, 1)
}
