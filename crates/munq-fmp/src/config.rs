use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Environment variable holding the access key.
pub const API_KEY_VAR: &str = "FMP_API_KEY";
pub const BASE_URL_VAR: &str = "FMP_BASE_URL";
pub const USER_AGENT_VAR: &str = "USER_AGENT";

/// Connection settings for the Financial Modeling Prep API.
///
/// The access key is held as a [`SecretString`] and handed explicitly to every
/// URL builder; nothing in this crate reads it from the environment on its own.
/// ```rust
/// let config = munq_fmp::Config::new(munq_fmp::config::DEFAULT_BASE_URL, "XYZ")?;
/// let url = config.endpoint(&["search"])?;
/// # Ok::<(), munq_fmp::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    base_url: Url,
    api_key: SecretString,
    pub user_agent: String,
}

impl Config {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let api_key: String = api_key.into();
        if base_url.cannot_be_a_base() {
            return Err(Error::Validation(format!(
                "{base_url} cannot be used as an API base"
            )));
        }

        Ok(Self {
            base_url,
            api_key: SecretString::new(api_key.into_boxed_str()),
            user_agent: default_user_agent(),
        })
    }

    /// Reads `FMP_API_KEY`, `FMP_BASE_URL` and `USER_AGENT`.
    ///
    /// A missing key is not an error: requests go out unauthenticated and the
    /// API itself rejects them.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_VAR).unwrap_or_else(|_| {
            log::warn!("{API_KEY_VAR} is not set; requests will be sent without an access key");
            String::new()
        });
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(&base_url, api_key)?;
        if let Ok(user_agent) = env::var(USER_AGENT_VAR) {
            config = config.with_user_agent(user_agent);
        }
        log::debug!("API base set to {}", config.base_url());
        Ok(config)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded on
    /// its own, so a symbol such as `BRK/B` stays one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Validation(format!("{} cannot be used as an API base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn default_user_agent() -> String {
    format!("munq/{}", env!("CARGO_PKG_VERSION"))
}

/// Copy of `url` safe for logs: the `apikey` value is masked.
pub fn redact(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return masked.to_string();
    }
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
