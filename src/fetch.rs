use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::records::ErrorKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{status} - {reason}")]
    Transport { status: u16, reason: String },
    #[error("{0}")]
    Network(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } => ErrorKind::Transport,
            FetchError::Network(_) => ErrorKind::Network,
        }
    }
}

/// Anything that can hand back the raw page for a given day.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError>;

    /// Where the page for `date` lives, for log context.
    fn locate(&self, date: NaiveDate) -> String;
}

pub fn page_url(base_url: &str, date: NaiveDate) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{}/{}", base, date.format("%Y/%m/%d"))
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError> {
        let url = self.locate(date);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    fn locate(&self, date: NaiveDate) -> String {
        page_url(&self.base_url, date)
    }
}
