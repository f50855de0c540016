//! Remote feed transport.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::debug;

use crate::config::FeedConfig;

/// Characters left untouched when a sheet name is placed in a query string.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("feed is not configured (sheet id is missing or still the placeholder)")]
    NotConfigured,
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Where feed text comes from.
///
/// The run loop is single-threaded, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait FeedSource {
    /// Short label for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<String, TransportError>;
}

/// Expand the configured URL template. `None` when the feed is not configured.
pub fn feed_url(config: &FeedConfig) -> Option<String> {
    if !config.is_configured() {
        return None;
    }
    let sheet_name = utf8_percent_encode(&config.sheet_name, QUERY_COMPONENT).to_string();
    Some(
        config
            .url_template
            .replace("{sheet_id}", config.sheet_id.trim())
            .replace("{sheet_name}", &sheet_name),
    )
}

/// Fetches the published sheet over HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: Option<String>,
}

impl HttpFeedSource {
    pub fn new(config: &FeedConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            client,
            url: feed_url(config),
        })
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[async_trait(?Send)]
impl FeedSource for HttpFeedSource {
    fn describe(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => "unconfigured feed".to_string(),
        }
    }

    async fn fetch(&self) -> Result<String, TransportError> {
        let url = self.url.as_ref().ok_or(TransportError::NotConfigured)?;
        debug!(target: "shared_map::feed", url = %url, "feed.request");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body {
                url: url.clone(),
                source,
            })?;
        debug!(
            target: "shared_map::feed",
            url = %url,
            bytes = body.len(),
            "feed.response"
        );
        Ok(body)
    }
}
