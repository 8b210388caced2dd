use reqwest::StatusCode;
use serde::Deserialize;

use super::PriceQuote;

/// One entry of the icon directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconEntry {
    pub name: String,
    /// Missing for sub-directories in the listing
    #[serde(default)]
    pub download_url: Option<String>,
}

impl IconEntry {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: Some(download_url.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Network failures and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

/// Where the catalog loader gets its raw data from.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource {
    /// Fetch the full icon directory listing, unfiltered.
    async fn fetch_icons(&self) -> Result<Vec<IconEntry>, SourceError>;

    /// Fetch every price quote the feed has, in feed order.
    async fn fetch_prices(&self) -> Result<Vec<PriceQuote>, SourceError>;
}
