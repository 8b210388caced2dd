use color_eyre::eyre::{self, WrapErr as _};
use reqwest::{Client, header::ACCEPT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{
    PriceQuote,
    source::{CatalogSource, IconEntry, SourceError},
};
use crate::config::Config;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";
const JSON: &str = "application/json";

/// [`CatalogSource`] backed by the two public HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    icons_url: String,
    prices_url: String,
}

impl HttpSource {
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .wrap_err("failed to build http client")?;

        Ok(Self {
            client,
            icons_url: config.icons_url.clone(),
            prices_url: config.prices_url.clone(),
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_json<T: DeserializeOwned>(&self, url: &str, accept: &str) -> Result<T, SourceError> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|source| SourceError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(|source| SourceError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(body.len = body.len(), "received response");

        decode(url, &body)
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpSource {
    async fn fetch_icons(&self) -> Result<Vec<IconEntry>, SourceError> {
        self.get_json(&self.icons_url, GITHUB_JSON).await
    }

    async fn fetch_prices(&self) -> Result<Vec<PriceQuote>, SourceError> {
        self.get_json(&self.prices_url, JSON).await
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, SourceError> {
    serde_json::from_slice(body).map_err(|source| SourceError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use chrono::{TimeZone as _, Utc};
    use rust_decimal::Decimal;

    use super::*;

    const ICONS_BODY: &str = r#"[
        {
            "name": "1INCH.svg",
            "path": "tokens/1INCH.svg",
            "sha": "a7a2a1e6c5a3b2f1",
            "size": 2541,
            "type": "file",
            "download_url": "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/1INCH.svg"
        },
        {
            "name": "legacy",
            "path": "tokens/legacy",
            "type": "dir",
            "download_url": null
        }
    ]"#;

    const PRICES_BODY: &str = r#"[
        {"currency":"BLUR","date":"2023-08-29T07:10:24.000Z","price":0.20811525423728813},
        {"currency":"bNEO","date":"2023-08-29T07:10:50.000Z","price":7.1282679}
    ]"#;

    #[test]
    fn decodes_icon_listing() {
        let icons: Vec<IconEntry> = decode("icons", ICONS_BODY.as_bytes()).unwrap();
        assert_eq!(icons.len(), 2);
        assert_eq!(
            icons[0],
            IconEntry::new(
                "1INCH.svg",
                "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/1INCH.svg"
            )
        );
        assert_eq!(icons[1].name, "legacy");
        assert_eq!(icons[1].download_url, None);
    }

    #[test]
    fn decodes_price_feed() {
        let quotes: Vec<PriceQuote> = decode("prices", PRICES_BODY.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].currency, "BLUR");
        assert_eq!(
            quotes[0].observed_at,
            Utc.with_ymd_and_hms(2023, 8, 29, 7, 10, 24).unwrap()
        );
        assert_eq!(
            quotes[1].price,
            Decimal::from_str("7.1282679").unwrap()
        );
    }

    #[test]
    fn malformed_body_is_not_a_transport_failure() {
        let err = decode::<Vec<PriceQuote>>("https://prices", b"<html>rate limited</html>")
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "failed to decode response from https://prices");
    }

    #[test]
    fn builds_from_config() {
        let source = HttpSource::from_config(&Config::default()).unwrap();
        assert_eq!(source.icons_url, crate::config::DEFAULT_ICONS_URL);
        assert_eq!(source.prices_url, crate::config::DEFAULT_PRICES_URL);
    }
}
