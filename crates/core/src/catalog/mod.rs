//! Token catalog: icon listing joined with the latest price per currency.
//!
//! Loading is all-or-nothing. The icon listing is fetched first, then the price
//! feed; if either fails the loader yields an empty [`Catalog`] and logs why.
use std::{
    cmp::Ordering,
    collections::{HashMap, hash_map::Entry},
    fmt::Display,
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

pub use http::HttpSource;
pub use source::{CatalogSource, IconEntry, SourceError};
pub use store::{CatalogStore, LoadHandle};

mod http;
mod source;
mod store;

/// A selectable token. Equality is by name, ignoring ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    name: String,
    icon_url: String,
    price: Option<Decimal>,
}

impl Token {
    pub fn new(name: impl Into<String>, icon_url: impl Into<String>, price: Option<Decimal>) -> Self {
        Self {
            name: name.into(),
            icon_url: icon_url.into(),
            price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon_url(&self) -> &str {
        &self.icon_url
    }

    /// USD price, `None` if no quote was resolved for this token.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn display_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Placeholder image showing the first letter of the name.
    pub fn fallback_icon_url(&self) -> String {
        let initial = self.name.chars().next().map(String::from).unwrap_or_default();
        format!("https://placehold.co/24x24?text={initial}")
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Token {}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single price observation as published by the price feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub currency: String,
    #[serde(rename = "date")]
    pub observed_at: DateTime<Utc>,
    pub price: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load token icons")]
    Icons(#[source] SourceError),

    #[error("failed to load token prices")]
    Prices(#[source] SourceError),
}

impl LoadError {
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Icons(e) | Self::Prices(e) => e.is_transport(),
        }
    }
}

/// Priced tokens, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tokens: Vec<Token>,
}

impl Catalog {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Keeps the most recent positive quote per currency.
///
/// On equal timestamps the quote appearing later in `quotes` wins.
pub fn resolve_latest_quotes(
    quotes: impl IntoIterator<Item = PriceQuote>,
) -> HashMap<String, PriceQuote> {
    let mut latest: HashMap<String, PriceQuote> = HashMap::new();

    for quote in quotes {
        if quote.price <= Decimal::ZERO {
            debug!(quote.currency = %quote.currency, quote.price = %quote.price, "skipping non-positive quote");
            continue;
        }

        match latest.entry(quote.currency.clone()) {
            Entry::Occupied(mut entry) => {
                if quote.observed_at >= entry.get().observed_at {
                    entry.insert(quote);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(quote);
            }
        }
    }

    latest
}

/// Joins icon candidates with resolved quotes and drops everything unpriced.
pub fn build_catalog(icons: Vec<IconEntry>, quotes: Vec<PriceQuote>, icon_suffix: &str) -> Catalog {
    let latest = resolve_latest_quotes(quotes);

    let mut tokens: Vec<Token> = icons
        .into_iter()
        .filter_map(|IconEntry { name, download_url }| {
            let symbol = name.strip_suffix(icon_suffix)?;
            let Some(icon_url) = download_url else {
                debug!(icon.name = %name, "skipping icon without download url");
                return None;
            };
            let Some(quote) = latest.get(symbol) else {
                debug!(token.name = %symbol, "no price for token, excluding");
                return None;
            };
            Some(Token::new(symbol, icon_url, Some(quote.price)))
        })
        .collect();

    tokens.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    tokens.dedup();

    Catalog { tokens }
}

/// Case-insensitive ordering; lower case sorts before upper case when names
/// differ only in case.
///
/// Matches `localeCompare` for alphanumeric names only. Punctuation such as
/// `-`, `.` and `_` falls back to code point order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b).then_with(|| b.cmp(a))
}

pub struct CatalogLoader<S> {
    source: S,
    icon_suffix: String,
}

impl<S: CatalogSource> CatalogLoader<S> {
    pub fn new(source: S, icon_suffix: impl Into<String>) -> Self {
        Self {
            source,
            icon_suffix: icon_suffix.into(),
        }
    }

    /// Fetches icons, then prices, and merges them.
    ///
    /// # Errors
    /// Returns which of the two fetches failed; nothing partial is returned.
    #[instrument(name = "catalog_load", skip(self))]
    pub async fn try_load(&self) -> Result<Catalog, LoadError> {
        let icons = self.source.fetch_icons().await.map_err(LoadError::Icons)?;
        debug!(icons.len = icons.len(), "fetched icon listing");

        let quotes = self.source.fetch_prices().await.map_err(LoadError::Prices)?;
        debug!(quotes.len = quotes.len(), "fetched price feed");

        let catalog = build_catalog(icons, quotes, &self.icon_suffix);
        info!(catalog.len = catalog.len(), "🪙 Loaded token catalog");

        Ok(catalog)
    }

    /// Like [`Self::try_load`], but failures are logged and collapse to an
    /// empty catalog.
    pub async fn load(&self) -> Catalog {
        match self.try_load().await {
            Ok(catalog) => catalog,
            Err(e) if e.is_transport() => {
                error!(error = %e, cause = %source_chain(&e), "transport error while loading catalog");
                Catalog::default()
            }
            Err(e) => {
                error!(error = %e, cause = %source_chain(&e), "error while loading catalog");
                Catalog::default()
            }
        }
    }

    /// Loads and publishes into `store`, unless `attempt` was cancelled while
    /// loading. Returns whether the catalog was committed.
    pub async fn load_into(&self, store: &CatalogStore, attempt: &CancellationToken) -> bool {
        let catalog = self.load().await;
        store.commit(catalog, attempt)
    }
}

fn source_chain(e: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut curr = e.source();
    while let Some(cause) = curr {
        causes.push(cause.to_string());
        curr = cause.source();
    }
    causes.join(": ")
}
