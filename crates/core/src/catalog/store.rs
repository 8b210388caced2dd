use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};

use color_eyre::eyre::{self, WrapErr as _};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Catalog, CatalogLoader, CatalogSource};

/// Shared, single-writer view of the current catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    tx: Arc<watch::Sender<Arc<Catalog>>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(Arc::new(Catalog::default()))),
        }
    }

    pub fn current(&self) -> Arc<Catalog> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Catalog>> {
        self.tx.subscribe()
    }

    /// Yields every catalog committed after this call.
    pub fn updates(&self) -> WatchStream<Arc<Catalog>> {
        WatchStream::from_changes(self.tx.subscribe())
    }

    /// Publishes `catalog` unless `attempt` has been cancelled.
    pub fn commit(&self, catalog: Catalog, attempt: &CancellationToken) -> bool {
        if attempt.is_cancelled() {
            debug!(catalog.len = catalog.len(), "load attempt cancelled, discarding catalog");
            return false;
        }
        info!(catalog.len = catalog.len(), "committing catalog");
        self.tx.send_replace(Arc::new(catalog));
        true
    }
}

/// A single catalog load attempt running in the background.
///
/// Dropping the handle, or calling [`LoadHandle::cancel`], invalidates the
/// attempt: the fetches still run to completion but their result is never
/// committed. Awaiting the handle yields whether the catalog was committed.
pub struct LoadHandle {
    attempt: CancellationToken,
    task: Option<JoinHandle<bool>>,
}

impl LoadHandle {
    pub fn spawn<S>(
        loader: Arc<CatalogLoader<S>>,
        store: CatalogStore,
        attempt: CancellationToken,
    ) -> Self
    where
        S: CatalogSource + Send + Sync + 'static,
    {
        let task_attempt = attempt.clone();
        let task = tokio::spawn(async move { loader.load_into(&store, &task_attempt).await });

        Self {
            attempt,
            task: Some(task),
        }
    }

    pub fn cancel(&self) {
        self.attempt.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.attempt.is_cancelled()
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.attempt.cancel();
    }
}

// Awaiting the handle deals with the load task's result
impl Future for LoadHandle {
    type Output = eyre::Result<bool>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        use futures::future::FutureExt as _;

        let Some(task) = self.task.as_mut() else {
            return Poll::Ready(Err(eyre::eyre!("catalog load already completed")));
        };

        let result = ready!(task.poll_unpin(cx));
        self.task = None;
        Poll::Ready(result.wrap_err("catalog load task panicked"))
    }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt as _, StreamExt as _};

    use super::*;
    use crate::catalog::{
        IconEntry, PriceQuote, Token,
        source::MockCatalogSource,
        tests::{dec, init_tracing, mock_source},
    };

    fn eth_source() -> MockCatalogSource {
        mock_source(
            vec![IconEntry::new("ETH.svg", "https://icons.test/ETH.svg")],
            vec![PriceQuote {
                currency: "ETH".to_string(),
                observed_at: chrono::Utc::now(),
                price: dec("1645.93"),
            }],
        )
    }

    #[test]
    fn starts_empty() {
        let store = CatalogStore::new();
        assert!(store.current().is_empty());
        assert!(!store.subscribe().has_changed().unwrap());
    }

    #[tokio::test]
    async fn spawned_load_commits_and_notifies() {
        init_tracing();
        let store = CatalogStore::new();
        let mut updates = store.updates();
        let loader = Arc::new(CatalogLoader::new(eth_source(), ".svg"));

        let handle = LoadHandle::spawn(loader, store.clone(), CancellationToken::new());
        assert!(handle.await.unwrap());

        let catalog = updates.next().await.unwrap();
        assert_eq!(catalog.tokens(), [Token::new("ETH", "", None)]);
        assert_eq!(store.current().find("ETH").and_then(Token::price), Some(dec("1645.93")));
    }

    #[tokio::test]
    async fn completed_handle_reports_error_when_polled_again() {
        init_tracing();
        let store = CatalogStore::new();
        let loader = Arc::new(CatalogLoader::new(eth_source(), ".svg"));

        let mut handle = LoadHandle::spawn(loader, store, CancellationToken::new());
        assert!((&mut handle).await.unwrap());

        let again = (&mut handle).now_or_never().unwrap();
        assert!(again.unwrap_err().to_string().contains("already completed"));
    }

    #[tokio::test]
    async fn cancelled_handle_leaves_store_untouched() {
        init_tracing();
        let store = CatalogStore::new();
        let rx = store.subscribe();
        let loader = Arc::new(CatalogLoader::new(eth_source(), ".svg"));

        let attempt = CancellationToken::new();
        let handle = LoadHandle::spawn(loader, store.clone(), attempt.clone());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(!handle.await.unwrap());

        assert!(attempt.is_cancelled());
        assert!(!rx.has_changed().unwrap());
        assert!(store.current().is_empty());
    }

    #[tokio::test]
    async fn dropping_handle_invalidates_attempt() {
        let store = CatalogStore::new();
        // the task may not get to run before the runtime shuts down
        let mut source = MockCatalogSource::new();
        source.expect_fetch_icons().returning(|| Ok(vec![]));
        source.expect_fetch_prices().returning(|| Ok(vec![]));
        let loader = Arc::new(CatalogLoader::new(source, ".svg"));
        let attempt = CancellationToken::new();

        drop(LoadHandle::spawn(loader, store, attempt.clone()));
        assert!(attempt.is_cancelled());
    }
}
