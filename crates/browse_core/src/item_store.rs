//! Read-only holder of a provider's latest artwork snapshot.

use std::{future::Future, sync::Arc, sync::Mutex};

use futures::{future, StreamExt};
use shared::domain::{ListSnapshot, ProviderRef};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::{error::BrowseError, ProviderContentSource, SnapshotStream};

pub struct ItemStore {
    latest: watch::Receiver<Option<ListSnapshot>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ItemStore {
    /// Subscribes to the provider's content and keeps the most recent snapshot.
    pub async fn attach(
        source: Arc<dyn ProviderContentSource>,
        provider: ProviderRef,
    ) -> Result<Self, BrowseError> {
        let mut upstream = source
            .subscribe_content(&provider)
            .await
            .map_err(|source| BrowseError::ContentSubscriptionFailed {
                authority: provider.authority().to_string(),
                source,
            })?;

        let (latest_tx, latest) = watch::channel(None);
        let authority = provider.authority().to_string();
        let pump = tokio::spawn(async move {
            while let Some(snapshot) = upstream.next().await {
                debug!(
                    authority = %authority,
                    items = snapshot.len(),
                    "item store: provider snapshot received"
                );
                latest_tx.send_replace(Some(snapshot));
            }
            debug!(authority = %authority, "item store: provider stream ended");
        });

        Ok(Self {
            latest,
            pump: Mutex::new(Some(pump)),
        })
    }

    /// Most recent known snapshot, `None` until the provider has emitted once.
    pub fn current(&self) -> Option<ListSnapshot> {
        self.latest.borrow().clone()
    }

    /// Stream of snapshots for one subscriber: the most recent known snapshot
    /// first, then every later one. Intermediate snapshots may be skipped when
    /// the subscriber is slower than the provider.
    pub fn observe(&self) -> SnapshotStream {
        WatchStream::new(self.latest.clone())
            .filter_map(future::ready)
            .boxed()
    }

    /// Hands snapshots to `deliver` one at a time; the next snapshot is pulled
    /// only after the previous delivery completed.
    pub fn subscribe<F, Fut>(&self, deliver: F) -> Subscription
    where
        F: FnMut(ListSnapshot) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Subscription::spawn(self.observe(), deliver)
    }

    pub fn close(&self) {
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(task) = pump.take() {
                task.abort();
            }
        }
    }
}

impl Drop for ItemStore {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cancellation handle for a snapshot subscription. Dropping it unsubscribes.
pub struct Subscription {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    pub fn spawn<F, Fut>(mut snapshots: SnapshotStream, mut deliver: F) -> Self
    where
        F: FnMut(ListSnapshot) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(snapshot) = snapshots.next().await {
                if !deliver(snapshot).await {
                    break;
                }
            }
        });
        Self {
            task: Mutex::new(Some(task)),
        }
    }

    /// Stops delivery. Returns `true` only for the call that cancelled it.
    pub fn unsubscribe(&self) -> bool {
        let Ok(mut task) = self.task.lock() else {
            return false;
        };
        match task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .map(|task| task.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
#[path = "tests/item_store_tests.rs"]
mod tests;
