use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::ProviderRef;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::BrowseError, lifecycle::ViewLifecycle, ProviderLoader};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub request_id: Uuid,
    pub provider: ProviderRef,
    pub issued_at: Instant,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The minimum visible duration elapsed and this was the newest refresh.
    Completed,
    /// A newer refresh owns the indicator now.
    Superseded,
    /// The view went away during the wait.
    Cancelled,
}

impl RefreshOutcome {
    pub fn hides_indicator(self) -> bool {
        self == Self::Completed
    }
}

/// Issues provider loads and keeps the progress indicator up for at least
/// `min_visible`, since the provider's own completion is not observable.
pub struct RefreshCoordinator {
    loader: Arc<dyn ProviderLoader>,
    min_visible: Duration,
    lifecycle: ViewLifecycle,
    generation: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(
        loader: Arc<dyn ProviderLoader>,
        min_visible: Duration,
        lifecycle: ViewLifecycle,
    ) -> Self {
        Self {
            loader,
            min_visible,
            lifecycle,
            generation: AtomicU64::new(0),
        }
    }

    /// Completes once the indicator may be hidden. Overlapping calls each
    /// issue their own provider load; only the newest call reports
    /// [`RefreshOutcome::Completed`].
    pub async fn refresh(&self, target: &ProviderRef) -> RefreshOutcome {
        let request = RefreshRequest {
            request_id: Uuid::new_v4(),
            provider: target.clone(),
            issued_at: Instant::now(),
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        };
        info!(
            request_id = %request.request_id,
            authority = %target.authority(),
            generation = request.generation,
            "refresh: requesting provider load"
        );
        self.spawn_load(&request);

        tokio::select! {
            biased;
            _ = self.lifecycle.ended() => {}
            _ = tokio::time::sleep(self.min_visible) => {}
        }

        let outcome = if !self.lifecycle.is_alive() {
            RefreshOutcome::Cancelled
        } else if self.generation.load(Ordering::SeqCst) != request.generation {
            RefreshOutcome::Superseded
        } else {
            RefreshOutcome::Completed
        };
        debug!(
            request_id = %request.request_id,
            elapsed_ms = request.issued_at.elapsed().as_millis() as u64,
            ?outcome,
            "refresh: indicator window closed"
        );
        outcome
    }

    // The load outlives the view; cancelling the wait never rolls it back.
    fn spawn_load(&self, request: &RefreshRequest) {
        let loader = Arc::clone(&self.loader);
        let provider = request.provider.clone();
        let request_id = request.request_id;
        tokio::spawn(async move {
            if let Err(source) = loader.request_load(&provider).await {
                let err = BrowseError::RefreshRequestFailed {
                    authority: provider.authority().to_string(),
                    source,
                };
                warn!(request_id = %request_id, error = %err, "refresh: provider load failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/refresh_tests.rs"]
mod tests;
