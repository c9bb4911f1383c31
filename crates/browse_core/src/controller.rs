//! Browse screen controller: binds a provider, keeps the rendered list in sync
//! and forwards user actions.
//!
//! All [`BrowseSurface`] calls happen on one UI task fed by [`UiEvent`]s.
//! Background work (snapshot delivery, refresh waits, selections) only ever
//! posts events; the UI task drops every event that arrives after teardown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{ArtworkItem, ListSnapshot, ProviderDescriptor, ProviderRef};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::BrowseSettings,
    diff::diff,
    error::BrowseError,
    events::UiEvent,
    item_store::{ItemStore, Subscription},
    lifecycle::ViewLifecycle,
    provider::LocalProviderHost,
    refresh::RefreshCoordinator,
    selection::SelectionHandler,
    AnalyticsSink, ArtworkWriter, BrowseSurface, Navigator, ProviderContentSource,
    ProviderLoader, ProviderResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Uninitialized,
    Bound,
    Observing,
    Unavailable,
    Destroyed,
}

#[derive(Clone)]
pub struct BrowseDeps {
    pub resolver: Arc<dyn ProviderResolver>,
    pub content: Arc<dyn ProviderContentSource>,
    pub loader: Arc<dyn ProviderLoader>,
    pub writer: Arc<dyn ArtworkWriter>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub navigator: Arc<dyn Navigator>,
}

impl BrowseDeps {
    /// Provider-facing collaborators all backed by one in-process host.
    pub fn local(
        host: Arc<LocalProviderHost>,
        writer: Arc<dyn ArtworkWriter>,
        analytics: Arc<dyn AnalyticsSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            resolver: host.clone(),
            content: host.clone(),
            loader: host,
            writer,
            analytics,
            navigator,
        }
    }
}

enum ControllerState {
    Uninitialized,
    Bound {
        provider: ProviderRef,
    },
    Observing {
        provider: ProviderRef,
        store: ItemStore,
        subscription: Subscription,
    },
    Unavailable,
    Destroyed,
}

impl ControllerState {
    fn phase(&self) -> ControllerPhase {
        match self {
            ControllerState::Uninitialized => ControllerPhase::Uninitialized,
            ControllerState::Bound { .. } => ControllerPhase::Bound,
            ControllerState::Observing { .. } => ControllerPhase::Observing,
            ControllerState::Unavailable => ControllerPhase::Unavailable,
            ControllerState::Destroyed => ControllerPhase::Destroyed,
        }
    }

    fn provider(&self) -> Option<&ProviderRef> {
        match self {
            ControllerState::Bound { provider, .. }
            | ControllerState::Observing { provider, .. } => Some(provider),
            _ => None,
        }
    }
}

pub struct ListController {
    deps: BrowseDeps,
    refresher: Arc<RefreshCoordinator>,
    selector: Arc<SelectionHandler>,
    lifecycle: ViewLifecycle,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    ui_task: Mutex<Option<JoinHandle<()>>>,
    rendered: watch::Receiver<ListSnapshot>,
    state: Mutex<ControllerState>,
}

impl ListController {
    /// Must be called inside a tokio runtime; the UI task is spawned here.
    pub fn new(deps: BrowseDeps, surface: Arc<dyn BrowseSurface>, settings: BrowseSettings) -> Self {
        let lifecycle = ViewLifecycle::new();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (rendered_tx, rendered) = watch::channel(ListSnapshot::empty());
        let ui_task = tokio::spawn(run_ui_loop(ui_rx, surface, lifecycle.clone(), rendered_tx));

        let refresher = Arc::new(RefreshCoordinator::new(
            Arc::clone(&deps.loader),
            settings.refresh_delay(),
            lifecycle.clone(),
        ));
        let selector = Arc::new(SelectionHandler::new(
            Arc::clone(&deps.analytics),
            Arc::clone(&deps.writer),
            settings,
        ));

        Self {
            deps,
            refresher,
            selector,
            lifecycle,
            ui_tx,
            ui_task: Mutex::new(Some(ui_task)),
            rendered,
            state: Mutex::new(ControllerState::Uninitialized),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.lock_state().phase()
    }

    pub fn lifecycle(&self) -> &ViewLifecycle {
        &self.lifecycle
    }

    /// Snapshot currently shown by the surface.
    pub fn rendered(&self) -> ListSnapshot {
        self.rendered.borrow().clone()
    }

    /// Binds and starts observing in one step.
    pub async fn open(&self, provider: ProviderRef) -> Result<ProviderDescriptor, BrowseError> {
        let descriptor = self.bind(provider).await?;
        self.start_observing().await?;
        Ok(descriptor)
    }

    /// Resolves the provider. An unresolvable provider ends the screen: the
    /// controller becomes unavailable and the host is asked to navigate away.
    pub async fn bind(&self, provider: ProviderRef) -> Result<ProviderDescriptor, BrowseError> {
        self.ensure_phase("bind", ControllerPhase::Uninitialized)?;

        let descriptor = match self.deps.resolver.resolve_provider(&provider).await {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                return Err(self.abandon(BrowseError::ProviderUnresolvable {
                    authority: provider.authority().to_string(),
                }))
            }
            Err(source) => {
                return Err(self.abandon(BrowseError::ProviderResolutionFailed {
                    authority: provider.authority().to_string(),
                    source,
                }))
            }
        };

        let mut state = self.lock_state();
        if !matches!(*state, ControllerState::Uninitialized) {
            return Err(BrowseError::InvalidState {
                operation: "bind",
                phase: state.phase(),
            });
        }
        info!(
            authority = %descriptor.authority,
            label = %descriptor.label,
            "controller: provider bound"
        );
        *state = ControllerState::Bound { provider };
        Ok(descriptor)
    }

    pub async fn start_observing(&self) -> Result<(), BrowseError> {
        let provider = {
            let state = self.lock_state();
            match &*state {
                ControllerState::Bound { provider, .. } => provider.clone(),
                other => {
                    return Err(BrowseError::InvalidState {
                        operation: "start_observing",
                        phase: other.phase(),
                    })
                }
            }
        };

        let store = ItemStore::attach(Arc::clone(&self.deps.content), provider.clone()).await?;
        let ui_tx = self.ui_tx.clone();
        let subscription = store.subscribe(move |snapshot| {
            let ui_tx = ui_tx.clone();
            async move {
                let (delivered, rendered) = oneshot::channel();
                if ui_tx
                    .send(UiEvent::Snapshot {
                        snapshot,
                        delivered,
                    })
                    .is_err()
                {
                    return false;
                }
                rendered.await.is_ok()
            }
        });

        let mut state = self.lock_state();
        if !matches!(*state, ControllerState::Bound { .. }) {
            // Torn down or rebound while attaching; `store` and `subscription` drop here.
            return Err(BrowseError::InvalidState {
                operation: "start_observing",
                phase: state.phase(),
            });
        }
        debug!(authority = %provider.authority(), "controller: observing provider content");
        *state = ControllerState::Observing {
            provider,
            store,
            subscription,
        };
        Ok(())
    }

    /// Shows the indicator and hides it once the refresh window of the newest
    /// refresh has elapsed. Returns immediately.
    pub fn refresh(&self) -> Result<(), BrowseError> {
        let provider = self.current_provider("refresh")?;
        self.post(UiEvent::ShowIndicator);

        let refresher = Arc::clone(&self.refresher);
        let lifecycle = self.lifecycle.clone();
        let ui_tx = self.ui_tx.clone();
        tokio::spawn(async move {
            let outcome = refresher.refresh(&provider).await;
            if outcome.hides_indicator() && lifecycle.is_alive() {
                let _ = ui_tx.send(UiEvent::HideIndicator);
            }
        });
        Ok(())
    }

    /// Runs the selection pipeline in the background; the outcome reaches the
    /// surface as a message or an error.
    pub fn select(&self, item: ArtworkItem) -> Result<(), BrowseError> {
        self.current_provider("select")?;

        let selector = Arc::clone(&self.selector);
        let ui_tx = self.ui_tx.clone();
        tokio::spawn(async move {
            match selector.select(&item).await {
                Ok(message) => {
                    let _ = ui_tx.send(UiEvent::Message(message));
                }
                Err(err) => {
                    error!(artwork_id = item.id.0, error = %err, "controller: selection failed");
                    let _ = ui_tx.send(UiEvent::Error(err));
                }
            }
        });
        Ok(())
    }

    /// Selects the row at `index` of the rendered list.
    pub fn select_at(&self, index: usize) -> Result<(), BrowseError> {
        let rendered = self.rendered();
        let item = rendered
            .get(index)
            .cloned()
            .ok_or(BrowseError::ItemOutOfRange {
                index,
                len: rendered.len(),
            })?;
        self.select(item)
    }

    /// Tears down the subscription, pending refresh waits and the UI task.
    /// Safe to call any number of times.
    pub fn destroy(&self) {
        let first = self.lifecycle.end();
        let previous = std::mem::replace(&mut *self.lock_state(), ControllerState::Destroyed);
        if let ControllerState::Observing {
            store,
            subscription,
            ..
        } = previous
        {
            subscription.unsubscribe();
            store.close();
        }
        if let Ok(mut task) = self.ui_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
        if first {
            info!("controller: destroyed");
        }
    }

    fn abandon(&self, err: BrowseError) -> BrowseError {
        {
            let mut state = self.lock_state();
            if matches!(*state, ControllerState::Destroyed) {
                return err;
            }
            *state = ControllerState::Unavailable;
        }
        warn!(error = %err, "controller: provider unavailable, leaving screen");
        self.deps.navigator.pop_to_parent();
        err
    }

    fn ensure_phase(
        &self,
        operation: &'static str,
        expected: ControllerPhase,
    ) -> Result<(), BrowseError> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(BrowseError::InvalidState { operation, phase })
        }
    }

    fn current_provider(&self, operation: &'static str) -> Result<ProviderRef, BrowseError> {
        let state = self.lock_state();
        state
            .provider()
            .cloned()
            .ok_or(BrowseError::InvalidState {
                operation,
                phase: state.phase(),
            })
    }

    fn post(&self, event: UiEvent) {
        let name = event.name();
        if self.ui_tx.send(event).is_err() {
            debug!(event = name, "controller: ui task gone, event dropped");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn run_ui_loop(
    mut events: mpsc::UnboundedReceiver<UiEvent>,
    surface: Arc<dyn BrowseSurface>,
    lifecycle: ViewLifecycle,
    rendered_tx: watch::Sender<ListSnapshot>,
) {
    let mut rendered = ListSnapshot::empty();
    while let Some(event) = events.recv().await {
        if !lifecycle.is_alive() {
            debug!(event = event.name(), "ui: dropping event after teardown");
            continue;
        }
        match event {
            UiEvent::Snapshot {
                snapshot,
                delivered,
            } => {
                let ops = diff(&rendered, &snapshot);
                debug!(
                    ops = ops.len(),
                    items = snapshot.len(),
                    "ui: applying snapshot"
                );
                if !ops.is_empty() {
                    surface.apply_ops(&ops);
                }
                rendered = snapshot;
                rendered_tx.send_replace(rendered.clone());
                let _ = delivered.send(());
            }
            UiEvent::ShowIndicator => surface.set_refreshing(true),
            UiEvent::HideIndicator => surface.set_refreshing(false),
            UiEvent::Message(message) => surface.show_message(&message),
            UiEvent::Error(err) => surface.show_error(&err),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
