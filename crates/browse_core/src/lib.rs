use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::{
    domain::{ArtworkItem, ListSnapshot, ProviderDescriptor, ProviderRef},
    protocol::AnalyticsEvent,
};
use tracing::info;

pub mod config;
pub mod controller;
pub mod diff;
pub mod error;
pub mod events;
pub mod item_store;
pub mod lifecycle;
pub mod provider;
pub mod refresh;
pub mod selection;

pub use config::{load_settings, BrowseSettings};
pub use controller::{BrowseDeps, ControllerPhase, ListController};
pub use diff::{apply, diff, ListOp};
pub use error::BrowseError;
pub use item_store::{ItemStore, Subscription};
pub use lifecycle::ViewLifecycle;
pub use provider::LocalProviderHost;
pub use refresh::{RefreshCoordinator, RefreshOutcome, RefreshRequest};
pub use selection::SelectionHandler;

/// Upstream content of one provider, newest snapshot last.
pub type SnapshotStream = BoxStream<'static, ListSnapshot>;

#[async_trait]
pub trait ProviderResolver: Send + Sync {
    async fn resolve_provider(&self, provider: &ProviderRef) -> Result<Option<ProviderDescriptor>>;
}

#[async_trait]
pub trait ProviderContentSource: Send + Sync {
    async fn subscribe_content(&self, provider: &ProviderRef) -> Result<SnapshotStream>;
}

#[async_trait]
pub trait ProviderLoader: Send + Sync {
    /// Asks the provider to load new artwork. Completion of the load itself is
    /// not observable; `Ok` only means the request was accepted.
    async fn request_load(&self, provider: &ProviderRef) -> Result<()>;
}

#[async_trait]
pub trait ArtworkWriter: Send + Sync {
    async fn write_active_artwork(&self, artwork: &ArtworkItem) -> Result<()>;
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn log_event(&self, event: AnalyticsEvent) -> Result<()>;
}

pub trait Navigator: Send + Sync {
    fn pop_to_parent(&self);
}

/// Callbacks into the host UI. Only ever invoked from the controller's UI task.
pub trait BrowseSurface: Send + Sync {
    fn apply_ops(&self, ops: &[ListOp]);
    fn set_refreshing(&self, refreshing: bool);
    fn show_message(&self, message: &str);
    fn show_error(&self, error: &BrowseError);
}

pub struct MissingProviderResolver;

#[async_trait]
impl ProviderResolver for MissingProviderResolver {
    async fn resolve_provider(&self, provider: &ProviderRef) -> Result<Option<ProviderDescriptor>> {
        Err(anyhow!(
            "provider resolution unavailable for '{}'",
            provider.authority()
        ))
    }
}

pub struct MissingContentSource;

#[async_trait]
impl ProviderContentSource for MissingContentSource {
    async fn subscribe_content(&self, provider: &ProviderRef) -> Result<SnapshotStream> {
        Err(anyhow!(
            "content source unavailable for provider '{}'",
            provider.authority()
        ))
    }
}

pub struct MissingProviderLoader;

#[async_trait]
impl ProviderLoader for MissingProviderLoader {
    async fn request_load(&self, provider: &ProviderRef) -> Result<()> {
        Err(anyhow!(
            "provider loader unavailable for '{}'",
            provider.authority()
        ))
    }
}

pub struct MissingArtworkWriter;

#[async_trait]
impl ArtworkWriter for MissingArtworkWriter {
    async fn write_active_artwork(&self, artwork: &ArtworkItem) -> Result<()> {
        Err(anyhow!(
            "artwork store unavailable; cannot persist artwork {}",
            artwork.id.0
        ))
    }
}

/// Analytics sink that records events in the log stream only.
pub struct TracingAnalyticsSink;

#[async_trait]
impl AnalyticsSink for TracingAnalyticsSink {
    async fn log_event(&self, event: AnalyticsEvent) -> Result<()> {
        info!(
            event = %event.name,
            properties = ?event.properties,
            "analytics: event logged"
        );
        Ok(())
    }
}
