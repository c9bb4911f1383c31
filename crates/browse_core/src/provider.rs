//! In-process artwork providers, used by the CLI host and by tests.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use shared::domain::{ArtworkItem, ListSnapshot, ProviderDescriptor, ProviderRef};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::info;

use crate::{ProviderContentSource, ProviderLoader, ProviderResolver, SnapshotStream};

struct HostedProvider {
    descriptor: ProviderDescriptor,
    content: watch::Sender<ListSnapshot>,
    staged: Option<Vec<ArtworkItem>>,
    load_requests: u64,
}

#[derive(Default)]
pub struct LocalProviderHost {
    providers: Mutex<HashMap<String, HostedProvider>>,
}

impl LocalProviderHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, descriptor: ProviderDescriptor, items: Vec<ArtworkItem>) {
        let (content, _) = watch::channel(ListSnapshot::new(items));
        let mut providers = self.providers.lock().await;
        providers.insert(
            descriptor.authority.clone(),
            HostedProvider {
                descriptor,
                content,
                staged: None,
                load_requests: 0,
            },
        );
    }

    /// Replaces the provider's content; every subscriber sees the new snapshot.
    pub async fn publish(&self, authority: &str, items: Vec<ArtworkItem>) -> Result<()> {
        let providers = self.providers.lock().await;
        let provider = providers
            .get(authority)
            .ok_or_else(|| anyhow!("no provider registered for authority '{authority}'"))?;
        provider.content.send_replace(ListSnapshot::new(items));
        Ok(())
    }

    /// Content the provider publishes on its next load request.
    pub async fn stage_load(&self, authority: &str, items: Vec<ArtworkItem>) -> Result<()> {
        let mut providers = self.providers.lock().await;
        let provider = providers
            .get_mut(authority)
            .ok_or_else(|| anyhow!("no provider registered for authority '{authority}'"))?;
        provider.staged = Some(items);
        Ok(())
    }

    pub async fn load_requests(&self, authority: &str) -> u64 {
        self.providers
            .lock()
            .await
            .get(authority)
            .map(|provider| provider.load_requests)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProviderResolver for LocalProviderHost {
    async fn resolve_provider(&self, provider: &ProviderRef) -> Result<Option<ProviderDescriptor>> {
        Ok(self
            .providers
            .lock()
            .await
            .get(provider.authority())
            .map(|hosted| hosted.descriptor.clone()))
    }
}

#[async_trait]
impl ProviderContentSource for LocalProviderHost {
    async fn subscribe_content(&self, provider: &ProviderRef) -> Result<SnapshotStream> {
        let providers = self.providers.lock().await;
        let hosted = providers.get(provider.authority()).ok_or_else(|| {
            anyhow!(
                "no provider registered for authority '{}'",
                provider.authority()
            )
        })?;
        Ok(WatchStream::new(hosted.content.subscribe()).boxed())
    }
}

#[async_trait]
impl ProviderLoader for LocalProviderHost {
    async fn request_load(&self, provider: &ProviderRef) -> Result<()> {
        let mut providers = self.providers.lock().await;
        let hosted = providers.get_mut(provider.authority()).ok_or_else(|| {
            anyhow!(
                "no provider registered for authority '{}'",
                provider.authority()
            )
        })?;
        hosted.load_requests += 1;
        if let Some(items) = hosted.staged.take() {
            info!(
                authority = %provider.authority(),
                items = items.len(),
                "provider: publishing staged artwork"
            );
            hosted.content.send_replace(ListSnapshot::new(items));
        }
        Ok(())
    }
}
