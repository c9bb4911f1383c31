//! JSON catalog describing the in-process providers the CLI hosts.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use browse_core::LocalProviderHost;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::domain::{ArtworkId, ArtworkItem, ImageUri, ProviderDescriptor};

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub providers: Vec<CatalogProvider>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogProvider {
    pub authority: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub artworks: Vec<CatalogArtwork>,
    /// Published when the provider is asked to load more.
    #[serde(default)]
    pub on_refresh: Option<Vec<CatalogArtwork>>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogArtwork {
    pub id: i64,
    pub image_uri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub byline: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

impl CatalogArtwork {
    fn into_item(self, authority: &str) -> ArtworkItem {
        ArtworkItem {
            id: ArtworkId(self.id),
            provider_authority: authority.to_string(),
            image_uri: ImageUri::new(self.image_uri),
            title: self.title,
            byline: self.byline,
            attribution: self.attribution,
            metadata: self.metadata,
            date_added: self.date_added.unwrap_or_else(Utc::now),
        }
    }
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid catalog '{}'", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn install(self, host: &LocalProviderHost) -> Result<()> {
        for provider in self.providers {
            let authority = provider.authority;
            let descriptor = ProviderDescriptor {
                label: provider.label.unwrap_or_else(|| authority.clone()),
                authority: authority.clone(),
            };
            let items = provider
                .artworks
                .into_iter()
                .map(|artwork| artwork.into_item(&authority))
                .collect();
            host.register(descriptor, items).await;

            if let Some(staged) = provider.on_refresh {
                let staged = staged
                    .into_iter()
                    .map(|artwork| artwork.into_item(&authority))
                    .collect();
                host.stage_load(&authority, staged).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
