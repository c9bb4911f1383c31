use std::{fmt, ops::Deref, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ArtworkId);

const CONTENT_SCHEME: &str = "content";

/// Opaque reference to an artwork's image data. Doubles as the row identity
/// when two snapshots of the same provider are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageUri(pub String);

impl ImageUri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkItem {
    pub id: ArtworkId,
    pub provider_authority: String,
    pub image_uri: ImageUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl ArtworkItem {
    pub fn new(
        id: ArtworkId,
        provider_authority: impl Into<String>,
        image_uri: impl Into<String>,
    ) -> Self {
        Self {
            id,
            provider_authority: provider_authority.into(),
            image_uri: ImageUri::new(image_uri),
            title: None,
            byline: None,
            attribution: None,
            metadata: None,
            date_added: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Identity comparison: same row, regardless of content.
    pub fn same_identity(&self, other: &ArtworkItem) -> bool {
        self.image_uri == other.image_uri
    }

    /// Title suitable for display, `None` when absent or blank.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }
}

/// Immutable, cheaply clonable view of a provider's artwork at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSnapshot {
    items: Arc<[ArtworkItem]>,
}

impl ListSnapshot {
    pub fn new(items: Vec<ArtworkItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Deref for ListSnapshot {
    type Target = [ArtworkItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl From<Vec<ArtworkItem>> for ListSnapshot {
    fn from(items: Vec<ArtworkItem>) -> Self {
        Self::new(items)
    }
}

/// A content URI naming one artwork provider, e.g. `content://com.example.featured/artwork`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderRef {
    content_uri: Url,
    authority: String,
}

impl ProviderRef {
    pub fn parse(content_uri: &str) -> Result<Self, DomainError> {
        let url = Url::parse(content_uri.trim()).map_err(|err| DomainError::InvalidContentUri {
            uri: content_uri.to_string(),
            reason: err.to_string(),
        })?;
        if url.scheme() != CONTENT_SCHEME {
            return Err(DomainError::InvalidContentUri {
                uri: content_uri.to_string(),
                reason: format!("expected scheme '{CONTENT_SCHEME}', got '{}'", url.scheme()),
            });
        }
        let authority = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| DomainError::MissingAuthority {
                uri: content_uri.to_string(),
            })?
            .to_string();
        Ok(Self {
            content_uri: url,
            authority,
        })
    }

    pub fn for_authority(authority: &str) -> Result<Self, DomainError> {
        Self::parse(&format!("{CONTENT_SCHEME}://{authority}"))
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl fmt::Display for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_uri.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub authority: String,
    pub label: String,
}
