use shared::domain::ArtworkId;
use thiserror::Error;

use crate::controller::ControllerPhase;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("artwork provider '{authority}' could not be resolved")]
    ProviderUnresolvable { authority: String },
    #[error("failed to resolve artwork provider '{authority}': {source}")]
    ProviderResolutionFailed {
        authority: String,
        source: anyhow::Error,
    },
    #[error("failed to subscribe to content of provider '{authority}': {source}")]
    ContentSubscriptionFailed {
        authority: String,
        source: anyhow::Error,
    },
    #[error("failed to persist artwork {artwork_id} as active artwork: {source}")]
    PersistenceWriteFailed {
        artwork_id: i64,
        source: anyhow::Error,
    },
    #[error("refresh request to provider '{authority}' failed: {source}")]
    RefreshRequestFailed {
        authority: String,
        source: anyhow::Error,
    },
    #[error("cannot {operation} while controller is {phase:?}")]
    InvalidState {
        operation: &'static str,
        phase: ControllerPhase,
    },
    #[error("no artwork at position {index}; list has {len} items")]
    ItemOutOfRange { index: usize, len: usize },
    #[error("invalid browse configuration: {0}")]
    Config(String),
}

impl BrowseError {
    pub fn persistence(artwork_id: ArtworkId, source: anyhow::Error) -> Self {
        Self::PersistenceWriteFailed {
            artwork_id: artwork_id.0,
            source,
        }
    }

    /// Errors that end the screen; the host navigates away instead of retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnresolvable { .. } | Self::ProviderResolutionFailed { .. }
        )
    }
}
