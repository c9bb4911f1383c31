use std::sync::Arc;

use shared::{domain::ArtworkItem, protocol::AnalyticsEvent};
use tracing::{info, warn};

use crate::{config::BrowseSettings, error::BrowseError, AnalyticsSink, ArtworkWriter};

/// Adopts a selected artwork: log, persist, then confirm, strictly in order.
pub struct SelectionHandler {
    analytics: Arc<dyn AnalyticsSink>,
    writer: Arc<dyn ArtworkWriter>,
    settings: BrowseSettings,
}

impl SelectionHandler {
    pub fn new(
        analytics: Arc<dyn AnalyticsSink>,
        writer: Arc<dyn ArtworkWriter>,
        settings: BrowseSettings,
    ) -> Self {
        Self {
            analytics,
            writer,
            settings,
        }
    }

    /// Returns the confirmation message to show. A failed write skips the
    /// confirmation; the analytics event already sent stays sent.
    pub async fn select(&self, item: &ArtworkItem) -> Result<String, BrowseError> {
        let event = AnalyticsEvent::select_content(
            item,
            &self.settings.analytics_category,
            &self.settings.analytics_content_type,
        );
        if let Err(err) = self.analytics.log_event(event).await {
            warn!(artwork_id = item.id.0, error = %err, "selection: analytics event dropped");
        }

        self.writer
            .write_active_artwork(item)
            .await
            .map_err(|source| BrowseError::persistence(item.id, source))?;

        info!(
            artwork_id = item.id.0,
            image_uri = %item.image_uri,
            "selection: artwork is now active"
        );
        Ok(self.settings.confirmation_for(item.title.as_deref()))
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
