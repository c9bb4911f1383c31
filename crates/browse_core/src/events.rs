//! Events marshaled from background work onto the controller's UI task.

use shared::domain::ListSnapshot;
use tokio::sync::oneshot;

use crate::error::BrowseError;

pub enum UiEvent {
    /// A new provider snapshot. `delivered` is completed once it is rendered,
    /// which lets the subscription pull the next one.
    Snapshot {
        snapshot: ListSnapshot,
        delivered: oneshot::Sender<()>,
    },
    ShowIndicator,
    HideIndicator,
    Message(String),
    Error(BrowseError),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Snapshot { .. } => "snapshot",
            UiEvent::ShowIndicator => "show_indicator",
            UiEvent::HideIndicator => "hide_indicator",
            UiEvent::Message(_) => "message",
            UiEvent::Error(_) => "error",
        }
    }
}
