//! Line-oriented rendering of the artwork list for the CLI.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use browse_core::{BrowseError, BrowseSurface, ListOp, Navigator};
use tracing::info;

/// Writes one line per surface call to a shared sink (stdout in the binary).
pub struct TerminalSurface {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl TerminalSurface {
    pub fn stdout() -> Self {
        Self::with_writer(Arc::new(Mutex::new(io::stdout())))
    }

    pub fn with_writer(out: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { out }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stdout only loses the transcript.
        let _ = writeln!(out, "{text}");
    }
}

pub fn describe(op: &ListOp) -> String {
    match op {
        ListOp::Insert { index, item } => format!(
            "+ [{index}] {} {}",
            item.image_uri,
            item.display_title().unwrap_or("(untitled)")
        ),
        ListOp::Remove { index, image_uri } => format!("- [{index}] {image_uri}"),
        ListOp::Move { from, to } => format!("> [{from}] -> [{to}]"),
        ListOp::Update { index, item } => format!(
            "~ [{index}] {} {}",
            item.image_uri,
            item.display_title().unwrap_or("(untitled)")
        ),
    }
}

impl BrowseSurface for TerminalSurface {
    fn apply_ops(&self, ops: &[ListOp]) {
        for op in ops {
            self.line(&describe(op));
        }
    }

    fn set_refreshing(&self, refreshing: bool) {
        self.line(if refreshing {
            "refreshing..."
        } else {
            "refresh done"
        });
    }

    fn show_message(&self, message: &str) {
        self.line(&format!("* {message}"));
    }

    fn show_error(&self, error: &BrowseError) {
        self.line(&format!("! {error}"));
    }
}

/// The CLI has no parent screen; leaving just gets logged.
pub struct ExitNavigator;

impl Navigator for ExitNavigator {
    fn pop_to_parent(&self) {
        info!("navigation: leaving artwork list");
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
