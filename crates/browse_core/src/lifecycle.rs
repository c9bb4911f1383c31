use std::sync::Arc;

use tokio::sync::watch;

/// Liveness flag shared between a view and the work it scheduled.
///
/// Ending the lifecycle is idempotent. Continuations that touch the display
/// must check [`ViewLifecycle::is_alive`] first; waits race against
/// [`ViewLifecycle::ended`].
#[derive(Clone)]
pub struct ViewLifecycle {
    alive: Arc<watch::Sender<bool>>,
}

impl ViewLifecycle {
    pub fn new() -> Self {
        let (alive, _) = watch::channel(true);
        Self {
            alive: Arc::new(alive),
        }
    }

    pub fn is_alive(&self) -> bool {
        *self.alive.borrow()
    }

    /// Returns `true` only for the call that actually ended the lifecycle.
    pub fn end(&self) -> bool {
        self.alive.send_replace(false)
    }

    /// Resolves once the lifecycle has ended.
    pub async fn ended(&self) {
        let mut alive = self.alive.subscribe();
        let _ = alive.wait_for(|alive| !*alive).await;
    }
}

impl Default for ViewLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
