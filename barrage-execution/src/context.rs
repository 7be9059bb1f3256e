//! Cancellable execution context bound to one task

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cancellation handle shared between a task and its driver.
///
/// Cancelling is idempotent; once the owning task is terminal the handle is
/// simply never looked at again.
#[derive(Debug, Clone, Default)]
pub struct AttackContext {
    token: CancellationToken,
}

impl AttackContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub fn canceled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
