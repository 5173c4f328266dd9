//! The cancellable context handed to service calls.

use tokio_util::sync::CancellationToken;

/// Execution context of a call.
///
/// Cancellation is cooperative: triggering it only marks the context, a handler has to
/// check [is_cancelled](Self::is_cancelled) or await [cancelled](Self::cancelled) and
/// return early by itself.
///
/// Cancelling a context also cancels every context derived from it with
/// [child](Self::child), but never its parent.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    token: CancellationToken,
}

impl CallContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that is cancelled together with this one, or on its own.
    #[inline]
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token() }
    }

    /// Mark this context and its children as cancelled. Never blocks.
    #[inline]
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    #[inline]
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
