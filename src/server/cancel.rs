//! The registry of in-flight service calls that can be cancelled.

use crate::context::CallContext;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Maps a request id to the context of its in-flight call.
///
/// A slot lives from [register](Self::register) until either [finish](Self::finish) or
/// [cancel](Self::cancel) removes it. Removal is exclusive, so when a cancel races with the
/// end of a call, exactly one side finds the slot.
///
/// NOTE: one-way requests also register under their (non-positive) id, so concurrent
/// one-way calls sharing an id alias each other's slot.
#[derive(Default, Debug)]
pub struct CancelRegistry {
    cancels: Mutex<HashMap<i64, CallContext>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a cancellable child of `parent` and store it under `req_id`,
    /// replacing any previous slot.
    pub fn register(&self, parent: &CallContext, req_id: i64) -> CallContext {
        let ctx = parent.child();
        self.cancels.lock().insert(req_id, ctx.clone());
        ctx
    }

    /// Like [register](Self::register), but the slot is released when the returned guard is
    /// dropped, so a call whose future is dropped mid-way does not leak its slot.
    pub fn enter(&self, parent: &CallContext, req_id: i64) -> (CallContext, CallSlot<'_>) {
        let ctx = self.register(parent, req_id);
        (ctx, CallSlot { registry: self, req_id, armed: true })
    }

    /// Release the slot of a finished call.
    ///
    /// Returns true when the slot was already gone, meaning a cancel consumed it.
    pub fn finish(&self, req_id: i64) -> bool {
        self.cancels.lock().remove(&req_id).is_none()
    }

    /// Remove the slot of `req_id` and trigger its cancellation.
    ///
    /// Returns false if no call is registered under `req_id`.
    pub fn cancel(&self, req_id: i64) -> bool {
        let mut cancels = self.cancels.lock();
        match cancels.remove(&req_id) {
            Some(ctx) => {
                ctx.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.cancels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the registry slot of an in-flight call, see [CancelRegistry::enter].
#[must_use]
pub struct CallSlot<'a> {
    registry: &'a CancelRegistry,
    req_id: i64,
    armed: bool,
}

impl CallSlot<'_> {
    /// Release the slot on completion, same result as [CancelRegistry::finish].
    pub fn finish(mut self) -> bool {
        self.armed = false;
        self.registry.finish(self.req_id)
    }
}

impl Drop for CallSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.registry.finish(self.req_id);
        }
    }
}
