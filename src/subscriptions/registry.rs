//! Fixed-capacity registry of change observers.

use crate::error::{Result, StoreError};
use crate::types::SubscriptionId;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

use super::types::{Callback, Subscription};

/// Slot array plus id counter. `None` marks a free slot.
struct Slots {
    slots: Box<[Option<Subscription>]>,
    /// Next id to hand out. Only advances on a successful subscribe.
    next_id: u64,
}

/// Tracks active observers and notifies them synchronously.
pub struct SubscriptionRegistry {
    inner: ReentrantMutex<RefCell<Slots>>,
}

impl SubscriptionRegistry {
    /// Create a registry with room for `capacity` active subscriptions.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(Slots {
                slots: (0..capacity).map(|_| None).collect(),
                next_id: 1,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().borrow().slots.len()
    }

    /// Register `callback` in the first free slot.
    ///
    /// Fails with `CapacityExceeded` when every slot is active, leaving the
    /// registry untouched.
    pub fn subscribe(&self, callback: Callback) -> Result<SubscriptionId> {
        let guard = self.inner.lock();
        let mut state = guard.borrow_mut();
        let state = &mut *state;

        let capacity = state.slots.len();
        let slot = state
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(StoreError::CapacityExceeded { capacity })?;

        let id = SubscriptionId(state.next_id);
        *slot = Some(Subscription { id, callback });
        state.next_id += 1;
        Ok(id)
    }

    /// Free the slot held by `id`. The id is retired for good.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        let guard = self.inner.lock();
        let removed = guard
            .borrow_mut()
            .slots
            .iter_mut()
            .find(|slot| matches!(slot, Some(sub) if sub.id == id))
            .and_then(Option::take);

        // The callback is released here, after the slot borrow has ended.
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::SubscriptionNotFound(id)),
        }
    }

    /// Invoke every active callback with `key`, in slot order.
    ///
    /// A callback that panics is contained: the panic is logged, the
    /// subscription stays registered, and the remaining slots are still
    /// notified. Returns the number of callbacks invoked, panicking ones
    /// included.
    pub fn notify(&self, key: &str) -> usize {
        let guard = self.inner.lock();
        let (horizon, capacity) = {
            let state = guard.borrow();
            (state.next_id, state.slots.len())
        };

        let mut delivered = 0;
        for index in 0..capacity {
            // Re-read each slot: an earlier callback may have changed it.
            let (id, callback) = match &guard.borrow().slots[index] {
                Some(sub) if sub.id.0 < horizon => (sub.id, Arc::clone(&sub.callback)),
                _ => continue,
            };
            if panic::catch_unwind(AssertUnwindSafe(|| callback(key))).is_err() {
                warn!(%id, key, "subscriber callback panicked");
            }
            delivered += 1;
        }
        delivered
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
