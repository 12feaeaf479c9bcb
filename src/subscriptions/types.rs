//! Subscription types for change notifications.

use crate::types::SubscriptionId;
use std::sync::Arc;

/// Observer invoked with the key of every successful mutation.
pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// An occupied registry slot.
pub(crate) struct Subscription {
    pub id: SubscriptionId,
    pub callback: Callback,
}

/// Handle for a channel-backed subscription.
///
/// Occupies one registry slot until `Store::unsubscribe(handle.id)` is
/// called; dropping the handle alone does not free the slot.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Keys of mutated entries, in delivery order.
    pub receiver: crossbeam_channel::Receiver<String>,
}

impl SubscriptionHandle {
    /// Receive the next changed key (blocking).
    pub fn recv(&self) -> Result<String, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a changed key (non-blocking).
    pub fn try_recv(&self) -> Result<String, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<String, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
