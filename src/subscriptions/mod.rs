//! Subscription registry for change notifications.
//!
//! Observers register a callback and receive the key of every successful
//! `put` or `delete`. The registry has a fixed number of slots; a slot freed
//! by `unsubscribe` is reused, but its id never is.
//!
//! Fan-out is synchronous on the mutating thread, in slot order, under the
//! registry lock. The lock is reentrant, so a callback may call back into the
//! store from the same thread:
//! - a subscription removed during fan-out is not invoked afterwards
//! - a subscription added during fan-out misses the in-flight notification
//! - a mutation made from a callback runs its own nested fan-out
//!
//! Another thread calling `unsubscribe` waits for the in-flight fan-out to
//! finish, so once it returns the callback is never invoked again.
//!
//! # Example
//!
//! ```ignore
//! let registry = SubscriptionRegistry::new(MAX_SUBSCRIPTIONS);
//! let id = registry.subscribe(Arc::new(|key: &str| println!("changed: {key}")))?;
//! registry.notify("user:1");
//! registry.unsubscribe(id)?;
//! ```

mod registry;
mod types;

pub use registry::SubscriptionRegistry;
pub use types::{Callback, SubscriptionHandle};
