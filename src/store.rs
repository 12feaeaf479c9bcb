//! Main Store struct tying the table and the subscription registry together.

use crate::error::{Result, StoreError};
use crate::subscriptions::{SubscriptionHandle, SubscriptionRegistry};
use crate::table::HashTable;
use crate::types::{StoreConfig, StoreStats, SubscriptionId};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// The in-memory key-value store.
///
/// Provides a unified interface for:
/// - Storing, reading and deleting byte values under string keys
/// - Notifying observers after every successful mutation
///
/// The table lock and the registry lock are never held together: a mutation
/// finishes and releases the table before any observer is notified. Because
/// of that, observers may see notifications for concurrent mutations in a
/// different order than the mutations were applied.
pub struct Store {
    /// Store configuration.
    config: StoreConfig,

    /// Key/value entries.
    table: HashTable,

    /// Change observers.
    subscriptions: SubscriptionRegistry,
}

impl Store {
    /// Open a fresh, empty store with default sizing.
    ///
    /// `path` is kept for reporting only; nothing touches the filesystem.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Open a fresh, empty store with explicit sizing.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        if config.bucket_count == 0 {
            return Err(StoreError::InvalidArgument(
                "bucket_count must be at least 1".to_string(),
            ));
        }
        if config.max_subscriptions == 0 {
            return Err(StoreError::InvalidArgument(
                "max_subscriptions must be at least 1".to_string(),
            ));
        }

        debug!(
            path = %config.path.display(),
            buckets = config.bucket_count,
            max_subscriptions = config.max_subscriptions,
            "opened store"
        );

        Ok(Self {
            table: HashTable::new(config.bucket_count),
            subscriptions: SubscriptionRegistry::new(config.max_subscriptions),
            config,
        })
    }

    /// Release every entry and subscription.
    pub fn close(self) {
        debug!(
            path = %self.config.path.display(),
            entries = self.table.len(),
            subscriptions = self.subscriptions.len(),
            "closing store"
        );
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Key/Value Operations ---

    /// Store `value` under `key`, replacing any previous value, then notify
    /// every active subscription.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.table.put(key, value)?;
        self.notify(key);
        Ok(())
    }

    /// Two-phase read.
    ///
    /// Pass `None` to learn the value's size: the call fails with
    /// [`StoreError::BufferTooSmall`] carrying the exact length. Pass a
    /// buffer at least that long to receive the value; the returned length
    /// may be shorter than the buffer. A short buffer is never written to.
    pub fn get(&self, key: &str, buf: Option<&mut [u8]>) -> Result<usize> {
        self.table.get(key, buf)
    }

    /// Read the whole value into a new vector.
    pub fn get_value(&self, key: &str) -> Result<Vec<u8>> {
        self.table.get_value(key)
    }

    /// Remove `key`, then notify every active subscription.
    ///
    /// Observers get the same notification as for `put`; a follow-up `get`
    /// returning `KeyNotFound` is how they tell a removal apart.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.table.delete(key)?;
        self.notify(key);
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // --- Subscriptions ---

    /// Register a callback invoked with the key of every successful mutation.
    ///
    /// Callbacks run synchronously on the mutating thread and block it until
    /// they return. They may call back into the store from that thread.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.subscriptions.subscribe(Arc::new(callback))?;
        debug!(%id, "subscribed");
        Ok(id)
    }

    /// Register a subscription that forwards changed keys into a bounded
    /// channel.
    ///
    /// A key is dropped for this handle when its buffer is full.
    pub fn subscribe_channel(&self, buffer_size: usize) -> Result<SubscriptionHandle> {
        let (sender, receiver) = crossbeam_channel::bounded(buffer_size.max(1));
        let id = self.subscribe(move |key: &str| {
            if sender.try_send(key.to_string()).is_err() {
                trace!(key, "channel subscriber full or gone, key dropped");
            }
        })?;
        Ok(SubscriptionHandle { id, receiver })
    }

    /// Remove a subscription. Once this returns its callback is never
    /// invoked again.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.subscriptions.unsubscribe(id)?;
        debug!(%id, "unsubscribed");
        Ok(())
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Current table and registry statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            subscriptions: self.subscriptions.len(),
            ..self.table.stats()
        }
    }

    fn notify(&self, key: &str) {
        let delivered = self.subscriptions.notify(key);
        trace!(key, delivered, "notified subscribers");
    }
}
