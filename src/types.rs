//! Core types for the key-value store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Library version reported by [`version`].
pub const VERSION: &str = "1.0.0";

/// Number of hash buckets in a default table.
pub const DEFAULT_BUCKET_COUNT: usize = 256;

/// Maximum number of concurrently active subscriptions in a default store.
pub const MAX_SUBSCRIPTIONS: usize = 100;

/// Static version identifier. Takes no lock and has no side effects.
pub fn version() -> &'static str {
    VERSION
}

/// Identifier for a subscription. Starts at 1 and is never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Accepted for symmetry with persistent stores. Nothing is read from or
    /// written to this path.
    pub path: PathBuf,

    /// Number of hash buckets. Fixed for the lifetime of the store.
    pub bucket_count: usize,

    /// Hard ceiling on concurrently active subscriptions.
    pub max_subscriptions: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./ditto"),
            bucket_count: DEFAULT_BUCKET_COUNT,
            max_subscriptions: MAX_SUBSCRIPTIONS,
        }
    }
}

/// Point-in-time statistics for a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored entries.
    pub entries: usize,
    /// Sum of all value lengths in bytes.
    pub value_bytes: usize,
    /// Buckets holding at least one entry.
    pub occupied_buckets: usize,
    /// Length of the longest collision chain.
    pub longest_chain: usize,
    /// Active subscriptions.
    pub subscriptions: usize,
}
