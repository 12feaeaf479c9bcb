//! # Ditto
//!
//! A thread-safe, in-memory key-value store with change notifications.
//!
//! ## Core Concepts
//!
//! - **Entries**: Opaque byte values under string keys, in a bucketed hash
//!   table guarded by one lock
//! - **Two-phase get**: Query a value's exact size, then read it into a
//!   buffer of that size; values are never truncated
//! - **Subscriptions**: Up to 100 observers called synchronously with the key
//!   of every successful `put` or `delete`
//!
//! ## C ABI
//!
//! The `ffi` feature exports the `ditto_*` functions declared in
//! `include/ditto.h`. Its tests only build with the feature enabled:
//! `cargo test --features ffi`.
//!
//! ## Example
//!
//! ```ignore
//! use ditto::{Store, StoreError};
//!
//! let store = Store::open("memory")?;
//! let id = store.subscribe(|key: &str| println!("changed: {key}"))?;
//!
//! store.put("greeting", b"hello")?;
//!
//! let required = match store.get("greeting", None) {
//!     Err(StoreError::BufferTooSmall { required }) => required,
//!     other => unreachable!("{other:?}"),
//! };
//! let mut buf = vec![0; required];
//! let len = store.get("greeting", Some(&mut buf))?;
//! assert_eq!(&buf[..len], b"hello");
//!
//! store.unsubscribe(id)?;
//! store.close();
//! ```

pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod store;
pub mod subscriptions;
pub mod table;
pub mod types;

// Re-exports
pub use error::{Result, Status, StoreError};
pub use store::Store;
pub use subscriptions::{Callback, SubscriptionHandle, SubscriptionRegistry};
pub use table::{bucket_index, HashTable};
pub use types::*;
