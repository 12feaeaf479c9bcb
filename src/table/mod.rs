//! Bucketed hash table holding every key/value entry.
//!
//! The table is a fixed array of buckets, each a chain of entries whose key
//! hashes to that bucket. A single mutex covers the whole table, so every
//! `put`, `get` and `delete` observes entries either fully present or fully
//! absent.

mod hash;
mod hash_table;

pub use hash::bucket_index;
pub use hash_table::HashTable;
