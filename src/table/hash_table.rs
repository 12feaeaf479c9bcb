//! Hash table storage with a single table-wide lock.

use crate::error::{Result, StoreError};
use crate::types::StoreStats;
use parking_lot::Mutex;

use super::hash::bucket_index;

/// One stored key/value pair. Replaced wholesale on update.
struct Entry {
    key: Box<str>,
    value: Vec<u8>,
}

/// Collision chain, most recently inserted entry first.
type Bucket = Vec<Entry>;

/// Exact-match storage of string keys to byte values.
pub struct HashTable {
    /// Fixed at construction.
    bucket_count: usize,

    buckets: Mutex<Box<[Bucket]>>,
}

impl HashTable {
    /// Create an empty table with `bucket_count` buckets.
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            bucket_count,
            buckets: Mutex::new((0..bucket_count).map(|_| Bucket::new()).collect()),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Insert or replace the value stored under `key`.
    ///
    /// The value is copied before the lock is taken. On allocation failure
    /// the table is left exactly as it was.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let value = copy_bytes(value)?;
        let index = bucket_index(key, self.bucket_count);

        let mut buckets = self.buckets.lock();
        let bucket = &mut buckets[index];

        if let Some(entry) = bucket.iter_mut().find(|e| &*e.key == key) {
            entry.value = value;
            return Ok(());
        }

        let key = copy_key(key)?;
        bucket
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationFailed {
                bytes: std::mem::size_of::<Entry>(),
            })?;
        bucket.insert(0, Entry { key, value });
        Ok(())
    }

    /// Two-phase read of the value stored under `key`.
    ///
    /// With no buffer, or a buffer shorter than the value, nothing is written
    /// and `BufferTooSmall` carries the exact length needed. Otherwise the
    /// value is copied to the front of `buf` and its length returned.
    pub fn get(&self, key: &str, buf: Option<&mut [u8]>) -> Result<usize> {
        let index = bucket_index(key, self.bucket_count);

        let buckets = self.buckets.lock();
        let entry = find(&buckets[index], key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        let len = entry.value.len();
        match buf {
            Some(buf) if buf.len() >= len => {
                buf[..len].copy_from_slice(&entry.value);
                Ok(len)
            }
            _ => Err(StoreError::BufferTooSmall { required: len }),
        }
    }

    /// Copy the whole value stored under `key` into a fresh vector.
    pub fn get_value(&self, key: &str) -> Result<Vec<u8>> {
        let index = bucket_index(key, self.bucket_count);

        let buckets = self.buckets.lock();
        let entry = find(&buckets[index], key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;
        copy_bytes(&entry.value)
    }

    /// Remove the entry for `key`. Other entries are never moved between buckets.
    pub fn delete(&self, key: &str) -> Result<()> {
        let index = bucket_index(key, self.bucket_count);

        let mut buckets = self.buckets.lock();
        let bucket = &mut buckets[index];
        match bucket.iter().position(|e| &*e.key == key) {
            Some(pos) => {
                bucket.remove(pos);
                Ok(())
            }
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let index = bucket_index(key, self.bucket_count);
        find(&self.buckets.lock()[index], key).is_some()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.buckets.lock().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.lock().iter().all(Vec::is_empty)
    }

    /// Table statistics. `subscriptions` is left at zero.
    pub fn stats(&self) -> StoreStats {
        let buckets = self.buckets.lock();
        let mut stats = StoreStats::default();
        for bucket in buckets.iter() {
            stats.entries += bucket.len();
            stats.value_bytes += bucket.iter().map(|e| e.value.len()).sum::<usize>();
            if !bucket.is_empty() {
                stats.occupied_buckets += 1;
            }
            stats.longest_chain = stats.longest_chain.max(bucket.len());
        }
        stats
    }
}

fn find<'a>(bucket: &'a [Entry], key: &str) -> Option<&'a Entry> {
    bucket.iter().find(|e| &*e.key == key)
}

fn copy_bytes(value: &[u8]) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(value.len())
        .map_err(|_| StoreError::AllocationFailed { bytes: value.len() })?;
    data.extend_from_slice(value);
    Ok(data)
}

fn copy_key(key: &str) -> Result<Box<str>> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(key.len())
        .map_err(|_| StoreError::AllocationFailed { bytes: key.len() })?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}
