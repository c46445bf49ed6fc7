// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{list::DEFAULT_CAPACITY, FastHashTable, HashTable, Result};

/// Number of buckets of a default table (prime)
pub const HASH_TABLE_SIZE: usize = 9_973;

/// Removals between two automatic compactions of a [`FastHashTable`]
const DEFAULT_COMPACTION_INTERVAL: usize = 1_024;

/// What an insert does if the word is already in its bucket
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum InsertPolicy {
    /// Always append, so every occurrence is stored (multiset)
    #[default]
    Append,

    /// Keep the existing entry and do not store the word again (set)
    Deduplicate,
}

/// Hash table configuration builder
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Number of buckets
    #[doc(hidden)]
    pub bucket_count: usize,

    /// Initial slot count of each bucket
    #[doc(hidden)]
    pub bucket_capacity: usize,

    /// Buckets double when full instead of rejecting inserts
    #[doc(hidden)]
    pub growable_buckets: bool,

    /// Duplicate handling
    #[doc(hidden)]
    pub insert_policy: InsertPolicy,

    /// Removals between automatic compactions (0 = never)
    #[doc(hidden)]
    pub compaction_interval: usize,

    /// Case fold the text before tokenizing it
    #[doc(hidden)]
    pub fold_case: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_count: HASH_TABLE_SIZE,
            bucket_capacity: DEFAULT_CAPACITY,
            growable_buckets: true,
            insert_policy: InsertPolicy::Append,
            compaction_interval: DEFAULT_COMPACTION_INTERVAL,
            fold_case: false,
        }
    }
}

impl Config {
    /// Initializes a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of buckets.
    ///
    /// The bucket count is fixed for the lifetime of the table, a prime
    /// gives the best distribution for weak hash functions.
    ///
    /// Defaults to 9973.
    #[must_use]
    pub fn bucket_count(mut self, n: usize) -> Self {
        self.bucket_count = n;
        self
    }

    /// Sets the initial slot count of every bucket.
    ///
    /// Defaults to 120.
    #[must_use]
    pub fn bucket_capacity(mut self, n: usize) -> Self {
        self.bucket_capacity = n;
        self
    }

    /// If `false`, inserting into a full bucket fails with
    /// [`Error::ListFull`](crate::Error::ListFull).
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn growable_buckets(mut self, flag: bool) -> Self {
        self.growable_buckets = flag;
        self
    }

    /// Sets the duplicate handling.
    ///
    /// Defaults to [`InsertPolicy::Append`].
    #[must_use]
    pub fn insert_policy(mut self, policy: InsertPolicy) -> Self {
        self.insert_policy = policy;
        self
    }

    /// Sets after how many removals a [`FastHashTable`] linearizes its
    /// buckets. 0 disables automatic compaction.
    ///
    /// Defaults to 1024.
    #[must_use]
    pub fn compaction_interval(mut self, n: usize) -> Self {
        self.compaction_interval = n;
        self
    }

    /// If `true`, words are ASCII lowercased before they are inserted,
    /// for both file and buffer fills.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn fold_case(mut self, flag: bool) -> Self {
        self.fold_case = flag;
        self
    }

    /// Opens a baseline table with a caller-selected hash function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongSize`](crate::Error::WrongSize) for a bucket
    /// count of 0 and [`Error::AllocFailed`](crate::Error::AllocFailed) if
    /// the buckets cannot be allocated.
    pub fn open(self) -> Result<HashTable> {
        HashTable::with_config(self)
    }

    /// Opens a table bound to the hardware CRC-32C hash.
    ///
    /// # Errors
    ///
    /// Same as [`Config::open`].
    pub fn open_fast(self) -> Result<FastHashTable> {
        FastHashTable::with_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn config_defaults() {
        let config = Config::new();
        assert_eq!(HASH_TABLE_SIZE, config.bucket_count);
        assert_eq!(120, config.bucket_capacity);
        assert!(config.growable_buckets);
        assert_eq!(InsertPolicy::Append, config.insert_policy);
        assert!(!config.fold_case);
    }

    #[test]
    fn config_builder() -> crate::Result<()> {
        let table = Config::new()
            .bucket_count(10)
            .bucket_capacity(4)
            .insert_policy(InsertPolicy::Deduplicate)
            .open()?;

        assert_eq!(10, table.bucket_count());
        assert!(table.is_empty());

        Ok(())
    }

    #[test]
    fn config_zero_buckets() {
        assert!(matches!(
            Config::new().bucket_count(0).open(),
            Err(crate::Error::WrongSize)
        ));
        assert!(matches!(
            Config::new().bucket_count(0).open_fast(),
            Err(crate::Error::WrongSize)
        ));
    }
}
