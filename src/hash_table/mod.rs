// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Chained hash tables over arena lists
//!
//! Two strategies share the same bucket array:
//!
//! - [`HashTable`] takes the hash function as an argument of every call,
//!   so hash functions can be compared on the same corpus without
//!   recompiling
//! - [`FastHashTable`] is bound to [`Crc32`](crate::hash::Crc32), scans
//!   chains eight bytes at a time and keeps its buckets linearized

mod baseline;
mod buckets;
mod fast;
mod stats;

pub use baseline::HashTable;
pub use fast::FastHashTable;
pub use stats::TableStats;

/// Position of a word inside a table
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Location {
    /// Bucket index
    pub bucket: usize,

    /// Slot index inside the bucket's list
    pub slot: usize,
}
