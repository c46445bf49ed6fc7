// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A word-frequency and membership index for large text corpora.
//!
//! ##### About
//!
//! Text is loaded into a buffer, split into words, and every word is stored
//! in a chained hash table with a fixed number of buckets. Each bucket is an
//! [`ArenaList`]: a doubly linked list whose nodes live in one contiguous
//! array and are linked by index, with a free list for slot reuse. This
//! avoids one heap allocation per node and keeps chains compact.
//!
//! Two table strategies are provided:
//!
//! - [`HashTable`] takes the [`HashFunction`] as an argument, so hash
//!   functions can be compared on the same corpus
//! - [`FastHashTable`] is bound to hardware accelerated CRC-32C, compares
//!   words eight bytes at a time and keeps its chains linearized
//!
//! Tables never resize; the bucket count is chosen at construction. By
//! default every occurrence of a word is stored (see [`InsertPolicy`]).
//!
//! ```
//! use word_index::{hash::AsciiSum, HashTable};
//!
//! let mut table = HashTable::new(10)?;
//!
//! for word in ["apple", "banana", "apple"] {
//!     table.insert(word.as_bytes(), &AsciiSum)?;
//! }
//!
//! assert_eq!(2, table.count(b"apple", &AsciiSum));
//! assert!(table.search(b"cherry", &AsciiSum).is_none());
//! # Ok::<(), word_index::Error>(())
//! ```

#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]
#![warn(clippy::redundant_feature_names)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[doc(hidden)]
pub type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

/// Configuration
pub mod config;

mod error;

pub mod hash;

mod hash_table;

pub mod list;

/// Loading text files
pub mod loader;

pub mod tokenizer;

pub use {
    config::{Config, InsertPolicy, HASH_TABLE_SIZE},
    error::{Error, Result},
    hash::{HashFunction, HashKind},
    hash_table::{FastHashTable, HashTable, Location, TableStats},
    list::ArenaList,
};
