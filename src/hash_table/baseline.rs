// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{buckets::Buckets, stats, Location, TableStats};
use crate::{hash::HashFunction, list::ArenaList, loader, tokenizer, Config, Result};
use std::{io::Write, path::Path, time::Instant};

/// Chained hash table with a pluggable hash function
///
/// The hash function is passed to every call. Using different hash
/// functions on the same table places words in different buckets, so
/// lookups must use the hash function the words were inserted with.
#[derive(Debug)]
pub struct HashTable {
    buckets: Buckets,
    fold_case: bool,
}

impl HashTable {
    /// Creates a table with `bucket_count` empty buckets and otherwise
    /// default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongSize`](crate::Error::WrongSize) for a bucket
    /// count of 0 and [`Error::AllocFailed`](crate::Error::AllocFailed) if
    /// the buckets cannot be allocated.
    pub fn new(bucket_count: usize) -> Result<Self> {
        Self::with_config(Config::new().bucket_count(bucket_count))
    }

    /// Creates a table from the given config.
    ///
    /// # Errors
    ///
    /// Same as [`HashTable::new`].
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            buckets: Buckets::new(&config)?,
            fold_case: config.fold_case,
        })
    }

    /// Number of buckets
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    /// Number of stored words
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if no word is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the chain of the given bucket.
    #[must_use]
    pub fn bucket(&self, idx: usize) -> Option<&ArenaList> {
        self.buckets.get(idx)
    }

    /// Iterates over all buckets.
    pub fn buckets(&self) -> impl Iterator<Item = &ArenaList> + '_ {
        self.buckets.lists().iter()
    }

    /// Inserts the word into bucket `hash(word) mod bucket_count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListFull`](crate::Error::ListFull) if the bucket is
    /// full and cannot grow, or [`Error::NullPtr`](crate::Error::NullPtr)
    /// if the table was destroyed.
    pub fn insert(&mut self, word: &[u8], hasher: &dyn HashFunction) -> Result<Location> {
        self.buckets.insert(hasher.hash(word), word, false)
    }

    /// Finds the first occurrence of the word.
    #[must_use]
    pub fn search(&self, word: &[u8], hasher: &dyn HashFunction) -> Option<Location> {
        self.buckets.search(hasher.hash(word), word, false)
    }

    /// Returns `true` if the word is stored.
    #[must_use]
    pub fn contains(&self, word: &[u8], hasher: &dyn HashFunction) -> bool {
        self.search(word, hasher).is_some()
    }

    /// Counts the occurrences of the word.
    #[must_use]
    pub fn count(&self, word: &[u8], hasher: &dyn HashFunction) -> usize {
        self.buckets.count(hasher.hash(word), word)
    }

    /// Removes the first occurrence of the word.
    ///
    /// Returns `false` if the word is not stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullPtr`](crate::Error::NullPtr) if the table was destroyed.
    pub fn remove(&mut self, word: &[u8], hasher: &dyn HashFunction) -> Result<bool> {
        self.buckets.remove(hasher.hash(word), word, false)
    }

    /// Tokenizes the buffer and inserts every word, returning the number of words seen.
    ///
    /// Words are ASCII lowercased first if the table was configured to fold case.
    ///
    /// # Errors
    ///
    /// Fails like [`HashTable::insert`].
    pub fn fill_from_buffer(&mut self, buffer: &[u8], hasher: &dyn HashFunction) -> Result<usize> {
        let fold_case = self.fold_case;
        self.fill_words(buffer, fold_case, hasher)
    }

    fn fill_words(
        &mut self,
        buffer: &[u8],
        fold_case: bool,
        hasher: &dyn HashFunction,
    ) -> Result<usize> {
        tokenizer::try_for_each_word(buffer, fold_case, |word| {
            self.insert(word, hasher).map(|_| ())
        })
    }

    /// Loads the file and inserts every word, returning the number of words seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoArguments`](crate::Error::NoArguments) for an
    /// empty path, [`Error::UnableToOpenFile`](crate::Error::UnableToOpenFile)
    /// if the file cannot be read, and otherwise fails like [`HashTable::insert`].
    pub fn fill_from_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        hasher: &dyn HashFunction,
    ) -> Result<usize> {
        let path = path.as_ref();
        let start = Instant::now();

        let mut buffer = loader::read_buffer(path)?;

        if self.fold_case {
            tokenizer::fold_case(&mut buffer);
        }

        // NOTE: Already folded in place, no need to copy every word
        let count = self.fill_words(&buffer, false, hasher)?;

        log::debug!(
            "Filled {count} words from {} using {} in {:?}",
            path.display(),
            hasher.name(),
            start.elapsed(),
        );

        Ok(count)
    }

    /// Verifies every bucket.
    ///
    /// # Errors
    ///
    /// Returns the first structural error found, see [`ArenaList::verify`].
    pub fn verify(&self) -> Result<()> {
        self.buckets.verify()
    }

    /// Computes the chain length distribution.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        self.buckets.stats()
    }

    /// Writes one `bucket,length` CSV line per bucket.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn write_distribution<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        stats::write_distribution(self.buckets.lists(), writer)
    }

    /// Destroys every bucket, releasing all stored words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecreatingList`](crate::Error::RecreatingList) if
    /// the table was already destroyed.
    pub fn destruct(&mut self) -> Result<()> {
        self.buckets.destruct()
    }
}
