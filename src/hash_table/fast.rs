// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{buckets::Buckets, stats, Location, TableStats};
use crate::{
    hash::{Crc32, HashFunction},
    list::ArenaList,
    loader, tokenizer, Config, Result,
};
use std::{io::Write, path::Path, time::Instant};

/// Chained hash table bound to CRC-32C
///
/// Chains are scanned with [`ArenaList::search_batched`], and buckets are
/// linearized after every fill and every `compaction_interval` removals,
/// so lookups walk the arenas front to back.
#[derive(Debug)]
pub struct FastHashTable {
    buckets: Buckets,
    hasher: Crc32,

    fold_case: bool,

    compaction_interval: usize,
    removals_since_compaction: usize,
}

impl FastHashTable {
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
    /// Same as [`FastHashTable::new`].
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            buckets: Buckets::new(&config)?,
            hasher: Crc32::new(),
            fold_case: config.fold_case,
            compaction_interval: config.compaction_interval,
            removals_since_compaction: 0,
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

    /// Returns `true` if the CRC-32C hardware instruction is used.
    #[must_use]
    pub fn is_accelerated(&self) -> bool {
        self.hasher.is_accelerated()
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

    /// Inserts the word into bucket `crc32c(word) mod bucket_count`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListFull`](crate::Error::ListFull) if the bucket is
    /// full and cannot grow, or [`Error::NullPtr`](crate::Error::NullPtr)
    /// if the table was destroyed.
    pub fn insert(&mut self, word: &[u8]) -> Result<Location> {
        self.buckets.insert(self.hasher.hash(word), word, true)
    }

    /// Finds the first occurrence of the word.
    #[must_use]
    pub fn search(&self, word: &[u8]) -> Option<Location> {
        self.buckets.search(self.hasher.hash(word), word, true)
    }

    /// Returns `true` if the word is stored.
    #[must_use]
    pub fn contains(&self, word: &[u8]) -> bool {
        self.search(word).is_some()
    }

    /// Counts the occurrences of the word.
    #[must_use]
    pub fn count(&self, word: &[u8]) -> usize {
        self.buckets.count(self.hasher.hash(word), word)
    }

    /// Removes the first occurrence of the word.
    ///
    /// Returns `false` if the word is not stored. Every
    /// `compaction_interval` removals, the table is [compacted](Self::compact).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullPtr`](crate::Error::NullPtr) if the table was destroyed.
    pub fn remove(&mut self, word: &[u8]) -> Result<bool> {
        let removed = self.buckets.remove(self.hasher.hash(word), word, true)?;

        if removed {
            self.removals_since_compaction += 1;

            if self.compaction_interval > 0
                && self.removals_since_compaction >= self.compaction_interval
            {
                self.compact()?;
            }
        }

        Ok(removed)
    }

    /// Linearizes every bucket whose arena order drifted from its chain order.
    ///
    /// Returns the number of rewritten buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`](crate::Error::AllocFailed) if a new
    /// arena cannot be reserved.
    pub fn compact(&mut self) -> Result<usize> {
        let rewritten = self.buckets.compact()?;
        self.removals_since_compaction = 0;

        log::trace!("Compacted {rewritten} buckets");

        Ok(rewritten)
    }

    /// Tokenizes the buffer, inserts every word and compacts the table.
    ///
    /// Returns the number of words seen. Words are ASCII lowercased first
    /// if the table was configured to fold case.
    ///
    /// # Errors
    ///
    /// Fails like [`FastHashTable::insert`].
    pub fn fill_from_buffer(&mut self, buffer: &[u8]) -> Result<usize> {
        let fold_case = self.fold_case;
        self.fill_words(buffer, fold_case)
    }

    fn fill_words(&mut self, buffer: &[u8], fold_case: bool) -> Result<usize> {
        let count =
            tokenizer::try_for_each_word(buffer, fold_case, |word| self.insert(word).map(|_| ()))?;

        self.compact()?;

        Ok(count)
    }

    /// Loads the file, inserts every word and compacts the table.
    ///
    /// Returns the number of words seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoArguments`](crate::Error::NoArguments) for an
    /// empty path, [`Error::UnableToOpenFile`](crate::Error::UnableToOpenFile)
    /// if the file cannot be read, and otherwise fails like [`FastHashTable::insert`].
    pub fn fill_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let start = Instant::now();

        let mut buffer = loader::read_buffer(path)?;

        if self.fold_case {
            tokenizer::fold_case(&mut buffer);
        }

        // NOTE: Already folded in place, no need to copy every word
        let count = self.fill_words(&buffer, false)?;

        log::debug!(
            "Filled {count} words from {} using crc32 (accelerated={}) in {:?}",
            path.display(),
            self.hasher.is_accelerated(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::InsertPolicy, Error, HashTable};
    use test_log::test;

    #[test]
    fn fast_table_apple_banana() -> crate::Result<()> {
        let mut table = FastHashTable::new(10)?;

        for word in [&b"apple"[..], b"banana", b"apple"] {
            table.insert(word)?;
        }

        assert_eq!(3, table.buckets().map(ArenaList::len).sum::<usize>());
        assert!(table.contains(b"apple"));
        assert_eq!(2, table.count(b"apple"));
        assert_eq!(None, table.search(b"cherry"));
        table.verify()?;

        Ok(())
    }

    #[test]
    fn fast_table_matches_baseline_with_crc32() -> crate::Result<()> {
        let text = b"one two three two three three four four four four";

        let mut fast = FastHashTable::new(31)?;
        let mut baseline = HashTable::new(31)?;

        fast.fill_from_buffer(text)?;
        baseline.fill_from_buffer(text, &Crc32::portable())?;

        for word in [&b"one"[..], b"two", b"three", b"four", b"five"] {
            assert_eq!(baseline.count(word, &Crc32::portable()), fast.count(word));
            assert_eq!(baseline.search(word, &Crc32::portable()), fast.search(word));
        }

        Ok(())
    }

    #[test]
    fn fast_table_compacts_after_removals() -> crate::Result<()> {
        let mut table = Config::new()
            .bucket_count(1)
            .compaction_interval(2)
            .open_fast()?;

        for word in [&b"a"[..], b"b", b"c", b"d"] {
            table.insert(word)?;
        }

        assert!(table.remove(b"a")?);
        assert!(!table.bucket(0).is_some_and(ArenaList::is_linear));

        assert!(table.remove(b"c")?);
        let bucket = table.bucket(0).expect("bucket 0 exists");
        assert!(bucket.is_linear());
        assert_eq!("[b, d]", bucket.to_string());
        table.verify()?;

        assert!(!table.remove(b"zzz")?);

        Ok(())
    }

    #[test]
    fn fast_table_compact_reports_rewrites() -> crate::Result<()> {
        let mut table = Config::new()
            .bucket_count(3)
            .compaction_interval(0)
            .open_fast()?;

        table.fill_from_buffer(b"a b c d e f g h")?;
        assert_eq!(0, table.compact()?);

        for word in [&b"a"[..], b"b", b"c"] {
            table.remove(word)?;
        }
        let dirty = table.buckets().filter(|list| !list.is_linear()).count();
        assert_eq!(dirty, table.compact()?);
        assert_eq!(0, table.buckets().filter(|list| !list.is_linear()).count());
        table.verify()?;

        Ok(())
    }

    #[test]
    fn fast_table_deduplicate() -> crate::Result<()> {
        let mut table = Config::new()
            .bucket_count(7)
            .insert_policy(InsertPolicy::Deduplicate)
            .open_fast()?;

        let count = table.fill_from_buffer(b"to be or not to be")?;
        assert_eq!(6, count);
        assert_eq!(4, table.len());

        Ok(())
    }

    #[test]
    fn fast_table_fold_case_from_buffer() -> crate::Result<()> {
        let mut table = Config::new().bucket_count(7).fold_case(true).open_fast()?;

        assert_eq!(3, table.fill_from_buffer(b"It it IT")?);
        assert_eq!(3, table.count(b"it"));
        assert_eq!(0, table.count(b"It"));

        Ok(())
    }

    #[test]
    fn fast_table_destruct() -> crate::Result<()> {
        let mut table = FastHashTable::new(2)?;
        table.insert(b"a")?;

        table.destruct()?;
        assert!(matches!(table.destruct(), Err(Error::RecreatingList)));
        assert!(matches!(table.insert(b"a"), Err(Error::NullPtr)));

        Ok(())
    }
}
