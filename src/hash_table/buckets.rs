// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{Location, TableStats};
use crate::{config::InsertPolicy, list::ArenaList, Config, Error, Result};

/// Fixed array of chains, addressed by precomputed hash values
///
/// Shared by both table strategies; they only differ in how the hash is
/// computed and how chains are scanned.
#[derive(Debug)]
pub struct Buckets {
    lists: Vec<ArenaList>,
    policy: InsertPolicy,
    len: usize,
}

impl Buckets {
    pub fn new(config: &Config) -> Result<Self> {
        if config.bucket_count == 0 {
            return Err(Error::WrongSize);
        }

        let mut lists = Vec::new();
        lists.try_reserve_exact(config.bucket_count)?;

        for _ in 0..config.bucket_count {
            let list = if config.growable_buckets {
                ArenaList::growable(config.bucket_capacity)?
            } else {
                ArenaList::with_capacity(config.bucket_capacity)?
            };
            lists.push(list);
        }

        log::debug!(
            "Created {} buckets of {} slots ({:?})",
            config.bucket_count,
            config.bucket_capacity,
            config.insert_policy,
        );

        Ok(Self {
            lists,
            policy: config.insert_policy,
            len: 0,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.lists.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn bucket_of(&self, hash: u64) -> usize {
        // NOTE: Bucket count is never 0, and the remainder fits into usize
        #[allow(clippy::cast_possible_truncation)]
        let idx = (hash % self.lists.len() as u64) as usize;
        idx
    }

    pub fn get(&self, bucket: usize) -> Option<&ArenaList> {
        self.lists.get(bucket)
    }

    pub fn lists(&self) -> &[ArenaList] {
        &self.lists
    }

    pub fn insert(&mut self, hash: u64, word: &[u8], batched: bool) -> Result<Location> {
        let bucket = self.bucket_of(hash);
        let policy = self.policy;

        let list = self.list_mut(bucket);

        if policy == InsertPolicy::Deduplicate {
            if let Some(slot) = find(list, word, batched) {
                return Ok(Location { bucket, slot });
            }
        }

        let slot = list.push_back(word)?;
        self.len += 1;

        Ok(Location { bucket, slot })
    }

    pub fn search(&self, hash: u64, word: &[u8], batched: bool) -> Option<Location> {
        let bucket = self.bucket_of(hash);
        let slot = find(self.lists.get(bucket)?, word, batched)?;
        Some(Location { bucket, slot })
    }

    pub fn count(&self, hash: u64, word: &[u8]) -> usize {
        self.lists
            .get(self.bucket_of(hash))
            .map_or(0, |list| list.iter().filter(|(_, item)| *item == word).count())
    }

    /// Removes the first occurrence of the word, returning `false` if there is none.
    pub fn remove(&mut self, hash: u64, word: &[u8], batched: bool) -> Result<bool> {
        let bucket = self.bucket_of(hash);
        let list = self.list_mut(bucket);

        if list.is_released() {
            return Err(Error::NullPtr);
        }

        let Some(slot) = find(list, word, batched) else {
            return Ok(false);
        };

        list.remove(slot)?;
        self.len -= 1;

        Ok(true)
    }

    /// Linearizes every bucket that is not linear yet, returning how many were rewritten.
    pub fn compact(&mut self) -> Result<usize> {
        let mut rewritten = 0;

        for list in self.lists.iter_mut().filter(|list| !list.is_linear()) {
            list.linearize()?;
            rewritten += 1;
        }

        Ok(rewritten)
    }

    pub fn verify(&self) -> Result<()> {
        let mut total = 0;

        for list in &self.lists {
            list.verify()?;
            total += list.len();
        }

        if total == self.len {
            Ok(())
        } else {
            Err(Error::WrongSize)
        }
    }

    pub fn stats(&self) -> TableStats {
        TableStats::collect(&self.lists)
    }

    pub fn destruct(&mut self) -> Result<()> {
        for list in &mut self.lists {
            list.destruct()?;
        }

        self.len = 0;

        Ok(())
    }

    // NOTE: `bucket_of` always yields an index inside the array
    #[allow(clippy::indexing_slicing)]
    fn list_mut(&mut self, bucket: usize) -> &mut ArenaList {
        &mut self.lists[bucket]
    }
}

fn find(list: &ArenaList, word: &[u8], batched: bool) -> Option<usize> {
    if batched {
        list.search_batched(word)
    } else {
        list.search(word)
    }
}
