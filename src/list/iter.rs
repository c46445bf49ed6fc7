// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{ArenaList, Link};

/// Iterator over the elements of an [`ArenaList`] in logical order
///
/// Yields `(slot index, value)` pairs.
pub struct Iter<'a> {
    list: &'a ArenaList,
    cursor: Link,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(list: &'a ArenaList) -> Self {
        Self {
            list,
            cursor: list.head,
            remaining: list.len,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        // NOTE: Bounded by `len`, so a damaged chain cannot loop forever
        if self.remaining == 0 {
            return None;
        }

        let idx = self.cursor.get()?;
        let slot = self.list.slots.get(idx)?;
        let value = slot.value.as_deref()?;

        self.cursor = slot.next;
        self.remaining -= 1;

        Some((idx, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a ArenaList {
    type Item = (usize, &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
