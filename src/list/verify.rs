// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Structural self-check of an [`ArenaList`]

use super::{ArenaList, Link};
use crate::{Error, Result};

/// Marks `idx` as visited, returning `false` if it was already seen or is out of range.
fn visit(seen: &mut [bool], idx: usize) -> bool {
    match seen.get_mut(idx) {
        Some(flag) if !*flag => {
            *flag = true;
            true
        }
        _ => false,
    }
}

impl ArenaList {
    /// Checks every structural invariant of the list.
    ///
    /// This walks both chains, so it is meant for tests and debug
    /// assertions, not for the hot path.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant:
    ///
    /// - [`Error::WrongSize`]: `len` exceeds the capacity or disagrees with the chain
    /// - [`Error::WrongHead`]: head missing, dangling or with a predecessor
    /// - [`Error::WrongTail`]: tail is not the last chain element
    /// - [`Error::WrongFreeHead`]: free list reaches an occupied or repeated slot
    /// - [`Error::ListIsDamaged`]: broken back links, or slots on neither chain
    ///
    /// [`Error::NullPtr`] is returned for a destroyed list.
    pub fn verify(&self) -> Result<()> {
        self.ensure_live()?;

        let capacity = self.slots.len();

        if self.len > capacity {
            return Err(Error::WrongSize);
        }

        self.verify_head()?;

        let mut seen = vec![false; capacity];

        let mut count = 0;
        let mut prev = Link::NONE;
        let mut cursor = self.head;

        while let Some(idx) = cursor.get() {
            if !visit(&mut seen, idx) {
                return Err(Error::ListIsDamaged);
            }

            let Some(slot) = self.slots.get(idx) else {
                return Err(Error::ListIsDamaged);
            };

            if slot.value.is_none() || slot.prev != prev {
                return Err(Error::ListIsDamaged);
            }

            if self.is_linear && idx != count {
                return Err(Error::ListIsDamaged);
            }

            count += 1;

            if count > self.len {
                return Err(Error::WrongSize);
            }

            prev = cursor;
            cursor = slot.next;
        }

        if count != self.len {
            return Err(Error::WrongSize);
        }

        if self.tail != prev {
            return Err(Error::WrongTail);
        }

        let mut free = 0;
        let mut cursor = self.free_head;

        while let Some(idx) = cursor.get() {
            if !visit(&mut seen, idx) {
                return Err(Error::WrongFreeHead);
            }

            let Some(slot) = self.slots.get(idx) else {
                return Err(Error::WrongFreeHead);
            };

            if slot.value.is_some() {
                return Err(Error::WrongFreeHead);
            }

            free += 1;
            cursor = slot.next;
        }

        if count + free != capacity {
            return Err(Error::ListIsDamaged);
        }

        Ok(())
    }

    fn verify_head(&self) -> Result<()> {
        let Some(head) = self.head.get() else {
            return if self.len > 0 {
                Err(Error::WrongHead)
            } else if self.tail.is_some() {
                Err(Error::WrongTail)
            } else {
                Ok(())
            };
        };

        match self.slots.get(head) {
            Some(slot) if slot.value.is_some() && slot.prev.is_none() => Ok(()),
            _ => Err(Error::WrongHead),
        }
    }
}
