// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Arena-backed doubly linked list
//!
//! All elements live in one contiguous array of slots. Slots are linked by
//! index, forming two chains over the same storage: the logical chain of
//! elements (doubly linked, from `head` to `tail`) and the free list
//! (singly linked through `next`, starting at `free_head`).
//!
//! Every hash bucket owns one of these, so there are thousands of them
//! living at once; keeping them allocation-light matters.

mod dump;
mod iter;
mod link;
mod verify;

pub use iter::Iter;
pub use link::MAX_CAPACITY;

use crate::{Error, Result};
use link::Link;

/// Default capacity of a freshly created list
pub const DEFAULT_CAPACITY: usize = 120;

/// Smallest arena a growable list grows to
const MIN_GROWTH: usize = 8;

#[derive(Debug)]
struct Slot {
    /// `None` iff the slot is on the free list
    value: Option<Box<[u8]>>,

    next: Link,
    prev: Link,
}

impl Slot {
    fn free(next: Link) -> Self {
        Self {
            value: None,
            next,
            prev: Link::NONE,
        }
    }
}

/// Index-addressed doubly linked list of owned byte strings
///
/// Element handles are plain slot indices. An index stays valid until the
/// element is removed or the list is [linearized](ArenaList::linearize).
#[derive(Debug)]
pub struct ArenaList {
    slots: Vec<Slot>,

    len: usize,

    head: Link,
    tail: Link,
    free_head: Link,

    /// Double the arena instead of failing when it runs out of slots
    growable: bool,

    /// Physical slot order equals logical order
    is_linear: bool,

    /// Set by [`ArenaList::destruct`]
    released: bool,
}

impl ArenaList {
    /// Creates a fixed-capacity list.
    ///
    /// Pushing more than `capacity` elements fails with [`Error::ListFull`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`] if the arena cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::create(capacity, false)
    }

    /// Creates a list that doubles its arena whenever it runs full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`] if the arena cannot be reserved.
    pub fn growable(capacity: usize) -> Result<Self> {
        Self::create(capacity, true)
    }

    fn create(capacity: usize, growable: bool) -> Result<Self> {
        if capacity > MAX_CAPACITY {
            return Err(Error::AllocFailed);
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.extend((0..capacity).map(|idx| Slot::free(next_free(idx, capacity))));

        Ok(Self {
            slots,
            len: 0,
            head: Link::NONE,
            tail: Link::NONE,
            free_head: if capacity > 0 { Link::to(0) } else { Link::NONE },
            growable,
            is_linear: true,
            released: false,
        })
    }

    /// Number of elements in the list
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the arena
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the arena doubles instead of running full
    #[must_use]
    pub fn is_growable(&self) -> bool {
        self.growable
    }

    /// Returns `true` if slot `k` holds the `k`-th element for every element.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.is_linear
    }

    /// Returns `true` if the list has been destroyed.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Slot index of the first element
    #[must_use]
    pub fn head(&self) -> Option<usize> {
        self.head.get()
    }

    /// Slot index of the last element
    #[must_use]
    pub fn tail(&self) -> Option<usize> {
        self.tail.get()
    }

    /// Returns the value stored at the given slot, if it is occupied.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.slots.get(index)?.value.as_deref()
    }

    /// Slot index of the element following the one at `index`
    #[must_use]
    pub fn next_of(&self, index: usize) -> Option<usize> {
        let slot = self.slots.get(index)?;
        slot.value.as_ref()?;
        slot.next.get()
    }

    /// Slot index of the element preceding the one at `index`
    #[must_use]
    pub fn prev_of(&self, index: usize) -> Option<usize> {
        let slot = self.slots.get(index)?;
        slot.value.as_ref()?;
        slot.prev.get()
    }

    /// Iterates over `(slot index, value)` pairs in logical order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Appends a copy of `value` as the new tail and returns its slot index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ListFull`] if a fixed-capacity list has no free slot,
    /// [`Error::AllocFailed`] if a growable list cannot grow and
    /// [`Error::NullPtr`] if the list was destroyed.
    pub fn push_back(&mut self, value: &[u8]) -> Result<usize> {
        self.ensure_live()?;

        let idx = self.take_free_slot()?;
        let prev_tail = self.tail;

        *self.slot_mut(idx) = Slot {
            value: Some(value.into()),
            next: Link::NONE,
            prev: prev_tail,
        };

        match prev_tail.get() {
            Some(tail) => {
                self.slot_mut(tail).next = Link::to(idx);

                if tail + 1 != idx {
                    self.is_linear = false;
                }
            }
            None => {
                self.head = Link::to(idx);

                if idx != 0 {
                    self.is_linear = false;
                }
            }
        }

        self.tail = Link::to(idx);
        self.len += 1;

        Ok(idx)
    }

    /// Inserts a copy of `value` right after the element at slot `index`
    /// and returns the slot index of the new element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongIndex`] if `index` does not hold an element,
    /// otherwise fails like [`ArenaList::push_back`].
    pub fn insert(&mut self, index: usize, value: &[u8]) -> Result<usize> {
        self.ensure_live()?;

        if self.get(index).is_none() {
            return Err(Error::WrongIndex(index));
        }

        if self.tail == Link::to(index) {
            return self.push_back(value);
        }

        let idx = self.take_free_slot()?;
        let next = self.slot(index).next;

        *self.slot_mut(idx) = Slot {
            value: Some(value.into()),
            next,
            prev: Link::to(index),
        };

        self.slot_mut(index).next = Link::to(idx);

        // NOTE: `index` is not the tail, so it has a successor
        if let Some(next) = next.get() {
            self.slot_mut(next).prev = Link::to(idx);
        }

        self.len += 1;
        self.is_linear = false;

        Ok(idx)
    }

    /// Detaches the element at slot `index` and returns its value.
    ///
    /// The slot goes back to the front of the free list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongIndex`] if `index` is outside the arena and
    /// [`Error::NothingToRemove`] if the slot is free. The list is left
    /// untouched in both cases.
    pub fn remove(&mut self, index: usize) -> Result<Box<[u8]>> {
        self.ensure_live()?;

        let free_head = self.free_head;

        let slot = self.slots.get_mut(index).ok_or(Error::WrongIndex(index))?;
        let value = slot.value.take().ok_or(Error::NothingToRemove)?;

        let prev = std::mem::replace(&mut slot.prev, Link::NONE);
        let next = std::mem::replace(&mut slot.next, free_head);

        self.free_head = Link::to(index);

        match prev.get() {
            Some(prev) => self.slot_mut(prev).next = next,
            None => self.head = next,
        }

        match next.get() {
            Some(next) => self.slot_mut(next).prev = prev,
            None => self.tail = prev,
        }

        self.len -= 1;

        // NOTE: Dropping the tail keeps every remaining element in place,
        // and the freed slot is exactly the next one a push will take
        if next.is_some() {
            self.is_linear = false;
        }

        Ok(value)
    }

    /// Removes the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRemove`] if the list is empty.
    pub fn pop_front(&mut self) -> Result<Box<[u8]>> {
        self.ensure_live()?;
        let head = self.head.get().ok_or(Error::NothingToRemove)?;
        self.remove(head)
    }

    /// Removes the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToRemove`] if the list is empty.
    pub fn pop_back(&mut self) -> Result<Box<[u8]>> {
        self.ensure_live()?;
        let tail = self.tail.get().ok_or(Error::NothingToRemove)?;
        self.remove(tail)
    }

    /// Returns the slot index of the first element equal to `value`.
    #[must_use]
    pub fn search(&self, value: &[u8]) -> Option<usize> {
        self.iter()
            .find(|(_, item)| *item == value)
            .map(|(idx, _)| idx)
    }

    /// Same as [`ArenaList::search`], but compares eight bytes per step and
    /// scans the arena front to back when the list is linear.
    #[must_use]
    pub fn search_batched(&self, value: &[u8]) -> Option<usize> {
        if self.is_linear {
            return self
                .slots
                .iter()
                .take(self.len)
                .position(|slot| slot.value.as_deref().is_some_and(|item| wide_eq(item, value)));
        }

        self.iter()
            .find(|(_, item)| wide_eq(item, value))
            .map(|(idx, _)| idx)
    }

    /// Rewrites the arena so that slot `k` holds the `k`-th element.
    ///
    /// Values and their order are preserved, slot indices are not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocFailed`] if the new arena cannot be reserved.
    pub fn linearize(&mut self) -> Result<()> {
        self.ensure_live()?;

        if self.is_linear {
            return Ok(());
        }

        let capacity = self.slots.len();

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;

        let mut cursor = self.head;

        while let Some(idx) = cursor.get() {
            let old = self.slot_mut(idx);
            cursor = old.next;

            let pos = slots.len();

            slots.push(Slot {
                value: old.value.take(),
                next: Link::to(pos + 1),
                prev: pos.checked_sub(1).into(),
            });
        }

        if let Some(last) = slots.last_mut() {
            last.next = Link::NONE;
        }

        debug_assert_eq!(self.len, slots.len(), "chain length should match len");

        let len = slots.len();
        slots.extend((len..capacity).map(|idx| Slot::free(next_free(idx, capacity))));

        self.slots = slots;
        self.head = if len > 0 { Link::to(0) } else { Link::NONE };
        self.tail = len.checked_sub(1).into();
        self.free_head = if len < capacity { Link::to(len) } else { Link::NONE };
        self.is_linear = true;

        log::trace!("Linearized list of {len} elements ({capacity} slots)");

        Ok(())
    }

    /// Releases every value and the arena.
    ///
    /// Afterwards, mutating operations fail with [`Error::NullPtr`] and
    /// lookups find nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecreatingList`] if the list was already destroyed.
    pub fn destruct(&mut self) -> Result<()> {
        if self.released {
            return Err(Error::RecreatingList);
        }

        self.slots = Vec::new();
        self.len = 0;
        self.head = Link::NONE;
        self.tail = Link::NONE;
        self.free_head = Link::NONE;
        self.released = true;

        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            Err(Error::NullPtr)
        } else {
            Ok(())
        }
    }

    /// Pops a slot off the free list, growing the arena if allowed.
    fn take_free_slot(&mut self) -> Result<usize> {
        let idx = match self.free_head.get() {
            Some(idx) => idx,
            None if self.growable => self.grow()?,
            None => return Err(Error::ListFull),
        };

        self.free_head = self.slot(idx).next;

        Ok(idx)
    }

    /// Doubles the arena and returns the first new slot.
    ///
    /// Only called when the free list is empty.
    fn grow(&mut self) -> Result<usize> {
        debug_assert!(self.free_head.is_none());

        let capacity = self.slots.len();
        let new_capacity = (capacity * 2).clamp(MIN_GROWTH, MAX_CAPACITY);

        if new_capacity <= capacity {
            return Err(Error::AllocFailed);
        }

        self.slots.try_reserve_exact(new_capacity - capacity)?;
        self.slots
            .extend((capacity..new_capacity).map(|idx| Slot::free(next_free(idx, new_capacity))));

        self.free_head = Link::to(capacity);

        log::trace!("Grew list arena from {capacity} to {new_capacity} slots");

        Ok(capacity)
    }

    // NOTE: Links only ever point into the arena
    #[allow(clippy::indexing_slicing)]
    fn slot(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    #[allow(clippy::indexing_slicing)]
    fn slot_mut(&mut self, idx: usize) -> &mut Slot {
        &mut self.slots[idx]
    }
}

/// Free list successor of a fresh slot in an arena of `capacity` slots
fn next_free(idx: usize, capacity: usize) -> Link {
    if idx + 1 < capacity {
        Link::to(idx + 1)
    } else {
        Link::NONE
    }
}

/// Compares two byte strings eight bytes at a time.
fn wide_eq(lhs: &[u8], rhs: &[u8]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }

    let mut lhs_words = lhs.chunks_exact(8);
    let mut rhs_words = rhs.chunks_exact(8);

    for (l, r) in lhs_words.by_ref().zip(rhs_words.by_ref()) {
        if load_word(l) != load_word(r) {
            return false;
        }
    }

    lhs_words.remainder() == rhs_words.remainder()
}

fn load_word(chunk: &[u8]) -> u64 {
    let mut buf = [0; 8];
    buf.copy_from_slice(chunk);
    u64::from_ne_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn values(list: &ArenaList) -> Vec<&[u8]> {
        list.iter().map(|(_, v)| v).collect()
    }

    #[test]
    fn list_push_back_links_in_order() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(DEFAULT_CAPACITY)?;
        assert!(list.is_empty());
        assert_eq!(None, list.head());

        let a = list.push_back(b"a")?;
        let b = list.push_back(b"b")?;
        let c = list.push_back(b"c")?;

        assert_eq!(3, list.len());
        assert_eq!(Some(a), list.head());
        assert_eq!(Some(c), list.tail());
        assert_eq!(Some(b), list.next_of(a));
        assert_eq!(Some(a), list.prev_of(b));
        assert_eq!(None, list.next_of(c));
        assert_eq!(vec![&b"a"[..], b"b", b"c"], values(&list));
        assert!(list.is_linear());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_alloc_failed() {
        for capacity in [usize::MAX, MAX_CAPACITY + 1] {
            assert!(matches!(
                ArenaList::with_capacity(capacity),
                Err(Error::AllocFailed)
            ));
            assert!(matches!(
                ArenaList::growable(capacity),
                Err(Error::AllocFailed)
            ));
        }
    }

    #[test]
    fn list_full_capacity() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(3)?;

        for word in [&b"one"[..], b"two", b"three"] {
            list.push_back(word)?;
        }

        assert!(matches!(list.push_back(b"four"), Err(Error::ListFull)));
        assert_eq!(3, list.len());
        assert_eq!(3, list.capacity());
        assert_eq!(vec![&b"one"[..], b"two", b"three"], values(&list));
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_zero_capacity() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(0)?;
        assert!(matches!(list.push_back(b"x"), Err(Error::ListFull)));
        list.verify()?;

        let mut list = ArenaList::growable(0)?;
        list.push_back(b"x")?;
        assert_eq!(MIN_GROWTH, list.capacity());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_growable_doubles() -> crate::Result<()> {
        let mut list = ArenaList::growable(2)?;

        for idx in 0..20_u32 {
            list.push_back(&idx.to_be_bytes())?;
        }

        assert_eq!(20, list.len());
        assert_eq!(32, list.capacity());
        assert!(list.is_linear());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_insert_after() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(8)?;
        let a = list.push_back(b"a")?;
        let c = list.push_back(b"c")?;

        let b = list.insert(a, b"b")?;
        assert_eq!(Some(b), list.next_of(a));
        assert_eq!(Some(c), list.next_of(b));
        assert_eq!(Some(b), list.prev_of(c));
        assert!(!list.is_linear());

        let d = list.insert(c, b"d")?;
        assert_eq!(Some(d), list.tail());

        assert_eq!(vec![&b"a"[..], b"b", b"c", b"d"], values(&list));
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_insert_wrong_index() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        assert!(matches!(list.insert(0, b"x"), Err(Error::WrongIndex(0))));

        list.push_back(b"a")?;
        assert!(matches!(list.insert(1, b"x"), Err(Error::WrongIndex(1))));
        assert!(matches!(list.insert(99, b"x"), Err(Error::WrongIndex(99))));
        assert_eq!(1, list.len());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_remove_middle() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        let a = list.push_back(b"a")?;
        let b = list.push_back(b"b")?;
        let c = list.push_back(b"c")?;

        assert_eq!(&b"b"[..], &*list.remove(b)?);
        assert_eq!(Some(c), list.next_of(a));
        assert_eq!(Some(a), list.prev_of(c));
        assert_eq!(None, list.get(b));
        assert_eq!(2, list.len());
        list.verify()?;

        // freed slot is reused first
        assert_eq!(b, list.push_back(b"d")?);
        assert_eq!(vec![&b"a"[..], b"c", b"d"], values(&list));
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_remove_twice() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        let a = list.push_back(b"a")?;
        list.push_back(b"b")?;
        list.remove(a)?;

        let (head, tail) = (list.head(), list.tail());

        assert!(matches!(list.remove(a), Err(Error::NothingToRemove)));
        assert!(matches!(list.remove(4), Err(Error::WrongIndex(4))));

        assert_eq!(1, list.len());
        assert_eq!(head, list.head());
        assert_eq!(tail, list.tail());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_pop_both_ends() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        assert!(matches!(list.pop_front(), Err(Error::NothingToRemove)));
        assert!(matches!(list.pop_back(), Err(Error::NothingToRemove)));

        list.push_back(b"a")?;
        list.push_back(b"b")?;
        list.push_back(b"c")?;

        assert_eq!(&b"a"[..], &*list.pop_front()?);
        assert_eq!(&b"c"[..], &*list.pop_back()?);
        assert_eq!(&b"b"[..], &*list.pop_back()?);
        assert!(list.is_empty());
        assert_eq!(None, list.head());
        assert_eq!(None, list.tail());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_remove_tail_stays_linear() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        list.push_back(b"a")?;
        list.push_back(b"b")?;
        list.pop_back()?;
        assert!(list.is_linear());

        list.push_back(b"c")?;
        assert!(list.is_linear());

        list.pop_front()?;
        assert!(!list.is_linear());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_search() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(8)?;
        list.push_back(b"apple")?;
        let banana = list.push_back(b"banana")?;
        list.push_back(b"a-very-long-word-spanning-words")?;
        let dup = list.push_back(b"banana")?;

        assert_eq!(Some(banana), list.search(b"banana"));
        assert_eq!(Some(banana), list.search_batched(b"banana"));
        assert_eq!(None, list.search(b"banan"));
        assert_eq!(None, list.search_batched(b"bananas"));

        list.remove(banana)?;
        assert!(!list.is_linear());
        assert_eq!(Some(dup), list.search(b"banana"));
        assert_eq!(Some(dup), list.search_batched(b"banana"));
        assert_eq!(
            list.search(b"a-very-long-word-spanning-words"),
            list.search_batched(b"a-very-long-word-spanning-words"),
        );

        Ok(())
    }

    #[test]
    fn list_search_empty_value() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(2)?;
        assert_eq!(None, list.search(b""));

        let idx = list.push_back(b"")?;
        assert_eq!(Some(idx), list.search(b""));
        assert_eq!(Some(idx), list.search_batched(b""));

        Ok(())
    }

    #[test]
    fn list_linearize_keeps_order() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(8)?;
        let a = list.push_back(b"a")?;
        list.push_back(b"b")?;
        list.push_back(b"c")?;
        list.insert(a, b"x")?;
        list.pop_front()?;
        list.push_back(b"d")?;

        let before: Vec<Vec<u8>> = list.iter().map(|(_, v)| v.to_vec()).collect();
        assert!(!list.is_linear());

        list.linearize()?;
        assert!(list.is_linear());

        let after: Vec<Vec<u8>> = list.iter().map(|(_, v)| v.to_vec()).collect();
        assert_eq!(before, after);

        for (pos, (idx, _)) in list.iter().enumerate() {
            assert_eq!(pos, idx);
        }

        assert_eq!(Some(0), list.head());
        assert_eq!(Some(list.len() - 1), list.tail());
        list.verify()?;

        // pushes after linearization stay linear
        list.push_back(b"e")?;
        assert!(list.is_linear());
        list.verify()?;

        Ok(())
    }

    #[test]
    fn list_destruct_twice() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        list.push_back(b"a")?;

        list.destruct()?;
        assert!(list.is_released());
        assert!(matches!(list.destruct(), Err(Error::RecreatingList)));
        assert!(matches!(list.push_back(b"b"), Err(Error::NullPtr)));
        assert!(matches!(list.pop_front(), Err(Error::NullPtr)));
        assert!(matches!(list.verify(), Err(Error::NullPtr)));
        assert_eq!(None, list.search(b"a"));
        assert_eq!(0, list.len());

        Ok(())
    }

    #[test]
    fn list_wide_eq() {
        assert!(wide_eq(b"", b""));
        assert!(wide_eq(b"12345678", b"12345678"));
        assert!(wide_eq(b"123456789", b"123456789"));
        assert!(!wide_eq(b"123456789", b"123456780"));
        assert!(!wide_eq(b"02345678x", b"12345678x"));
        assert!(!wide_eq(b"abc", b"abcd"));
    }
}
