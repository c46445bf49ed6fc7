// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Largest capacity a single arena can address
pub const MAX_CAPACITY: usize = (u32::MAX - 1) as usize;

/// Index of a slot inside the arena, or nothing
///
/// `u32::MAX` is never a valid slot, so it serves as the "no link" marker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Link(u32);

impl Link {
    pub const NONE: Self = Self(u32::MAX);

    /// Links to the given slot.
    ///
    /// The arena never exceeds [`MAX_CAPACITY`] slots.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to(idx: usize) -> Self {
        debug_assert!(idx <= MAX_CAPACITY, "slot index out of range");
        Self(idx as u32)
    }

    pub fn get(self) -> Option<usize> {
        if self == Self::NONE {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl From<Option<usize>> for Link {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Self::NONE, Self::to)
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(idx) => f.pad(&idx.to_string()),
            None => f.pad("-"),
        }
    }
}
