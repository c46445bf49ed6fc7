// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur in the word index
#[derive(Debug)]
pub enum Error {
    /// The list (or table) was already destroyed
    NullPtr,

    /// Index is outside the live range of the list
    WrongIndex(usize),

    /// Remove or pop on an empty list or an unoccupied slot
    NothingToRemove,

    /// Fixed-capacity list has no free slot left
    ListFull,

    /// Element count disagrees with the chain or exceeds the capacity
    WrongSize,

    /// Tail does not point at the last element of the chain
    WrongTail,

    /// Head is missing, dangling or has a predecessor
    WrongHead,

    /// Free list reaches an occupied, foreign or repeated slot
    WrongFreeHead,

    /// Links are inconsistent or some slot belongs to neither chain
    ListIsDamaged,

    /// Backing storage could not be reserved
    AllocFailed,

    /// Source text could not be read
    UnableToOpenFile(std::io::Error),

    /// No input was specified
    NoArguments,

    /// The list (or table) was destroyed twice
    RecreatingList,
}

impl Error {
    /// Returns a human readable description of the error.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::NullPtr => "list has already been destroyed",
            Self::WrongIndex(_) => "index is outside the live range of the list",
            Self::NothingToRemove => "there is no element to remove at this position",
            Self::ListFull => "list has no free slot left",
            Self::WrongSize => "list size does not match its chain",
            Self::WrongTail => "list tail does not match its chain",
            Self::WrongHead => "list head is invalid",
            Self::WrongFreeHead => "free list is damaged",
            Self::ListIsDamaged => "list links are inconsistent",
            Self::AllocFailed => "could not allocate backing storage",
            Self::UnableToOpenFile(_) => "unable to open source file",
            Self::NoArguments => "no input file specified",
            Self::RecreatingList => "list has been destroyed twice",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongIndex(idx) => write!(f, "WordIndexError: {} ({idx})", self.message()),
            Self::UnableToOpenFile(e) => write!(f, "WordIndexError: {}: {e}", self.message()),
            _ => write!(f, "WordIndexError: {}", self.message()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnableToOpenFile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::UnableToOpenFile(value)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::AllocFailed
    }
}

/// Word index result
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn error_display_carries_detail() {
        let err = Error::WrongIndex(42);
        assert_eq!(
            "WordIndexError: index is outside the live range of the list (42)",
            err.to_string(),
        );

        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::UnableToOpenFile(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().ends_with("gone"));
    }

    #[test]
    fn error_reserve_maps_to_alloc_failed() {
        let mut v = Vec::<u8>::new();
        let err = v.try_reserve_exact(usize::MAX).map_err(Error::from);
        assert!(matches!(err, Err(Error::AllocFailed)));
    }
}
