// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Hash functions mapping words to buckets
//!
//! All of them are deterministic, allocation-free functions of the given
//! bytes only. The caller reduces the digest modulo the bucket count.

mod crc;

pub use crc::Crc32;

/// Calculates a 64-bit digest from a byte slice.
pub trait HashFunction {
    /// Gets the readable hash function name (e.g. "crc32")
    fn name(&self) -> &'static str;

    /// Hashes a byte slice
    fn hash(&self, bytes: &[u8]) -> u64;
}

/// Sum of all byte values
///
/// Fast, but anagrams and near-anagrams all collide.
#[derive(Copy, Clone, Debug, Default)]
pub struct AsciiSum;

impl HashFunction for AsciiSum {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn hash(&self, bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .fold(0_u64, |acc, &byte| acc.wrapping_add(u64::from(byte)))
    }
}

/// Value of the first byte
///
/// Deliberately poor: at most 256 buckets are ever used.
#[derive(Copy, Clone, Debug, Default)]
pub struct FirstLetter;

impl HashFunction for FirstLetter {
    fn name(&self) -> &'static str {
        "first-letter"
    }

    fn hash(&self, bytes: &[u8]) -> u64 {
        bytes.first().copied().map_or(0, u64::from)
    }
}

/// 32-bit accumulator, rotated left by one bit and XORed with every byte
#[derive(Copy, Clone, Debug, Default)]
pub struct Rol;

impl HashFunction for Rol {
    fn name(&self) -> &'static str {
        "rol"
    }

    fn hash(&self, bytes: &[u8]) -> u64 {
        let digest = bytes
            .iter()
            .fold(0_u32, |acc, &byte| acc.rotate_left(1) ^ u32::from(byte));

        u64::from(digest)
    }
}

/// XXH3 (64-bit)
#[derive(Copy, Clone, Debug, Default)]
pub struct Xxh3;

impl HashFunction for Xxh3 {
    fn name(&self) -> &'static str {
        "xxh3"
    }

    fn hash(&self, bytes: &[u8]) -> u64 {
        xxhash_rust::xxh3::xxh3_64(bytes)
    }
}

/// Selects one of the built-in hash functions at runtime
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HashKind {
    /// See [`AsciiSum`]
    Ascii,

    /// See [`FirstLetter`]
    FirstLetter,

    /// See [`Rol`]
    Rol,

    /// See [`Crc32`]
    Crc32,

    /// See [`Xxh3`]
    Xxh3,
}

impl HashKind {
    /// All built-in hash functions, worst first
    pub const ALL: [Self; 5] = [
        Self::FirstLetter,
        Self::Ascii,
        Self::Rol,
        Self::Crc32,
        Self::Xxh3,
    ];

    /// Instantiates the hash function.
    ///
    /// For [`HashKind::Crc32`] this runs the CPU feature detection.
    #[must_use]
    pub fn build(self) -> Box<dyn HashFunction> {
        match self {
            Self::Ascii => Box::new(AsciiSum),
            Self::FirstLetter => Box::new(FirstLetter),
            Self::Rol => Box::new(Rol),
            Self::Crc32 => Box::new(Crc32::new()),
            Self::Xxh3 => Box::new(Xxh3),
        }
    }

    /// Gets the readable hash function name
    #[must_use]
    pub fn name(self) -> &'static str {
        // NOTE: Must equal `HashFunction::name` of the built function,
        // checked by `hash_kind_names_match_functions`
        match self {
            Self::Ascii => "ascii",
            Self::FirstLetter => "first-letter",
            Self::Rol => "rol",
            Self::Crc32 => "crc32",
            Self::Xxh3 => "xxh3",
        }
    }
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

impl std::str::FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names = Self::ALL.map(Self::name).join(", ");
                format!("unknown hash function {s:?}, expected one of: {names}")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn hash_ascii_sum() {
        assert_eq!(0, AsciiSum.hash(b""));
        assert_eq!(u64::from(b'a' + b'b'), AsciiSum.hash(b"ab"));
        assert_eq!(AsciiSum.hash(b"listen"), AsciiSum.hash(b"silent"));
    }

    #[test]
    fn hash_first_letter() {
        assert_eq!(0, FirstLetter.hash(b""));
        assert_eq!(u64::from(b'c'), FirstLetter.hash(b"cat"));
        assert_eq!(FirstLetter.hash(b"cat"), FirstLetter.hash(b"cow"));
    }

    #[test]
    fn hash_rol() {
        assert_eq!(0, Rol.hash(b""));
        assert_eq!(u64::from(b'a'), Rol.hash(b"a"));
        assert_eq!(u64::from((u32::from(b'a') << 1) ^ u32::from(b'b')), Rol.hash(b"ab"));
        assert_ne!(Rol.hash(b"ab"), Rol.hash(b"ba"));

        // the accumulator wraps around instead of overflowing
        let long = [0xFF_u8; 100];
        assert!(Rol.hash(&long) <= u64::from(u32::MAX));
    }

    #[test]
    fn hash_kind_names_match_functions() {
        for kind in HashKind::ALL {
            assert_eq!(kind.name(), kind.build().name());
            assert_eq!(Ok(kind), kind.name().parse::<HashKind>());
        }
        assert_eq!("crc32", Crc32::portable().name());
    }

    #[test]
    fn hash_deterministic() {
        for kind in HashKind::ALL {
            let hasher = kind.build();

            for word in [&b""[..], b"a", b"apple", b"a-much-longer-word-than-eight"] {
                assert_eq!(hasher.hash(word), hasher.hash(word), "{kind}");
                assert_eq!(hasher.hash(word), kind.build().hash(word), "{kind}");
            }
        }
    }

    #[test]
    fn hash_ignores_bytes_past_the_slice() {
        let padded = b"apple\0\0\0junk";

        for kind in HashKind::ALL {
            let hasher = kind.build();
            assert_eq!(hasher.hash(b"apple"), hasher.hash(&padded[..5]), "{kind}");
        }
    }

    #[test]
    fn hash_kind_from_str() {
        for kind in HashKind::ALL {
            assert_eq!(Ok(kind), kind.name().parse());
        }

        assert_eq!(Ok(HashKind::Crc32), "CRC32".parse());
        assert!("md5".parse::<HashKind>().is_err());
    }
}
