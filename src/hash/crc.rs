// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::HashFunction;

/// CRC-32C (Castagnoli)
///
/// Uses the SSE 4.2 `crc32` instruction, eight bytes per step, if the CPU
/// supports it. Otherwise falls back to a portable implementation that
/// produces the same digest.
#[derive(Copy, Clone, Debug)]
pub struct Crc32 {
    accelerated: bool,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    /// Detects hardware support once; the result is kept for all later calls.
    #[must_use]
    pub fn new() -> Self {
        let accelerated = Self::hardware_available();

        log::debug!("CRC-32C hardware acceleration available: {accelerated}");

        Self { accelerated }
    }

    /// Never uses the hardware instruction.
    #[must_use]
    pub const fn portable() -> Self {
        Self { accelerated: false }
    }

    /// Returns `true` if hashing uses the hardware instruction.
    #[must_use]
    pub fn is_accelerated(&self) -> bool {
        self.accelerated
    }

    #[cfg(target_arch = "x86_64")]
    fn hardware_available() -> bool {
        std::arch::is_x86_feature_detected!("sse4.2")
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn hardware_available() -> bool {
        false
    }

    /// Computes the raw 32-bit checksum.
    #[must_use]
    pub fn checksum(&self, bytes: &[u8]) -> u32 {
        #[cfg(target_arch = "x86_64")]
        {
            if self.accelerated {
                // SAFETY: `accelerated` is only set after detecting SSE 4.2
                return unsafe { crc32c_sse42(bytes) };
            }
        }

        crc32c::crc32c(bytes)
    }
}

impl HashFunction for Crc32 {
    fn name(&self) -> &'static str {
        "crc32"
    }

    fn hash(&self, bytes: &[u8]) -> u64 {
        u64::from(self.checksum(bytes))
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.2")]
unsafe fn crc32c_sse42(bytes: &[u8]) -> u32 {
    use std::arch::x86_64::{_mm_crc32_u64, _mm_crc32_u8};

    let mut words = bytes.chunks_exact(8);
    let mut crc = u64::from(u32::MAX);

    for word in words.by_ref() {
        let mut buf = [0; 8];
        buf.copy_from_slice(word);

        crc = _mm_crc32_u64(crc, u64::from_le_bytes(buf));
    }

    // NOTE: The instruction zero-extends its 32-bit result
    #[allow(clippy::cast_possible_truncation)]
    let mut crc = crc as u32;

    for &byte in words.remainder() {
        crc = _mm_crc32_u8(crc, byte);
    }

    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn crc32_check_value() {
        assert_eq!(0xE306_9283, Crc32::new().checksum(b"123456789"));
        assert_eq!(0xE306_9283, Crc32::portable().checksum(b"123456789"));
        assert_eq!(0, Crc32::new().checksum(b""));
    }

    #[test]
    fn crc32_hardware_matches_portable() {
        let hw = Crc32::new();
        let sw = Crc32::portable();
        assert!(!sw.is_accelerated());

        let text = b"The quick brown fox jumps over the lazy dog, again and again";

        for len in 0..=text.len() {
            let prefix = text.get(..len).unwrap_or_default();
            assert_eq!(sw.hash(prefix), hw.hash(prefix), "length {len}");
        }
    }
}
