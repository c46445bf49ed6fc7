// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Splits a text buffer into words
//!
//! Tokens are separated by ASCII whitespace; non-letter bytes are trimmed
//! from both ends of each token, so `"(hello),"` yields `hello` while
//! `don't` is kept whole. Bytes of multi-byte UTF-8 sequences count as
//! letters. Words borrow from the buffer, nothing is copied.

/// Returns `true` if the byte may start or end a word.
#[must_use]
pub fn is_letter(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || !byte.is_ascii()
}

/// ASCII lowercases the buffer in place.
pub fn fold_case(buffer: &mut [u8]) {
    buffer.make_ascii_lowercase();
}

/// Strips non-letter bytes from both ends of a token.
///
/// Returns `None` if the token contains no letter at all.
#[must_use]
pub fn trim_word(token: &[u8]) -> Option<&[u8]> {
    let start = token.iter().position(|&b| is_letter(b))?;
    let end = token.iter().rposition(|&b| is_letter(b))?;
    token.get(start..=end)
}

/// Iterates over the words of the buffer.
pub fn words(buffer: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    buffer
        .split(u8::is_ascii_whitespace)
        .filter_map(trim_word)
}

/// Calls `f` with every word of the buffer and returns the number of words.
///
/// With `fold_case`, each word is ASCII lowercased into a scratch buffer
/// first, so the buffer itself is never modified.
///
/// # Errors
///
/// Stops at and returns the first error of `f`.
pub fn try_for_each_word<E>(
    buffer: &[u8],
    fold_case: bool,
    mut f: impl FnMut(&[u8]) -> Result<(), E>,
) -> Result<usize, E> {
    let mut scratch = Vec::new();
    let mut count = 0;

    for word in words(buffer) {
        if fold_case {
            scratch.clear();
            scratch.extend_from_slice(word);
            scratch.make_ascii_lowercase();
            f(&scratch)?;
        } else {
            f(word)?;
        }

        count += 1;
    }

    Ok(count)
}
