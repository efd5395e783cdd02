//! Utility macros and functions for the ingest crate.
//!
//! This module provides helper macros and byte-scanning functions that are used internally
//! by the codec implementation.

use memchr::memmem;

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Arguments
///
/// * `$predicate` - A boolean expression that should evaluate to true
/// * `$error` - The error value to return if the predicate is false
///
/// # Example
///
/// ```ignore
/// ensure!(uri.first() == Some(&b'/'), ParseError::malformed(offset, "uri must start with '/'"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Finds `byte` in `haystack[from..to]`, returning the absolute position.
#[inline]
pub(crate) fn find_byte(byte: u8, haystack: &[u8], from: usize, to: usize) -> Option<usize> {
    memchr::memchr(byte, &haystack[from..to]).map(|pos| from + pos)
}

/// Returns true if `haystack` contains a parent directory reference (`..`).
#[inline]
pub(crate) fn has_dot_dot(haystack: &[u8]) -> bool {
    memmem::find(haystack, b"..").is_some()
}
