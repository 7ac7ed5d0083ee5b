//! # Hashing Utilities
//!
//! The gateway speaks exactly one digest: SHA-512 over the UTF-8 bytes of a
//! pipe-delimited canonical string, rendered as lowercase hex. Both
//! directions of the protocol funnel through [`sha512_hex`].
//!
//! [`CanonicalString`] is the shared joiner. It only knows how to append
//! fields with a separator; field *order* belongs to the signing and
//! verification modules, which each build their own string.

use sha2::{Digest, Sha512};
use std::fmt;

use crate::config::FIELD_SEPARATOR;

/// Compute the SHA-512 digest of `data` as a 128-character lowercase hex string.
///
/// # Example
///
/// ```
/// use donation_protocol::crypto::sha512_hex;
///
/// let digest = sha512_hex(b"abc");
/// assert_eq!(digest.len(), 128);
/// assert!(digest.starts_with("ddaf35a1"));
/// ```
pub fn sha512_hex(data: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A pipe-delimited string under construction.
///
/// Its contents embed the merchant salt, so `Debug` never prints them.
/// Use [`CanonicalString::expose`] in tests and explicit diagnostics only.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalString {
    buf: String,
    fields: usize,
}

impl CanonicalString {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            fields: 0,
        }
    }

    /// Appends one field, inserting the separator before every field but the first.
    pub(crate) fn push(&mut self, field: &str) -> &mut Self {
        if self.fields > 0 {
            self.buf.push(FIELD_SEPARATOR);
        }
        self.buf.push_str(field);
        self.fields += 1;
        self
    }

    /// Appends `count` blank fields.
    pub(crate) fn push_blanks(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.push("");
        }
        self
    }

    /// Number of fields appended so far.
    pub fn field_count(&self) -> usize {
        self.fields
    }

    /// SHA-512 of the string, lowercase hex.
    pub fn digest(&self) -> String {
        sha512_hex(self.buf.as_bytes())
    }

    /// The raw string, salt included.
    pub fn expose(&self) -> &str {
        &self.buf
    }
}

impl fmt::Debug for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalString")
            .field("fields", &self.fields)
            .field("len", &self.buf.len())
            .finish_non_exhaustive()
    }
}
