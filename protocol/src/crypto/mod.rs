//! # Cryptographic Primitives
//!
//! One hash function, one string layout. Everything here is a thin wrapper
//! around the audited `sha2` implementation; the protocol's only secret is
//! the salt mixed into the hashed string.

pub mod hash;

pub use hash::{sha512_hex, CanonicalString};
