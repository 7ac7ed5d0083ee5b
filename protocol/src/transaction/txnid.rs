//! Transaction identifiers.
//!
//! A txnid correlates the signed request with the gateway's later callback.
//! Generated ids look like `TXN` + 13-digit millisecond timestamp + 4-digit
//! suffix, e.g. `TXN17000000000004821`.
//!
//! The generator keeps one atomic: the last issued `(timestamp, suffix)`
//! pair packed into a `u64`. Every new id is strictly greater than the
//! previous one, so ids from one process never repeat, and a clock that
//! steps backwards can never make the embedded timestamp go backwards.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{TXNID_PREFIX, TXNID_SUFFIX_WIDTH, TXNID_TIMESTAMP_WIDTH};
use crate::error::{is_blank, ProtocolError};

/// Number of distinct suffixes per millisecond (10^TXNID_SUFFIX_WIDTH).
const SUFFIX_SPACE: u64 = 10_000;

/// An opaque transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wraps a caller-supplied identifier (the `txnId` override).
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Validation`] if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ProtocolError> {
        let value = value.into();
        if is_blank(Some(&value)) {
            return Err(ProtocolError::Validation {
                missing_fields: vec!["txnId"],
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The millisecond timestamp embedded in a generated id.
    ///
    /// Returns `None` for caller-supplied ids that do not follow the
    /// generated layout.
    pub fn timestamp_ms(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(TXNID_PREFIX)?;
        if digits.len() != TXNID_TIMESTAMP_WIDTH + TXNID_SUFFIX_WIDTH
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits[..TXNID_TIMESTAMP_WIDTH].parse().ok()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Issues practically unique, time-ordered transaction identifiers.
///
/// Cheap to share: wrap in an `Arc` and call [`TxnIdGenerator::generate`]
/// from any number of tasks.
#[derive(Debug, Default)]
pub struct TxnIdGenerator {
    /// Last issued `timestamp_ms * SUFFIX_SPACE + suffix`.
    last: AtomicU64,
}

impl TxnIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the id for one request: the caller's override when it has
    /// content (surrounding whitespace dropped), a fresh id otherwise.
    ///
    /// Every entry point that accepts a `txnId` override goes through here.
    pub fn resolve(&self, requested: Option<&str>) -> TransactionId {
        match requested.map(str::trim) {
            Some(id) if !id.is_empty() => TransactionId(id.to_string()),
            _ => self.generate(),
        }
    }

    /// Generates an id stamped with the current wall-clock time.
    pub fn generate(&self) -> TransactionId {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.generate_at(now_ms)
    }

    /// Generates an id for an explicit clock reading.
    pub fn generate_at(&self, now_ms: u64) -> TransactionId {
        let suffix = rand::thread_rng().gen_range(0..SUFFIX_SPACE);
        let candidate = now_ms.saturating_mul(SUFFIX_SPACE).saturating_add(suffix);

        let previous = match self.last.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(candidate.max(last.saturating_add(1)))
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        let issued = candidate.max(previous.saturating_add(1));

        TransactionId(format!(
            "{}{:0tw$}{:0sw$}",
            TXNID_PREFIX,
            issued / SUFFIX_SPACE,
            issued % SUFFIX_SPACE,
            tw = TXNID_TIMESTAMP_WIDTH,
            sw = TXNID_SUFFIX_WIDTH,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn generated_id_layout() {
        let gen = TxnIdGenerator::new();
        let id = gen.generate_at(1_700_000_000_000);
        assert!(id.as_str().starts_with("TXN1700000000000"));
        assert_eq!(id.as_str().len(), 3 + 13 + 4);
        assert_eq!(id.timestamp_ms(), Some(1_700_000_000_000));
    }

    #[test]
    fn wall_clock_ids_are_recent() {
        let before = Utc::now().timestamp_millis() as u64;
        let id = TxnIdGenerator::new().generate();
        let ts = id.timestamp_ms().expect("generated layout");
        assert!(ts >= before);
    }

    #[test]
    fn rapid_calls_never_repeat() {
        let gen = TxnIdGenerator::new();
        let ids: HashSet<_> = (0..5_000).map(|_| gen.generate_at(1_700_000_000_000)).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn timestamp_never_goes_backwards() {
        let gen = TxnIdGenerator::new();
        let later = gen.generate_at(1_700_000_000_500);
        let earlier_clock = gen.generate_at(1_700_000_000_000);
        assert!(earlier_clock.timestamp_ms() >= later.timestamp_ms());
        assert!(earlier_clock.as_str() > later.as_str());
    }

    #[test]
    fn suffix_overflow_rolls_into_next_millisecond() {
        let gen = TxnIdGenerator::new();
        let ids: Vec<_> = (0..(SUFFIX_SPACE + 10))
            .map(|_| gen.generate_at(1_700_000_000_000))
            .collect();
        let last = ids.last().unwrap();
        assert!(last.timestamp_ms().unwrap() > 1_700_000_000_000);
    }

    #[test]
    fn concurrent_generation_is_unique() {
        let gen = Arc::new(TxnIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || {
                    (0..1_000)
                        .map(|_| gen.generate_at(1_700_000_000_000))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate txnid issued");
            }
        }
        assert_eq!(seen.len(), 4_000);
    }

    #[test]
    fn override_must_not_be_blank() {
        assert!(TransactionId::new("ORDER-42").is_ok());
        let err = TransactionId::new("   ").unwrap_err();
        assert_eq!(err.missing_fields(), &["txnId"]);
    }

    #[test]
    fn resolve_prefers_trimmed_override() {
        let gen = TxnIdGenerator::new();
        assert_eq!(gen.resolve(Some("  ORDER-42 ")).as_str(), "ORDER-42");
    }

    #[test]
    fn resolve_generates_when_override_is_blank() {
        let gen = TxnIdGenerator::new();
        for requested in [None, Some(""), Some("   ")] {
            let id = gen.resolve(requested);
            assert!(id.timestamp_ms().is_some(), "{requested:?} gave {id}");
        }
    }

    #[test]
    fn foreign_ids_have_no_timestamp() {
        assert_eq!(TransactionId::new("ORDER-42").unwrap().timestamp_ms(), None);
        assert_eq!(TransactionId::new("TXN12").unwrap().timestamp_ms(), None);
    }
}
