//! Error types for the donation hash protocol.
//!
//! Every fallible protocol operation returns a [`ProtocolError`]. Both
//! variants are detected before any hashing happens; hashing itself cannot
//! fail.

use thiserror::Error;

/// Errors produced by signing, verification, and credential loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// One or more required fields were absent or blank.
    #[error("missing required fields: {}", .missing_fields.join(", "))]
    Validation {
        /// Wire names of the missing fields, in declaration order.
        missing_fields: Vec<&'static str>,
    },

    /// Merchant credentials are absent or unusable.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is missing. Never contains secret material.
        reason: String,
    },
}

impl ProtocolError {
    /// The missing field names for a validation error, empty otherwise.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ProtocolError::Validation { missing_fields } => missing_fields,
            ProtocolError::Configuration { .. } => &[],
        }
    }
}

/// Treats `None`, empty, and whitespace-only values as absent.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
