//! Request signing: the forward direction of the gateway hash protocol.
//!
//! The canonical create string is
//!
//! ```text
//! key|txnid|amount|productinfo|firstname|email|udf1|udf2|udf3|udf4|udf5||||||salt
//! ```
//!
//! i.e. six identity fields, ten optional slots (five UDFs, five reserved
//! blanks), then the salt. The gateway recomputes the same string on its
//! side, so the field order and slot count are not ours to change.

use crate::config::{OPTIONAL_SLOT_COUNT, RESERVED_SLOT_COUNT};
use crate::credentials::MerchantCredentials;
use crate::crypto::CanonicalString;
use crate::error::ProtocolError;

use super::request::{NormalizedRequest, TransactionRequest};
use super::txnid::TransactionId;

/// The digest authorizing one payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    /// SHA-512 of the canonical string, lowercase hex.
    pub hash: String,
    canonical: CanonicalString,
}

impl RequestSignature {
    /// The hashed string, for diagnostics. Embeds the salt.
    pub fn canonical(&self) -> &CanonicalString {
        &self.canonical
    }
}

/// Builds the canonical create string for an already-validated request.
pub fn canonical_request_string(
    request: &NormalizedRequest<'_>,
    txnid: &TransactionId,
    credentials: &MerchantCredentials,
) -> CanonicalString {
    let mut s = CanonicalString::with_capacity(256);
    s.push(credentials.key())
        .push(txnid.as_str())
        .push(request.amount)
        .push(request.product_info)
        .push(request.first_name)
        .push(request.email);
    for udf in request.udfs {
        s.push(udf);
    }
    s.push_blanks(RESERVED_SLOT_COUNT);
    s.push(credentials.salt());

    debug_assert_eq!(s.field_count(), 6 + OPTIONAL_SLOT_COUNT + 1);
    s
}

/// Validates `request` and computes its payment hash.
///
/// Deterministic: the same request fields, txnid, and credentials always
/// produce the same hash.
///
/// # Errors
///
/// [`ProtocolError::Validation`] if `amount`, `firstName`/`name`, or
/// `email` is missing or blank. Nothing is hashed in that case.
///
/// # Example
///
/// ```
/// use donation_protocol::credentials::MerchantCredentials;
/// use donation_protocol::transaction::{sign_request, TransactionId, TransactionRequest};
///
/// let creds = MerchantCredentials::new("qyHOaB", "0x99YlO1SoZtMA98MzO9ebBrKEssz4z0").unwrap();
/// let request = TransactionRequest {
///     amount: Some("10.00".into()),
///     first_name: Some("Test".into()),
///     email: Some("test@example.com".into()),
///     ..Default::default()
/// };
/// let txnid = TransactionId::new("TXN1700000000000").unwrap();
///
/// let signature = sign_request(&request, &txnid, &creds).unwrap();
/// assert_eq!(signature.hash.len(), 128);
/// ```
pub fn sign_request(
    request: &TransactionRequest,
    txnid: &TransactionId,
    credentials: &MerchantCredentials,
) -> Result<RequestSignature, ProtocolError> {
    let normalized = request.normalize()?;
    Ok(sign_normalized(&normalized, txnid, credentials))
}

pub(crate) fn sign_normalized(
    request: &NormalizedRequest<'_>,
    txnid: &TransactionId,
    credentials: &MerchantCredentials,
) -> RequestSignature {
    let canonical = canonical_request_string(request, txnid, credentials);
    let hash = canonical.digest();
    tracing::debug!(txnid = %txnid, "payment request signed");
    RequestSignature { hash, canonical }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
