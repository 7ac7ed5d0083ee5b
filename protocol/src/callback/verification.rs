//! Callback verification: the reverse direction of the gateway hash protocol.
//!
//! The gateway signs its status callback with the mirror image of the
//! create string:
//!
//! ```text
//! salt|status||||||udf5|udf4|udf3|udf2|udf1|email|firstname|productinfo|amount|txnid|key
//! ```
//!
//! The UDF slots are blank unless the gateway echoed them, which it does
//! not by default. This builder is separate from
//! [`crate::transaction::signing`]: the order differs and reusing the
//! forward builder would produce a hash the gateway never sends.

use serde::{Deserialize, Serialize};

use crate::config::{OPTIONAL_SLOT_COUNT, RESERVED_SLOT_COUNT};
use crate::credentials::MerchantCredentials;
use crate::crypto::CanonicalString;
use crate::error::{is_blank, ProtocolError};

/// A status callback as posted by the gateway. Untrusted until verified.
///
/// Accepts both JSON bodies and the gateway's form-encoded POST. Fields the
/// protocol does not hash (`mihpayid`, `error_Message`) are carried for
/// logging and the user-facing message only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayCallback {
    pub txnid: Option<String>,
    pub amount: Option<String>,
    pub productinfo: Option<String>,
    pub firstname: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub hash: Option<String>,
    pub key: Option<String>,
    pub udf1: Option<String>,
    pub udf2: Option<String>,
    pub udf3: Option<String>,
    pub udf4: Option<String>,
    pub udf5: Option<String>,
    /// Gateway-side payment id.
    pub mihpayid: Option<String>,
    #[serde(rename = "error_Message")]
    pub error_message: Option<String>,
}

/// The result of checking a callback's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True iff the computed digest equals the supplied one exactly.
    pub is_valid: bool,
    /// The digest we computed from the callback fields.
    pub computed_hash: String,
}

impl GatewayCallback {
    fn field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("")
    }

    /// Status as sent, empty when absent.
    pub fn status(&self) -> &str {
        Self::field(&self.status)
    }

    /// Txnid as sent, empty when absent.
    pub fn txnid(&self) -> &str {
        Self::field(&self.txnid)
    }

    fn required_missing(&self) -> Vec<&'static str> {
        [
            ("txnid", &self.txnid),
            ("status", &self.status),
            ("hash", &self.hash),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value.as_deref()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Builds the canonical verification string for a callback.
///
/// The merchant key always comes from `credentials`, never from the
/// callback body.
pub fn canonical_callback_string(
    callback: &GatewayCallback,
    credentials: &MerchantCredentials,
) -> CanonicalString {
    let f = GatewayCallback::field;

    let mut s = CanonicalString::with_capacity(256);
    s.push(credentials.salt()).push(f(&callback.status));
    s.push_blanks(RESERVED_SLOT_COUNT);
    for udf in [
        &callback.udf5,
        &callback.udf4,
        &callback.udf3,
        &callback.udf2,
        &callback.udf1,
    ] {
        s.push(f(udf));
    }
    s.push(f(&callback.email))
        .push(f(&callback.firstname))
        .push(f(&callback.productinfo))
        .push(f(&callback.amount))
        .push(f(&callback.txnid))
        .push(credentials.key());

    debug_assert_eq!(s.field_count(), 2 + OPTIONAL_SLOT_COUNT + 6);
    s
}

/// The hash a genuine gateway would attach to `callback`.
///
/// Used by [`verify_callback`], and by anything that needs to simulate the
/// gateway (tests, the demo).
pub fn expected_callback_hash(
    callback: &GatewayCallback,
    credentials: &MerchantCredentials,
) -> String {
    canonical_callback_string(callback, credentials).digest()
}

/// Checks the authenticity of a gateway callback.
///
/// A callback is valid only if its `hash` equals the recomputed digest
/// byte for byte (case-sensitive) and, when it names a merchant `key`, that
/// key is ours.
///
/// # Errors
///
/// [`ProtocolError::Validation`] if `txnid`, `status`, or `hash` is missing
/// or blank. Nothing is hashed in that case.
pub fn verify_callback(
    callback: &GatewayCallback,
    credentials: &MerchantCredentials,
) -> Result<VerificationResult, ProtocolError> {
    let missing = callback.required_missing();
    if !missing.is_empty() {
        return Err(ProtocolError::Validation {
            missing_fields: missing,
        });
    }

    let computed_hash = expected_callback_hash(callback, credentials);
    let key_matches = callback
        .key
        .as_deref()
        .map_or(true, |key| key.is_empty() || key == credentials.key());
    let is_valid = key_matches && callback.hash.as_deref() == Some(computed_hash.as_str());

    if is_valid {
        tracing::debug!(txnid = callback.txnid(), status = callback.status(), "callback hash verified");
    } else {
        tracing::warn!(
            txnid = callback.txnid(),
            status = callback.status(),
            key_matches,
            "callback hash mismatch"
        );
    }

    Ok(VerificationResult {
        is_valid,
        computed_hash,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
