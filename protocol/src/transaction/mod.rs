//! # Transaction Module
//!
//! The outgoing half of the protocol: identifying, validating, and signing
//! a donation before the donor's browser is sent to the hosted gateway.
//!
//! ## Architecture
//!
//! ```text
//! txnid.rs  : TransactionId and the time-ordered TxnIdGenerator
//! request.rs: TransactionRequest body and its single normalization step
//! signing.rs: canonical create string + SHA-512 request hash
//! payload.rs: SignedPaymentPayload assembled for the gateway form post
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Identify**: [`TxnIdGenerator::generate`] issues a txnid (or the
//!    caller supplies one).
//! 2. **Normalize**: [`TransactionRequest::normalize`] resolves aliases and
//!    rejects missing fields.
//! 3. **Sign**: [`sign_request`] hashes the canonical create string.
//! 4. **Hand off**: [`build_payload`] assembles the form the browser posts.

pub mod payload;
pub mod request;
pub mod signing;
pub mod txnid;

pub use payload::{build_payload, SignedPaymentPayload};
pub use request::{NormalizedRequest, TransactionRequest};
pub use signing::{canonical_request_string, sign_request, RequestSignature};
pub use txnid::{TransactionId, TxnIdGenerator};
