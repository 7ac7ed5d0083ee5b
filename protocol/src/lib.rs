// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Donation Protocol Core Library
//!
//! The integrity protocol spoken with a hosted payment gateway: a salted
//! SHA-512 digest over a fixed pipe-delimited string, computed in one
//! direction to authorize a payment request and in the mirrored direction
//! to authenticate the gateway's status callback.
//!
//! Both strings must be reproduced exactly. A missing pipe makes every
//! payment fail without any error from the gateway.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, gateway endpoints, deployment profile.
//! - **credentials**: The merchant key/salt pair. Loaded once, passed explicitly.
//! - **crypto**: SHA-512 hex digests and the canonical string joiner.
//! - **transaction**: Txnid generation, request normalization, signing, payload.
//! - **callback**: Callback verification and outcome resolution.
//! - **error**: The [`ProtocolError`] taxonomy.
//!
//! ## Design Philosophy
//!
//! 1. One implementation of each direction; every entry point calls it.
//! 2. No fallback credentials. Missing secrets are a configuration error.
//! 3. Pure functions: no I/O, no global state, no clocks except in txnid.

pub mod callback;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod transaction;

pub use callback::{verify_callback, Disposition, GatewayCallback, Outcome, OutcomeResolver};
pub use credentials::MerchantCredentials;
pub use error::ProtocolError;
pub use transaction::{
    build_payload, sign_request, SignedPaymentPayload, TransactionId, TransactionRequest,
    TxnIdGenerator,
};
