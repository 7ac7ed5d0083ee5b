//! # Callback Module
//!
//! The incoming half of the protocol. The gateway posts a status callback;
//! [`verify_callback`] checks its hash with the reversed canonical string
//! and [`OutcomeResolver`] turns the result into a disposition and redirect.
//!
//! ```text
//! verification.rs: GatewayCallback, reversed canonical string, hash check
//! outcome.rs     : Disposition / Outcome / OutcomeResolver
//! ```

pub mod outcome;
pub mod verification;

pub use outcome::{Disposition, Outcome, OutcomeResolver};
pub use verification::{
    canonical_callback_string, expected_callback_hash, verify_callback, GatewayCallback,
    VerificationResult,
};
