//! # Protocol Configuration & Constants
//!
//! Every literal the gateway protocol depends on lives here. The slot counts
//! and field order are dictated by the hosted gateway; changing any of them
//! silently breaks every hash we produce, so treat this file as frozen.
//!
//! Runtime configuration that varies per deployment (redirect URLs, the
//! deployment profile) is modelled here as plain values. Loading them from
//! the environment is the node binary's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate-level protocol version, reported by the node's version banner.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Canonical String Layout
// ---------------------------------------------------------------------------

/// Field separator for both canonical strings.
pub const FIELD_SEPARATOR: char = '|';

/// Number of user-defined fields (udf1..udf5) the gateway reserves.
pub const UDF_SLOT_COUNT: usize = 5;

/// Number of additional reserved slots after the UDFs. Always blank.
pub const RESERVED_SLOT_COUNT: usize = 5;

/// Total number of optional slots between the email and the salt.
pub const OPTIONAL_SLOT_COUNT: usize = UDF_SLOT_COUNT + RESERVED_SLOT_COUNT;

/// Length of a lowercase hex SHA-512 digest.
pub const HASH_HEX_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// Payload Defaults
// ---------------------------------------------------------------------------

/// Product info used when the donor does not supply one.
pub const DEFAULT_PRODUCT_INFO: &str = "Donation";

/// Fixed service provider tag the gateway expects on hosted checkout posts.
pub const SERVICE_PROVIDER: &str = "payu_paisa";

/// Prefix for generated transaction identifiers.
pub const TXNID_PREFIX: &str = "TXN";

/// Width of the zero-padded millisecond timestamp inside a txnid.
/// 13 digits covers every millisecond timestamp until the year 2286.
pub const TXNID_TIMESTAMP_WIDTH: usize = 13;

/// Width of the random suffix appended to a txnid.
pub const TXNID_SUFFIX_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Gateway Endpoints
// ---------------------------------------------------------------------------

/// Live hosted-checkout endpoint.
pub const LIVE_PAYMENT_URL: &str = "https://secure.payu.in/_payment";

/// Sandbox hosted-checkout endpoint.
pub const TEST_PAYMENT_URL: &str = "https://test.payu.in/_payment";

/// Default redirect for successful payments.
pub const DEFAULT_SUCCESS_URL: &str = "https://wad-donation.vercel.app/payment/success";

/// Default redirect for failed payments.
pub const DEFAULT_FAILURE_URL: &str = "https://wad-donation.vercel.app/payment/failure";

/// Callback status values the gateway sends.
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILURE: &str = "failure";

/// Where the signed payload is posted and where the gateway sends the donor
/// back afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEndpoints {
    /// Hosted checkout URL the browser form posts to.
    pub payment_url: String,
    /// `surl`: where the gateway redirects after a successful payment.
    pub success_url: String,
    /// `furl`: where the gateway redirects after a failed payment.
    pub failure_url: String,
}

impl Default for GatewayEndpoints {
    fn default() -> Self {
        Self {
            payment_url: LIVE_PAYMENT_URL.to_string(),
            success_url: DEFAULT_SUCCESS_URL.to_string(),
            failure_url: DEFAULT_FAILURE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Deployment Profile
// ---------------------------------------------------------------------------

/// Deployment profile. Decides whether missing credentials abort startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local development. Missing credentials are tolerated at startup, but
    /// every sign/verify call is refused until they are supplied.
    Development,
    /// Anything reachable by real donors. Missing credentials are fatal.
    Production,
}

impl Profile {
    pub fn is_production(self) -> bool {
        matches!(self, Profile::Production)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(format!(
                "unknown profile `{}` (expected `development` or `production`)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_slots_total_ten() {
        // The gateway's hash formula has exactly ten slots between email and salt.
        assert_eq!(OPTIONAL_SLOT_COUNT, 10);
    }

    #[test]
    fn test_txnid_widths_fit_gateway_limit() {
        // The gateway rejects txnids longer than 25 characters.
        let len = TXNID_PREFIX.len() + TXNID_TIMESTAMP_WIDTH + TXNID_SUFFIX_WIDTH;
        assert!(len <= 25, "txnid length {} exceeds gateway limit", len);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("production".parse::<Profile>(), Ok(Profile::Production));
        assert_eq!("DEV".parse::<Profile>(), Ok(Profile::Development));
        assert!("staging".parse::<Profile>().is_err());
    }

    #[test]
    fn test_profile_display_round_trips() {
        for p in [Profile::Development, Profile::Production] {
            assert_eq!(p.to_string().parse::<Profile>(), Ok(p));
        }
    }

    #[test]
    fn test_default_endpoints_use_live_gateway() {
        let endpoints = GatewayEndpoints::default();
        assert_eq!(endpoints.payment_url, LIVE_PAYMENT_URL);
        assert_ne!(endpoints.success_url, endpoints.failure_url);
    }
}
