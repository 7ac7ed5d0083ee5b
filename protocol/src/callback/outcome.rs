//! Maps a verified (or not) callback to what the donor sees next.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{GatewayEndpoints, STATUS_FAILURE, STATUS_SUCCESS};

/// Final disposition of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Success,
    Failure,
    Pending,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Success => "success",
            Disposition::Failure => "failure",
            Disposition::Pending => "pending",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to tell the donor and where to send them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub disposition: Disposition,
    /// Redirect target. `None` for pending payments.
    pub redirect: Option<String>,
    pub message: String,
}

/// Resolves callback status + hash validity into an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeResolver {
    success_url: String,
    failure_url: String,
}

impl OutcomeResolver {
    pub fn new(success_url: impl Into<String>, failure_url: impl Into<String>) -> Self {
        Self {
            success_url: success_url.into(),
            failure_url: failure_url.into(),
        }
    }

    pub fn from_endpoints(endpoints: &GatewayEndpoints) -> Self {
        Self::new(endpoints.success_url.clone(), endpoints.failure_url.clone())
    }

    /// Total over its inputs. Rules, first match wins:
    ///
    /// 1. `"success"` with a valid hash → [`Disposition::Success`].
    /// 2. `"failure"`, or any status with an invalid hash → [`Disposition::Failure`].
    ///    A tampered "success" lands here.
    /// 3. Anything else → [`Disposition::Pending`], no redirect.
    pub fn resolve(&self, status: &str, is_valid: bool) -> Outcome {
        if status == STATUS_SUCCESS && is_valid {
            Outcome {
                disposition: Disposition::Success,
                redirect: Some(self.success_url.clone()),
                message: "Payment successful".into(),
            }
        } else if status == STATUS_FAILURE || !is_valid {
            let message = if is_valid {
                "Payment failed"
            } else {
                "Payment could not be verified"
            };
            Outcome {
                disposition: Disposition::Failure,
                redirect: Some(self.failure_url.clone()),
                message: message.into(),
            }
        } else {
            Outcome {
                disposition: Disposition::Pending,
                redirect: None,
                message: format!("Payment status is `{}`; awaiting confirmation", status),
            }
        }
    }
}
