//! # Merchant Credentials
//!
//! The merchant key and salt shared with the gateway. Loaded once at
//! startup and passed explicitly to every signing and verification call.
//!
//! There is no fallback pair baked into the binary. Whether a missing value
//! aborts startup depends on the deployment [`Profile`].

use std::fmt;

use crate::config::Profile;
use crate::error::{is_blank, ProtocolError};

/// The merchant key/salt pair. Immutable once constructed.
///
/// `Debug` redacts both values so the struct can sit inside logged state
/// without leaking anything.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantCredentials {
    key: String,
    salt: String,
}

impl MerchantCredentials {
    /// Builds credentials from explicit values.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Configuration`] if either value is blank.
    pub fn new(key: impl Into<String>, salt: impl Into<String>) -> Result<Self, ProtocolError> {
        let key = key.into();
        let salt = salt.into();

        let mut missing = Vec::new();
        if is_blank(Some(&key)) {
            missing.push("merchant key");
        }
        if is_blank(Some(&salt)) {
            missing.push("merchant salt");
        }
        if !missing.is_empty() {
            return Err(ProtocolError::Configuration {
                reason: format!("{} not supplied", missing.join(" and ")),
            });
        }

        Ok(Self { key, salt })
    }

    /// Resolves optional configuration values against the deployment profile.
    ///
    /// - Both present: `Ok(Some(credentials))`.
    /// - Either absent under [`Profile::Production`]: `Err(Configuration)`.
    /// - Either absent under [`Profile::Development`]: `Ok(None)`; callers
    ///   must refuse to sign or verify until credentials are configured.
    pub fn load(
        key: Option<String>,
        salt: Option<String>,
        profile: Profile,
    ) -> Result<Option<Self>, ProtocolError> {
        match (key, salt) {
            (Some(key), Some(salt)) if !is_blank(Some(&key)) && !is_blank(Some(&salt)) => {
                Self::new(key, salt).map(Some)
            }
            (key, salt) => {
                let err = Self::new(key.unwrap_or_default(), salt.unwrap_or_default())
                    .err()
                    .unwrap_or_else(|| ProtocolError::Configuration {
                        reason: "merchant credentials not supplied".into(),
                    });
                if profile.is_production() {
                    Err(err)
                } else {
                    tracing::warn!(
                        %profile,
                        "merchant credentials not configured; signing and verification are disabled"
                    );
                    Ok(None)
                }
            }
        }
    }

    /// The merchant key. Public on the wire: the gateway requires it in the
    /// signed payload.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared salt. Only ever fed into a canonical string.
    pub(crate) fn salt(&self) -> &str {
        &self.salt
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("key", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}
