//! The signed payload handed to the hosted gateway.
//!
//! Field names follow the gateway's form spelling (`productinfo`,
//! `firstname`, `surl`, ...) because the client posts this object verbatim
//! as a browser form.

use serde::{Deserialize, Serialize};

use crate::config::{GatewayEndpoints, SERVICE_PROVIDER};
use crate::credentials::MerchantCredentials;
use crate::error::ProtocolError;

use super::request::TransactionRequest;
use super::signing::sign_normalized;
use super::txnid::TransactionId;

/// Everything the gateway needs to start a hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPaymentPayload {
    pub key: String,
    pub txnid: String,
    pub amount: String,
    pub productinfo: String,
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf5: Option<String>,
    pub surl: String,
    pub furl: String,
    pub hash: String,
    pub service_provider: String,
}

/// Validates, signs, and assembles the gateway payload in one step.
///
/// # Errors
///
/// [`ProtocolError::Validation`] for missing required request fields.
pub fn build_payload(
    request: &TransactionRequest,
    txnid: &TransactionId,
    credentials: &MerchantCredentials,
    endpoints: &GatewayEndpoints,
) -> Result<SignedPaymentPayload, ProtocolError> {
    let normalized = request.normalize()?;
    let signature = sign_normalized(&normalized, txnid, credentials);

    let udf = |i: usize| Some(normalized.udfs[i]).filter(|v| !v.is_empty()).map(str::to_owned);

    Ok(SignedPaymentPayload {
        key: credentials.key().to_owned(),
        txnid: txnid.as_str().to_owned(),
        amount: normalized.amount.to_owned(),
        productinfo: normalized.product_info.to_owned(),
        firstname: normalized.first_name.to_owned(),
        lastname: normalized.last_name.map(str::to_owned),
        email: normalized.email.to_owned(),
        phone: normalized.phone.map(str::to_owned),
        udf1: udf(0),
        udf2: udf(1),
        udf3: udf(2),
        udf4: udf(3),
        udf5: udf(4),
        surl: endpoints.success_url.clone(),
        furl: endpoints.failure_url.clone(),
        hash: signature.hash,
        service_provider: SERVICE_PROVIDER.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> MerchantCredentials {
        MerchantCredentials::new("qyHOaB", "0x99YlO1SoZtMA98MzO9ebBrKEssz4z0").unwrap()
    }

    fn request() -> TransactionRequest {
        TransactionRequest {
            amount: Some("10.00".into()),
            first_name: Some("Test".into()),
            last_name: Some("Donor".into()),
            email: Some("test@example.com".into()),
            phone: Some("9999999999".into()),
            ..Default::default()
        }
    }

    #[test]
    fn payload_carries_gateway_fields() {
        let txnid = TransactionId::new("TXN1700000000000").unwrap();
        let payload =
            build_payload(&request(), &txnid, &creds(), &GatewayEndpoints::default()).unwrap();

        assert_eq!(payload.key, "qyHOaB");
        assert_eq!(payload.txnid, "TXN1700000000000");
        assert_eq!(payload.productinfo, "Donation");
        assert_eq!(payload.lastname.as_deref(), Some("Donor"));
        assert_eq!(payload.service_provider, "payu_paisa");
        assert_eq!(payload.surl, crate::config::DEFAULT_SUCCESS_URL);
        assert_eq!(payload.furl, crate::config::DEFAULT_FAILURE_URL);
        assert_eq!(
            payload.hash,
            "649532a6d00a80e26a44f93ab93b9e08238b300ea402c86487ba344c33ba932089fe3596f623cf038e6c0dba559833d43a83814d677f12369633c5de84af3f16"
        );
    }

    #[test]
    fn payload_json_never_contains_salt() {
        let txnid = TransactionId::new("TXN1").unwrap();
        let payload =
            build_payload(&request(), &txnid, &creds(), &GatewayEndpoints::default()).unwrap();
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("0x99YlO1SoZtMA98MzO9ebBrKEssz4z0"));
        assert!(!json.contains("udf1"));
    }

    #[test]
    fn supplied_udfs_are_echoed() {
        let mut req = request();
        req.udf2 = Some("campaign-7".into());
        let txnid = TransactionId::new("TXN1").unwrap();
        let payload = build_payload(&req, &txnid, &creds(), &GatewayEndpoints::default()).unwrap();
        assert_eq!(payload.udf1, None);
        assert_eq!(payload.udf2.as_deref(), Some("campaign-7"));
    }

    #[test]
    fn invalid_request_builds_nothing() {
        let txnid = TransactionId::new("TXN1").unwrap();
        let err = build_payload(
            &TransactionRequest::default(),
            &txnid,
            &creds(),
            &GatewayEndpoints::default(),
        )
        .unwrap_err();
        assert_eq!(err.missing_fields().len(), 3);
    }
}
