//! Donation request bodies and their normalization.
//!
//! Clients have historically sent two shapes: `{ firstName, productInfo }`
//! and `{ name, purpose }`. Both deserialize into [`TransactionRequest`];
//! [`TransactionRequest::normalize`] is the single place that resolves the
//! aliases, applies defaults, and checks required fields.

use serde::{Deserialize, Deserializer};

use crate::config::DEFAULT_PRODUCT_INFO;
use crate::error::ProtocolError;

/// A donation request as received from the client. Every field is optional
/// at this stage; [`normalize`](TransactionRequest::normalize) enforces
/// what the protocol requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Amount exactly as the donor entered it. JSON numbers are accepted
    /// and rendered with `serde_json`'s number formatting.
    #[serde(default, deserialize_with = "amount_text")]
    pub amount: Option<String>,
    #[serde(default, alias = "firstname")]
    pub first_name: Option<String>,
    /// Legacy spelling of `firstName`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "lastname")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "productinfo")]
    pub product_info: Option<String>,
    /// Legacy spelling of `productInfo`.
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub udf1: Option<String>,
    #[serde(default)]
    pub udf2: Option<String>,
    #[serde(default)]
    pub udf3: Option<String>,
    #[serde(default)]
    pub udf4: Option<String>,
    #[serde(default)]
    pub udf5: Option<String>,
    /// Caller-chosen transaction id. Generated when absent.
    #[serde(default, alias = "txnid")]
    pub txn_id: Option<String>,
}

/// A request that passed validation. Borrows from the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedRequest<'a> {
    pub amount: &'a str,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub product_info: &'a str,
    /// udf1..udf5, blank when not supplied.
    pub udfs: [&'a str; 5],
}

impl TransactionRequest {
    /// Resolves aliases and defaults, then checks required fields.
    ///
    /// `firstName` wins over `name`, `productInfo` over `purpose`. A blank
    /// product info falls back to [`DEFAULT_PRODUCT_INFO`]. Values are not
    /// trimmed: whatever the donor sent is what gets hashed.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Validation`] naming every missing or blank field
    /// among `amount`, `firstName`, and `email`.
    pub fn normalize(&self) -> Result<NormalizedRequest<'_>, ProtocolError> {
        let amount = present(&self.amount);
        let first_name = present(&self.first_name).or_else(|| present(&self.name));
        let email = present(&self.email);

        let mut missing = Vec::new();
        if amount.is_none() {
            missing.push("amount");
        }
        if first_name.is_none() {
            missing.push("firstName");
        }
        if email.is_none() {
            missing.push("email");
        }

        let (Some(amount), Some(first_name), Some(email)) = (amount, first_name, email) else {
            return Err(ProtocolError::Validation {
                missing_fields: missing,
            });
        };

        Ok(NormalizedRequest {
            amount,
            first_name,
            last_name: present(&self.last_name),
            email,
            phone: present(&self.phone),
            product_info: present(&self.product_info)
                .or_else(|| present(&self.purpose))
                .unwrap_or(DEFAULT_PRODUCT_INFO),
            udfs: [
                present(&self.udf1).unwrap_or(""),
                present(&self.udf2).unwrap_or(""),
                present(&self.udf3).unwrap_or(""),
                present(&self.udf4).unwrap_or(""),
                present(&self.udf5).unwrap_or(""),
            ],
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn amount_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawAmount>::deserialize(deserializer)?.map(|raw| match raw {
        RawAmount::Text(text) => text,
        RawAmount::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> TransactionRequest {
        serde_json::from_value(json).expect("valid request json")
    }

    #[test]
    fn camel_case_shape_normalizes() {
        let req = parse(serde_json::json!({
            "amount": "10.00",
            "firstName": "Test",
            "lastName": "Donor",
            "email": "test@example.com",
            "phone": "9999999999",
            "productInfo": "School Fund"
        }));
        let n = req.normalize().unwrap();
        assert_eq!(n.amount, "10.00");
        assert_eq!(n.first_name, "Test");
        assert_eq!(n.last_name, Some("Donor"));
        assert_eq!(n.product_info, "School Fund");
        assert_eq!(n.udfs, [""; 5]);
    }

    #[test]
    fn legacy_shape_normalizes() {
        let req = parse(serde_json::json!({
            "amount": "250",
            "name": "Asha",
            "email": "asha@example.com",
            "purpose": "Flood relief"
        }));
        let n = req.normalize().unwrap();
        assert_eq!(n.first_name, "Asha");
        assert_eq!(n.product_info, "Flood relief");
    }

    #[test]
    fn first_name_takes_precedence_over_name() {
        let req = parse(serde_json::json!({
            "amount": "1",
            "firstName": "Primary",
            "name": "Legacy",
            "email": "a@b.c"
        }));
        assert_eq!(req.normalize().unwrap().first_name, "Primary");
    }

    #[test]
    fn product_info_defaults_to_donation() {
        let req = parse(serde_json::json!({
            "amount": "1", "firstName": "A", "email": "a@b.c", "productInfo": "  "
        }));
        assert_eq!(req.normalize().unwrap().product_info, "Donation");
    }

    #[test]
    fn numeric_amount_is_accepted() {
        let req = parse(serde_json::json!({ "amount": 500, "firstName": "A", "email": "a@b.c" }));
        assert_eq!(req.normalize().unwrap().amount, "500");

        let req = parse(serde_json::json!({ "amount": 10.5, "firstName": "A", "email": "a@b.c" }));
        assert_eq!(req.normalize().unwrap().amount, "10.5");
    }

    #[test]
    fn amount_is_not_reformatted() {
        let req = parse(serde_json::json!({ "amount": " 10.00", "firstName": "A", "email": "a@b.c" }));
        assert_eq!(req.normalize().unwrap().amount, " 10.00");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let err = TransactionRequest::default().normalize().unwrap_err();
        assert_eq!(err.missing_fields(), &["amount", "firstName", "email"]);
    }

    #[test]
    fn blank_email_is_missing() {
        let req = parse(serde_json::json!({ "amount": "1", "name": "A", "email": "" }));
        assert_eq!(req.normalize().unwrap_err().missing_fields(), &["email"]);
    }

    #[test]
    fn udfs_keep_their_positions() {
        let req = parse(serde_json::json!({
            "amount": "1", "firstName": "A", "email": "a@b.c",
            "udf2": "campaign-7", "udf5": "web"
        }));
        assert_eq!(req.normalize().unwrap().udfs, ["", "campaign-7", "", "", "web"]);
    }

    #[test]
    fn gateway_spellings_are_aliases() {
        let req = parse(serde_json::json!({
            "amount": "1", "firstname": "A", "email": "a@b.c",
            "productinfo": "Gift", "txnid": "ORDER-1"
        }));
        assert_eq!(req.txn_id.as_deref(), Some("ORDER-1"));
        assert_eq!(req.normalize().unwrap().product_info, "Gift");
    }
}
