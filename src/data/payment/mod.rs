use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};

pub mod db;

pub static PAYMENT_COLLECTION_NAME: &str = "payments";

fn default_payment_status() -> String {
    "succeeded".to_string()
}

/// Body of `POST /payments`, sent by the client after the gateway confirmed the charge.
///
/// `cartItems` is accepted and stored but nothing is removed from the cart: the
/// enrollment flag is flipped by a separate `PATCH /classes/enrollment/<id>` call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub email: String,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cart_items: Vec<String>,
    pub price: f64,
    pub transaction_id: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default = "default_payment_status")]
    pub status: String,
}

impl NewPayment {
    pub fn validate(&self) -> Result<(), Problem> {
        if !self.email.contains('@') {
            return Err(problems::invalid_field(
                "email",
                "Not a valid e-mail address.",
            ));
        }
        if self.transaction_id.trim().is_empty() {
            return Err(problems::invalid_field(
                "transactionId",
                "Transaction id can't be empty.",
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::invalid_field(
                "price",
                "Price must be a non-negative number.",
            ));
        }

        Ok(())
    }
}

/// Projection served by `GET /paymenthistory/<email>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /create-payment-intent`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

impl PaymentIntentRequest {
    pub fn validate(&self) -> Result<(), Problem> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(problems::invalid_field(
                "price",
                "Price must be a positive number.",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_defaults_fill_missing_fields() {
        let payment: NewPayment = serde_json::from_str(
            r#"{"email":"s@x.com","className":"French","price":30,"transactionId":"pi_1"}"#,
        )
        .unwrap();

        assert!(payment.validate().is_ok());
        assert_eq!(payment.status, "succeeded");
        assert!(payment.cart_items.is_empty());

        let document = bson::to_document(&payment).unwrap();
        assert!(document.get_str("date").is_ok());
        assert!(!document.contains_key("cartItems"));
    }

    #[test]
    fn payment_email_must_be_an_address() {
        let payment: NewPayment = serde_json::from_str(
            r#"{"email":"nobody","className":"French","price":30,"transactionId":"pi_1"}"#,
        )
        .unwrap();

        let problem = payment.validate().unwrap_err();
        assert_eq!(problem.body["field"], "email");
    }

    #[test]
    fn intent_price_must_be_positive() {
        assert!(PaymentIntentRequest { price: 0.0 }.validate().is_err());
        assert!(PaymentIntentRequest { price: f64::NAN }.validate().is_err());
        assert!(PaymentIntentRequest { price: 12.5 }.validate().is_ok());
    }
}
