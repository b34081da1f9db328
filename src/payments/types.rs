use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A payment request that failed local validation. Nothing invalid is ever
/// put on the wire.
#[derive(Debug, Clone, Error)]
#[error("invalid payment request: {message}")]
pub struct InvalidPaymentRequest {
    pub message: String,
    pub field: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    pub email: String,
}

/// Body submitted to the proxy to create a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub transaction_amount: BigDecimal,
    pub description: String,
    pub payment_method_id: String,
    pub payer: Payer,
}

impl PaymentIntentRequest {
    /// Convenience constructor for the PIX payment rail.
    pub fn pix(
        transaction_amount: BigDecimal,
        description: impl Into<String>,
        payer_email: impl Into<String>,
    ) -> Self {
        Self {
            transaction_amount,
            description: description.into(),
            payment_method_id: "pix".to_string(),
            payer: Payer {
                email: payer_email.into(),
            },
        }
    }

    /// Amount and payer email must be present before forwarding; their
    /// absence is a client error, not an upstream one.
    pub fn validate(&self) -> Result<(), InvalidPaymentRequest> {
        if self.transaction_amount <= BigDecimal::from(0) {
            return Err(InvalidPaymentRequest {
                message: "transaction_amount must be greater than zero".to_string(),
                field: "transaction_amount",
            });
        }
        if self.payer.email.trim().is_empty() {
            return Err(InvalidPaymentRequest {
                message: "payer.email is required".to_string(),
                field: "payer.email",
            });
        }
        if self.payment_method_id.trim().is_empty() {
            return Err(InvalidPaymentRequest {
                message: "payment_method_id is required".to_string(),
                field: "payment_method_id",
            });
        }
        Ok(())
    }
}

/// Provider payment status, as a closed enumeration.
///
/// Unrecognized values deserialize as `Unknown` and bucket as rejected, so
/// a status the provider adds later can never be silently treated as
/// pending or approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    InProcess,
    InMediation,
    Approved,
    Authorized,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    #[serde(other)]
    Unknown,
}

/// The three-way classification the poller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn bucket(self) -> StatusBucket {
        match self {
            PaymentStatus::Pending | PaymentStatus::InProcess | PaymentStatus::InMediation => {
                StatusBucket::Pending
            }
            PaymentStatus::Approved | PaymentStatus::Authorized => StatusBucket::Approved,
            PaymentStatus::Rejected
            | PaymentStatus::Cancelled
            | PaymentStatus::Refunded
            | PaymentStatus::ChargedBack
            | PaymentStatus::Unknown => StatusBucket::Rejected,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self.bucket(), StatusBucket::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::InMediation => "in_mediation",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::ChargedBack => "charged_back",
            PaymentStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed view of the provider's payment resource, used on the client side.
/// The proxy itself relays bodies opaquely and never parses into this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    /// Provider-assigned identifier; immutable once created. The provider
    /// emits numeric ids, so both numbers and strings are accepted.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub transaction_amount: Option<BigDecimal>,
    #[serde(default)]
    pub point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointOfInteraction {
    #[serde(default)]
    pub transaction_data: Option<TransactionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

impl PaymentIntentResponse {
    fn transaction_data(&self) -> Option<&TransactionData> {
        self.point_of_interaction
            .as_ref()
            .and_then(|poi| poi.transaction_data.as_ref())
    }

    /// Copy-and-paste PIX payload, when the provider returned one.
    pub fn qr_code(&self) -> Option<&str> {
        self.transaction_data().and_then(|td| td.qr_code.as_deref())
    }

    /// Base64-encoded QR image, when the provider returned one.
    pub fn qr_code_base64(&self) -> Option<&str> {
        self.transaction_data()
            .and_then(|td| td.qr_code_base64.as_deref())
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "payment id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn request(amount: &str, email: &str) -> PaymentIntentRequest {
        PaymentIntentRequest::pix(
            BigDecimal::from_str(amount).expect("test amount should parse"),
            "Full access",
            email,
        )
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(request("19.90", "user@example.com").validate().is_ok());
    }

    #[test]
    fn zero_or_negative_amount_is_rejected() {
        let err = request("0", "user@example.com")
            .validate()
            .expect_err("zero amount should fail");
        assert_eq!(err.field, "transaction_amount");

        assert!(request("-5.00", "user@example.com").validate().is_err());
    }

    #[test]
    fn blank_email_is_rejected() {
        let err = request("19.90", "  ")
            .validate()
            .expect_err("blank email should fail");
        assert_eq!(err.field, "payer.email");
    }

    #[test]
    fn status_buckets_match_the_provider_sets() {
        assert_eq!(PaymentStatus::Pending.bucket(), StatusBucket::Pending);
        assert_eq!(PaymentStatus::InProcess.bucket(), StatusBucket::Pending);
        assert_eq!(PaymentStatus::InMediation.bucket(), StatusBucket::Pending);

        assert_eq!(PaymentStatus::Approved.bucket(), StatusBucket::Approved);
        assert_eq!(PaymentStatus::Authorized.bucket(), StatusBucket::Approved);

        assert_eq!(PaymentStatus::Rejected.bucket(), StatusBucket::Rejected);
        assert_eq!(PaymentStatus::Cancelled.bucket(), StatusBucket::Rejected);
        assert_eq!(PaymentStatus::ChargedBack.bucket(), StatusBucket::Rejected);
    }

    #[test]
    fn unrecognized_status_is_unknown_and_buckets_as_rejected() {
        let status: PaymentStatus =
            serde_json::from_value(json!("brand_new_status")).expect("should deserialize");
        assert_eq!(status, PaymentStatus::Unknown);
        assert_eq!(status.bucket(), StatusBucket::Rejected);
        assert!(status.is_terminal());
    }

    #[test]
    fn response_deserializes_with_numeric_id_and_qr_payload() {
        let payload = json!({
            "id": 123456789,
            "status": "pending",
            "transaction_amount": 19.90,
            "point_of_interaction": {
                "transaction_data": {
                    "qr_code": "00020126QRDATA",
                    "qr_code_base64": "aW1hZ2U=",
                    "ticket_url": "https://gateway.example/ticket/1"
                }
            }
        });
        let parsed: PaymentIntentResponse =
            serde_json::from_value(payload).expect("should deserialize");
        assert_eq!(parsed.id, "123456789");
        assert_eq!(parsed.status, PaymentStatus::Pending);
        assert_eq!(parsed.qr_code(), Some("00020126QRDATA"));
        assert_eq!(parsed.qr_code_base64(), Some("aW1hZ2U="));
    }

    #[test]
    fn response_tolerates_missing_interaction_data() {
        let payload = json!({ "id": "abc", "status": "approved" });
        let parsed: PaymentIntentResponse =
            serde_json::from_value(payload).expect("should deserialize");
        assert_eq!(parsed.id, "abc");
        assert!(parsed.qr_code().is_none());
        assert!(parsed.qr_code_base64().is_none());
    }
}
