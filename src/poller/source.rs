use crate::payments::types::PaymentStatus;
use async_trait::async_trait;
use thiserror::Error;

pub type StatusCheckResult = Result<PaymentStatus, StatusCheckError>;

/// Failures of a single status check.
#[derive(Debug, Clone, Error)]
pub enum StatusCheckError {
    /// The proxy does not know the payment, or the status route is absent
    /// in the current deployment. Fatal for polling.
    #[error("payment {payment_id} not found at the proxy")]
    NotFound { payment_id: String },

    #[error("status check transport failure: {message}")]
    Transport { message: String },

    #[error("unexpected status response: HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("unreadable status payload: {message}")]
    InvalidPayload { message: String },
}

impl StatusCheckError {
    /// Only a not-found answer stops polling; every other failure is
    /// swallowed and the next scheduled check proceeds.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StatusCheckError::NotFound { .. })
    }
}

/// Where the poller reads payment status from. Production uses
/// [`crate::client::ProxyClient`]; tests script their own answers.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, payment_id: &str) -> StatusCheckResult;
}
