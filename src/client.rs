//! Client-side checkout flow helpers.
//!
//! `ProxyClient` is the piece that runs next to the UI: it validates and
//! posts a payment intent through the proxy, reads back the QR payload for
//! rendering, and feeds the status poller. It never sees the gateway
//! credential.

use crate::payments::types::{
    InvalidPaymentRequest, PaymentIntentRequest, PaymentIntentResponse,
};
use crate::poller::source::{StatusCheckError, StatusCheckResult, StatusSource};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidPaymentRequest),

    #[error("proxy request failed: {message}")]
    Transport { message: String },

    #[error("payment {payment_id} not found")]
    NotFound { payment_id: String },

    #[error("proxy returned HTTP {status}: {message}")]
    Proxy { status: u16, message: String },

    #[error("unreadable proxy response: {message}")]
    InvalidPayload { message: String },
}

pub struct ProxyClient {
    http: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Transport {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a payment intent through the proxy. Validation runs locally
    /// before anything goes on the wire: a missing amount or payer email is
    /// a client error and is never forwarded.
    pub async fn create_payment(
        &self,
        request: &PaymentIntentRequest,
    ) -> ClientResult<PaymentIntentResponse> {
        request.validate()?;

        let response = self
            .http
            .post(self.endpoint("/payments"))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                message: e.to_string(),
            })?;

        let payment = Self::parse_payment(response, None).await?;
        info!(payment_id = %payment.id, status = %payment.status, "payment intent created");
        Ok(payment)
    }

    /// Read the current payment resource from the proxy.
    pub async fn payment_status(&self, payment_id: &str) -> ClientResult<PaymentIntentResponse> {
        let response = self
            .http
            .get(self.endpoint(&format!("/payments/{}", payment_id)))
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                message: e.to_string(),
            })?;

        Self::parse_payment(response, Some(payment_id)).await
    }

    async fn parse_payment(
        response: reqwest::Response,
        payment_id: Option<&str>,
    ) -> ClientResult<PaymentIntentResponse> {
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound {
                payment_id: payment_id.unwrap_or("unknown").to_string(),
            });
        }

        let text = response.text().await.map_err(|e| ClientError::Transport {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(ClientError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::InvalidPayload {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StatusSource for ProxyClient {
    async fn fetch_status(&self, payment_id: &str) -> StatusCheckResult {
        match self.payment_status(payment_id).await {
            Ok(payment) => Ok(payment.status),
            Err(ClientError::NotFound { payment_id }) => {
                Err(StatusCheckError::NotFound { payment_id })
            }
            Err(ClientError::Transport { message }) => {
                Err(StatusCheckError::Transport { message })
            }
            Err(ClientError::Proxy { status, .. }) => {
                Err(StatusCheckError::UnexpectedStatus { status })
            }
            Err(other) => Err(StatusCheckError::InvalidPayload {
                message: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::types::{PaymentStatus, Payer};
    use bigdecimal::BigDecimal;

    fn invalid_request() -> PaymentIntentRequest {
        PaymentIntentRequest {
            transaction_amount: BigDecimal::from(0),
            description: "Full access".to_string(),
            payment_method_id: "pix".to_string(),
            payer: Payer {
                email: "user@example.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_the_wire() {
        // Unroutable base URL: a transport attempt would fail differently.
        let client = ProxyClient::new("http://127.0.0.1:9").expect("client should build");
        let err = client
            .create_payment(&invalid_request())
            .await
            .expect_err("zero amount should fail locally");
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn parse_maps_404_to_not_found() {
        let response = http::Response::builder()
            .status(404)
            .body(r#"{"message":"resource not found"}"#)
            .expect("response should build");
        let err = ProxyClient::parse_payment(reqwest::Response::from(response), Some("77"))
            .await
            .expect_err("404 should map to NotFound");
        assert!(matches!(err, ClientError::NotFound { payment_id } if payment_id == "77"));
    }

    #[tokio::test]
    async fn parse_extracts_proxy_error_messages() {
        let response = http::Response::builder()
            .status(500)
            .body(r#"{"error":true,"message":"PIX_GATEWAY_ACCESS_TOKEN is not configured in the environment"}"#)
            .expect("response should build");
        let err = ProxyClient::parse_payment(reqwest::Response::from(response), Some("77"))
            .await
            .expect_err("500 should map to Proxy");
        match err {
            ClientError::Proxy { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("PIX_GATEWAY_ACCESS_TOKEN"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn parse_reads_a_typed_payment() {
        let response = http::Response::builder()
            .status(200)
            .body(r#"{"id":42,"status":"approved"}"#)
            .expect("response should build");
        let payment = ProxyClient::parse_payment(reqwest::Response::from(response), Some("42"))
            .await
            .expect("payment should parse");
        assert_eq!(payment.id, "42");
        assert_eq!(payment.status, PaymentStatus::Approved);
    }
}
