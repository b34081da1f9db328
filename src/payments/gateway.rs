use crate::config::ConfigError;
use crate::payments::error::{GatewayError, GatewayResult};
use crate::payments::idempotency::IdempotencyKey;
use axum::body::Bytes;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the gateway bearer credential.
pub const ACCESS_TOKEN_VAR: &str = "PIX_GATEWAY_ACCESS_TOKEN";

const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com/v1";

#[derive(Clone)]
pub struct GatewayConfig {
    /// Absence is tolerated at startup (with a warning); requests then fail
    /// with a configuration error before any upstream call.
    pub access_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_token: std::env::var(ACCESS_TOKEN_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            base_url: std::env::var("PIX_GATEWAY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: std::env::var("PIX_GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "PIX_GATEWAY_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PIX_GATEWAY_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Status code and JSON body as answered by the gateway, relayed to the
/// caller without reinterpretation.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: JsonValue,
}

/// Sole holder of the gateway credential. Every outbound call carries
/// `Authorization: Bearer <secret>`; the secret never leaves this type.
pub struct GatewayClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_ok()
    }

    fn credential(&self) -> GatewayResult<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(GatewayError::MissingCredential {
                variable: ACCESS_TOKEN_VAR,
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Forward a creation body to the gateway unmodified, tagged with a
    /// fresh idempotency key. The body is treated as opaque bytes; the
    /// proxy does not validate payload structure. No automatic retry.
    pub async fn create_payment(
        &self,
        body: Bytes,
        key: &IdempotencyKey,
    ) -> GatewayResult<UpstreamReply> {
        let token = self.credential()?;

        let response = self
            .http
            .post(self.endpoint("/payments"))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .header("X-Idempotency-Key", key.to_string())
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                message: format!("payment creation request failed: {}", e),
            })?;

        Self::relay(response).await
    }

    /// Read a payment resource by id. A pure read: no idempotency key.
    pub async fn payment_status(&self, id: &str) -> GatewayResult<UpstreamReply> {
        let token = self.credential()?;

        let response = self
            .http
            .get(self.endpoint(&format!("/payments/{}", id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                message: format!("payment status request failed: {}", e),
            })?;

        Self::relay(response).await
    }

    /// Relay contract: the gateway's status code is preserved, the body is
    /// parsed as JSON, and a non-JSON body is wrapped as `{"raw": <text>}`
    /// so the caller always receives JSON under the original status.
    async fn relay(response: reqwest::Response) -> GatewayResult<UpstreamReply> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| GatewayError::Transport {
            message: format!("failed to read gateway response: {}", e),
        })?;

        let body = if text.is_empty() {
            json!({})
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }))
        };

        debug!(status, "relaying gateway response");
        Ok(UpstreamReply { status, body })
    }
}
