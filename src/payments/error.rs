use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures produced by the proxy before or while reaching the gateway.
///
/// Provider responses, including non-2xx business errors, are never mapped
/// into this type — they travel back to the caller as an `UpstreamReply`
/// with the original status code and body.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The credential is absent from the environment. The error names the
    /// missing setting, never a credential value.
    #[error("{variable} is not configured in the environment")]
    MissingCredential { variable: &'static str },

    /// Network-level failure talking to the gateway. Not retried here;
    /// retry responsibility belongs to the caller, mediated by the
    /// idempotency key.
    #[error("{message}")]
    Transport { message: String },
}

impl GatewayError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            GatewayError::MissingCredential { .. } => 500,
            GatewayError::Transport { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_setting() {
        let err = GatewayError::MissingCredential {
            variable: "PIX_GATEWAY_ACCESS_TOKEN",
        };
        assert!(err.to_string().contains("PIX_GATEWAY_ACCESS_TOKEN"));
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn transport_errors_carry_the_underlying_message() {
        let err = GatewayError::Transport {
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status_code(), 500);
    }
}
