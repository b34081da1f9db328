//! HTTP surface of the payment proxy.
//!
//! Two routes, both transparent relays: the proxy injects the credential
//! and an idempotency key, then hands back whatever the gateway answered.
//! Wrong verbs are answered with 405 by the method router before any
//! handler (and therefore any upstream call) runs.

use crate::error::ApiError;
use crate::payments::gateway::{GatewayClient, UpstreamReply};
use crate::payments::idempotency::IdempotencyKey;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};

/// State shared by the payment routes.
#[derive(Clone)]
pub struct PaymentsState {
    pub gateway: Arc<GatewayClient>,
}

pub fn routes(state: PaymentsState) -> Router {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/{id}", get(get_payment_status))
        .with_state(state)
}

/// POST /payments — relay the raw JSON body to the gateway with a fresh
/// idempotency key per invocation.
pub async fn create_payment(State(state): State<PaymentsState>, body: Bytes) -> Response {
    let key = IdempotencyKey::generate();

    match state.gateway.create_payment(body, &key).await {
        Ok(reply) => {
            info!(status = reply.status, "payment creation relayed");
            relay_response(reply)
        }
        Err(e) => {
            warn!(error = %e, "payment creation failed before reaching the gateway");
            ApiError::from(e).into_response()
        }
    }
}

/// GET /payments/{id} — relay a status read. A blank id is rejected with
/// 400 before any upstream call.
pub async fn get_payment_status(
    State(state): State<PaymentsState>,
    Path(id): Path<String>,
) -> Response {
    let id = id.trim();
    if id.is_empty() {
        return ApiError::BadRequest("payment id is required".to_string()).into_response();
    }

    match state.gateway.payment_status(id).await {
        Ok(reply) => relay_response(reply),
        Err(e) => {
            warn!(payment_id = %id, error = %e, "payment status check failed before reaching the gateway");
            ApiError::from(e).into_response()
        }
    }
}

fn relay_response(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(reply.body)).into_response()
}
