//! PIX payment-intent proxy and status poller.
//!
//! The proxy keeps the gateway credential server-side: it relays payment
//! creation and status reads to the remote provider with bearer auth and a
//! per-creation idempotency key, adding zero business logic. The poller
//! turns the provider's asynchronous status lifecycle into a terminal
//! approved / rejected / unavailable outcome for the caller.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod payments;
pub mod poller;
