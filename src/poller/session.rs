//! Payment status polling.
//!
//! A [`PollingSession`] owns at most one polling task. Starting a session
//! for a new payment id cancels the previous registration first, so two
//! timers can never race for the same logical checkout. Checks within a
//! task run sequentially (each is awaited before the next sleep), and a
//! terminal transition ends the task, which makes the terminal outcome a
//! once-only latch without explicit guarding.

use crate::payments::types::StatusBucket;
use crate::poller::source::StatusSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Terminal result of a polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Payment approved; proceed to the success outcome.
    Approved { payment_id: String },
    /// Payment concluded without approval. Sub-reasons are not
    /// distinguished.
    Rejected { payment_id: String, message: String },
    /// The status service itself is unreachable or misconfigured.
    Unavailable { payment_id: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling { payment_id: String },
    Concluded(PollOutcome),
}

impl PollState {
    pub fn outcome(&self) -> Option<&PollOutcome> {
        match self {
            PollState::Concluded(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between status checks. The first check is issued
    /// immediately, not after the first interval.
    pub interval: Duration,
    /// Optional bound on the number of checks; `None` polls until a
    /// terminal status or cancellation.
    pub max_checks: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_checks: None,
        }
    }
}

impl PollerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.interval.as_secs()),
            ),
            max_checks: std::env::var("POLL_MAX_CHECKS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok()),
        }
    }
}

/// One polling session per checkout attempt. Dropping the session cancels
/// any active registration, so a torn-down caller cannot leak checks.
pub struct PollingSession {
    source: Arc<dyn StatusSource>,
    config: PollerConfig,
    state_tx: watch::Sender<PollState>,
    task: Option<JoinHandle<()>>,
}

impl PollingSession {
    pub fn new(source: Arc<dyn StatusSource>, config: PollerConfig) -> Self {
        let (state_tx, _) = watch::channel(PollState::Idle);
        Self {
            source,
            config,
            state_tx,
            task: None,
        }
    }

    /// Observe session state transitions: `Idle → Polling → Concluded`.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.state_tx.borrow().clone()
    }

    /// Begin polling for `payment_id`. Any previous registration is
    /// cancelled first; at most one polling task exists per session.
    pub fn start(&mut self, payment_id: impl Into<String>) {
        self.cancel();

        let payment_id = payment_id.into();
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let state_tx = self.state_tx.clone();

        state_tx.send_replace(PollState::Polling {
            payment_id: payment_id.clone(),
        });
        self.task = Some(tokio::spawn(poll_loop(
            source, config, state_tx, payment_id,
        )));
    }

    /// Clear the active registration, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    config: PollerConfig,
    state_tx: watch::Sender<PollState>,
    payment_id: String,
) {
    let mut checks: u32 = 0;

    loop {
        checks += 1;

        match source.fetch_status(&payment_id).await {
            Ok(status) => match status.bucket() {
                StatusBucket::Pending => {
                    debug!(payment_id = %payment_id, status = %status, checks, "payment still pending");
                }
                StatusBucket::Approved => {
                    info!(payment_id = %payment_id, status = %status, checks, "payment approved");
                    state_tx.send_replace(PollState::Concluded(PollOutcome::Approved {
                        payment_id,
                    }));
                    return;
                }
                StatusBucket::Rejected => {
                    info!(payment_id = %payment_id, status = %status, checks, "payment concluded without approval");
                    state_tx.send_replace(PollState::Concluded(PollOutcome::Rejected {
                        payment_id,
                        message: "payment was not approved".to_string(),
                    }));
                    return;
                }
            },
            Err(e) if e.is_fatal() => {
                warn!(payment_id = %payment_id, error = %e, "status check failed fatally, stopping");
                state_tx.send_replace(PollState::Concluded(PollOutcome::Unavailable {
                    payment_id,
                    message: "payment status service is unavailable; retry later or contact support"
                        .to_string(),
                }));
                return;
            }
            Err(e) => {
                // Transient; the next scheduled check proceeds.
                warn!(payment_id = %payment_id, error = %e, "transient status check failure");
            }
        }

        if let Some(max) = config.max_checks {
            if checks >= max {
                warn!(payment_id = %payment_id, checks, "status check budget exhausted");
                state_tx.send_replace(PollState::Concluded(PollOutcome::Unavailable {
                    payment_id,
                    message: format!("gave up after {} status checks", checks),
                }));
                return;
            }
        }

        tokio::time::sleep(config.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_observed_design() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.max_checks, None);
    }

    #[test]
    fn outcome_accessor_only_reports_concluded_states() {
        assert!(PollState::Idle.outcome().is_none());
        assert!(PollState::Polling {
            payment_id: "1".to_string()
        }
        .outcome()
        .is_none());

        let state = PollState::Concluded(PollOutcome::Approved {
            payment_id: "1".to_string(),
        });
        assert_eq!(
            state.outcome(),
            Some(&PollOutcome::Approved {
                payment_id: "1".to_string()
            })
        );
    }
}
