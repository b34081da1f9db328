pub mod session;
pub mod source;

pub use session::{PollOutcome, PollState, PollerConfig, PollingSession};
pub use source::{StatusCheckError, StatusSource};
