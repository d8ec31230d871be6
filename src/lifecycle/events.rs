//! # Lifecycle Notifications
//!
//! Events are broadcast over a `tokio::sync::broadcast` channel. Sending never
//! blocks and never fails the lifecycle: with no subscriber the event is
//! dropped, and a slow subscriber observes `RecvError::Lagged`.

use super::signals::Signal;
use std::fmt;

/// Why a shutdown sweep ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An explicit `stop()`, including the one issued after a boot failure.
    Stop,
    /// A termination signal delivered to the process.
    Signal(Signal),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Stop => write!(f, "stop"),
            StopReason::Signal(signal) => write!(f, "{signal}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    NodeStarted { node: String },
    NodeFailed { node: String },
    NodeStopped { node: String },
    /// Every node settled and none failed.
    Started,
    /// A shutdown sweep completed.
    Stopped { reason: StopReason },
}
