//! # Configuration
//!
//! [`LifecycleConfig`] tunes the controller. It derives `Deserialize` with
//! defaults for every field, so a host can nest it inside its own
//! configuration file and only override what it needs:
//!
//! ```rust
//! use applife::{LifecycleConfig, Signal};
//!
//! let config = LifecycleConfig::default()
//!     .with_event_capacity(16)
//!     .with_signals([Signal::Terminate]);
//! assert_eq!(config.signals, vec![Signal::Terminate]);
//! ```

use crate::lifecycle::signals::Signal;
use serde::Deserialize;

const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Capacity of the lifecycle event broadcast channel.
    pub event_capacity: usize,
    /// Signals that trigger a shutdown sweep once `start()` has been called.
    pub signals: Vec<Signal>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            signals: vec![Signal::Interrupt, Signal::Terminate],
        }
    }
}

impl LifecycleConfig {
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.signals = signals.into_iter().collect();
        self
    }

    /// Disables signal handling entirely.
    pub fn without_signals(mut self) -> Self {
        self.signals.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: LifecycleConfig = serde_json::from_str(r#"{ "signals": ["SIGTERM"] }"#).unwrap();
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.signals, vec![Signal::Terminate]);

        let faults: LifecycleConfig =
            serde_json::from_str(r#"{ "signals": ["uncaughtException", "panic"] }"#).unwrap();
        assert_eq!(faults.signals, vec![Signal::Panic, Signal::Panic]);

        let empty: LifecycleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, LifecycleConfig::default());
    }
}
