//! # Test Doubles
//!
//! Helpers for exercising graphs without real components.
//!
//! | Helper | Purpose |
//! |--------|---------|
//! | [`Recorder`] | Builds delayed `up`/`down` actions that log when they complete and count how often they were invoked |
//! | [`ManualSignals`] | A [`SignalSource`] driven by a [`SignalTrigger`] instead of the process |
//!
//! Delays use `tokio::time::sleep`, so tests can run with a paused clock
//! (`#[tokio::test(start_paused = true)]`) and measure exact virtual durations.
//!
//! ```rust
//! use applife::mock::Recorder;
//! use applife::{Applife, Graph, LifecycleConfig, NodeSpec};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = Recorder::new();
//!     let graph = Graph::new()
//!         .node("db", NodeSpec::new()
//!             .up(recorder.up("db", Duration::from_millis(5), 1u8))
//!             .down(recorder.down("db", Duration::ZERO)));
//!
//!     let app = Applife::with_config(graph, LifecycleConfig::default().without_signals()).unwrap();
//!     app.run().await.unwrap();
//!     assert_eq!(recorder.log(), ["db", "down:db"]);
//! }
//! ```

use crate::engine::lock;
use crate::graph::{BoxError, Loaded};
use crate::lifecycle::signals::{Signal, SignalSource};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type UpFn<V> = Box<dyn Fn(Loaded<V>) -> BoxFuture<'static, Result<V, BoxError>> + Send + Sync>;
type DownFn<V> = Box<dyn Fn(Loaded<V>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Records completions and invocation counts of the actions it builds.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in completion order: `label` for a successful up,
    /// `fail:label` for a failed up, `down:label` for a down.
    pub fn log(&self) -> Vec<String> {
        lock(&self.log).clone()
    }

    /// Entries of the log starting with `down:`, without the prefix.
    pub fn downs(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix("down:").map(str::to_string))
            .collect()
    }

    /// How many times the action logging `entry` was invoked.
    pub fn calls(&self, entry: &str) -> usize {
        lock(&self.calls).get(entry).copied().unwrap_or(0)
    }

    /// An `up` that resolves to `value` after `delay`.
    pub fn up<V>(&self, label: &str, delay: Duration, value: V) -> UpFn<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        let recorder = self.clone();
        let label = label.to_string();
        Box::new(move |_: Loaded<V>| {
            let entry = recorder.invoked(&label);
            let recorder = recorder.clone();
            let value = value.clone();
            async move {
                tokio::time::sleep(delay).await;
                recorder.push(entry);
                Ok::<V, BoxError>(value)
            }
            .boxed()
        })
    }

    /// An `up` that fails with `message` after `delay`.
    pub fn failing_up<V>(&self, label: &str, delay: Duration, message: &str) -> UpFn<V>
    where
        V: Send + 'static,
    {
        let recorder = self.clone();
        let entry = format!("fail:{label}");
        let message = message.to_string();
        Box::new(move |_: Loaded<V>| {
            let entry = recorder.invoked(&entry);
            let recorder = recorder.clone();
            let message = message.clone();
            async move {
                tokio::time::sleep(delay).await;
                recorder.push(entry);
                Err::<V, BoxError>(BoxError::from(message))
            }
            .boxed()
        })
    }

    /// A `down` that completes after `delay`.
    pub fn down<V>(&self, label: &str, delay: Duration) -> DownFn<V>
    where
        V: Send + 'static,
    {
        self.down_with(label, delay, None)
    }

    /// A `down` that fails with `message` after `delay`.
    pub fn failing_down<V>(&self, label: &str, delay: Duration, message: &str) -> DownFn<V>
    where
        V: Send + 'static,
    {
        self.down_with(label, delay, Some(message.to_string()))
    }

    fn down_with<V>(&self, label: &str, delay: Duration, failure: Option<String>) -> DownFn<V>
    where
        V: Send + 'static,
    {
        let recorder = self.clone();
        let entry = format!("down:{label}");
        Box::new(move |_: Loaded<V>| {
            let entry = recorder.invoked(&entry);
            let recorder = recorder.clone();
            let failure = failure.clone();
            async move {
                tokio::time::sleep(delay).await;
                recorder.push(entry);
                match failure {
                    Some(message) => Err(BoxError::from(message)),
                    None => Ok(()),
                }
            }
            .boxed()
        })
    }

    fn invoked(&self, entry: &str) -> String {
        *lock(&self.calls).entry(entry.to_string()).or_insert(0) += 1;
        entry.to_string()
    }

    fn push(&self, entry: String) {
        lock(&self.log).push(entry);
    }
}

/// Signal source fed by hand through a [`SignalTrigger`].
pub struct ManualSignals {
    receiver: mpsc::UnboundedReceiver<Signal>,
}

/// Sending half of [`ManualSignals`].
#[derive(Clone)]
pub struct SignalTrigger {
    sender: mpsc::UnboundedSender<Signal>,
}

impl ManualSignals {
    pub fn channel() -> (Self, SignalTrigger) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, SignalTrigger { sender })
    }
}

impl SignalTrigger {
    /// Delivers `signal`. Returns `false` if the listener is gone.
    pub fn send(&self, signal: Signal) -> bool {
        self.sender.send(signal).is_ok()
    }
}

#[async_trait]
impl SignalSource for ManualSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.receiver.recv().await
    }
}
