//! # Lifecycle Controller
//!
//! [`Applife`] is the entry point: it owns one resolution engine for one
//! graph, and exposes `start`, `stop` and `run`.
//!
//! ## Boot
//!
//! `start()` resolves every node upward at once. Each node waits for its
//! `needs` to settle, then invokes its `up` action exactly once. Independent
//! branches run concurrently, so boot time is bounded by the longest chain
//! rather than the number of nodes.
//!
//! The first `up` failure aborts the boot globally: no node whose `up` has
//! not been invoked yet will be invoked afterwards, even in unrelated
//! branches. Actions already in flight run to completion. The failing node
//! then drives a full shutdown sweep before `start()` returns
//! [`LifecycleError::BootFailed`] with every failure in the order it happened.
//!
//! ## Shutdown
//!
//! `stop()` resolves every node downward at once. A node waits for its
//! `after` targets to stop, then invokes its `down` action exactly once, but
//! only if its `up` succeeded (or it is a down-only step). A sweep always
//! completes; failing `down` actions are logged and available through
//! [`Applife::shutdown_failures`].
//!
//! ## Signals
//!
//! Once started, the controller listens for the configured termination
//! signals. Each one runs a shutdown sweep and then broadcasts
//! `Stopped { reason: Signal(..) }`. The process is left running.
//!
//! ```rust
//! use applife::{Applife, BoxError, Graph, LifecycleConfig, Loaded, NodeSpec};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), applife::LifecycleError> {
//! let graph = Graph::new()
//!     .node("a", NodeSpec::new().up(|_| async { Ok::<_, BoxError>(1) }))
//!     .node(
//!         "b",
//!         NodeSpec::new()
//!             .needs(["a"])
//!             .up(|loaded: Loaded<i64>| async move { Ok::<_, BoxError>(loaded["a"] + 10) }),
//!     );
//!
//! let app = Applife::with_config(graph, LifecycleConfig::default().without_signals())?;
//! let loaded = app.start().await?;
//! assert_eq!(loaded["b"], 11);
//! app.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod signals;

use crate::config::LifecycleConfig;
use crate::engine::{lock, Engine};
use crate::error::{LifecycleError, NodeFailure};
use crate::graph::{Graph, Loaded};
use events::{LifecycleEvent, StopReason};
use signals::{OsSignals, Signal, SignalSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Boots and tears down a dependency graph of components.
pub struct Applife<V> {
    engine: Arc<Engine<V>>,
    signals: Vec<Signal>,
    source: Mutex<Option<Box<dyn SignalSource>>>,
    started: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<V: Clone + Send + Sync + 'static> Applife<V> {
    /// Creates a controller with the default configuration.
    pub fn new(graph: Graph<V>) -> Result<Self, LifecycleError> {
        Self::with_config(graph, LifecycleConfig::default())
    }

    /// Creates a controller, rejecting edges that name undeclared nodes.
    pub fn with_config(graph: Graph<V>, config: LifecycleConfig) -> Result<Self, LifecycleError> {
        graph.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Ok(Self {
            engine: Arc::new(Engine::new(graph, events)),
            signals: config.signals,
            source: Mutex::new(None),
            started: AtomicBool::new(false),
            listener: Mutex::new(None),
        })
    }

    /// Replaces the process signal listener with a custom source.
    pub fn with_signal_source(self, source: impl SignalSource) -> Self {
        *lock(&self.source) = Some(Box::new(source));
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.engine.subscribe()
    }

    /// Boots the graph and returns the values of every node that started.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::BootFailed`] if any `up` action failed; the
    ///   shutdown sweep has already run when this is returned.
    /// - [`LifecycleError::AlreadyStarted`] on a second call.
    pub async fn start(&self) -> Result<Loaded<V>, LifecycleError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(LifecycleError::AlreadyStarted);
        }
        self.listen_for_signals();

        info!(nodes = self.engine.graph().len(), "Booting");
        self.engine.boot().await;

        if let Some(err) = self.engine.boot_error() {
            error!(error = %err, "Boot sequence failed");
            return Err(err);
        }

        info!("Boot complete");
        self.engine.emit(LifecycleEvent::Started);
        Ok(self.engine.loaded())
    }

    /// Shuts down every started node. Safe to call any number of times.
    pub async fn stop(&self) {
        self.engine.stop().await;
    }

    /// Starts then stops the graph. The final sweep runs even if boot failed.
    pub async fn run(&self) -> Result<(), LifecycleError> {
        let booted = self.start().await;
        self.stop().await;
        booted.map(|_| ())
    }

    /// Values loaded so far.
    pub fn loaded(&self) -> Loaded<V> {
        self.engine.loaded()
    }

    /// `down` failures recorded so far, in the order they happened.
    pub fn shutdown_failures(&self) -> Vec<NodeFailure> {
        self.engine.shutdown_failures()
    }

    fn listen_for_signals(&self) {
        let custom = lock(&self.source).take();
        let source: Box<dyn SignalSource> = match custom {
            Some(source) => source,
            None if self.signals.is_empty() => return,
            None => Box::new(OsSignals::new(&self.signals)),
        };

        let engine = Arc::clone(&self.engine);
        let handle = tokio::spawn(async move {
            let mut source = source;
            while let Some(signal) = source.recv().await {
                warn!(%signal, "Termination signal received");
                engine.stop().await;
                engine.emit(LifecycleEvent::Stopped {
                    reason: StopReason::Signal(signal),
                });
            }
        });
        *lock(&self.listener) = Some(handle);
    }
}

impl<V> Drop for Applife<V> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.listener).take() {
            handle.abort();
        }
    }
}
