//! # Resolution Engine
//!
//! Owns everything that changes while a graph boots and shuts down:
//!
//! - **Loaded values**: results of successful `up` actions. A value is stored
//!   by the boot handle itself, before any awaiter observes the result.
//! - **Up ledger / down ledger**: one shared handle per node and direction.
//!   The handle is created and stored under the ledger lock before anyone
//!   awaits it, so concurrent resolvers reaching the same node await the same
//!   action instead of invoking it again.
//! - **Error set**: boot failures in the order they happened.
//! - **Shutdown failures**: `down` failures, logged and reported but never raised.
//!
//! Resolution fans out with `join_all` inside the calling task. Nothing is
//! spawned per node, so the ordering guarantees hold under any Tokio runtime
//! flavor. Locks are `std::sync::Mutex` and are never held across an await.
//!
//! The resolvers themselves live in [`up`] and [`down`].

mod down;
mod up;

use crate::error::{ErrorSet, LifecycleError, NodeFailure, SharedError};
use crate::graph::{Graph, Loaded};
use crate::lifecycle::events::{LifecycleEvent, StopReason};
use futures::future::{join_all, BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{info, info_span, Instrument};

type UpHandle<V> = Shared<BoxFuture<'static, Result<V, SharedError>>>;
type DownHandle = Shared<BoxFuture<'static, Result<(), SharedError>>>;

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct Engine<V> {
    graph: Graph<V>,
    loaded: Arc<Mutex<Loaded<V>>>,
    up_ledger: Mutex<HashMap<String, UpHandle<V>>>,
    down_ledger: Mutex<HashMap<String, DownHandle>>,
    errors: Mutex<ErrorSet>,
    shutdown_failures: Mutex<Vec<NodeFailure>>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl<V: Clone + Send + Sync + 'static> Engine<V> {
    pub(crate) fn new(graph: Graph<V>, events: broadcast::Sender<LifecycleEvent>) -> Self {
        Self {
            graph,
            loaded: Arc::new(Mutex::new(HashMap::new())),
            up_ledger: Mutex::new(HashMap::new()),
            down_ledger: Mutex::new(HashMap::new()),
            errors: Mutex::new(ErrorSet::new()),
            shutdown_failures: Mutex::new(Vec::new()),
            events,
        }
    }

    pub(crate) fn graph(&self) -> &Graph<V> {
        &self.graph
    }

    /// Everything loaded so far.
    pub(crate) fn loaded(&self) -> Loaded<V> {
        lock(&self.loaded).clone()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: LifecycleEvent) {
        // No subscriber is not an error.
        let _ = self.events.send(event);
    }

    /// The aggregate boot failure, if any node failed.
    pub(crate) fn boot_error(&self) -> Option<LifecycleError> {
        lock(&self.errors).to_aggregate()
    }

    pub(crate) fn shutdown_failures(&self) -> Vec<NodeFailure> {
        lock(&self.shutdown_failures).clone()
    }

    /// Resolves every node upward concurrently.
    pub(crate) async fn boot(&self) {
        join_all(self.graph.names().map(|name| self.resolve_up(name)))
            .instrument(info_span!("boot"))
            .await;
    }

    /// Root sweep: resolves every node downward concurrently, then notifies.
    pub(crate) async fn stop(&self) {
        join_all(self.graph.names().map(|name| self.resolve_down(name)))
            .instrument(info_span!("shutdown"))
            .await;
        info!(reason = %StopReason::Stop, "Stopped");
        self.emit(LifecycleEvent::Stopped {
            reason: StopReason::Stop,
        });
    }
}
