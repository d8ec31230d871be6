//! Down resolver: brings a node and its transitive `after` targets to "stopped".

use super::{lock, DownHandle, Engine};
use crate::error::{NodeFailure, SharedError};
use crate::graph::DownAction;
use crate::lifecycle::events::LifecycleEvent;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, error, info};

impl<V: Clone + Send + Sync + 'static> Engine<V> {
    /// Returns once `name` has stopped, needs no stop, or never meaningfully
    /// started. A failing `down` is logged and reported, and still counts as
    /// settled for the nodes waiting on it.
    pub(crate) fn resolve_down<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ()> {
        async move {
            let Some(spec) = self.graph.get(name) else {
                return;
            };

            join_all(spec.after_set().iter().map(|target| self.resolve_down(target))).await;

            let Some(down) = spec.actions().down() else {
                return;
            };

            let boot = lock(&self.up_ledger).get(name).cloned();
            match boot {
                // Declared an `up` that never ran: nothing to tear down.
                None if spec.actions().up().is_some() => {
                    debug!(node = name, "Never started, skipping shutdown");
                    return;
                }
                // Down-only step.
                None => {}
                Some(handle) => {
                    if handle.await.is_err() {
                        debug!(node = name, "Boot failed, skipping shutdown");
                        return;
                    }
                }
            }

            let (handle, owner) = self.down_handle(name, down);
            let result = handle.await;
            if !owner {
                return;
            }
            match result {
                Ok(()) => {
                    info!(node = name, "Stopped");
                    self.emit(LifecycleEvent::NodeStopped {
                        node: name.to_string(),
                    });
                }
                Err(source) => {
                    error!(node = name, error = %source, "Shutdown failed");
                    lock(&self.shutdown_failures).push(NodeFailure {
                        node: name.to_string(),
                        source,
                    });
                }
            }
        }
        .boxed()
    }

    /// Returns the node's shutdown handle and whether this call invoked `down`.
    fn down_handle(&self, name: &str, down: &Arc<dyn DownAction<V>>) -> (DownHandle, bool) {
        let mut ledger = lock(&self.down_ledger);
        if let Some(handle) = ledger.get(name) {
            debug!(node = name, "Shutdown already in flight");
            return (handle.clone(), false);
        }

        info!(node = name, "Stopping");
        let down = Arc::clone(down);
        let loaded = self.loaded();
        let handle = async move { down.down(loaded).await.map_err(SharedError::from) }
            .boxed()
            .shared();
        ledger.insert(name.to_string(), handle.clone());
        (handle, true)
    }
}
