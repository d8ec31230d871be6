//! Up resolver: brings a node and its transitive `needs` to "started".

use super::{lock, Engine, UpHandle};
use crate::error::SharedError;
use crate::graph::UpAction;
use crate::lifecycle::events::LifecycleEvent;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, error, info};

impl<V: Clone + Send + Sync + 'static> Engine<V> {
    /// Returns once `name` has started, needs no start, or was abandoned
    /// because boot is aborting. Never fails: outcomes land in the loaded
    /// values or the error set.
    pub(crate) fn resolve_up<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ()> {
        async move {
            let Some(spec) = self.graph.get(name) else {
                return;
            };

            // Dependencies settle first, whatever their outcome.
            join_all(spec.needs_set().iter().map(|dep| self.resolve_up(dep))).await;

            let Some(up) = spec.actions().up() else {
                return;
            };

            // Any failure anywhere halts every boot not yet invoked.
            let aborting = !lock(&self.errors).is_empty();
            if aborting {
                debug!(node = name, "Boot aborting, not starting");
                return;
            }

            let (handle, owner) = self.up_handle(name, up);
            match handle.await {
                Ok(_) => {
                    if owner {
                        info!(node = name, "Started");
                        self.emit(LifecycleEvent::NodeStarted {
                            node: name.to_string(),
                        });
                    }
                }
                Err(source) => {
                    let recorded = lock(&self.errors).record(name, Arc::clone(&source));
                    if recorded {
                        error!(node = name, error = %source, "Boot failed, shutting down");
                        self.emit(LifecycleEvent::NodeFailed {
                            node: name.to_string(),
                        });
                        self.stop().await;
                    }
                }
            }
        }
        .boxed()
    }

    /// Returns the node's boot handle and whether this call invoked `up`.
    ///
    /// The handle stores a successful value into the loaded map before it
    /// resolves, so a shutdown sweep awaiting it sees the node's own value.
    fn up_handle(&self, name: &str, up: &Arc<dyn UpAction<V>>) -> (UpHandle<V>, bool) {
        let mut ledger = lock(&self.up_ledger);
        if let Some(handle) = ledger.get(name) {
            debug!(node = name, "Boot already in flight");
            return (handle.clone(), false);
        }

        info!(node = name, "Starting");
        let up = Arc::clone(up);
        let snapshot = self.loaded();
        let loaded = Arc::clone(&self.loaded);
        let node = name.to_string();
        let handle = async move {
            let value = up.up(snapshot).await.map_err(SharedError::from)?;
            lock(&loaded).insert(node, value.clone());
            Ok::<V, SharedError>(value)
        }
        .boxed()
        .shared();
        ledger.insert(name.to_string(), handle.clone());
        (handle, true)
    }
}
