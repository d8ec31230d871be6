//! # Lifecycle Errors
//!
//! Node-level boot failures are never raised by the resolvers. They are
//! collected into an `ErrorSet` in the order they occur and surfaced once,
//! from [`Applife::start`](crate::Applife::start), as
//! [`LifecycleError::BootFailed`].

use crate::graph::EdgeKind;
use std::collections::HashSet;
use std::sync::Arc;

/// An action error shared between every awaiter of the same node.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// A single node's failure, either at boot or at shutdown.
#[derive(Debug, Clone, thiserror::Error)]
#[error("node `{node}` failed: {source}")]
pub struct NodeFailure {
    pub node: String,
    pub source: SharedError,
}

/// Errors surfaced by the lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Boot sequence failed ({} node failure(s))", .failures.len())]
    BootFailed { failures: Vec<NodeFailure> },
    #[error("Boot sequence already attempted on this instance")]
    AlreadyStarted,
    #[error("Node `{node}` declares a {edge} edge to unknown node `{target}`")]
    UnknownNode {
        node: String,
        edge: EdgeKind,
        target: String,
    },
}

impl LifecycleError {
    /// The per-node failures behind a boot failure, in the order they happened.
    pub fn failures(&self) -> &[NodeFailure] {
        match self {
            LifecycleError::BootFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// Failures keyed by node name, kept in the order they were recorded.
#[derive(Debug, Default)]
pub(crate) struct ErrorSet {
    seen: HashSet<String>,
    failures: Vec<NodeFailure>,
}

impl ErrorSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a failure unless one is already held for `node`.
    /// Returns `true` when this call inserted it.
    pub(crate) fn record(&mut self, node: &str, source: SharedError) -> bool {
        if !self.seen.insert(node.to_string()) {
            return false;
        }
        self.failures.push(NodeFailure {
            node: node.to_string(),
            source,
        });
        true
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Bundles the recorded failures into a boot error, or `None` if nothing failed.
    pub(crate) fn to_aggregate(&self) -> Option<LifecycleError> {
        if self.is_empty() {
            return None;
        }
        Some(LifecycleError::BootFailed {
            failures: self.failures.clone(),
        })
    }
}
