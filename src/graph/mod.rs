//! # Graph Model
//!
//! The declared set of named nodes. Each node carries optional forward edges
//! (`needs`, boot ordering), optional reverse edges (`after`, shutdown
//! ordering) and optional boot/shutdown actions.
//!
//! A graph is supplied once to [`Applife`](crate::Applife) and never mutated
//! afterwards. Key order carries no meaning: every node is a root of the boot
//! and shutdown sweeps.

pub mod action;
pub mod node;

pub use action::{BoxError, DownAction, Loaded, UpAction};
pub use node::{Actions, NodeSpec};

use crate::error::LifecycleError;
use std::collections::HashMap;
use std::fmt;

/// Which kind of edge referenced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Needs,
    After,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Needs => write!(f, "needs"),
            EdgeKind::After => write!(f, "after"),
        }
    }
}

/// Mapping from node name to its declaration.
pub struct Graph<V> {
    nodes: HashMap<String, NodeSpec<V>>,
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Declares a node. Declaring the same name twice keeps the last spec.
    pub fn node(mut self, name: impl Into<String>, spec: NodeSpec<V>) -> Self {
        self.nodes.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeSpec<V>> {
        self.nodes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks that every `needs` and `after` edge targets a declared node.
    ///
    /// Cycles are not detected; a cyclic graph deadlocks at boot.
    pub fn validate(&self) -> Result<(), LifecycleError> {
        for (name, spec) in &self.nodes {
            let edges = spec
                .needs_set()
                .iter()
                .map(|target| (EdgeKind::Needs, target))
                .chain(spec.after_set().iter().map(|target| (EdgeKind::After, target)));
            for (edge, target) in edges {
                if !self.nodes.contains_key(target) {
                    return Err(LifecycleError::UnknownNode {
                        node: name.clone(),
                        edge,
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, NodeSpec<V>)> for Graph<V> {
    fn from_iter<I: IntoIterator<Item = (String, NodeSpec<V>)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<V> fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.nodes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_closed_graph() {
        let graph = Graph::<u32>::new()
            .node("a", NodeSpec::new())
            .node("b", NodeSpec::new().needs(["a"]).after(["a"]));
        assert!(graph.validate().is_ok());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let graph = Graph::<u32>::new().node("b", NodeSpec::new().after(["ghost"]));
        match graph.validate() {
            Err(LifecycleError::UnknownNode { node, edge, target }) => {
                assert_eq!(node, "b");
                assert_eq!(edge, EdgeKind::After);
                assert_eq!(target, "ghost");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
