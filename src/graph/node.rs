//! # Node Specification
//!
//! A [`NodeSpec`] declares one component of the graph: which nodes it `needs`
//! before booting, which nodes must be shut down `after`-first before its own
//! shutdown, and which actions it carries.
//!
//! The four legal shapes of a node are captured by [`Actions`], so a resolver
//! matches on the shape instead of probing optional fields.

use super::action::{BoxError, DownAction, Loaded, UpAction};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The actions a node carries.
pub enum Actions<V> {
    /// Pure structural placeholder: groups dependencies, starts nothing.
    Structural,
    /// Boots a value, needs no teardown.
    UpOnly(Arc<dyn UpAction<V>>),
    /// Teardown step that runs on every shutdown sweep, whether or not boot succeeded.
    DownOnly(Arc<dyn DownAction<V>>),
    /// Boots a value and tears it down again.
    Full {
        up: Arc<dyn UpAction<V>>,
        down: Arc<dyn DownAction<V>>,
    },
}

impl<V> Actions<V> {
    pub fn up(&self) -> Option<&Arc<dyn UpAction<V>>> {
        match self {
            Actions::UpOnly(up) | Actions::Full { up, .. } => Some(up),
            Actions::Structural | Actions::DownOnly(_) => None,
        }
    }

    pub fn down(&self) -> Option<&Arc<dyn DownAction<V>>> {
        match self {
            Actions::DownOnly(down) | Actions::Full { down, .. } => Some(down),
            Actions::Structural | Actions::UpOnly(_) => None,
        }
    }

    /// Short name of the shape, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Actions::Structural => "structural",
            Actions::UpOnly(_) => "up-only",
            Actions::DownOnly(_) => "down-only",
            Actions::Full { .. } => "full",
        }
    }

    fn with_up(self, up: Arc<dyn UpAction<V>>) -> Self {
        match self {
            Actions::Structural | Actions::UpOnly(_) => Actions::UpOnly(up),
            Actions::DownOnly(down) | Actions::Full { down, .. } => Actions::Full { up, down },
        }
    }

    fn with_down(self, down: Arc<dyn DownAction<V>>) -> Self {
        match self {
            Actions::Structural | Actions::DownOnly(_) => Actions::DownOnly(down),
            Actions::UpOnly(up) | Actions::Full { up, .. } => Actions::Full { up, down },
        }
    }
}

impl<V> Clone for Actions<V> {
    fn clone(&self) -> Self {
        match self {
            Actions::Structural => Actions::Structural,
            Actions::UpOnly(up) => Actions::UpOnly(Arc::clone(up)),
            Actions::DownOnly(down) => Actions::DownOnly(Arc::clone(down)),
            Actions::Full { up, down } => Actions::Full {
                up: Arc::clone(up),
                down: Arc::clone(down),
            },
        }
    }
}

/// Declaration of a single node in the dependency graph.
///
/// Built with chained calls; setting `up` or `down` moves the node to the
/// matching [`Actions`] shape.
///
/// ```rust
/// use applife::{BoxError, NodeSpec};
///
/// let cache = NodeSpec::<String>::new()
///     .needs(["config"])
///     .after(["http"])
///     .up(|_| async { Ok::<_, BoxError>("cache".to_string()) });
/// assert_eq!(cache.actions().kind(), "up-only");
/// ```
pub struct NodeSpec<V> {
    needs: BTreeSet<String>,
    after: BTreeSet<String>,
    actions: Actions<V>,
}

impl<V: Send + 'static> NodeSpec<V> {
    /// A structural node with no edges.
    pub fn new() -> Self {
        Self {
            needs: BTreeSet::new(),
            after: BTreeSet::new(),
            actions: Actions::Structural,
        }
    }

    /// Adds nodes whose boot must settle before this node boots.
    pub fn needs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds nodes whose shutdown must settle before this node shuts down.
    pub fn after<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn up<F, Fut>(self, action: F) -> Self
    where
        F: Fn(Loaded<V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, BoxError>> + Send + 'static,
    {
        self.up_action(Arc::new(action))
    }

    pub fn down<F, Fut>(self, action: F) -> Self
    where
        F: Fn(Loaded<V>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.down_action(Arc::new(action))
    }

    /// Sets the boot action from an existing trait object.
    pub fn up_action(mut self, action: Arc<dyn UpAction<V>>) -> Self {
        self.actions = self.actions.with_up(action);
        self
    }

    /// Sets the shutdown action from an existing trait object.
    pub fn down_action(mut self, action: Arc<dyn DownAction<V>>) -> Self {
        self.actions = self.actions.with_down(action);
        self
    }
}

impl<V> NodeSpec<V> {
    pub fn needs_set(&self) -> &BTreeSet<String> {
        &self.needs
    }

    pub fn after_set(&self) -> &BTreeSet<String> {
        &self.after
    }

    pub fn actions(&self) -> &Actions<V> {
        &self.actions
    }
}

impl<V: Send + 'static> Default for NodeSpec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for NodeSpec<V> {
    fn clone(&self) -> Self {
        Self {
            needs: self.needs.clone(),
            after: self.after.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<V> fmt::Debug for NodeSpec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("needs", &self.needs)
            .field("after", &self.after)
            .field("actions", &self.actions.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_follows_declared_actions() {
        let structural = NodeSpec::<u32>::new();
        assert_eq!(structural.actions().kind(), "structural");

        let down_only = NodeSpec::<u32>::new().down(|_| async { Ok::<_, BoxError>(()) });
        assert_eq!(down_only.actions().kind(), "down-only");
        assert!(down_only.actions().up().is_none());

        let full = down_only.up(|_| async { Ok::<_, BoxError>(7) });
        assert_eq!(full.actions().kind(), "full");
        assert!(full.actions().up().is_some());
        assert!(full.actions().down().is_some());
    }

    #[test]
    fn edges_are_deduplicated() {
        let spec = NodeSpec::<u32>::new().needs(["a", "b", "a"]).after(["c"]);
        assert_eq!(spec.needs_set().len(), 2);
        assert!(spec.after_set().contains("c"));
    }
}
