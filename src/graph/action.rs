//! # Node Actions
//!
//! A node may carry an asynchronous boot action (`up`) and an asynchronous
//! shutdown action (`down`). Both receive an owned snapshot of every value
//! loaded so far.
//!
//! The traits are `#[async_trait]` so they can be stored as trait objects
//! (`Arc<dyn UpAction<V>>`) inside the graph. Any closure of the shape
//! `Fn(Loaded<V>) -> impl Future<Output = Result<_, BoxError>>` implements them,
//! which is how most graphs are written:
//!
//! ```rust
//! use applife::{BoxError, Loaded, NodeSpec};
//!
//! let db = NodeSpec::<u32>::new()
//!     .needs(["config"])
//!     .up(|loaded: Loaded<u32>| async move { Ok::<_, BoxError>(loaded["config"] + 1) })
//!     .down(|_| async { Ok::<_, BoxError>(()) });
//! assert!(db.actions().up().is_some());
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;

/// Error type returned by node actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Values produced by successful `up` actions, keyed by node name.
pub type Loaded<V> = HashMap<String, V>;

/// Boot action of a node.
#[async_trait]
pub trait UpAction<V>: Send + Sync {
    async fn up(&self, loaded: Loaded<V>) -> Result<V, BoxError>;
}

/// Shutdown action of a node.
#[async_trait]
pub trait DownAction<V>: Send + Sync {
    async fn down(&self, loaded: Loaded<V>) -> Result<(), BoxError>;
}

#[async_trait]
impl<V, F, Fut> UpAction<V> for F
where
    V: Send + 'static,
    F: Fn(Loaded<V>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, BoxError>> + Send + 'static,
{
    async fn up(&self, loaded: Loaded<V>) -> Result<V, BoxError> {
        (self)(loaded).await
    }
}

#[async_trait]
impl<V, F, Fut> DownAction<V> for F
where
    V: Send + 'static,
    F: Fn(Loaded<V>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn down(&self, loaded: Loaded<V>) -> Result<(), BoxError> {
        (self)(loaded).await
    }
}
