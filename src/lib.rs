//! # Applife
//!
//! > **Boot a graph of components in dependency order, tear it down in reverse.**
//!
//! Each component is a named node with optional `up` and `down` actions.
//! `needs` edges order the boot, `after` edges order the shutdown.
//! Independent branches boot concurrently; one failing `up` halts the rest of
//! the boot and triggers a coordinated shutdown of everything that did start.
//!
//! ## Core Concepts
//!
//! ### Nodes and shapes
//! A [`NodeSpec`] carries one of four [`Actions`] shapes: structural (no
//! actions), up-only, down-only, or full. A down-only node runs on every
//! shutdown sweep regardless of how boot went.
//!
//! ### Memoization
//! Every `up` and every `down` runs at most once per [`Applife`] instance,
//! no matter how many dependents reach it concurrently.
//!
//! ### Global abort
//! Once any `up` fails, no `up` that has not been invoked yet will be, in any
//! branch. Failures are collected in the order they happen and returned from
//! [`Applife::start`] as one [`LifecycleError::BootFailed`].
//!
//! ## Module Tour
//!
//! - [`graph`]: graph declaration, node shapes, action traits.
//! - [`lifecycle`]: the [`Applife`] controller, events and signal handling.
//! - [`error`]: node failures and their aggregation.
//! - [`config`]: [`LifecycleConfig`].
//! - [`tracing`]: subscriber setup for host binaries.
//! - [`mock`]: recording actions and a manual signal source for tests.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod config;
mod engine;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod mock;
pub mod tracing;

pub use config::LifecycleConfig;
pub use error::{LifecycleError, NodeFailure, SharedError};
pub use graph::{Actions, BoxError, DownAction, EdgeKind, Graph, Loaded, NodeSpec, UpAction};
pub use lifecycle::events::{LifecycleEvent, StopReason};
pub use lifecycle::signals::{OsSignals, PanicSignals, Signal, SignalSource};
pub use lifecycle::Applife;
