//! # Observability & Tracing
//!
//! Both resolvers log through `tracing` with the node name as a structured
//! field, so a boot can be followed node by node.
//!
//! ## What Gets Traced
//!
//! - **Boot**: `Starting` / `Started` per node, inside a `boot` span
//! - **Shutdown**: `Stopping` / `Stopped` per node, inside a `shutdown` span
//! - **Failures**: `Boot failed, shutting down` and `Shutdown failed` with the error
//! - **Skips** (debug): nodes not started because boot is aborting, nodes not
//!   stopped because they never started, memoized calls already in flight
//! - **Signals**: `Termination signal received` with the signal name
//!
//! ## Usage Examples
//!
//! ```bash
//! # Node transitions
//! RUST_LOG=info cargo run
//!
//! # Include skips and memo hits
//! RUST_LOG=debug cargo run
//!
//! # Only this crate
//! RUST_LOG=applife=debug cargo run
//! ```
//!
//! ## Boot Trace Example
//!
//! A failing `cache` node aborts the boot and drives the shutdown sweep:
//!
//! ```text
//! INFO Booting nodes=4
//! INFO boot: Starting node="config"
//! INFO boot: Started node="config"
//! INFO boot: Starting node="database"
//! INFO boot: Starting node="cache"
//! ERROR boot: Boot failed, shutting down node="cache" error=connection refused
//! INFO boot:shutdown: Stopping node="database"
//! INFO boot:shutdown: Stopped node="database"
//! INFO boot: Stopped reason=stop
//! ERROR Boot sequence failed error=Boot sequence failed (1 node failure(s))
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once, at the start of the host binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
