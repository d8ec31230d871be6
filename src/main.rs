//! # Applife Demo
//!
//! Boots a small service graph, lets it serve until Ctrl+C (or a few
//! seconds), then tears it down:
//!
//! ```text
//! config ──► database ──► http
//!        └─► cache ─────┘
//! ```
//!
//! `http` must stop before `database` and `cache` (`after` edges), and
//! `flush-metrics` is a down-only step that runs on every shutdown.

use applife::tracing::setup_tracing;
use applife::{
    Applife, BoxError, Graph, LifecycleError, LifecycleEvent, Loaded, NodeSpec, StopReason,
};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

#[allow(dead_code)]
#[derive(Debug, Clone)]
enum Service {
    Config { database_url: String },
    Pool { size: usize },
    Cache { entries: usize },
    Server { port: u16 },
}

fn graph() -> Graph<Service> {
    Graph::new()
        .node(
            "config",
            NodeSpec::new().up(|_| async {
                Ok::<_, BoxError>(Service::Config {
                    database_url: "postgres://localhost/app".to_string(),
                })
            }),
        )
        .node(
            "database",
            NodeSpec::new()
                .needs(["config"])
                .after(["http"])
                .up(|loaded: Loaded<Service>| async move {
                    let Some(Service::Config { database_url }) = loaded.get("config") else {
                        return Err(BoxError::from("config not loaded"));
                    };
                    info!(%database_url, "Connecting");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(Service::Pool { size: 8 })
                })
                .down(|_| async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, BoxError>(())
                }),
        )
        .node(
            "cache",
            NodeSpec::new()
                .needs(["config"])
                .after(["http"])
                .up(|_| async {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok::<_, BoxError>(Service::Cache { entries: 0 })
                }),
        )
        .node(
            "http",
            NodeSpec::new()
                .needs(["database", "cache"])
                .up(|loaded: Loaded<Service>| async move {
                    if let Some(Service::Pool { size }) = loaded.get("database") {
                        info!(pool_size = size, "Binding listener");
                    }
                    Ok::<_, BoxError>(Service::Server { port: 8080 })
                })
                .down(|_| async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok::<_, BoxError>(())
                }),
        )
        .node(
            "flush-metrics",
            NodeSpec::new()
                .after(["database"])
                .down(|_| async { Ok::<_, BoxError>(()) }),
        )
}

#[tokio::main]
async fn main() -> Result<(), LifecycleError> {
    setup_tracing();

    let app = Applife::new(graph())?;
    let mut events = app.subscribe();

    let loaded = app.start().await?;
    for (name, service) in &loaded {
        info!(node = %name, ?service, "Loaded");
    }

    // Serve until a signal-triggered sweep completes, or give up after a while.
    let signalled = async {
        loop {
            match events.recv().await {
                Ok(LifecycleEvent::Stopped {
                    reason: reason @ StopReason::Signal(_),
                }) => {
                    info!(%reason, "Stopped by signal");
                    return true;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return false,
            }
        }
    };
    let stopped = tokio::time::timeout(Duration::from_secs(3), signalled)
        .await
        .unwrap_or(false);
    if !stopped {
        app.stop().await;
    }

    info!("Demo complete");
    Ok(())
}
