use applife::mock::Recorder;
use applife::{Applife, BoxError, Graph, LifecycleConfig, LifecycleError, Loaded, NodeSpec};
use std::time::Duration;
use tokio::time::Instant;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn app<V: Clone + Send + Sync + 'static>(graph: Graph<V>) -> Applife<V> {
    Applife::with_config(graph, LifecycleConfig::default().without_signals())
        .expect("graph should be valid")
}

/// a -> b -> c, each taking 10ms: boot is the sum of the chain.
#[tokio::test(start_paused = true)]
async fn test_sequential_chain() {
    let recorder = Recorder::new();
    let graph = Graph::new()
        .node("b", NodeSpec::new().needs(["a"]).up(recorder.up("b", ms(10), "b")))
        .node("a", NodeSpec::new().up(recorder.up("a", ms(10), "a")))
        .node("c", NodeSpec::new().needs(["a", "b"]).up(recorder.up("c", ms(10), "c")));

    let now = Instant::now();
    let loaded = app(graph).start().await.expect("boot should succeed");
    let elapsed = now.elapsed();

    assert!(elapsed >= ms(30), "took {elapsed:?}");
    assert!(elapsed < ms(35), "took {elapsed:?}");
    assert_eq!(recorder.log(), ["a", "b", "c"]);
    assert_eq!(loaded["a"], "a");
    assert_eq!(loaded["b"], "b");
    assert_eq!(loaded["c"], "c");
}

/// Three independent 10ms nodes: boot is bounded by the slowest one.
#[tokio::test(start_paused = true)]
async fn test_parallel_boot() {
    let recorder = Recorder::new();
    let graph = Graph::new()
        .node("a", NodeSpec::new().up(recorder.up("a", ms(10), 'a')))
        .node("b", NodeSpec::new().up(recorder.up("b", ms(10), 'b')))
        .node("c", NodeSpec::new().up(recorder.up("c", ms(10), 'c')));

    let now = Instant::now();
    let loaded = app(graph).start().await.expect("boot should succeed");
    let elapsed = now.elapsed();

    assert!(elapsed >= ms(10), "took {elapsed:?}");
    assert!(elapsed < ms(15), "took {elapsed:?}");
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded["c"], 'c');
}

/// ```text
/// a -+- b -+--------- e
///    |     +-+
///    +-- c --+- d
/// ```
#[tokio::test(start_paused = true)]
async fn test_graph_boot() {
    let recorder = Recorder::new();
    let graph = Graph::new()
        .node("e", NodeSpec::new().needs(["b"]).up(recorder.up("e", ms(30), ())))
        .node("d", NodeSpec::new().needs(["c", "b"]).up(recorder.up("d", ms(10), ())))
        .node("c", NodeSpec::new().needs(["a"]).up(recorder.up("c", ms(20), ())))
        .node("b", NodeSpec::new().needs(["a"]).up(recorder.up("b", ms(10), ())))
        .node("a", NodeSpec::new().up(recorder.up("a", ms(10), ())));

    let now = Instant::now();
    app(graph).start().await.expect("boot should succeed");
    let elapsed = now.elapsed();

    assert!(elapsed >= ms(50), "took {elapsed:?}");
    assert!(elapsed < ms(55), "took {elapsed:?}");
    assert_eq!(recorder.log(), ["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_values_flow_to_dependents() {
    let graph = Graph::new()
        .node("a", NodeSpec::new().up(|_| async { Ok::<_, BoxError>(1) }))
        .node(
            "b",
            NodeSpec::new()
                .needs(["a"])
                .up(|loaded: Loaded<i64>| async move { Ok::<_, BoxError>(loaded["a"] + 10) }),
        )
        .node(
            "c",
            NodeSpec::new().needs(["b"]).up(|loaded: Loaded<i64>| async move {
                Ok::<_, BoxError>(loaded["a"] + loaded["b"] + 100)
            }),
        );

    let loaded = app(graph).start().await.expect("boot should succeed");

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded["a"], 1);
    assert_eq!(loaded["b"], 11);
    assert_eq!(loaded["c"], 112);
}

/// Two independent nodes fail at different times. Failures come back in the
/// order they happened, and only nodes that actually started are torn down,
/// respecting `after` edges.
#[tokio::test(start_paused = true)]
async fn test_partial_failure() {
    let recorder = Recorder::new();
    let graph = Graph::new()
        // Declared before `b` but fails after it.
        .node(
            "c",
            NodeSpec::new()
                .up(recorder.failing_up("c", ms(30), "c exploded"))
                .down(recorder.down("c", ms(1))),
        )
        .node(
            "f",
            NodeSpec::new()
                .needs(["b"])
                .up(recorder.up("f", ms(1), 0))
                .down(recorder.down("f", ms(1))),
        )
        .node(
            "b",
            NodeSpec::new()
                .needs(["a"])
                .up(recorder.failing_up("b", ms(10), "b exploded"))
                .down(recorder.down("b", ms(1))),
        )
        .node(
            "a",
            NodeSpec::new()
                .up(recorder.up("a", ms(10), 1))
                .down(recorder.down("a", ms(2))),
        )
        .node(
            "d",
            NodeSpec::new()
                .after(["e"])
                .up(recorder.up("d", ms(5), 4))
                .down(recorder.down("d", ms(1))),
        )
        .node(
            "e",
            NodeSpec::new()
                .up(recorder.up("e", ms(15), 5))
                .down(recorder.down("e", ms(4))),
        );

    let app = app(graph);
    let err = app.start().await.expect_err("boot should fail");

    let failed: Vec<_> = err.failures().iter().map(|f| f.node.as_str()).collect();
    assert_eq!(failed, ["b", "c"]);
    assert_eq!(err.failures()[0].source.to_string(), "b exploded");
    assert!(matches!(err, LifecycleError::BootFailed { .. }));

    // `a` stops first, `d` waits for `e`; failed and never-started nodes are skipped.
    assert_eq!(recorder.downs(), ["a", "e", "d"]);
    assert_eq!(recorder.calls("f"), 0);

    let mut loaded: Vec<_> = app.loaded().into_keys().collect();
    loaded.sort();
    assert_eq!(loaded, ["a", "d", "e"]);
}
