//! Property checks over arbitrary inputs.

use std::time::Duration;

use proptest::prelude::*;
use sortscope_engine::{Algorithm, NullRenderer, RunOutcome, RunState, Visualizer, VisualizerConfig};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

fn sorted_copy(values: &[u32]) -> Vec<u32> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn completed_runs_are_sorted_permutations(
        algorithm in algorithm(),
        input in prop::collection::vec(0u32..50, 0..40),
    ) {
        let (outcome, output) = runtime().block_on(async {
            let vis = Visualizer::new(VisualizerConfig::fast(), NullRenderer).unwrap();
            vis.load(&input).unwrap();
            let outcome = vis.start(algorithm).await.unwrap();
            let output: Vec<u32> = vis.snapshot().iter().map(|e| e.value).collect();
            (outcome, output)
        });

        prop_assert_eq!(outcome, RunOutcome::Completed);
        prop_assert_eq!(output, sorted_copy(&input));
    }

    #[test]
    fn interrupted_runs_keep_every_value(
        algorithm in algorithm(),
        input in prop::collection::vec(0u32..50, 2..40),
        stop_after_ms in 0u64..200,
    ) {
        let (outcome, state, output) = runtime().block_on(async {
            let vis = Visualizer::new(VisualizerConfig::fast(), NullRenderer).unwrap();
            vis.load(&input).unwrap();

            let runner = vis.clone();
            let handle = tokio::spawn(async move { runner.start(algorithm).await });
            tokio::time::sleep(Duration::from_millis(stop_after_ms)).await;
            vis.stop();

            let outcome = handle.await.unwrap().unwrap();
            let output: Vec<u32> = vis.snapshot().iter().map(|e| e.value).collect();
            (outcome, vis.run_state(), output)
        });

        prop_assert_ne!(outcome, RunOutcome::AlreadyRunning);
        prop_assert_eq!(state, RunState::Idle);
        prop_assert_eq!(sorted_copy(&output), sorted_copy(&input));
    }
}
