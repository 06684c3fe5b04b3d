// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios over the full orchestrator.

use spawnbench::workload::IO_FILE_PREFIX;
use spawnbench::{execute_round, orchestrator, BenchConfig, MetricsCollector, NativeThreads, Workload};
use tempfile::TempDir;

fn config(workers: usize, rounds: usize) -> BenchConfig {
    BenchConfig {
        worker_count: workers,
        round_count: rounds,
        carrier_threads: 4,
        native_stack_bytes: 128 * 1024,
    }
}

#[test]
fn heavy_computation_native_rounds() {
    let strategy = NativeThreads::new(128 * 1024);
    let mut collector = MetricsCollector::new().unwrap();
    let workload = Workload::heavy_computation();

    let mut results = Vec::new();
    for _ in 0..2 {
        results.push(execute_round(&strategy, 1_000, &workload, &mut collector).unwrap());
    }

    assert_eq!(results.len(), 2);
    for result in &results {
        // Dispatching and joining 1000 OS threads cannot complete sub-ms.
        assert!(result.elapsed_ms > 0);
        assert_eq!(result.faults, 0);
    }
}

#[test]
fn io_simulation_cleans_up_after_both_strategies() {
    let dir = TempDir::new().unwrap();
    let workload = Workload::IoSimulation {
        payload: 1_000..5_000,
        dir: dir.path().to_path_buf(),
    };

    let run = orchestrator::run(&config(50, 1), &workload).unwrap();

    assert_eq!(run.native.rounds.len(), 1);
    assert_eq!(run.lightweight.rounds.len(), 1);
    assert_eq!(run.native.rounds[0].faults, 0);
    assert_eq!(run.lightweight.rounds[0].faults, 0);

    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(IO_FILE_PREFIX)
        })
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn invalid_choice_still_produces_full_result_set() {
    let workload = Workload::select(99);
    assert_eq!(workload.name(), "String Processing");

    let run = orchestrator::run(&config(25, 1), &workload).unwrap();
    assert_eq!(run.workload, "String Processing");
    assert_eq!(run.native.rounds.len(), 1);
    assert_eq!(run.lightweight.rounds.len(), 1);
}

#[test]
fn both_strategies_satisfy_round_invariants() {
    let workload = Workload::HeavyComputation { trips: 500..1_000 };
    let run = orchestrator::run(&config(100, 2), &workload).unwrap();

    assert_eq!(run.native.rounds.len(), run.lightweight.rounds.len());
    for result in run.native.rounds.iter().chain(run.lightweight.rounds.iter()) {
        // u64 fields are non-negative by construction; faults must be zero
        // for a pure CPU workload.
        assert_eq!(result.faults, 0);
        assert!(result.combined_memory() >= result.heap_used);
    }
}
