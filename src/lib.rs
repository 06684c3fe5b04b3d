// SPDX-License-Identifier: Apache-2.0

//! Spawnbench
//!
//! A round-based experiment runner that compares two ways of realizing a
//! large fan-out of short-lived workers: one dedicated OS thread per worker
//! ("native") versus one cooperatively scheduled task per worker, multiplexed
//! over a small carrier pool ("lightweight").
//!
//! Each round spawns a configurable worker population, all running the same
//! synthetic workload, blocks until every worker has completed, and records
//! wall-clock time, memory footprint, and allocator-reclaim cost. The
//! orchestrator repeats this for a configurable number of rounds under both
//! strategies and hands the collected series to the reporting layer.
//!
//! # Counter mapping
//!
//! Memory and reclaim counters come from an instrumented global allocator
//! plus the process resident set size; see [`counters`] and [`metrics`].

pub mod config;
pub mod counters;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod round;
pub mod strategy;
pub mod workload;

/// Every allocation in this process is routed through the tracking allocator
/// so that heap and reclaim counters cover the benchmark itself.
#[global_allocator]
static ALLOCATOR: counters::TrackingAllocator = counters::TrackingAllocator;

// Re-export commonly used types
pub use config::BenchConfig;
pub use error::{
    BenchError, BenchResult, ConfigError, JoinError, MetricsError, RoundError, SpawnError,
    WorkloadError,
};
pub use metrics::{MetricsCollector, RoundResult, StrategyAverages, StrategySeries, SystemInfo};
pub use orchestrator::{run, BenchmarkRun};
pub use round::execute_round;
pub use strategy::{LightweightTasks, NativeThreads, SpawnStrategy, WorkFn};
pub use workload::{FastRng, Workload};
