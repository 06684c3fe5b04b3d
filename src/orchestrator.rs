// SPDX-License-Identifier: Apache-2.0

//! Drives the full experiment: all native rounds, then all lightweight
//! rounds, strictly sequential so one round's workers are fully measured
//! before the next round's are created.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::{MetricsCollector, StrategyAverages, StrategySeries, SystemInfo};
use crate::round::execute_round;
use crate::strategy::{LightweightTasks, NativeThreads, SpawnStrategy};
use crate::workload::Workload;

/// Everything one benchmark run produced, handed to the reporting layer.
#[derive(Debug, Serialize)]
pub struct BenchmarkRun {
    pub workload: String,
    pub timestamp: DateTime<Utc>,
    pub system: SystemInfo,
    pub config: BenchConfig,
    pub native: StrategySeries,
    pub lightweight: StrategySeries,
    pub native_averages: StrategyAverages,
    pub lightweight_averages: StrategyAverages,
}

/// Execute `round_count` rounds under both strategies with the same workload
/// and worker count, in fixed order: native first, then lightweight.
///
/// The two returned series always have equal length and were driven by the
/// identical workload, so they are directly comparable. A failed round aborts
/// the run with the strategy and round index in the error.
pub fn run(config: &BenchConfig, workload: &Workload) -> BenchResult<BenchmarkRun> {
    config.validate()?;
    let mut collector = MetricsCollector::new()?;

    let native = NativeThreads::new(config.native_stack_bytes);
    let native_series = run_strategy(&native, config, workload, &mut collector)?;

    let lightweight = LightweightTasks::new(config.effective_carriers())?;
    let lightweight_series = run_strategy(&lightweight, config, workload, &mut collector)?;

    let native_averages = native_series.averages();
    let lightweight_averages = lightweight_series.averages();

    Ok(BenchmarkRun {
        workload: workload.name().to_string(),
        timestamp: Utc::now(),
        system: SystemInfo::collect(),
        config: config.clone(),
        native: native_series,
        lightweight: lightweight_series,
        native_averages,
        lightweight_averages,
    })
}

fn run_strategy<S: SpawnStrategy>(
    strategy: &S,
    config: &BenchConfig,
    workload: &Workload,
    collector: &mut MetricsCollector,
) -> BenchResult<StrategySeries> {
    let mut series = StrategySeries::new(strategy.label());
    for round in 1..=config.round_count {
        info!(
            strategy = strategy.label(),
            round,
            total = config.round_count,
            workers = config.worker_count,
            "starting round"
        );

        let result = execute_round(strategy, config.worker_count, workload, collector).map_err(
            |source| BenchError::Round {
                strategy: strategy.label(),
                round,
                source,
            },
        )?;

        info!(
            strategy = strategy.label(),
            round,
            elapsed_ms = result.elapsed_ms,
            reclaims = result.reclaim_count,
            faults = result.faults,
            "round complete"
        );
        series.rounds.push(result);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(workers: usize, rounds: usize) -> BenchConfig {
        BenchConfig {
            worker_count: workers,
            round_count: rounds,
            carrier_threads: 2,
            native_stack_bytes: 128 * 1024,
        }
    }

    #[test]
    fn test_zero_rounds_yields_empty_comparable_series() {
        let run = run(&small_config(10, 0), &Workload::heavy_computation()).unwrap();
        assert!(run.native.rounds.is_empty());
        assert!(run.lightweight.rounds.is_empty());
        assert_eq!(run.native_averages.elapsed_ms, 0.0);
        assert_eq!(run.lightweight_averages.elapsed_ms, 0.0);
    }

    #[test]
    fn test_series_have_equal_length() {
        let workload = Workload::HeavyComputation { trips: 100..200 };
        let run = run(&small_config(20, 3), &workload).unwrap();
        assert_eq!(run.native.rounds.len(), 3);
        assert_eq!(run.lightweight.rounds.len(), 3);
        assert_eq!(run.native.label, "native");
        assert_eq!(run.lightweight.label, "lightweight");
    }

    #[test]
    fn test_invalid_config_is_rejected_before_any_round() {
        let config = BenchConfig {
            native_stack_bytes: 1024,
            ..small_config(10, 1)
        };
        let err = run(&config, &Workload::heavy_computation()).unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
