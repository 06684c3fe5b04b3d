// SPDX-License-Identifier: Apache-2.0

//! Execution of exactly one round for one strategy.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::RoundError;
use crate::metrics::{MetricsCollector, RoundResult};
use crate::strategy::{SpawnStrategy, WorkFn};
use crate::workload::{FastRng, Workload};

/// Run `worker_count` workers of `workload` under `strategy` and measure the
/// window from first dispatch to full barrier join.
///
/// No metric is sampled until the last worker has returned. If a spawn fails
/// midway, the already-dispatched workers are still drained before the round
/// fails; no [`RoundResult`] is ever built from a partially joined set.
pub fn execute_round<S: SpawnStrategy>(
    strategy: &S,
    worker_count: usize,
    workload: &Workload,
    collector: &mut MetricsCollector,
) -> Result<RoundResult, RoundError> {
    let reclaims_before = collector.cumulative_reclaims();
    let reclaim_time_before = collector.cumulative_reclaim_time();

    let start = Instant::now();

    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let workload = workload.clone();
        let work: WorkFn = Box::new(move || {
            let mut rng = FastRng::new();
            workload.run(&mut rng)
        });
        match strategy.spawn(work) {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                let spawned = handles.len();
                // Drain what was already dispatched so nothing outlives the
                // failed round.
                let _ = strategy.join_all(handles);
                return Err(RoundError::Spawn { spawned, source });
            }
        }
    }

    let summary = strategy.join_all(handles)?;
    if summary.completed != worker_count {
        return Err(RoundError::Incomplete {
            expected: worker_count,
            actual: summary.completed,
        });
    }

    let elapsed = start.elapsed();
    let heap_used = collector.heap_used();
    let non_heap_used = collector.non_heap_used();
    let reclaim_count = delta_count(reclaims_before, collector.cumulative_reclaims(), strategy.label());
    let reclaim_time = delta_time(
        reclaim_time_before,
        collector.cumulative_reclaim_time(),
        strategy.label(),
    );

    Ok(RoundResult {
        elapsed_ms: elapsed.as_millis() as u64,
        heap_used,
        non_heap_used,
        reclaim_count,
        reclaim_time_ms: reclaim_time.as_millis() as u64,
        faults: summary.faults,
    })
}

// A negative raw delta means the counter wrapped or reset mid-window. That
// round is a measurement anomaly: clamp to zero and flag it, never crash.

fn delta_count(before: u64, after: u64, strategy: &'static str) -> u64 {
    if after < before {
        warn!(strategy, before, after, "reclaim counter went backwards, clamping delta to zero");
    }
    after.saturating_sub(before)
}

fn delta_time(before: Duration, after: Duration, strategy: &'static str) -> Duration {
    after.checked_sub(before).unwrap_or_else(|| {
        warn!(strategy, "reclaim timer went backwards, clamping delta to zero");
        Duration::ZERO
    })
}
