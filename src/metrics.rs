// SPDX-License-Identifier: Apache-2.0

//! Process-wide counter reads and the per-round result types.
//!
//! The collector exposes instantaneous reads only; computing before/after
//! deltas is the round executor's responsibility.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessRefreshKind, System};

use crate::counters;
use crate::error::MetricsError;

/// Instantaneous reads over the two counter families: process memory usage
/// and allocator reclaim activity.
pub struct MetricsCollector {
    sys: System,
    pid: Pid,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, MetricsError> {
        let pid = sysinfo::get_current_pid().map_err(|message| MetricsError::Pid {
            message: message.to_string(),
        })?;
        Ok(Self {
            sys: System::new(),
            pid,
        })
    }

    /// Bytes currently live in the heap, per the tracking allocator.
    pub fn heap_used(&self) -> u64 {
        counters::heap_used()
    }

    /// Resident memory outside the tracked heap: thread stacks, code,
    /// allocator slack. Derived as RSS minus live heap, saturating at zero.
    pub fn non_heap_used(&mut self) -> u64 {
        self.sys
            .refresh_process_specifics(self.pid, ProcessRefreshKind::new().with_memory());
        let rss = self
            .sys
            .process(self.pid)
            .map(|p| p.memory())
            .unwrap_or(0);
        rss.saturating_sub(counters::heap_used())
    }

    /// Cumulative deallocation count since process start. Monotone.
    pub fn cumulative_reclaims(&self) -> u64 {
        counters::reclaims()
    }

    /// Cumulative time spent in deallocation since process start. Monotone.
    pub fn cumulative_reclaim_time(&self) -> Duration {
        counters::reclaim_time()
    }
}

/// Immutable record produced once per round.
///
/// All fields are unsigned; reclaim fields are before/after deltas computed
/// with saturating subtraction, so the non-negativity invariants hold by
/// construction. `faults` counts worker failures that were swallowed at the
/// worker boundary - they never abort a round but stay observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Wall-clock from "all workers dispatched" to "all workers complete".
    pub elapsed_ms: u64,
    /// Live heap bytes sampled immediately after the barrier join.
    pub heap_used: u64,
    /// Non-heap resident bytes sampled immediately after the barrier join.
    pub non_heap_used: u64,
    /// Deallocation calls that occurred during the measurement window.
    pub reclaim_count: u64,
    /// Time spent in deallocation during the measurement window.
    pub reclaim_time_ms: u64,
    /// Worker faults swallowed during the round.
    pub faults: u64,
}

impl RoundResult {
    pub fn combined_memory(&self) -> u64 {
        self.heap_used + self.non_heap_used
    }
}

/// Ordered sequence of round results for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySeries {
    pub label: String,
    pub rounds: Vec<RoundResult>,
}

impl StrategySeries {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rounds: Vec::new(),
        }
    }

    pub fn averages(&self) -> StrategyAverages {
        StrategyAverages::from_series(self)
    }
}

/// Arithmetic means across all rounds of one strategy.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StrategyAverages {
    pub elapsed_ms: f64,
    pub memory_bytes: f64,
    pub reclaims: f64,
    pub reclaim_time_ms: f64,
}

impl StrategyAverages {
    /// A zero-round series yields a defined all-zero average, not a fault.
    pub fn from_series(series: &StrategySeries) -> Self {
        let len = series.rounds.len();
        if len == 0 {
            return Self {
                elapsed_ms: 0.0,
                memory_bytes: 0.0,
                reclaims: 0.0,
                reclaim_time_ms: 0.0,
            };
        }
        let len = len as f64;
        Self {
            elapsed_ms: series.rounds.iter().map(|r| r.elapsed_ms).sum::<u64>() as f64 / len,
            memory_bytes: series
                .rounds
                .iter()
                .map(|r| r.combined_memory())
                .sum::<u64>() as f64
                / len,
            reclaims: series.rounds.iter().map(|r| r.reclaim_count).sum::<u64>() as f64 / len,
            reclaim_time_ms: series
                .rounds
                .iter()
                .map(|r| r.reclaim_time_ms)
                .sum::<u64>() as f64
                / len,
        }
    }
}

/// Host information captured once per run and attached to the report.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}
