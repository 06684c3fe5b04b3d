// SPDX-License-Identifier: Apache-2.0

//! Benchmark configuration with documented defaults and fail-fast validation.

use serde::Serialize;

use crate::error::ConfigError;

/// Workers spawned per round.
pub const DEFAULT_WORKER_COUNT: usize = 100_000;
/// Rounds executed per strategy.
pub const DEFAULT_ROUND_COUNT: usize = 10;
/// Stack size for native worker threads. The platform default (8 MiB on
/// Linux) would make the default worker population uncreatable.
pub const DEFAULT_STACK_BYTES: usize = 256 * 1024;

/// Floor below which worker threads overflow inside formatting machinery.
const MIN_STACK_BYTES: usize = 64 * 1024;
const MAX_CARRIER_THREADS: usize = 1_024;

#[derive(Debug, Clone, Serialize)]
pub struct BenchConfig {
    /// Concurrent workers per round.
    pub worker_count: usize,
    /// Sequential rounds per strategy.
    pub round_count: usize,
    /// Carrier threads backing the lightweight strategy; 0 means one per
    /// available core.
    pub carrier_threads: usize,
    /// Stack size per native worker thread.
    pub native_stack_bytes: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            round_count: DEFAULT_ROUND_COUNT,
            carrier_threads: 0,
            native_stack_bytes: DEFAULT_STACK_BYTES,
        }
    }
}

impl BenchConfig {
    /// Reject configurations that cannot execute before any round starts.
    /// Zero workers and zero rounds are both valid experiments.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.native_stack_bytes < MIN_STACK_BYTES {
            return Err(ConfigError::InvalidField {
                field: "native_stack_bytes",
                value: self.native_stack_bytes as u64,
                reason: format!("must be at least {} bytes", MIN_STACK_BYTES),
            });
        }

        if self.carrier_threads > MAX_CARRIER_THREADS {
            return Err(ConfigError::InvalidField {
                field: "carrier_threads",
                value: self.carrier_threads as u64,
                reason: format!("must not exceed {}", MAX_CARRIER_THREADS),
            });
        }

        Ok(())
    }

    /// Carrier pool size after resolving the 0 = auto sentinel.
    pub fn effective_carriers(&self) -> usize {
        if self.carrier_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.carrier_threads
        }
    }
}
