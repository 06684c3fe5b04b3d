// SPDX-License-Identifier: Apache-2.0

//! Custom error types for spawnbench.
//!
//! All library errors are explicit enum variants - no `Box<dyn Error>`,
//! no `anyhow::Result` outside the binary entry point.

use thiserror::Error;

/// Failure inside one worker's unit of work.
///
/// Workload faults are swallowed at the worker boundary: the round executor
/// logs them and counts the worker as complete, so a single bad worker can
/// never abort a round.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("I/O simulation failed during {stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O simulation read back {actual} bytes, expected {expected}")]
    ShortRead { expected: usize, actual: usize },
}

/// Failure to create one concurrent execution unit.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to spawn worker thread: {0}")]
    Thread(#[source] std::io::Error),

    #[error("failed to start carrier runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// The control thread's wait for round completion was interrupted.
///
/// Fatal to the round: no metric may be sampled from a partially joined
/// worker set.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("barrier join interrupted on {strategy} strategy: {reason}")]
    Interrupted {
        strategy: &'static str,
        reason: String,
    },
}

/// A round that could not produce a trustworthy result.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("worker spawn failed after {spawned} workers were dispatched: {source}")]
    Spawn {
        spawned: usize,
        #[source]
        source: SpawnError,
    },

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error("barrier accounted for {actual} of {expected} workers")]
    Incomplete { expected: usize, actual: usize },
}

/// Invalid benchmark configuration, rejected before any round executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {value} - {reason}")]
    InvalidField {
        field: &'static str,
        value: u64,
        reason: String,
    },
}

/// Failure to read process-wide counters.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("cannot resolve current process id: {message}")]
    Pid { message: String },
}

/// Top-level error for a full benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("metrics collector unavailable: {0}")]
    Metrics(#[from] MetricsError),

    #[error("failed to start strategy: {0}")]
    Strategy(#[from] SpawnError),

    #[error("round {round} failed on {strategy} strategy: {source}")]
    Round {
        strategy: &'static str,
        round: usize,
        #[source]
        source: RoundError,
    },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_error_display_names_spawn_progress() {
        let err = RoundError::Spawn {
            spawned: 42,
            source: SpawnError::Thread(std::io::Error::from(std::io::ErrorKind::WouldBlock)),
        };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_bench_error_carries_round_context() {
        let err = BenchError::Round {
            strategy: "native",
            round: 3,
            source: RoundError::Incomplete {
                expected: 10,
                actual: 9,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("round 3"));
        assert!(msg.contains("native"));
    }

    #[test]
    fn test_join_error_chain() {
        let join = JoinError::Interrupted {
            strategy: "lightweight",
            reason: "runtime shut down".to_string(),
        };
        let round: RoundError = join.into();
        assert!(matches!(round, RoundError::Join(_)));
    }
}
