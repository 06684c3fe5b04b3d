// SPDX-License-Identifier: Apache-2.0

//! The concurrency capability the round executor is parameterized by.
//!
//! Both strategies expose the same two operations - spawn one worker, join
//! them all - so the comparison between OS threads and lightweight tasks is
//! symmetric by construction. Workers share no state; each receives its own
//! boxed unit of work and runs to completion independently.

use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::warn;

use crate::error::{JoinError, SpawnError, WorkloadError};

/// One worker's unit of work. Returning `Ok(Some(d))` asks the strategy to
/// park the worker for `d` in whatever way suits its scheduler.
pub type WorkFn = Box<dyn FnOnce() -> Result<Option<Duration>, WorkloadError> + Send + 'static>;

/// Outcome of a full barrier join.
///
/// A worker whose workload failed or panicked still counts as completed for
/// join purposes; the failure is tallied in `faults` and logged, never
/// propagated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JoinSummary {
    pub completed: usize,
    pub faults: u64,
}

/// A concurrency primitive mapping: how one worker becomes one schedulable
/// unit, and how the control thread waits for all of them.
pub trait SpawnStrategy {
    type Handle;

    fn label(&self) -> &'static str;

    /// Create and dispatch one worker bound to `work`.
    fn spawn(&self, work: WorkFn) -> Result<Self::Handle, SpawnError>;

    /// Block until every handle has completed. No partial result: an
    /// interrupted wait is an error and the caller must discard the round.
    fn join_all(&self, handles: Vec<Self::Handle>) -> Result<JoinSummary, JoinError>;
}

// ============================================================================
// Native: one dedicated OS thread per worker
// ============================================================================

pub struct NativeThreads {
    stack_bytes: usize,
}

impl NativeThreads {
    /// `stack_bytes` applies to every worker thread; the default population
    /// of 100k workers is only creatable with stacks well below the platform
    /// default.
    pub fn new(stack_bytes: usize) -> Self {
        Self { stack_bytes }
    }
}

impl SpawnStrategy for NativeThreads {
    type Handle = thread::JoinHandle<Result<(), WorkloadError>>;

    fn label(&self) -> &'static str {
        "native"
    }

    fn spawn(&self, work: WorkFn) -> Result<Self::Handle, SpawnError> {
        thread::Builder::new()
            .stack_size(self.stack_bytes)
            .spawn(move || match work() {
                Ok(Some(park)) => {
                    thread::sleep(park);
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(err) => Err(err),
            })
            .map_err(SpawnError::Thread)
    }

    fn join_all(&self, handles: Vec<Self::Handle>) -> Result<JoinSummary, JoinError> {
        let mut summary = JoinSummary::default();
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => summary.completed += 1,
                Ok(Err(err)) => {
                    warn!(strategy = "native", error = %err, "worker fault swallowed");
                    summary.completed += 1;
                    summary.faults += 1;
                }
                Err(_) => {
                    warn!(strategy = "native", "worker panicked");
                    summary.completed += 1;
                    summary.faults += 1;
                }
            }
        }
        Ok(summary)
    }
}

// ============================================================================
// Lightweight: one task per worker over a bounded carrier pool
// ============================================================================

pub struct LightweightTasks {
    runtime: Runtime,
}

impl LightweightTasks {
    pub fn new(carrier_threads: usize) -> Result<Self, SpawnError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(carrier_threads.max(1))
            .thread_name("carrier")
            .enable_time()
            .build()
            .map_err(SpawnError::Runtime)?;
        Ok(Self { runtime })
    }
}

impl SpawnStrategy for LightweightTasks {
    type Handle = tokio::task::JoinHandle<Result<(), WorkloadError>>;

    fn label(&self) -> &'static str {
        "lightweight"
    }

    fn spawn(&self, work: WorkFn) -> Result<Self::Handle, SpawnError> {
        Ok(self.runtime.spawn(async move {
            match work() {
                Ok(Some(park)) => {
                    // Suspends the task, not the carrier thread.
                    tokio::time::sleep(park).await;
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(err) => Err(err),
            }
        }))
    }

    fn join_all(&self, handles: Vec<Self::Handle>) -> Result<JoinSummary, JoinError> {
        self.runtime.block_on(async {
            let mut summary = JoinSummary::default();
            for handle in handles {
                match handle.await {
                    Ok(Ok(())) => summary.completed += 1,
                    Ok(Err(err)) => {
                        warn!(strategy = "lightweight", error = %err, "worker fault swallowed");
                        summary.completed += 1;
                        summary.faults += 1;
                    }
                    Err(join_err) if join_err.is_panic() => {
                        warn!(strategy = "lightweight", "worker panicked");
                        summary.completed += 1;
                        summary.faults += 1;
                    }
                    Err(join_err) => {
                        // Cancelled task: the barrier can no longer account
                        // for every worker.
                        return Err(JoinError::Interrupted {
                            strategy: "lightweight",
                            reason: join_err.to_string(),
                        });
                    }
                }
            }
            Ok(summary)
        })
    }
}
