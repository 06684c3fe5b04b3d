// SPDX-License-Identifier: Apache-2.0

//! The closed set of synthetic workloads workers execute.
//!
//! Each variant carries its own size/time bounds so no invocation is tied to
//! hard-coded constants, and every bound is sampled per invocation so no two
//! workers do identical work. Workloads are self-contained: they share no
//! state with other workers and leave nothing behind.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::warn;
use uuid::Uuid;

use crate::error::WorkloadError;

/// Filename prefix used by the I/O simulation for its temp files.
pub const IO_FILE_PREFIX: &str = "iosim_";

/// Modulus keeping the running product of the computation workload bounded.
const PRODUCT_MODULUS: u64 = 1_000_000_007;

// ============================================================================
// Fast RNG (xorshift64) - one per worker, no shared state.
// Seeded from the system clock mixed through splitmix64 with a process-wide
// sequence counter so concurrently created workers diverge immediately.
// ============================================================================

static SEED_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct FastRng(u64);

impl FastRng {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let seq = SEED_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::seeded(nanos ^ seq.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Deterministic construction for tests.
    pub fn seeded(seed: u64) -> Self {
        // splitmix64 scramble; xorshift must never hold state 0.
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self((z ^ (z >> 31)) | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform draw from `[range.start, range.end)`; an empty range yields
    /// its start.
    pub fn range_u64(&mut self, range: &Range<u64>) -> u64 {
        let len = range.end.saturating_sub(range.start);
        if len == 0 {
            return range.start;
        }
        range.start + self.next_u64() % len
    }

    pub fn range_usize(&mut self, range: &Range<usize>) -> usize {
        let len = range.end.saturating_sub(range.start);
        if len == 0 {
            return range.start;
        }
        range.start + (self.next_u64() % len as u64) as usize
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn fill(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl Default for FastRng {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Workload variants
// ============================================================================

/// One synthetic unit of work, selected once per benchmark run.
///
/// `run` returns `Ok(Some(duration))` when the worker asks to be parked for
/// that long; the spawning strategy performs the park in its own idiom so a
/// suspended worker never blocks a carrier thread or the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workload {
    /// Iterative modular running product over a random trip count. Pure CPU.
    HeavyComputation { trips: Range<u64> },
    /// Pattern-filled byte buffer of random size plus one full copy.
    MemoryAllocation { size: Range<usize> },
    /// Concatenates indexed fragments, then one substring-replace pass.
    StringProcessing { fragments: usize },
    /// Busy-spins on square roots until a random monotonic-clock deadline.
    ActiveWait { spin_ms: Range<u64> },
    /// Scaled-down computation and allocation, then a parked wait.
    Mixed {
        trips: Range<u64>,
        size: Range<usize>,
        park_ms: Range<u64>,
    },
    /// Writes, reads back, and deletes a uniquely named temp file.
    IoSimulation { payload: Range<usize>, dir: PathBuf },
}

impl Workload {
    pub fn heavy_computation() -> Self {
        Self::HeavyComputation {
            trips: 10_000..20_000,
        }
    }

    pub fn memory_allocation() -> Self {
        Self::MemoryAllocation {
            size: 100_000..500_000,
        }
    }

    pub fn string_processing() -> Self {
        Self::StringProcessing { fragments: 10_000 }
    }

    pub fn active_wait() -> Self {
        Self::ActiveWait { spin_ms: 10..50 }
    }

    pub fn mixed() -> Self {
        Self::Mixed {
            trips: 1_000..5_000,
            size: 50_000..100_000,
            park_ms: 5..20,
        }
    }

    pub fn io_simulation() -> Self {
        Self::IoSimulation {
            payload: 10_000..50_000,
            dir: std::env::temp_dir(),
        }
    }

    /// Map a menu choice (1..=6) to its workload.
    pub fn from_choice(choice: u32) -> Option<Self> {
        match choice {
            1 => Some(Self::heavy_computation()),
            2 => Some(Self::memory_allocation()),
            3 => Some(Self::string_processing()),
            4 => Some(Self::active_wait()),
            5 => Some(Self::mixed()),
            6 => Some(Self::io_simulation()),
            _ => None,
        }
    }

    /// Resolve a menu choice, falling back to String Processing with a
    /// visible notice for anything outside the known set. Never fatal.
    pub fn select(choice: u32) -> Self {
        Self::from_choice(choice).unwrap_or_else(|| {
            warn!(choice, "invalid workload choice, using String Processing");
            Self::string_processing()
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HeavyComputation { .. } => "Heavy Computation",
            Self::MemoryAllocation { .. } => "Memory Allocation",
            Self::StringProcessing { .. } => "String Processing",
            Self::ActiveWait { .. } => "Active Wait",
            Self::Mixed { .. } => "Mixed",
            Self::IoSimulation { .. } => "I/O Simulation",
        }
    }

    /// Execute one invocation.
    pub fn run(&self, rng: &mut FastRng) -> Result<Option<Duration>, WorkloadError> {
        match self {
            Self::HeavyComputation { trips } => {
                let trips = rng.range_u64(trips);
                let mut acc: u64 = 1;
                for i in 2..=trips {
                    acc = (acc * i) % PRODUCT_MODULUS;
                }
                std::hint::black_box(acc);
                Ok(None)
            }
            Self::MemoryAllocation { size } => {
                let size = rng.range_usize(size);
                let mut data = vec![0u8; size];
                for (i, byte) in data.iter_mut().enumerate() {
                    *byte = (i % 256) as u8;
                }
                let copy = data.clone();
                std::hint::black_box(copy.len());
                Ok(None)
            }
            Self::StringProcessing { fragments } => {
                use std::fmt::Write;
                let mut text = String::new();
                for i in 0..*fragments {
                    let _ = write!(text, "ThreadWork{i}");
                }
                let replaced = text.replace("Thread", "Work");
                std::hint::black_box(replaced.len());
                Ok(None)
            }
            Self::ActiveWait { spin_ms } => {
                let deadline = Instant::now() + Duration::from_millis(rng.range_u64(spin_ms));
                while Instant::now() < deadline {
                    std::hint::black_box(rng.next_f64().sqrt());
                }
                Ok(None)
            }
            Self::Mixed {
                trips,
                size,
                park_ms,
            } => {
                let trips = rng.range_u64(trips);
                for i in 0..trips {
                    std::hint::black_box(((i + 1) as f64).ln());
                }
                let size = rng.range_usize(size);
                let mut data = vec![0u8; size];
                for (i, byte) in data.iter_mut().enumerate() {
                    *byte = (i % 128) as u8;
                }
                std::hint::black_box(data.len());
                Ok(Some(Duration::from_millis(rng.range_u64(park_ms))))
            }
            Self::IoSimulation { payload, dir } => {
                let size = rng.range_usize(payload);
                let mut data = vec![0u8; size];
                rng.fill(&mut data);

                let path = dir.join(format!("{}{}.tmp", IO_FILE_PREFIX, Uuid::new_v4()));
                let outcome = write_read_back(&path, &data);
                // The file must not survive the invocation even when a step
                // failed mid-sequence.
                let removed = fs::remove_file(&path);
                match (outcome, removed) {
                    (Ok(()), Ok(())) => Ok(None),
                    (Ok(()), Err(source)) => Err(WorkloadError::Io {
                        stage: "delete",
                        source,
                    }),
                    (Err(err), _) => Err(err),
                }
            }
        }
    }
}

fn write_read_back(path: &std::path::Path, data: &[u8]) -> Result<(), WorkloadError> {
    fs::write(path, data).map_err(|source| WorkloadError::Io {
        stage: "write",
        source,
    })?;
    let read = fs::read(path).map_err(|source| WorkloadError::Io {
        stage: "read",
        source,
    })?;
    if read.len() != data.len() {
        return Err(WorkloadError::ShortRead {
            expected: data.len(),
            actual: read.len(),
        });
    }
    Ok(())
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rng_range_stays_in_bounds() {
        let mut rng = FastRng::seeded(7);
        let range = 10_000u64..20_000;
        for _ in 0..10_000 {
            let n = rng.range_u64(&range);
            assert!(n >= range.start && n < range.end);
        }
    }

    #[test]
    fn test_rng_empty_range_yields_start() {
        let mut rng = FastRng::seeded(1);
        assert_eq!(rng.range_u64(&(5..5)), 5);
        assert_eq!(rng.range_usize(&(9..9)), 9);
    }

    #[test]
    fn test_rng_f64_is_unit_interval() {
        let mut rng = FastRng::seeded(3);
        for _ in 0..1_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_heavy_computation_terminates() {
        let workload = Workload::HeavyComputation { trips: 100..200 };
        let mut rng = FastRng::seeded(11);
        assert!(matches!(workload.run(&mut rng), Ok(None)));
    }

    #[test]
    fn test_memory_and_string_workloads_complete() {
        let mut rng = FastRng::seeded(13);
        let mem = Workload::MemoryAllocation { size: 100..200 };
        assert!(matches!(mem.run(&mut rng), Ok(None)));
        let text = Workload::StringProcessing { fragments: 50 };
        assert!(matches!(text.run(&mut rng), Ok(None)));
    }

    #[test]
    fn test_active_wait_spins_until_deadline() {
        let workload = Workload::ActiveWait { spin_ms: 2..3 };
        let mut rng = FastRng::seeded(17);
        let start = Instant::now();
        workload.run(&mut rng).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn test_mixed_requests_park_within_bounds() {
        let workload = Workload::Mixed {
            trips: 10..20,
            size: 100..200,
            park_ms: 5..20,
        };
        let mut rng = FastRng::seeded(19);
        let park = workload.run(&mut rng).unwrap().expect("park requested");
        assert!(park >= Duration::from_millis(5));
        assert!(park < Duration::from_millis(20));
    }

    #[test]
    fn test_io_simulation_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        let workload = Workload::IoSimulation {
            payload: 1_000..2_000,
            dir: dir.path().to_path_buf(),
        };
        let mut rng = FastRng::seeded(23);
        for _ in 0..10 {
            assert!(matches!(workload.run(&mut rng), Ok(None)));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_io_simulation_reports_unwritable_dir() {
        let workload = Workload::IoSimulation {
            payload: 100..200,
            dir: PathBuf::from("/nonexistent/spawnbench"),
        };
        let mut rng = FastRng::seeded(29);
        let err = workload.run(&mut rng).unwrap_err();
        assert!(matches!(err, WorkloadError::Io { stage: "write", .. }));
    }

    #[test]
    fn test_from_choice_covers_menu() {
        assert_eq!(Workload::from_choice(1).unwrap().name(), "Heavy Computation");
        assert_eq!(Workload::from_choice(6).unwrap().name(), "I/O Simulation");
        assert!(Workload::from_choice(0).is_none());
        assert!(Workload::from_choice(7).is_none());
    }

    #[test]
    fn test_select_falls_back_to_string_processing() {
        assert_eq!(Workload::select(99).name(), "String Processing");
        assert_eq!(Workload::select(4).name(), "Active Wait");
    }
}
