// SPDX-License-Identifier: Apache-2.0

//! Instrumented global allocator feeding the heap and reclaim counters.
//!
//! The process under test has no tracing garbage collector, so the two
//! counter families the experiment needs are derived from the allocator
//! itself: bytes currently live stand in for heap-in-use, and cumulative
//! deallocation count/time stand in for collection count/time. All counters
//! except the live-byte gauge are monotonically non-decreasing for the
//! lifetime of the process; differencing is the round executor's job.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static RECLAIM_OPS: AtomicU64 = AtomicU64::new(0);
static RECLAIM_NANOS: AtomicU64 = AtomicU64::new(0);

/// Thin wrapper over the system allocator that keeps process-wide tallies.
///
/// Installed as the `#[global_allocator]` in the crate root so every
/// allocation in the process is counted, including the harness's own.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let start = Instant::now();
        System.dealloc(ptr, layout);
        RECLAIM_NANOS.fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        RECLAIM_OPS.fetch_add(1, Ordering::Relaxed);
        LIVE_BYTES.fetch_sub(layout.size() as u64, Ordering::Relaxed);
    }
}

/// Bytes currently live in the process heap.
pub fn heap_used() -> u64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Cumulative count of deallocation calls since process start.
pub fn reclaims() -> u64 {
    RECLAIM_OPS.load(Ordering::Relaxed)
}

/// Cumulative wall time spent inside deallocation since process start.
pub fn reclaim_time() -> Duration {
    Duration::from_nanos(RECLAIM_NANOS.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests share the process-wide counters with every other test thread, so
    // assertions are monotone: concurrent activity only pushes them further
    // in the asserted direction.

    #[test]
    fn test_heap_used_includes_live_allocation() {
        let buf = vec![0u8; 8 * 1024 * 1024];
        assert!(heap_used() >= buf.len() as u64);
        drop(buf);
    }

    #[test]
    fn test_reclaims_advance_on_drop() {
        let before = reclaims();
        drop(vec![0u8; 4096]);
        assert!(reclaims() > before);
    }

    #[test]
    fn test_reclaim_time_is_monotone() {
        let before = reclaim_time();
        for _ in 0..100 {
            drop(vec![0u8; 1024]);
        }
        assert!(reclaim_time() >= before);
    }
}
