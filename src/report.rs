// SPDX-License-Identifier: Apache-2.0

//! Console rendering of a finished run: a side-by-side comparison table and
//! per-strategy averages, or the whole run as JSON on stdout.

use crate::metrics::{RoundResult, StrategyAverages};
use crate::orchestrator::BenchmarkRun;

/// Format bytes as megabytes, matching the table column width.
pub fn format_mb(bytes: f64) -> String {
    format!("{:.2} MB", bytes / (1024.0 * 1024.0))
}

/// Print the round-by-round comparison table and the averages summary.
pub fn print_table(run: &BenchmarkRun) {
    println!();
    println!("=== BENCHMARK RESULTS ===");
    println!(
        "Workload: {:<20} | Workers: {:<8} | Rounds: {}",
        run.workload, run.config.worker_count, run.config.round_count
    );
    let rule = "-".repeat(112);
    println!("{rule}");
    println!(
        "{:<6} | {:<49} | {:<49}",
        "Round", "Native threads", "Lightweight tasks"
    );
    println!(
        "{:<6} | {:>8} | {:>12} | {:>9} | {:>10} | {:>8} | {:>12} | {:>9} | {:>10}",
        "", "ms", "mem", "reclaims", "reclaim ms", "ms", "mem", "reclaims", "reclaim ms"
    );
    println!("{rule}");

    for (i, (n, l)) in run
        .native
        .rounds
        .iter()
        .zip(run.lightweight.rounds.iter())
        .enumerate()
    {
        println!(
            "{:<6} | {} | {}",
            i + 1,
            format_round_cells(n),
            format_round_cells(l)
        );
    }
    println!("{rule}");

    println!();
    println!("=== AVERAGES ===");
    print_averages("Native threads", &run.native_averages);
    print_averages("Lightweight tasks", &run.lightweight_averages);
}

fn format_round_cells(r: &RoundResult) -> String {
    format!(
        "{:>8} | {:>12} | {:>9} | {:>10}",
        r.elapsed_ms,
        format_mb(r.combined_memory() as f64),
        r.reclaim_count,
        r.reclaim_time_ms
    )
}

fn print_averages(label: &str, avg: &StrategyAverages) {
    println!(
        "{:<18} | avg time: {:>10.2} ms | avg memory: {:>12} | avg reclaims: {:>12.2} | avg reclaim time: {:>8.2} ms",
        label,
        avg.elapsed_ms,
        format_mb(avg.memory_bytes),
        avg.reclaims,
        avg.reclaim_time_ms
    );
}

/// Serialize the whole run to stdout. Nothing is written to disk.
pub fn print_json(run: &BenchmarkRun) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(run)?);
    Ok(())
}
