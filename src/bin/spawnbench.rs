// SPDX-License-Identifier: Apache-2.0

//! CLI entry point: select a workload, run the experiment, print the report.

use std::io::{self, Write};

use clap::Parser;

use spawnbench::config::{DEFAULT_ROUND_COUNT, DEFAULT_WORKER_COUNT};
use spawnbench::{orchestrator, report, BenchConfig, Workload};

#[derive(Parser)]
#[command(name = "spawnbench")]
#[command(about = "Compare OS-thread and lightweight-task fan-out under synthetic workloads")]
struct Args {
    /// Concurrent workers per round
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Rounds per strategy
    #[arg(long, default_value_t = DEFAULT_ROUND_COUNT)]
    rounds: usize,

    /// Carrier threads for the lightweight strategy (0 = one per core)
    #[arg(long, default_value_t = 0)]
    carriers: usize,

    /// Stack size per native worker thread, in KiB
    #[arg(long, default_value_t = 256)]
    stack_kib: usize,

    /// Workload number (1-6); prompts interactively when omitted
    #[arg(short, long)]
    workload: Option<u32>,

    /// Emit the full run as JSON on stdout instead of a table
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let choice = match args.workload {
        Some(choice) => choice,
        None => prompt_choice()?,
    };
    let workload = Workload::select(choice);

    let config = BenchConfig {
        worker_count: args.workers,
        round_count: args.rounds,
        carrier_threads: args.carriers,
        native_stack_bytes: args.stack_kib * 1024,
    };

    println!(
        "Benchmarking '{}' with {} workers over {} rounds per strategy",
        workload.name(),
        config.worker_count,
        config.round_count
    );

    let run = orchestrator::run(&config, &workload)?;

    if args.json {
        report::print_json(&run)?;
    } else {
        report::print_table(&run);
    }

    Ok(())
}

/// Read one menu selection from stdin. Unparsable input maps to 0, which the
/// workload selector treats as an invalid choice and resolves to the default.
fn prompt_choice() -> anyhow::Result<u32> {
    println!("Select a workload:");
    println!("1 - Heavy Computation");
    println!("2 - Memory Allocation");
    println!("3 - String Processing");
    println!("4 - Active Wait");
    println!("5 - Mixed");
    println!("6 - I/O Simulation");
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().parse().unwrap_or(0))
}
