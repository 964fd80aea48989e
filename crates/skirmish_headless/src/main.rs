//! Headless skirmish runner.
//!
//! # Usage
//!
//! ```bash
//! # Run the default scenario
//! cargo run -p skirmish_headless
//!
//! # Run a scenario file with custom timing
//! cargo run -p skirmish_headless -- run --scenario duel.ron --dt 0.05 --max-seconds 120
//!
//! # Benchmark
//! cargo run -p skirmish_headless -- bench --seconds 600
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_headless::{bench, load_config, RunnerConfig, Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless orbital skirmish runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and stream telemetry
    Run {
        /// Scenario file to load (default: built-in 1v1 skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Rules file overriding the scenario's config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Step length in seconds (default: from the scenario)
        #[arg(long)]
        dt: Option<f32>,

        /// Simulated seconds before the match is called (default: from the scenario)
        #[arg(long)]
        max_seconds: Option<f32>,

        /// Emit telemetry every N ticks, 0 to disable (default: once per second)
        #[arg(long)]
        report_every: Option<u64>,
    },

    /// Run the default scenario and report ticks per second
    Bench {
        /// Simulated seconds to run
        #[arg(long, default_value = "300")]
        seconds: f32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr (stdout is for JSON output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            config,
            dt,
            max_seconds,
            report_every,
        }) => cmd_run(scenario, config, dt, max_seconds, report_every),
        Some(Commands::Bench { seconds }) => cmd_bench(seconds),
        None => cmd_run(None, None, None, None, None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run a single match.
fn cmd_run(
    scenario: Option<PathBuf>,
    config: Option<PathBuf>,
    dt: Option<f32>,
    max_seconds: Option<f32>,
    report_every: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::skirmish_1v1(),
    };
    let rules = config.map(load_config).transpose()?;

    let defaults = RunnerConfig::from_scenario(&scenario);
    let runner_config = RunnerConfig {
        dt: dt.unwrap_or(defaults.dt),
        max_seconds: max_seconds.unwrap_or(defaults.max_seconds),
        report_every: report_every.unwrap_or(defaults.report_every),
    };

    let runner = ScenarioRunner::new(&scenario, rules, runner_config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runner.run(&mut out)?;
    Ok(())
}

/// Measure simulation throughput.
fn cmd_bench(seconds: f32) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::skirmish_1v1();
    tracing::info!(seconds, dt = scenario.dt, "Starting benchmark");

    let report = bench(&scenario, seconds)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", serde_json::to_string(&report)?)?;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks:            {}", report.ticks);
    eprintln!("Simulated:        {:.1} s", report.simulated_seconds);
    eprintln!("Wall clock:       {:.3} s", report.wall_seconds);
    eprintln!("Ticks per second: {:.0}", report.ticks_per_second);
    Ok(())
}
