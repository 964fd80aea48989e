//! Headless skirmish runner for scenario playback and CI verification.
//!
//! This crate loads a RON scenario, runs the simulation to an outcome or
//! time limit, and streams JSON lines:
//!
//! - **stdout**: telemetry snapshots, then one final summary (JSON)
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Run the built-in 1v1 skirmish
//! cargo run -p skirmish_headless -- run
//!
//! # Run a scenario with a rules override
//! cargo run -p skirmish_headless -- run --scenario scenarios/skirmish_1v1.ron --config rules.ron
//!
//! # Measure throughput
//! cargo run -p skirmish_headless -- bench --seconds 300
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;
pub mod runner;
pub mod scenario;

pub use metrics::{EndReason, FactionMetrics, GameMetrics};
pub use runner::{bench, BenchReport, OutputLine, RunnerConfig, RunnerError, ScenarioRunner};
pub use scenario::{load_config, Scenario, ScenarioError};
