//! Headless match runner.
//!
//! Drives a [`Simulation`] built from a [`Scenario`] until one side is
//! eliminated or the time limit runs out, writing JSON lines as it goes.

use std::io::Write;
use std::result::Result;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use skirmish_core::config::SimConfig;
use skirmish_core::prelude::*;
use thiserror::Error;

use crate::metrics::GameMetrics;
use crate::scenario::Scenario;

/// Error type for runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The step length is not a positive finite number.
    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f32),
    /// Writing output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    /// Serializing output failed.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One line of runner output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputLine {
    /// Periodic snapshot.
    Telemetry(Telemetry),
    /// Final summary.
    Summary(GameMetrics),
}

impl OutputLine {
    /// Serialize to a newline-terminated JSON string.
    pub fn to_json_line(&self) -> Result<String, RunnerError> {
        let mut json = serde_json::to_string(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Runner settings, usually taken from the scenario and the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerConfig {
    /// Step length in seconds.
    pub dt: f32,
    /// Simulated seconds before the match is called.
    pub max_seconds: f32,
    /// Emit telemetry every N ticks. Zero disables telemetry lines.
    pub report_every: u64,
}

impl RunnerConfig {
    /// Settings stored in a scenario, reporting once per simulated second.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let per_second = (1.0 / scenario.dt).round();
        Self {
            dt: scenario.dt,
            max_seconds: scenario.time_limit,
            report_every: if per_second.is_finite() && per_second >= 1.0 {
                per_second as u64
            } else {
                1
            },
        }
    }
}

/// Runs one scenario to completion.
pub struct ScenarioRunner {
    sim: Simulation,
    config: RunnerConfig,
    metrics: GameMetrics,
}

impl ScenarioRunner {
    /// Build a runner for `scenario`.
    ///
    /// A `rules` override replaces the scenario's own config.
    pub fn new(
        scenario: &Scenario,
        rules: Option<SimConfig>,
        config: RunnerConfig,
    ) -> Result<Self, RunnerError> {
        if !(config.dt.is_finite() && config.dt > 0.0) {
            return Err(RunnerError::InvalidTimeStep(config.dt));
        }

        let scenario = match rules {
            Some(rules) => scenario.clone().with_config(rules),
            None => scenario.clone(),
        };

        Ok(Self {
            sim: scenario.build_simulation(),
            config,
            metrics: GameMetrics::new(scenario.name),
        })
    }

    /// The simulation being run.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Metrics gathered so far.
    #[must_use]
    pub const fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    /// Check whether the match is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sim.outcome() != GameOutcome::InProgress || self.timed_out()
    }

    fn timed_out(&self) -> bool {
        self.sim.time() + self.config.dt * 0.5 >= self.config.max_seconds
    }

    /// Advance one step and fold its events into the metrics.
    pub fn step(&mut self) -> TickEvents {
        let events = self.sim.tick(self.config.dt);
        self.metrics.record_tick(&events);
        self.metrics.record_snapshot(&self.sim);
        events
    }

    /// Run to the end, streaming telemetry and a final summary to `out`.
    pub fn run<W: Write>(mut self, out: &mut W) -> Result<GameMetrics, RunnerError> {
        tracing::info!(
            scenario = %self.metrics.scenario,
            dt = self.config.dt,
            max_seconds = self.config.max_seconds,
            "Starting match"
        );

        while !self.is_finished() {
            self.step();

            let tick = self.sim.get_tick();
            if self.config.report_every > 0 && tick % self.config.report_every == 0 {
                out.write_all(OutputLine::Telemetry(self.sim.telemetry()).to_json_line()?.as_bytes())?;
            }
        }

        let timed_out = self.sim.outcome() == GameOutcome::InProgress;
        self.metrics.finalize(&self.sim, timed_out);
        out.write_all(OutputLine::Summary(self.metrics.clone()).to_json_line()?.as_bytes())?;
        out.flush()?;

        tracing::info!(
            winner = ?self.metrics.winner,
            reason = ?self.metrics.end_reason,
            seconds = self.metrics.duration_seconds,
            "Match finished"
        );
        Ok(self.metrics)
    }
}

/// Throughput measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Ticks run.
    pub ticks: u64,
    /// Simulated seconds.
    pub simulated_seconds: f32,
    /// Wall-clock seconds.
    pub wall_seconds: f64,
    /// Ticks per wall-clock second.
    pub ticks_per_second: f64,
}

/// Run `scenario` for `seconds` of simulated time, ignoring the outcome.
pub fn bench(scenario: &Scenario, seconds: f32) -> Result<BenchReport, RunnerError> {
    if !(scenario.dt.is_finite() && scenario.dt > 0.0) {
        return Err(RunnerError::InvalidTimeStep(scenario.dt));
    }

    let mut sim = scenario.build_simulation();
    let start = Instant::now();
    while sim.time() + scenario.dt * 0.5 < seconds {
        sim.tick(scenario.dt);
    }
    let wall_seconds = start.elapsed().as_secs_f64();

    let ticks = sim.get_tick();
    let ticks_per_second = if wall_seconds > 0.0 {
        ticks as f64 / wall_seconds
    } else {
        f64::INFINITY
    };
    tracing::info!(ticks, wall_seconds, ticks_per_second, "Benchmark finished");

    Ok(BenchReport {
        ticks,
        simulated_seconds: sim.time(),
        wall_seconds,
        ticks_per_second,
    })
}
