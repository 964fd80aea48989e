//! Repeatability testing utilities.
//!
//! The simulation processes entities in sorted id order and never reads
//! system randomness, so two runs from the same setup must produce the
//! same telemetry. This harness checks that.

use skirmish_core::simulation::{Simulation, Telemetry};

/// Result of a repeatability check.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatabilityResult {
    /// Whether every run ended in the same state.
    pub is_repeatable: bool,
    /// Final telemetry of each run.
    pub snapshots: Vec<Telemetry>,
    /// Number of ticks simulated per run.
    pub ticks: u64,
}

impl RepeatabilityResult {
    /// Assert that all runs matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if any two runs ended in different states.
    pub fn assert_repeatable(&self) {
        if !self.is_repeatable {
            let first_mismatch = self
                .snapshots
                .windows(2)
                .position(|w| w[0] != w[1])
                .unwrap_or_default();
            panic!(
                "Simulation runs diverged!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 First mismatch after run {}",
                self.snapshots.len(),
                self.ticks,
                first_mismatch
            );
        }
    }
}

/// Run a simulation several times from the same setup and compare.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `dt` - Step length in seconds
/// * `setup` - Function to create the initial simulation
pub fn verify_repeatable<F>(runs: usize, ticks: u64, dt: f32, setup: F) -> RepeatabilityResult
where
    F: Fn() -> Simulation,
{
    let snapshots: Vec<Telemetry> = (0..runs)
        .map(|_| {
            let mut sim = setup();
            for _ in 0..ticks {
                sim.tick(dt);
            }
            sim.telemetry()
        })
        .collect();

    let is_repeatable = snapshots.windows(2).all(|w| w[0] == w[1]);

    RepeatabilityResult {
        is_repeatable,
        snapshots,
        ticks,
    }
}
