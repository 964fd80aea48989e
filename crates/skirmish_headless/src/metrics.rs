//! Match metrics collected from tick events.

use serde::{Deserialize, Serialize};
use skirmish_core::economy::ClassCounts;
use skirmish_core::factions::FactionMap;
use skirmish_core::prelude::*;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Still running.
    #[default]
    InProgress,
    /// One side was eliminated.
    Elimination,
    /// Both sides were eliminated in the same step.
    Draw,
    /// The time limit ran out.
    TimeLimit,
}

/// Metrics for a single faction in a match.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactionMetrics {
    /// Ships produced by class.
    pub units_produced: ClassCounts,
    /// Ships lost by class.
    pub units_lost: ClassCounts,
    /// Structures placed after the start.
    pub structures_placed: u32,
    /// Turrets lost.
    pub turrets_lost: u32,
    /// Total damage dealt.
    pub damage_dealt: f64,
    /// Total damage taken.
    pub damage_taken: f64,
    /// Build requests lost to a full queue.
    pub builds_dropped: u32,
    /// Most ships alive at once.
    pub peak_army_size: u32,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Winning faction (None = draw or unfinished).
    pub winner: Option<Faction>,
    /// How the match ended.
    pub end_reason: EndReason,
    /// Simulated seconds.
    pub duration_seconds: f32,
    /// Ticks run.
    pub ticks: u64,
    /// Per-faction metrics.
    pub factions: FactionMap<FactionMetrics>,
}

impl GameMetrics {
    /// Create empty metrics for a scenario.
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            ..Default::default()
        }
    }

    /// Fold one tick's events into the totals.
    pub fn record_tick(&mut self, events: &TickEvents) {
        for spawn in &events.spawned {
            self.factions[spawn.faction]
                .units_produced
                .increment(spawn.class);
        }

        for death in &events.deaths {
            let metrics = &mut self.factions[death.faction];
            match (death.kind, death.class) {
                (EntityKind::Unit, Some(class)) => metrics.units_lost.increment(class),
                (EntityKind::Turret, _) => metrics.turrets_lost += 1,
                _ => {}
            }
        }

        for hit in &events.damage {
            let amount = f64::from(hit.amount);
            self.factions[hit.attacker_faction].damage_dealt += amount;
            self.factions[hit.attacker_faction.opponent()].damage_taken += amount;
        }

        for (_, placement) in &events.placed {
            self.factions[placement.faction].structures_placed += 1;
        }

        for dropped in &events.dropped_builds {
            self.factions[dropped.faction].builds_dropped += 1;
        }
    }

    /// Track army sizes from a snapshot.
    pub fn record_snapshot(&mut self, sim: &Simulation) {
        for faction in Faction::ALL {
            let live = sim.economy(faction).live_units();
            let metrics = &mut self.factions[faction];
            metrics.peak_army_size = metrics.peak_army_size.max(live);
        }
    }

    /// Finalize the match.
    pub fn finalize(&mut self, sim: &Simulation, timed_out: bool) {
        self.duration_seconds = sim.time();
        self.ticks = sim.get_tick();
        (self.winner, self.end_reason) = match sim.outcome() {
            GameOutcome::Victory(faction) => (Some(faction), EndReason::Elimination),
            GameOutcome::Draw => (None, EndReason::Draw),
            GameOutcome::InProgress if timed_out => (None, EndReason::TimeLimit),
            GameOutcome::InProgress => (None, EndReason::InProgress),
        };
    }
}
