//! Test fixtures and helpers.
//!
//! Pre-built simulations and economies for consistent testing.

use skirmish_core::config::SimConfig;
use skirmish_core::economy::{RawResources, ResourceEconomy};
use skirmish_core::prelude::*;

/// Default configuration with every ship's move speed set to zero.
///
/// Ships placed inside each other's range stay put, which keeps fire
/// timing independent of orbit motion.
#[must_use]
pub fn stationary_config() -> SimConfig {
    let mut config = SimConfig::default();
    for class in UnitClass::ALL {
        config.units.get_mut(class).move_speed = 0.0;
    }
    config
}

/// Default configuration with no resource generation.
#[must_use]
pub fn starved_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.economy.starting = RawResources::ZERO;
    config.economy.rates = RawResources::ZERO;
    config
}

/// An economy that never generates anything.
#[must_use]
pub fn starved_economy() -> ResourceEconomy {
    ResourceEconomy::new(RawResources::ZERO, RawResources::ZERO)
}

/// An economy with the standard rates and the given stock.
#[must_use]
pub fn economy_with_components(components: ComponentStock) -> ResourceEconomy {
    ResourceEconomy::default().with_components(components)
}

/// Two stationary ships of opposing factions.
///
/// `first` is spawned first and therefore acts first in every phase.
#[derive(Debug, Clone)]
pub struct Duel {
    /// The simulation.
    pub sim: Simulation,
    /// The Player ship.
    pub first: EntityId,
    /// The Enemy ship.
    pub second: EntityId,
}

impl Duel {
    /// Face `first` (Player) off against `second` (Enemy), `distance` apart.
    #[must_use]
    pub fn new(first: UnitClass, second: UnitClass, distance: f32) -> Self {
        let mut sim = Simulation::new(stationary_config(), FactionRegistry::default());
        let a = sim.spawn_unit(first, Faction::Player, Vec2::ZERO);
        let b = sim.spawn_unit(second, Faction::Enemy, Vec2::new(distance, 0.0));
        tracing::debug!(%first, %second, distance, "Duel fixture ready");

        Self {
            sim,
            first: a,
            second: b,
        }
    }

    /// Current health of a ship, or `None` once it is removed.
    #[must_use]
    pub fn health(&self, id: EntityId) -> Option<f32> {
        self.sim
            .get_entity(id)
            .and_then(|e| e.health)
            .map(|h| h.current)
    }
}

/// A default skirmish with both opening layouts placed.
#[must_use]
pub fn opening_skirmish() -> Simulation {
    let mut sim = Simulation::default();
    sim.place_opening_structures();
    sim
}

/// Run `ticks` steps of `dt`, collecting every event batch.
pub fn run_ticks(sim: &mut Simulation, ticks: usize, dt: f32) -> Vec<TickEvents> {
    (0..ticks).map(|_| sim.tick(dt)).collect()
}
