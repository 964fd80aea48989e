//! Scenario loading and configuration.
//!
//! Scenarios define the initial state of a headless match: planet
//! positions, starting structures and ships, optional rule overrides and
//! how long to run.

use std::path::Path;
use std::result::Result;

use serde::{Deserialize, Serialize};
use skirmish_core::buildings::Placement;
use skirmish_core::config::SimConfig;
use skirmish_core::error::GameError;
use skirmish_core::prelude::*;
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to parse a rules file.
    #[error("Failed to load config: {0}")]
    ConfigError(#[from] GameError),
}

/// Both home planets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetSetup {
    /// Player home.
    pub player: Planet,
    /// Enemy home.
    pub enemy: Planet,
}

impl Default for PlanetSetup {
    fn default() -> Self {
        let registry = FactionRegistry::default();
        Self {
            player: *registry.planet(Faction::Player),
            enemy: *registry.planet(Faction::Enemy),
        }
    }
}

impl PlanetSetup {
    /// Build the simulation's planet registry.
    #[must_use]
    pub const fn registry(&self) -> FactionRegistry {
        FactionRegistry::new(self.player, self.enemy)
    }
}

/// Ships present at scenario start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipPlacement {
    /// Hull class.
    pub class: UnitClass,
    /// Owner.
    pub faction: Faction,
    /// Position of the first ship.
    pub position: Vec2,
    /// Number of ships, stacked along +y at 0.5 spacing.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_time_limit() -> f32 {
    600.0
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Home planets.
    #[serde(default)]
    pub planets: PlanetSetup,
    /// Rule overrides. `None` uses the defaults.
    #[serde(default)]
    pub config: Option<SimConfig>,
    /// Place the standard opening shipyards and turret for both sides.
    #[serde(default)]
    pub opening_layout: bool,
    /// Additional structures.
    #[serde(default)]
    pub structures: Vec<Placement>,
    /// Starting ships.
    #[serde(default)]
    pub ships: Vec<ShipPlacement>,
    /// Run the enemy structure AI.
    #[serde(default)]
    pub enemy_ai: bool,
    /// Step length in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Simulated seconds before the match is called.
    #[serde(default = "default_time_limit")]
    pub time_limit: f32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish_1v1()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        tracing::info!(name = %scenario.name, path = %path.display(), "Loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The standard 1v1 skirmish: opening layouts and the enemy AI.
    #[must_use]
    pub fn skirmish_1v1() -> Self {
        Self {
            name: "Standard 1v1 Skirmish".to_string(),
            description: "Opening layouts on both planets, enemy structure AI enabled".to_string(),
            planets: PlanetSetup::default(),
            config: None,
            opening_layout: true,
            structures: Vec::new(),
            ships: Vec::new(),
            enemy_ai: true,
            dt: default_dt(),
            time_limit: default_time_limit(),
        }
    }

    /// Replace the rules this scenario runs with.
    #[must_use]
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the initial simulation.
    #[must_use]
    pub fn build_simulation(&self) -> Simulation {
        let config = self.config.clone().unwrap_or_default();
        let mut sim = Simulation::new(config, self.planets.registry());
        if self.enemy_ai {
            sim = sim.with_enemy_ai();
        }

        if self.opening_layout {
            sim.place_opening_structures();
        }
        for placement in &self.structures {
            sim.place(*placement);
        }
        for ships in &self.ships {
            for i in 0..ships.count {
                let offset = Vec2::new(0.0, 0.5 * i as f32);
                sim.spawn_unit(ships.class, ships.faction, ships.position + offset);
            }
        }

        tracing::debug!(
            name = %self.name,
            entities = sim.entities().len(),
            enemy_ai = self.enemy_ai,
            "Scenario simulation built"
        );
        sim
    }
}

/// Load a rules file from disk.
///
/// Missing fields keep their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config = SimConfig::from_ron_named(&contents, &path.display().to_string())?;
    Ok(config)
}
