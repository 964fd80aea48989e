//! Tunable simulation constants.
//!
//! Every number the simulation uses lives in [`SimConfig`]. The defaults
//! reproduce the standard skirmish rules; RON overrides may replace any
//! subset of fields.
//!
//! # Example RON
//!
//! ```ron
//! (
//!     shipyard: (build_cooldown: 2.5),
//!     production: (capacity: 20, builds_per_tick: 1),
//! )
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::components::{UnitClass, WeaponKind};
use crate::economy::{RawResources, Recipe, ResourceEconomy};
use crate::error::{GameError, Result};

/// Root configuration for a simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Economy start state, rates and recipes.
    pub economy: EconomyConfig,
    /// Per-class ship statistics.
    pub units: UnitStatsTable,
    /// Defense turret statistics.
    pub turret: TurretConfig,
    /// Shipyard timing.
    pub shipyard: ShipyardConfig,
    /// Projectile flight.
    pub projectile: ProjectileConfig,
    /// Build queue limits.
    pub production: ProductionConfig,
    /// Orbit and stand-off geometry.
    pub orbit: OrbitConfig,
    /// Enemy structure placement cadence.
    pub enemy_ai: EnemyAiConfig,
}

/// Class stats as written in a config file. Unlisted fields keep the
/// class standard.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct PartialStats {
    #[serde(default, deserialize_with = "listed")]
    max_health: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    fire_cooldown: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    move_speed: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    detection_range: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    attack_range: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    orbit_range: Option<f32>,
    #[serde(default, deserialize_with = "listed")]
    weapon: Option<WeaponKind>,
}

/// A field that is present is written bare, not as `Some(..)`.
fn listed<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PartialStats {
    fn over(self, base: UnitStats) -> UnitStats {
        UnitStats {
            max_health: self.max_health.unwrap_or(base.max_health),
            fire_cooldown: self.fire_cooldown.unwrap_or(base.fire_cooldown),
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            detection_range: self.detection_range.unwrap_or(base.detection_range),
            attack_range: self.attack_range.unwrap_or(base.attack_range),
            orbit_range: self.orbit_range.unwrap_or(base.orbit_range),
            weapon: self.weapon.unwrap_or(base.weapon),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct PartialStatsTable {
    light: PartialStats,
    heavy: PartialStats,
    drone: PartialStats,
}

impl From<PartialStatsTable> for UnitStatsTable {
    fn from(partial: PartialStatsTable) -> Self {
        Self {
            light: partial.light.over(UnitStats::standard(UnitClass::Light)),
            heavy: partial.heavy.over(UnitStats::standard(UnitClass::Heavy)),
            drone: partial.drone.over(UnitStats::standard(UnitClass::Drone)),
        }
    }
}

impl SimConfig {
    /// Parse a configuration from RON text.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Self::from_ron_named(source, "<inline>")
    }

    /// Parse RON text, naming `origin` in any error.
    pub fn from_ron_named(source: &str, origin: &str) -> Result<Self> {
        ron::from_str(source).map_err(|err| GameError::ConfigParse {
            path: origin.to_string(),
            message: err.to_string(),
        })
    }

    /// Stats for a ship class.
    #[must_use]
    pub fn unit_stats(&self, class: UnitClass) -> &UnitStats {
        self.units.get(class)
    }

    /// A fresh economy built from the configured start state.
    #[must_use]
    pub fn new_economy(&self) -> ResourceEconomy {
        ResourceEconomy::new(self.economy.starting, self.economy.rates)
            .with_recipes(self.economy.recipes.clone())
    }
}

/// Economy start state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Raw resources each faction starts with.
    pub starting: RawResources,
    /// Generation rates per second.
    pub rates: RawResources,
    /// Crafting recipes in the order they are attempted.
    pub recipes: Vec<Recipe>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting: RawResources::ZERO,
            rates: ResourceEconomy::DEFAULT_RATES,
            recipes: Recipe::standard(),
        }
    }
}

/// Combat and movement statistics of one ship class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Maximum (and starting) hit points.
    pub max_health: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Travel speed in world units per second.
    pub move_speed: f32,
    /// Radius within which targets are acquired.
    pub detection_range: f32,
    /// Radius within which the ship holds and fires.
    pub attack_range: f32,
    /// This ship's contribution to an orbit radius.
    pub orbit_range: f32,
    /// Damage delivery.
    pub weapon: WeaponKind,
}

impl UnitStats {
    /// Standard statistics for a class.
    #[must_use]
    pub const fn standard(class: UnitClass) -> Self {
        let (max_health, fire_cooldown, weapon) = match class {
            UnitClass::Light => (50.0, 1.0, WeaponKind::Hitscan),
            UnitClass::Heavy => (150.0, 1.5, WeaponKind::Projectile),
            UnitClass::Drone => (100.0, 2.0, WeaponKind::Projectile),
        };

        Self {
            max_health,
            fire_cooldown,
            move_speed: 2.0,
            detection_range: 4.0,
            attack_range: 2.0,
            orbit_range: 0.6,
            weapon,
        }
    }
}

/// Per-class stats lookup.
///
/// Deserializing merges each class's listed fields over
/// [`UnitStats::standard`], so overrides may name any subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialStatsTable")]
pub struct UnitStatsTable {
    /// Light class.
    pub light: UnitStats,
    /// Heavy class.
    pub heavy: UnitStats,
    /// Drone class.
    pub drone: UnitStats,
}

impl UnitStatsTable {
    /// Stats for a class.
    #[must_use]
    pub const fn get(&self, class: UnitClass) -> &UnitStats {
        match class {
            UnitClass::Light => &self.light,
            UnitClass::Heavy => &self.heavy,
            UnitClass::Drone => &self.drone,
        }
    }

    /// Mutable stats for a class.
    pub fn get_mut(&mut self, class: UnitClass) -> &mut UnitStats {
        match class {
            UnitClass::Light => &mut self.light,
            UnitClass::Heavy => &mut self.heavy,
            UnitClass::Drone => &mut self.drone,
        }
    }
}

impl Default for UnitStatsTable {
    fn default() -> Self {
        Self {
            light: UnitStats::standard(UnitClass::Light),
            heavy: UnitStats::standard(UnitClass::Heavy),
            drone: UnitStats::standard(UnitClass::Drone),
        }
    }
}

/// Defense turret statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Hit points.
    pub max_health: f32,
    /// Scan and firing radius.
    pub range: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Contribution to an attacker's orbit radius.
    pub orbit_range: f32,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            range: 3.5,
            fire_cooldown: 2.0,
            orbit_range: 0.6,
        }
    }
}

/// Shipyard timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipyardConfig {
    /// Seconds between build requests.
    pub build_cooldown: f32,
}

impl Default for ShipyardConfig {
    fn default() -> Self {
        Self {
            build_cooldown: 5.0,
        }
    }
}

/// Projectile flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Arrival distance.
    pub hit_epsilon: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            hit_epsilon: 0.1,
        }
    }
}

/// Build queue limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Maximum pending requests per faction.
    pub capacity: usize,
    /// Maximum successful builds per faction per tick.
    pub builds_per_tick: usize,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            builds_per_tick: 3,
        }
    }
}

/// Orbit and stand-off geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Orbit angle advance in radians per second.
    pub angular_speed: f32,
    /// Orbit radius as a fraction of the combined orbit ranges.
    pub radius_factor: f32,
    /// Stand-off distance as a fraction of attack range.
    pub standoff_factor: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            angular_speed: 1.5,
            radius_factor: 0.8,
            standoff_factor: 0.8,
        }
    }
}

/// Enemy structure placement cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyAiConfig {
    /// Seconds between placements.
    pub build_interval: f32,
    /// Closest placement to the home planet.
    pub min_distance: f32,
    /// Farthest placement from the home planet.
    pub max_distance: f32,
}

impl Default for EnemyAiConfig {
    fn default() -> Self {
        Self {
            build_interval: 10.0,
            min_distance: 1.5,
            max_distance: 3.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_rules() {
        let config = SimConfig::default();

        assert_eq!(config.unit_stats(UnitClass::Light).max_health, 50.0);
        assert_eq!(config.unit_stats(UnitClass::Heavy).fire_cooldown, 1.5);
        assert_eq!(
            config.unit_stats(UnitClass::Drone).weapon,
            WeaponKind::Projectile
        );
        assert_eq!(config.turret.range, 3.5);
        assert_eq!(config.production.capacity, 50);
        assert_eq!(config.production.builds_per_tick, 3);
        assert_eq!(config.shipyard.build_cooldown, 5.0);
    }

    #[test]
    fn test_partial_ron_override() {
        let config = SimConfig::from_ron_str(
            "(shipyard: (build_cooldown: 2.5), production: (capacity: 20))",
        )
        .unwrap();

        assert_eq!(config.shipyard.build_cooldown, 2.5);
        assert_eq!(config.production.capacity, 20);
        assert_eq!(config.production.builds_per_tick, 3);
        assert_eq!(config.turret, TurretConfig::default());
    }

    #[test]
    fn test_partial_unit_stats_keep_class_standard() {
        let config = SimConfig::from_ron_str(
            "(units: (light: (move_speed: 0.0), drone: (weapon: Hitscan, max_health: 80.0)))",
        )
        .unwrap();

        let light = config.unit_stats(UnitClass::Light);
        assert_eq!(light.move_speed, 0.0);
        assert_eq!(light.max_health, 50.0);
        assert_eq!(light.fire_cooldown, 1.0);

        let drone = config.unit_stats(UnitClass::Drone);
        assert_eq!(drone.weapon, WeaponKind::Hitscan);
        assert_eq!(drone.max_health, 80.0);
        assert_eq!(drone.fire_cooldown, 2.0);

        assert_eq!(
            *config.unit_stats(UnitClass::Heavy),
            UnitStats::standard(UnitClass::Heavy)
        );
    }

    #[test]
    fn test_full_config_survives_ron_round_trip() {
        let mut config = SimConfig::default();
        config.units.heavy.attack_range = 3.0;

        let text = ron::to_string(&config).unwrap();
        assert_eq!(SimConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = SimConfig::from_ron_named("(shipyard: nope)", "broken.ron").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { ref path, .. } if path == "broken.ron"));
    }

    #[test]
    fn test_new_economy_uses_configured_rates() {
        let mut config = SimConfig::default();
        config.economy.rates = RawResources::new(1.0, 0.0, 0.0, 0.0);

        let economy = config.new_economy();
        assert_eq!(economy.rates.iron, 1.0);
        assert_eq!(economy.recipes.len(), 3);
    }
}
