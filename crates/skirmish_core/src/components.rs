//! Component definitions.
//!
//! Components are plain data. Behavior lives in the controller modules
//! ([`crate::combat`], [`crate::movement`], [`crate::state_machine`]) and
//! in the phase functions of [`crate::simulation`].

use serde::{Deserialize, Serialize};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Hull class shared by ships and the shipyards that build them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitClass {
    /// Fast hitscan skirmisher. Hard counter to Heavy.
    Light,
    /// Armored projectile gunship. Hard counter to Drone.
    Heavy,
    /// Projectile swarm craft. Hard counter to Light.
    Drone,
}

impl UnitClass {
    /// All classes in table order.
    pub const ALL: [UnitClass; 3] = [UnitClass::Light, UnitClass::Heavy, UnitClass::Drone];

    /// The class this one deals bonus damage to.
    #[must_use]
    pub const fn hard_counter(self) -> Self {
        match self {
            Self::Light => Self::Heavy,
            Self::Heavy => Self::Drone,
            Self::Drone => Self::Light,
        }
    }

    /// Get the short name for this class.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Heavy => "heavy",
            Self::Drone => "drone",
        }
    }
}

impl std::fmt::Display for UnitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Coarse entity category, as reported by spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A ship.
    Unit,
    /// A defense turret.
    Turret,
    /// A shipyard.
    Shipyard,
    /// A projectile in flight.
    Projectile,
}

/// How a weapon delivers damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Damage lands the instant the shot is fired.
    Hitscan,
    /// A homing projectile carries the damage to the target.
    Projectile,
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: f32,
    /// Maximum health points.
    pub max: f32,
}

impl Health {
    /// Create a new health component at full health.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, returning the amount actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current -= amount.max(0.0);
        before - self.current
    }

    /// Check if health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Remaining health as a fraction of maximum.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).max(0.0)
        }
    }
}

/// Identity of a ship. The owner is the entity's faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Hull class.
    pub class: UnitClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_counters_form_a_cycle() {
        for class in UnitClass::ALL {
            assert_ne!(class.hard_counter(), class);
            assert_eq!(
                class.hard_counter().hard_counter().hard_counter(),
                class
            );
        }
    }

    #[test]
    fn test_health_damage_and_death() {
        let mut health = Health::new(50.0);
        assert_eq!(health.apply_damage(25.0), 25.0);
        assert!(!health.is_dead());
        assert_eq!(health.fraction(), 0.5);

        health.apply_damage(25.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_negative_damage_is_ignored() {
        let mut health = Health::new(10.0);
        health.apply_damage(-5.0);
        assert_eq!(health.current, 10.0);
    }
}
