//! Homing projectiles fired by Heavy and Drone ships and by turrets.

use serde::{Deserialize, Serialize};

use crate::combat::WorldView;
use crate::components::{EntityId, UnitClass};
use crate::config::ProjectileConfig;
use crate::factions::Faction;
use crate::math::Vec2;

/// Projectile component.
///
/// Damage is fixed at launch from the shooter and target classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Entity that fired this projectile.
    pub source: EntityId,
    /// Class the damage was computed for.
    pub shooter_class: Option<UnitClass>,
    /// Faction of the shooter.
    pub faction: Faction,
    /// Target entity.
    pub target: EntityId,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Damage applied on arrival.
    pub damage: f32,
    /// Arrival distance.
    pub hit_epsilon: f32,
}

/// What happened to a projectile this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    /// Still travelling, now at this position.
    InFlight(Vec2),
    /// Reached the target. Apply damage and despawn.
    Hit {
        /// Target entity.
        target: EntityId,
        /// Damage to apply.
        damage: f32,
    },
    /// Target is gone. Despawn without effect.
    Fizzled,
}

impl Projectile {
    /// Create a projectile with configured flight characteristics.
    #[must_use]
    pub const fn new(
        source: EntityId,
        shooter_class: Option<UnitClass>,
        faction: Faction,
        target: EntityId,
        damage: f32,
        config: &ProjectileConfig,
    ) -> Self {
        Self {
            source,
            shooter_class,
            faction,
            target,
            speed: config.speed,
            damage,
            hit_epsilon: config.hit_epsilon,
        }
    }

    /// Advance from `position` by `dt` seconds.
    #[must_use]
    pub fn step(&self, position: Vec2, dt: f32, world: &dyn WorldView) -> ProjectileStep {
        let Some(target) = world.target_info(self.target) else {
            return ProjectileStep::Fizzled;
        };

        let next = position.move_towards(target.position, self.speed * dt.max(0.0));
        if next.distance(target.position) < self.hit_epsilon {
            ProjectileStep::Hit {
                target: self.target,
                damage: self.damage,
            }
        } else {
            ProjectileStep::InFlight(next)
        }
    }
}
