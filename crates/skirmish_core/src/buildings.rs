//! Static structures: shipyards and defense turrets.
//!
//! Shipyards request builds on a timer and leave payment and spawning to
//! the production queue. Turrets scan for the nearest hostile ship and
//! fire homing projectiles at it.

use serde::{Deserialize, Serialize};

use crate::combat::{damage_for, nearest_hostile, WorldView};
use crate::components::{EntityId, EntityKind, UnitClass};
use crate::config::{ShipyardConfig, TurretConfig};
use crate::factions::Faction;
use crate::math::{approx_ge, approx_le, Vec2};
use crate::spatial::SpatialQuery;

/// Kinds of structure the placement layer can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// A shipyard building ships of one class.
    Shipyard(UnitClass),
    /// A defense turret.
    Turret,
}

/// A request to create a structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// What to build.
    pub structure: StructureKind,
    /// Owner.
    pub faction: Faction,
    /// World position.
    pub position: Vec2,
}

/// Shipyard component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shipyard {
    /// Class of ship built here.
    pub class: UnitClass,
    /// Seconds between build requests.
    pub build_cooldown: f32,
    build_timer: f32,
}

impl Shipyard {
    /// Create a shipyard with an empty build timer.
    #[must_use]
    pub const fn new(class: UnitClass, config: &ShipyardConfig) -> Self {
        Self {
            class,
            build_cooldown: config.build_cooldown,
            build_timer: 0.0,
        }
    }

    /// Seconds accumulated toward the next request.
    #[must_use]
    pub const fn build_timer(&self) -> f32 {
        self.build_timer
    }

    /// Advance the build timer.
    ///
    /// Returns `true` when the cooldown elapsed and a build request is due.
    /// The timer restarts from zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.build_timer += dt.max(0.0);
        if approx_ge(self.build_timer, self.build_cooldown) {
            self.build_timer = 0.0;
            true
        } else {
            false
        }
    }
}

/// Defense turret component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseTurret {
    /// Scan and firing radius.
    pub range: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Contribution to an attacker's orbit radius.
    pub orbit_range: f32,
    fire_timer: f32,
    target: Option<EntityId>,
}

/// A turret shot, to be turned into a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretShot {
    /// Target ship.
    pub target: EntityId,
    /// Precomputed damage.
    pub damage: f32,
}

impl DefenseTurret {
    /// Class turret shots are scored as.
    pub const SHOOTER_CLASS: UnitClass = UnitClass::Heavy;

    /// Create a turret ready to fire on first acquisition.
    #[must_use]
    pub const fn new(config: &TurretConfig) -> Self {
        Self {
            range: config.range,
            fire_cooldown: config.fire_cooldown,
            orbit_range: config.orbit_range,
            fire_timer: 0.0,
            target: None,
        }
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Advance the turret by `dt` seconds.
    ///
    /// Rescans when the current target is dead, gone or out of range, then
    /// fires if the timer has run out.
    pub fn tick(
        &mut self,
        position: Vec2,
        faction: Faction,
        dt: f32,
        world: &dyn WorldView,
        spatial: &dyn SpatialQuery,
    ) -> Option<TurretShot> {
        self.fire_timer = (self.fire_timer - dt.max(0.0)).max(0.0);

        let current = self
            .target
            .and_then(|id| world.target_info(id))
            .filter(|info| position.distance(info.position) <= self.range);

        let target = match current {
            Some(info) => Some(info),
            None => {
                let found = nearest_hostile(
                    world,
                    spatial,
                    position,
                    faction,
                    self.range,
                    EntityKind::Unit,
                );
                let new_id = found.map(|info| info.id);
                if new_id != self.target {
                    tracing::debug!(
                        %faction,
                        previous = ?self.target,
                        target = ?new_id,
                        "Turret target changed"
                    );
                }
                self.target = new_id;
                found
            }
        }?;

        if !approx_le(self.fire_timer, 0.0) {
            return None;
        }

        self.fire_timer = self.fire_cooldown;
        Some(TurretShot {
            target: target.id,
            damage: damage_for(Some(Self::SHOOTER_CLASS), target.defender_class()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::TargetInfo;
    use crate::spatial::{SpatialEntry, SpatialGrid};

    struct Ships {
        ships: Vec<TargetInfo>,
        grid: SpatialGrid,
    }

    impl Ships {
        fn new(ships: Vec<TargetInfo>) -> Self {
            let mut grid = SpatialGrid::default();
            for s in &ships {
                grid.insert(SpatialEntry {
                    id: s.id,
                    faction: s.faction,
                    kind: s.kind,
                    position: s.position,
                });
            }
            Self { ships, grid }
        }
    }

    impl WorldView for Ships {
        fn target_info(&self, id: EntityId) -> Option<TargetInfo> {
            self.ships.iter().find(|s| s.id == id).copied()
        }
    }

    fn ship(id: EntityId, faction: Faction, class: UnitClass, x: f32) -> TargetInfo {
        TargetInfo {
            id,
            faction,
            kind: EntityKind::Unit,
            class: Some(class),
            position: Vec2::new(x, 0.0),
            orbit_range: 0.6,
        }
    }

    #[test]
    fn test_shipyard_requests_on_cooldown_only() {
        let mut yard = Shipyard::new(UnitClass::Light, &ShipyardConfig::default());
        let requests = (0..100).filter(|_| yard.tick(0.05)).count();
        assert_eq!(requests, 1);
        assert!(yard.build_timer() < 0.05);
    }

    #[test]
    fn test_turret_fires_immediately_then_waits() {
        let world = Ships::new(vec![ship(1, Faction::Enemy, UnitClass::Drone, 2.0)]);
        let mut turret = DefenseTurret::new(&TurretConfig::default());

        let shot = turret
            .tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid)
            .unwrap();
        assert_eq!(shot.target, 1);
        // Heavy against Drone
        assert_eq!(shot.damage, 30.0);

        for _ in 0..19 {
            assert!(turret
                .tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid)
                .is_none());
        }
        assert!(turret
            .tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid)
            .is_some());
    }

    #[test]
    fn test_turret_picks_nearest_hostile_in_range() {
        let world = Ships::new(vec![
            ship(1, Faction::Player, UnitClass::Light, 0.5),
            ship(2, Faction::Enemy, UnitClass::Light, 3.0),
            ship(3, Faction::Enemy, UnitClass::Heavy, 1.0),
            ship(4, Faction::Enemy, UnitClass::Light, 5.0),
        ]);
        let mut turret = DefenseTurret::new(&TurretConfig::default());

        let shot = turret
            .tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid)
            .unwrap();
        assert_eq!(shot.target, 3);
        assert_eq!(shot.damage, 15.0);
    }

    #[test]
    fn test_turret_rescans_when_target_leaves_range() {
        let mut turret = DefenseTurret::new(&TurretConfig::default());
        let world = Ships::new(vec![
            ship(1, Faction::Enemy, UnitClass::Light, 1.0),
            ship(2, Faction::Enemy, UnitClass::Light, 3.0),
        ]);
        turret.tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid);
        assert_eq!(turret.target(), Some(1));

        let world = Ships::new(vec![
            ship(1, Faction::Enemy, UnitClass::Light, 10.0),
            ship(2, Faction::Enemy, UnitClass::Light, 3.0),
        ]);
        turret.tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid);
        assert_eq!(turret.target(), Some(2));

        let world = Ships::new(vec![
            ship(1, Faction::Enemy, UnitClass::Light, 10.0),
            ship(2, Faction::Enemy, UnitClass::Light, 4.0),
        ]);
        turret.tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid);
        assert_eq!(turret.target(), None);
    }

    #[test]
    fn test_turret_idle_without_targets() {
        let world = Ships::new(vec![ship(1, Faction::Enemy, UnitClass::Light, 10.0)]);
        let mut turret = DefenseTurret::new(&TurretConfig::default());

        assert!(turret
            .tick(Vec2::ZERO, Faction::Player, 0.1, &world, &world.grid)
            .is_none());
        assert_eq!(turret.target(), None);
    }
}
