//! Ship combat: target acquisition, positioning and firing.
//!
//! Each tick a ship's [`UnitCombat`] part:
//!
//! 1. Re-validates its current target against the live world and
//!    rescans when the target is gone or beyond detection range.
//!    Hostile turrets always win over hostile ships; within a group the
//!    nearest wins.
//! 2. Approaches a stand-off point while the target is beyond attack
//!    range.
//! 3. Inside attack range, enters `Attacking`, circles the pair's
//!    midpoint and fires whenever its cooldown timer runs out.
//!
//! Targets are held by id only. Nothing about a target is cached across
//! ticks.

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, EntityKind, UnitClass, WeaponKind};
use crate::config::{OrbitConfig, UnitStats};
use crate::factions::Faction;
use crate::math::{approx_le, Vec2};
use crate::movement::{MoveTarget, UnitMovement};
use crate::spatial::SpatialQuery;
use crate::state_machine::{StateTransition, TransitionCause, UnitState, UnitStateMachine};

/// Damage dealt when the shooter's class is unknown.
pub const UNKNOWN_SHOOTER_DAMAGE: f32 = 10.0;

/// Damage one shot deals.
///
/// Each class deals its high value against its hard counter and its base
/// value against everything else:
///
/// | attacker \ defender | Light | Heavy | Drone |
/// |---|---|---|---|
/// | Light | 10 | 25 | 10 |
/// | Heavy | 15 | 15 | 30 |
/// | Drone | 35 | 15 | 15 |
#[must_use]
pub fn damage_for(shooter: Option<UnitClass>, defender: UnitClass) -> f32 {
    let Some(shooter) = shooter else {
        return UNKNOWN_SHOOTER_DAMAGE;
    };

    let (base, counter) = match shooter {
        UnitClass::Light => (10.0, 25.0),
        UnitClass::Heavy => (15.0, 30.0),
        UnitClass::Drone => (15.0, 35.0),
    };

    if shooter.hard_counter() == defender {
        counter
    } else {
        base
    }
}

/// Live facts about a potential target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    /// Entity id.
    pub id: EntityId,
    /// Owning faction.
    pub faction: Faction,
    /// Ship or turret.
    pub kind: EntityKind,
    /// Hull class, for ships.
    pub class: Option<UnitClass>,
    /// Current position.
    pub position: Vec2,
    /// Contribution to an attacker's orbit radius.
    pub orbit_range: f32,
}

impl TargetInfo {
    /// Class used to look up incoming damage. Turrets count as Heavy.
    #[must_use]
    pub fn defender_class(&self) -> UnitClass {
        self.class.unwrap_or(UnitClass::Heavy)
    }
}

/// Read access to live, targetable entities.
pub trait WorldView {
    /// Facts about `id`, or `None` if it is gone, dead or untargetable.
    fn target_info(&self, id: EntityId) -> Option<TargetInfo>;
}

/// A shot fired this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// Target entity.
    pub target: EntityId,
    /// Damage carried.
    pub damage: f32,
    /// Delivery.
    pub weapon: WeaponKind,
}

/// Everything a combat tick needs to know about its surroundings.
pub struct CombatContext<'a> {
    /// The ship's own id.
    pub id: EntityId,
    /// The ship's faction.
    pub faction: Faction,
    /// The ship's class.
    pub class: UnitClass,
    /// The ship's position.
    pub position: Vec2,
    /// Seconds elapsed.
    pub dt: f32,
    /// Orbit geometry.
    pub orbit: &'a OrbitConfig,
    /// Live entity lookup.
    pub world: &'a dyn WorldView,
    /// Radius queries.
    pub spatial: &'a dyn SpatialQuery,
}

/// Result of one combat tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatOutcome {
    /// State changes, in order.
    pub transitions: Vec<StateTransition>,
    /// Shot fired, if any.
    pub shot: Option<Shot>,
}

/// Combat part of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitCombat {
    /// Acquisition radius.
    pub detection_range: f32,
    /// Hold-and-fire radius.
    pub attack_range: f32,
    /// Contribution to orbit radii.
    pub orbit_range: f32,
    /// Seconds between shots.
    pub fire_cooldown: f32,
    /// Damage delivery.
    pub weapon: WeaponKind,
    target: Option<EntityId>,
    fire_timer: f32,
    orbit_angle: Option<f32>,
}

impl UnitCombat {
    /// Create a combat part from class stats.
    #[must_use]
    pub const fn from_stats(stats: &UnitStats) -> Self {
        Self {
            detection_range: stats.detection_range,
            attack_range: stats.attack_range,
            orbit_range: stats.orbit_range,
            fire_cooldown: stats.fire_cooldown,
            weapon: stats.weapon,
            target: None,
            fire_timer: 0.0,
            orbit_angle: None,
        }
    }

    /// Current target id.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Seconds until the next shot may fire.
    #[must_use]
    pub const fn fire_timer(&self) -> f32 {
        self.fire_timer
    }

    /// Drop the target and all attack-run state.
    pub fn clear(&mut self) {
        self.target = None;
        self.fire_timer = 0.0;
        self.orbit_angle = None;
    }

    /// Advance combat by one tick.
    ///
    /// Drives `fsm` between `Moving` and `Attacking` and points
    /// `movement` at the planet, a stand-off point or an orbit point.
    /// Does nothing unless the ship is `Moving` or `Attacking`.
    pub fn tick(
        &mut self,
        fsm: &mut UnitStateMachine,
        movement: &mut UnitMovement,
        ctx: &CombatContext<'_>,
    ) -> CombatOutcome {
        let mut outcome = CombatOutcome::default();
        if !matches!(fsm.state(), UnitState::Moving | UnitState::Attacking) {
            return outcome;
        }

        let target = self.validated_target(ctx).or_else(|| self.acquire(ctx));
        self.target = target.map(|t| t.id);

        let Some(target) = target else {
            self.leave_attack(fsm, movement, &mut outcome);
            movement.retarget_planet();
            return outcome;
        };

        let distance = ctx.position.distance(target.position);
        if distance > self.attack_range {
            if fsm.state() == UnitState::Attacking {
                self.leave_attack(fsm, movement, &mut outcome);
            } else {
                movement.set_target(MoveTarget::Point(self.standoff_point(ctx, &target)));
            }
            return outcome;
        }

        if let Some(transition) = fsm.set_state(UnitState::Attacking, TransitionCause::TargetInRange) {
            outcome.transitions.push(transition);
            self.fire_timer = self.fire_cooldown;
            self.orbit_angle = None;
        }

        movement.set_target(MoveTarget::Point(self.orbit_point(ctx, &target)));

        self.fire_timer -= ctx.dt;
        if approx_le(self.fire_timer, 0.0) {
            self.fire_timer += self.fire_cooldown;
            outcome.shot = Some(Shot {
                target: target.id,
                damage: damage_for(Some(ctx.class), target.defender_class()),
                weapon: self.weapon,
            });
        }

        outcome
    }

    fn validated_target(&self, ctx: &CombatContext<'_>) -> Option<TargetInfo> {
        let info = ctx.world.target_info(self.target?)?;
        let in_range = ctx.position.distance(info.position) <= self.detection_range;
        (in_range && ctx.faction.is_hostile_to(info.faction)).then_some(info)
    }

    fn acquire(&self, ctx: &CombatContext<'_>) -> Option<TargetInfo> {
        let search = |kind| {
            nearest_hostile(
                ctx.world,
                ctx.spatial,
                ctx.position,
                ctx.faction,
                self.detection_range,
                kind,
            )
        };
        search(EntityKind::Turret).or_else(|| search(EntityKind::Unit))
    }

    fn leave_attack(
        &mut self,
        fsm: &mut UnitStateMachine,
        movement: &mut UnitMovement,
        outcome: &mut CombatOutcome,
    ) {
        if fsm.state() != UnitState::Attacking {
            return;
        }
        if let Some(transition) = fsm.set_state(UnitState::Moving, TransitionCause::TargetLost) {
            outcome.transitions.push(transition);
        }
        self.clear();
        movement.retarget_planet();
    }

    fn standoff_point(&self, ctx: &CombatContext<'_>, target: &TargetInfo) -> Vec2 {
        let approach = (target.position - ctx.position).normalize_or_zero();
        target.position - approach * (self.attack_range * ctx.orbit.standoff_factor)
    }

    fn orbit_point(&mut self, ctx: &CombatContext<'_>, target: &TargetInfo) -> Vec2 {
        let center = ctx.position.midpoint(target.position);
        let radius = ctx.orbit.radius_factor * (self.orbit_range + target.orbit_range);
        let direction = match ctx.faction {
            Faction::Player => 1.0,
            Faction::Enemy => -1.0,
        };

        let offset = ctx.position - center;
        let start = self
            .orbit_angle
            .unwrap_or_else(|| offset.y.atan2(offset.x));
        let angle = start + direction * ctx.orbit.angular_speed * ctx.dt;
        self.orbit_angle = Some(angle);

        center + Vec2::from_angle(angle) * radius
    }
}

/// Nearest live hostile of `kind` within `radius` of `origin`.
///
/// Distances use live positions. Ties go to the lower id.
#[must_use]
pub fn nearest_hostile(
    world: &dyn WorldView,
    spatial: &dyn SpatialQuery,
    origin: Vec2,
    faction: Faction,
    radius: f32,
    kind: EntityKind,
) -> Option<TargetInfo> {
    spatial
        .query_nearby(origin, radius)
        .into_iter()
        .filter(|entry| entry.kind == kind && faction.is_hostile_to(entry.faction))
        .filter_map(|entry| world.target_info(entry.id))
        .filter(|info| info.kind == kind && origin.distance(info.position) <= radius)
        .min_by(|a, b| {
            let da = origin.distance_squared(a.position);
            let db = origin.distance_squared(b.position);
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{SpatialEntry, SpatialGrid};

    /// A fixed set of live targets.
    struct Arena {
        targets: Vec<TargetInfo>,
        grid: SpatialGrid,
    }

    impl Arena {
        fn new(targets: Vec<TargetInfo>) -> Self {
            let mut grid = SpatialGrid::default();
            for t in &targets {
                grid.insert(SpatialEntry {
                    id: t.id,
                    faction: t.faction,
                    kind: t.kind,
                    position: t.position,
                });
            }
            Self { targets, grid }
        }

        fn ctx<'a>(&'a self, orbit: &'a OrbitConfig, position: Vec2, dt: f32) -> CombatContext<'a> {
            CombatContext {
                id: 100,
                faction: Faction::Player,
                class: UnitClass::Light,
                position,
                dt,
                orbit,
                world: self,
                spatial: &self.grid,
            }
        }
    }

    impl WorldView for Arena {
        fn target_info(&self, id: EntityId) -> Option<TargetInfo> {
            self.targets.iter().find(|t| t.id == id).copied()
        }
    }

    fn enemy(id: EntityId, kind: EntityKind, x: f32, y: f32) -> TargetInfo {
        TargetInfo {
            id,
            faction: Faction::Enemy,
            kind,
            class: (kind == EntityKind::Unit).then_some(UnitClass::Heavy),
            position: Vec2::new(x, y),
            orbit_range: 0.6,
        }
    }

    fn light_parts() -> (UnitCombat, UnitStateMachine, UnitMovement) {
        let mut fsm = UnitStateMachine::new();
        fsm.set_state(UnitState::Moving, TransitionCause::Initialized);
        (
            UnitCombat::from_stats(&UnitStats::standard(UnitClass::Light)),
            fsm,
            UnitMovement::new(2.0, Vec2::new(50.0, 0.0)),
        )
    }

    #[test]
    fn test_damage_matrix() {
        use UnitClass::{Drone, Heavy, Light};

        let expected = [
            (Light, [10.0, 25.0, 10.0]),
            (Heavy, [15.0, 15.0, 30.0]),
            (Drone, [35.0, 15.0, 15.0]),
        ];
        for (shooter, row) in expected {
            for (defender, value) in [Light, Heavy, Drone].into_iter().zip(row) {
                assert_eq!(damage_for(Some(shooter), defender), value);
            }
        }
        assert_eq!(damage_for(None, Drone), 10.0);
    }

    #[test]
    fn test_turret_preferred_over_closer_ship() {
        let arena = Arena::new(vec![
            enemy(1, EntityKind::Unit, 1.0, 0.0),
            enemy(2, EntityKind::Turret, 3.0, 0.0),
        ]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();

        combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));
        assert_eq!(combat.target(), Some(2));
    }

    #[test]
    fn test_friendly_entities_ignored() {
        let mut friend = enemy(1, EntityKind::Turret, 1.0, 0.0);
        friend.faction = Faction::Player;
        let arena = Arena::new(vec![friend]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();

        combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));
        assert_eq!(combat.target(), None);
        assert_eq!(movement.target(), MoveTarget::Planet);
    }

    #[test]
    fn test_approach_uses_standoff_point() {
        let arena = Arena::new(vec![enemy(1, EntityKind::Unit, 3.0, 0.0)]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();

        let outcome = combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));

        assert!(outcome.shot.is_none());
        assert_eq!(fsm.state(), UnitState::Moving);
        // 3.0 - 2.0 * 0.8
        match movement.target() {
            MoveTarget::Point(p) => assert!((p.x - 1.4).abs() < 1e-5 && p.y.abs() < 1e-5),
            MoveTarget::Planet => panic!("expected stand-off point"),
        }
    }

    #[test]
    fn test_first_shot_after_one_cooldown() {
        let arena = Arena::new(vec![enemy(1, EntityKind::Unit, 1.0, 0.0)]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();
        let ctx = arena.ctx(&orbit, Vec2::ZERO, 0.25);

        let first = combat.tick(&mut fsm, &mut movement, &ctx);
        assert_eq!(fsm.state(), UnitState::Attacking);
        assert_eq!(first.transitions.len(), 1);
        assert!(first.shot.is_none());

        assert!(combat.tick(&mut fsm, &mut movement, &ctx).shot.is_none());
        assert!(combat.tick(&mut fsm, &mut movement, &ctx).shot.is_none());

        let shot = combat.tick(&mut fsm, &mut movement, &ctx).shot.unwrap();
        assert_eq!(shot.target, 1);
        assert_eq!(shot.damage, 25.0);
        assert_eq!(shot.weapon, WeaponKind::Hitscan);
    }

    #[test]
    fn test_orbit_point_on_circle_around_midpoint() {
        let arena = Arena::new(vec![enemy(1, EntityKind::Unit, 1.0, 0.0)]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();

        combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));

        let MoveTarget::Point(point) = movement.target() else {
            panic!("expected orbit point");
        };
        let center = Vec2::new(0.5, 0.0);
        assert!((point.distance(center) - 0.96).abs() < 1e-4);
        // Player orbits counter-clockwise from bearing pi.
        assert!(point.y < 0.0);
    }

    #[test]
    fn test_enemy_orbits_clockwise() {
        let mut player = enemy(1, EntityKind::Unit, 1.0, 0.0);
        player.faction = Faction::Player;
        let arena = Arena::new(vec![player]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();
        let ctx = CombatContext {
            faction: Faction::Enemy,
            ..arena.ctx(&orbit, Vec2::ZERO, 0.1)
        };
        let center = Vec2::new(0.5, 0.0);
        let bearing = |point: Vec2| (point.y - center.y).atan2(point.x - center.x);

        combat.tick(&mut fsm, &mut movement, &ctx);
        let MoveTarget::Point(first) = movement.target() else {
            panic!("expected orbit point");
        };
        combat.tick(&mut fsm, &mut movement, &ctx);
        let MoveTarget::Point(second) = movement.target() else {
            panic!("expected orbit point");
        };

        let step = orbit.angular_speed * 0.1;
        assert!((bearing(first) - (std::f32::consts::PI - step)).abs() < 1e-4);
        assert!((bearing(second) - (bearing(first) - step)).abs() < 1e-4);
        assert!(first.y > 0.0);
    }

    #[test]
    fn test_losing_target_returns_to_planet() {
        let mut arena = Arena::new(vec![enemy(1, EntityKind::Unit, 1.0, 0.0)]);
        let orbit = OrbitConfig::default();
        let (mut combat, mut fsm, mut movement) = light_parts();

        combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));
        assert_eq!(fsm.state(), UnitState::Attacking);

        arena.targets.clear();
        let outcome = combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 0.1));

        assert_eq!(fsm.state(), UnitState::Moving);
        assert_eq!(outcome.transitions[0].cause, TransitionCause::TargetLost);
        assert_eq!(combat.target(), None);
        assert_eq!(combat.fire_timer(), 0.0);
        assert_eq!(movement.target(), MoveTarget::Planet);
    }

    #[test]
    fn test_idle_and_dead_units_do_nothing() {
        let arena = Arena::new(vec![enemy(1, EntityKind::Unit, 1.0, 0.0)]);
        let orbit = OrbitConfig::default();
        let mut combat = UnitCombat::from_stats(&UnitStats::standard(UnitClass::Light));
        let mut movement = UnitMovement::new(2.0, Vec2::ZERO);
        let mut fsm = UnitStateMachine::new();

        let outcome = combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 5.0));
        assert_eq!(outcome, CombatOutcome::default());

        fsm.kill();
        let outcome = combat.tick(&mut fsm, &mut movement, &arena.ctx(&orbit, Vec2::ZERO, 5.0));
        assert_eq!(outcome, CombatOutcome::default());
    }
}
