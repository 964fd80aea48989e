//! Core simulation loop.
//!
//! The simulation owns every entity, both faction economies and both
//! production queues. One call to [`Simulation::tick`] advances the world
//! by `dt` seconds through a fixed phase order:
//!
//! 1. **Economy** - resource generation and crafting, per faction
//! 2. **Production** - drain build queues, spawn approved ships
//! 3. **Placement** - enemy AI structure orders
//! 4. **Structures** - shipyard timers, then turret scans and shots
//! 5. **Units** - state machine, combat and movement per ship
//! 6. **Projectiles** - flight and impact
//! 7. **Cleanup** - remove entities that died this step
//!
//! Within a phase entities are processed in ascending id order. Damage
//! lands the moment it is dealt, so a ship killed early in a phase takes
//! no action later in that phase.
//!
//! # Example
//!
//! ```
//! use skirmish_core::prelude::*;
//!
//! let mut sim = Simulation::new(SimConfig::default(), FactionRegistry::default());
//! sim.place_opening_structures();
//!
//! let events = sim.tick(1.0 / 60.0);
//! assert!(events.rejected.is_empty());
//! assert_eq!(sim.outcome(), GameOutcome::InProgress);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ai::{opening_placements, EnemyAiController};
use crate::buildings::{DefenseTurret, Placement, Shipyard, StructureKind};
use crate::combat::{CombatContext, TargetInfo, UnitCombat, WorldView};
use crate::components::{EntityId, EntityKind, Health, Unit, UnitClass, WeaponKind};
use crate::config::SimConfig;
use crate::economy::{
    ClassCounts, ComponentStock, CraftReport, RateReport, RawResources, ResourceEconomy,
};
use crate::error::{GameError, Result, UnitPart};
use crate::factions::{Faction, FactionMap, FactionRegistry};
use crate::math::Vec2;
use crate::movement::UnitMovement;
use crate::production::{EnqueueOutcome, ProductionQueue};
use crate::projectile::{Projectile, ProjectileStep};
use crate::spatial::{SpatialEntry, SpatialGrid};
use crate::state_machine::{StateTransition, TransitionCause, UnitState, UnitStateMachine};

/// An entity with optional components.
///
/// Which components are present decides what the entity is. A ship
/// carries `unit`, `state_machine`, `movement`, `combat` and `health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Owning faction.
    pub faction: Faction,
    /// World position.
    pub position: Vec2,
    /// Hit points for damageable entities.
    pub health: Option<Health>,
    /// Ship identity.
    pub unit: Option<Unit>,
    /// Ship lifecycle.
    pub state_machine: Option<UnitStateMachine>,
    /// Ship movement.
    pub movement: Option<UnitMovement>,
    /// Ship combat.
    pub combat: Option<UnitCombat>,
    /// Shipyard data.
    pub shipyard: Option<Shipyard>,
    /// Turret data.
    pub turret: Option<DefenseTurret>,
    /// Projectile data.
    pub projectile: Option<Projectile>,
}

impl Entity {
    /// Create a new entity with no components.
    #[must_use]
    pub fn new(faction: Faction, position: Vec2) -> Self {
        Self {
            id: 0,
            faction,
            position,
            health: None,
            unit: None,
            state_machine: None,
            movement: None,
            combat: None,
            shipyard: None,
            turret: None,
            projectile: None,
        }
    }

    /// Coarse category derived from the components present.
    #[must_use]
    pub fn kind(&self) -> Option<EntityKind> {
        if self.projectile.is_some() {
            Some(EntityKind::Projectile)
        } else if self.turret.is_some() {
            Some(EntityKind::Turret)
        } else if self.shipyard.is_some() {
            Some(EntityKind::Shipyard)
        } else if self.unit.is_some() {
            Some(EntityKind::Unit)
        } else {
            None
        }
    }

    /// Check whether the entity still takes part in the simulation.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        let health_ok = self.health.map_or(true, |h| !h.is_dead());
        let fsm_ok = self.state_machine.map_or(true, |fsm| !fsm.is_dead());
        health_ok && fsm_ok
    }

    /// Ship state, if this is a ship.
    #[must_use]
    pub fn unit_state(&self) -> Option<UnitState> {
        self.state_machine.map(|fsm| fsm.state())
    }

    /// First part a ship is missing, if any.
    #[must_use]
    pub fn missing_part(&self) -> Option<UnitPart> {
        self.unit?;
        if self.movement.is_none() {
            Some(UnitPart::Movement)
        } else if self.combat.is_none() {
            Some(UnitPart::Combat)
        } else if self.state_machine.is_none() {
            Some(UnitPart::StateMachine)
        } else if self.health.is_none() {
            Some(UnitPart::Health)
        } else {
            None
        }
    }
}

/// Storage for all entities in the simulation.
///
/// Uses a `HashMap` for O(1) entity lookup by ID, with deterministic
/// iteration via sorted keys when processing phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its ID.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all entities (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Entity)> {
        self.entities.iter()
    }
}

/// A ship left a shipyard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// The new ship.
    pub unit: EntityId,
    /// Its class.
    pub class: UnitClass,
    /// Its faction.
    pub faction: Faction,
    /// The shipyard that built it.
    pub shipyard: EntityId,
}

/// Damage landed on a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Shooter. For projectiles, the entity that fired it.
    pub attacker: EntityId,
    /// Faction of the shooter.
    pub attacker_faction: Faction,
    /// Entity hit.
    pub target: EntityId,
    /// Hit points removed.
    pub amount: f32,
    /// Delivery.
    pub weapon: WeaponKind,
}

/// An entity was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    /// The destroyed entity.
    pub entity: EntityId,
    /// Its faction.
    pub faction: Faction,
    /// Its category.
    pub kind: EntityKind,
    /// Its class, for ships.
    pub class: Option<UnitClass>,
}

/// A ship changed state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// The ship.
    pub entity: EntityId,
    /// The change.
    pub transition: StateTransition,
}

/// A build request lost to a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedBuild {
    /// Requesting shipyard.
    pub shipyard: EntityId,
    /// Its faction.
    pub faction: Faction,
}

/// Events generated during a simulation tick.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Components crafted per faction.
    pub crafted: FactionMap<CraftReport>,
    /// Ships spawned.
    pub spawned: Vec<SpawnEvent>,
    /// Unaffordable requests sent back to the queue tail, per faction.
    pub deferred_builds: FactionMap<usize>,
    /// Requests discarded because their shipyard was removed.
    pub discarded_builds: Vec<EntityId>,
    /// Requests dropped by a full queue.
    pub dropped_builds: Vec<DroppedBuild>,
    /// Structures created from placement orders.
    pub placed: Vec<(EntityId, Placement)>,
    /// Hitscan shots and projectile impacts.
    pub damage: Vec<DamageEvent>,
    /// Ship state changes.
    pub transitions: Vec<TransitionEvent>,
    /// Entities destroyed.
    pub deaths: Vec<DeathEvent>,
    /// Entities refused a tick because they are misconfigured.
    pub rejected: Vec<GameError>,
}

/// State of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Both factions still have assets.
    InProgress,
    /// Only this faction has assets left.
    Victory(Faction),
    /// Neither faction has assets left.
    Draw,
}

/// Per-faction telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionTelemetry {
    /// Faction.
    pub faction: Faction,
    /// Raw resource levels.
    pub resources: RawResources,
    /// Component stock.
    pub components: ComponentStock,
    /// Live ships.
    pub live_units: u32,
    /// Pending build requests.
    pub queue_length: usize,
    /// Registered shipyards per class.
    pub shipyards: ClassCounts,
    /// Live turrets.
    pub turrets: u32,
    /// Production-rate panel.
    pub rates: RateReport,
}

/// Per-ship telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitTelemetry {
    /// Entity id.
    pub id: EntityId,
    /// Class.
    pub class: UnitClass,
    /// Faction.
    pub faction: Faction,
    /// Lifecycle state.
    pub state: UnitState,
    /// Current hit points.
    pub health: f32,
    /// Maximum hit points.
    pub max_health: f32,
    /// Position.
    pub position: Vec2,
}

/// Read-only snapshot for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Simulated seconds.
    pub time: f32,
    /// Ticks run.
    pub tick: u64,
    /// One entry per faction.
    pub factions: Vec<FactionTelemetry>,
    /// Ships in id order.
    pub units: Vec<UnitTelemetry>,
}

/// The skirmish simulation.
///
/// Owns all game state and exposes the placement, removal and query
/// operations the outer layers need.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    registry: FactionRegistry,
    time: f32,
    tick: u64,
    last_dt: f32,
    entities: EntityStorage,
    economies: FactionMap<ResourceEconomy>,
    queues: FactionMap<ProductionQueue>,
    enemy_ai: Option<EnemyAiController>,
    grid: SpatialGrid,
}

impl Simulation {
    /// Create an empty simulation.
    #[must_use]
    pub fn new(config: SimConfig, registry: FactionRegistry) -> Self {
        let economies = FactionMap::from_fn(|_| config.new_economy());
        let queues = FactionMap::from_fn(|_| ProductionQueue::new(config.production));
        let grid = SpatialGrid::new(
            (2.0 * config.units.light.detection_range.max(config.turret.range)).max(1.0),
        );

        Self {
            config,
            registry,
            time: 0.0,
            tick: 0,
            last_dt: 0.0,
            entities: EntityStorage::new(),
            economies,
            queues,
            enemy_ai: None,
            grid,
        }
    }

    /// Enable the enemy structure AI.
    #[must_use]
    pub fn with_enemy_ai(mut self) -> Self {
        self.enemy_ai = Some(EnemyAiController::new(Faction::Enemy, self.config.enemy_ai));
        self
    }

    /// Place each faction's opening shipyards and turret.
    pub fn place_opening_structures(&mut self) -> Vec<EntityId> {
        let placements: Vec<_> = Faction::ALL
            .into_iter()
            .flat_map(|faction| opening_placements(&self.registry, faction))
            .collect();
        placements.into_iter().map(|p| self.place(p)).collect()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Planet registry.
    #[must_use]
    pub const fn registry(&self) -> &FactionRegistry {
        &self.registry
    }

    /// Simulated seconds elapsed.
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Number of ticks run.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// All entities.
    #[must_use]
    pub const fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// A faction's economy.
    #[must_use]
    pub fn economy(&self, faction: Faction) -> &ResourceEconomy {
        &self.economies[faction]
    }

    /// Mutable access to a faction's economy.
    pub fn economy_mut(&mut self, faction: Faction) -> &mut ResourceEconomy {
        &mut self.economies[faction]
    }

    /// A faction's build queue.
    #[must_use]
    pub fn queue(&self, faction: Faction) -> &ProductionQueue {
        &self.queues[faction]
    }

    // ========================================================================
    // Spawning and placement
    // ========================================================================

    /// Insert a raw entity, bypassing the factories.
    ///
    /// The entity is indexed for spatial queries if it is a ship or
    /// structure. No counters are touched.
    pub fn insert_entity(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.index_entity(id);
        id
    }

    /// Spawn a ship at full health heading for the opposing planet.
    pub fn spawn_unit(&mut self, class: UnitClass, faction: Faction, position: Vec2) -> EntityId {
        let stats = *self.config.unit_stats(class);
        let target_planet = self.registry.target_planet(faction).position;

        let mut entity = Entity::new(faction, position);
        entity.unit = Some(Unit { class });
        entity.health = Some(Health::new(stats.max_health));
        entity.state_machine = Some(UnitStateMachine::new());
        entity.movement = Some(UnitMovement::new(stats.move_speed, target_planet));
        entity.combat = Some(UnitCombat::from_stats(&stats));

        let id = self.insert_entity(entity);
        self.economies[faction].increment_units();
        tracing::debug!(id, %class, %faction, x = position.x, y = position.y, "Spawned unit");
        id
    }

    /// Create a structure from a placement order.
    pub fn place(&mut self, placement: Placement) -> EntityId {
        match placement.structure {
            StructureKind::Shipyard(class) => {
                self.place_shipyard(class, placement.faction, placement.position)
            }
            StructureKind::Turret => self.place_turret(placement.faction, placement.position),
        }
    }

    /// Create a shipyard and register it with its faction's queue.
    pub fn place_shipyard(&mut self, class: UnitClass, faction: Faction, position: Vec2) -> EntityId {
        let mut entity = Entity::new(faction, position);
        entity.shipyard = Some(Shipyard::new(class, &self.config.shipyard));

        let id = self.insert_entity(entity);
        self.queues[faction].register_shipyard(class, id);
        tracing::debug!(id, %class, %faction, "Placed shipyard");
        id
    }

    /// Create a defense turret.
    pub fn place_turret(&mut self, faction: Faction, position: Vec2) -> EntityId {
        let mut entity = Entity::new(faction, position);
        entity.health = Some(Health::new(self.config.turret.max_health));
        entity.turret = Some(DefenseTurret::new(&self.config.turret));

        let id = self.insert_entity(entity);
        tracing::debug!(id, %faction, "Placed turret");
        id
    }

    /// Remove a shipyard or turret.
    ///
    /// Build requests a removed shipyard already filed are discarded when
    /// the queue draws them.
    pub fn remove_structure(&mut self, id: EntityId) -> Result<()> {
        let entity = self.entities.get(id).ok_or(GameError::EntityNotFound(id))?;
        if entity.shipyard.is_none() && entity.turret.is_none() {
            return Err(GameError::InvalidState(format!(
                "entity {id} is not a structure"
            )));
        }

        let faction = entity.faction;
        self.entities.remove(id);
        self.grid.remove(id);
        self.queues[faction].unregister_shipyard(id);
        tracing::debug!(id, %faction, "Removed structure");
        Ok(())
    }

    fn index_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        let Some(kind) = entity.kind() else {
            return;
        };
        if kind != EntityKind::Projectile && entity.is_alive() {
            self.grid.insert(SpatialEntry {
                id,
                faction: entity.faction,
                kind,
                position: entity.position,
            });
        }
    }

    fn spawn_projectile(&mut self, position: Vec2, projectile: Projectile) -> EntityId {
        let mut entity = Entity::new(projectile.faction, position);
        entity.projectile = Some(projectile);
        self.entities.insert(entity)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the simulation by `dt` seconds.
    ///
    /// Negative `dt` is treated as zero.
    pub fn tick(&mut self, dt: f32) -> TickEvents {
        let dt = dt.max(0.0);
        let mut events = TickEvents::default();

        self.run_economy_phase(dt, &mut events);
        self.run_production_phase(&mut events);
        self.run_placement_phase(dt, &mut events);

        let ids = self.entities.sorted_ids();
        self.run_shipyard_phase(&ids, dt, &mut events);
        self.run_turret_phase(&ids, dt);
        self.run_unit_phase(&ids, dt, &mut events);

        let ids = self.entities.sorted_ids();
        self.run_projectile_phase(&ids, dt, &mut events);
        self.remove_dead(&ids);

        self.time += dt;
        self.tick += 1;
        self.last_dt = dt;

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();

        events
    }

    fn run_economy_phase(&mut self, dt: f32, events: &mut TickEvents) {
        for faction in Faction::ALL {
            *events.crafted.get_mut(faction) = self.economies[faction].tick(dt);
        }
    }

    fn run_production_phase(&mut self, events: &mut TickEvents) {
        for faction in Faction::ALL {
            let entities = &self.entities;
            let report = self.queues[faction].tick(&mut self.economies[faction], |id| {
                entities
                    .get(id)
                    .filter(|e| e.faction == faction)
                    .and_then(|e| e.shipyard)
                    .map(|yard| yard.class)
            });

            *events.deferred_builds.get_mut(faction) = report.deferred;
            events.discarded_builds.extend(report.discarded);

            for build in report.approved {
                let Some(position) = self.entities.get(build.shipyard).map(|e| e.position) else {
                    continue;
                };
                let unit = self.spawn_unit(build.class, faction, position);
                events.spawned.push(SpawnEvent {
                    unit,
                    class: build.class,
                    faction,
                    shipyard: build.shipyard,
                });
            }
        }
    }

    fn run_placement_phase(&mut self, dt: f32, events: &mut TickEvents) {
        let placement = match self.enemy_ai.as_mut() {
            Some(ai) => ai.tick(dt, &self.registry),
            None => None,
        };

        if let Some(placement) = placement {
            let id = self.place(placement);
            events.placed.push((id, placement));
        }
    }

    fn run_shipyard_phase(&mut self, ids: &[EntityId], dt: f32, events: &mut TickEvents) {
        for &id in ids {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            let faction = entity.faction;
            let Some(yard) = entity.shipyard.as_mut() else {
                continue;
            };

            if !yard.tick(dt) {
                continue;
            }

            if self.queues[faction].enqueue_build(id) == EnqueueOutcome::Dropped {
                tracing::warn!(shipyard = id, %faction, "Build request dropped, queue full");
                events.dropped_builds.push(DroppedBuild {
                    shipyard: id,
                    faction,
                });
            }
        }
    }

    fn run_turret_phase(&mut self, ids: &[EntityId], dt: f32) {
        for &id in ids {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            if !entity.is_alive() {
                continue;
            }
            let Some(mut turret) = entity.turret else {
                continue;
            };
            let (faction, position) = (entity.faction, entity.position);

            let shot = turret.tick(position, faction, dt, &*self, &self.grid);

            if let Some(entity) = self.entities.get_mut(id) {
                entity.turret = Some(turret);
            }

            if let Some(shot) = shot {
                let projectile = Projectile::new(
                    id,
                    Some(DefenseTurret::SHOOTER_CLASS),
                    faction,
                    shot.target,
                    shot.damage,
                    &self.config.projectile,
                );
                self.spawn_projectile(position, projectile);
            }
        }
    }

    fn run_unit_phase(&mut self, ids: &[EntityId], dt: f32, events: &mut TickEvents) {
        for &id in ids {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            let Some(unit) = entity.unit else {
                continue;
            };

            if let Some(part) = entity.missing_part() {
                let err = GameError::MissingCollaborator { entity: id, part };
                tracing::error!(%err, "Refusing to tick unit");
                events.rejected.push(err);
                continue;
            }

            let (Some(mut fsm), Some(mut movement), Some(mut combat)) =
                (entity.state_machine, entity.movement, entity.combat)
            else {
                continue;
            };
            if !entity.is_alive() {
                continue;
            }
            let (faction, mut position) = (entity.faction, entity.position);

            if fsm.state() == UnitState::Idle {
                if let Some(transition) =
                    fsm.set_state(UnitState::Moving, TransitionCause::Initialized)
                {
                    events.transitions.push(TransitionEvent {
                        entity: id,
                        transition,
                    });
                }
            }

            let outcome = {
                let ctx = CombatContext {
                    id,
                    faction,
                    class: unit.class,
                    position,
                    dt,
                    orbit: &self.config.orbit,
                    world: &*self,
                    spatial: &self.grid,
                };
                combat.tick(&mut fsm, &mut movement, &ctx)
            };

            events
                .transitions
                .extend(outcome.transitions.into_iter().map(|transition| TransitionEvent {
                    entity: id,
                    transition,
                }));

            if matches!(fsm.state(), UnitState::Moving | UnitState::Attacking) {
                position = movement.step(position, dt);
            }

            if let Some(entity) = self.entities.get_mut(id) {
                entity.position = position;
                entity.state_machine = Some(fsm);
                entity.movement = Some(movement);
                entity.combat = Some(combat);
            }
            self.grid.update_position(id, position);

            if let Some(shot) = outcome.shot {
                match shot.weapon {
                    WeaponKind::Hitscan => {
                        self.apply_damage(
                            id,
                            faction,
                            shot.target,
                            shot.damage,
                            WeaponKind::Hitscan,
                            events,
                        );
                    }
                    WeaponKind::Projectile => {
                        let projectile = Projectile::new(
                            id,
                            Some(unit.class),
                            faction,
                            shot.target,
                            shot.damage,
                            &self.config.projectile,
                        );
                        self.spawn_projectile(position, projectile);
                    }
                }
            }
        }
    }

    fn run_projectile_phase(&mut self, ids: &[EntityId], dt: f32, events: &mut TickEvents) {
        for &id in ids {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            let Some(projectile) = entity.projectile else {
                continue;
            };

            match projectile.step(entity.position, dt, &*self) {
                ProjectileStep::InFlight(position) => {
                    if let Some(entity) = self.entities.get_mut(id) {
                        entity.position = position;
                    }
                }
                ProjectileStep::Hit { target, damage } => {
                    self.entities.remove(id);
                    self.apply_damage(
                        projectile.source,
                        projectile.faction,
                        target,
                        damage,
                        WeaponKind::Projectile,
                        events,
                    );
                }
                ProjectileStep::Fizzled => {
                    self.entities.remove(id);
                }
            }
        }
    }

    /// Apply damage to a live target, killing it if its health runs out.
    fn apply_damage(
        &mut self,
        attacker: EntityId,
        attacker_faction: Faction,
        target: EntityId,
        amount: f32,
        weapon: WeaponKind,
        events: &mut TickEvents,
    ) {
        let Some(entity) = self.entities.get_mut(target) else {
            return;
        };
        if !entity.is_alive() {
            return;
        }
        let Some(health) = entity.health.as_mut() else {
            return;
        };

        let dealt = health.apply_damage(amount);
        let died = health.is_dead();
        events.damage.push(DamageEvent {
            attacker,
            attacker_faction,
            target,
            amount: dealt,
            weapon,
        });

        if died {
            self.kill(target, events);
        }
    }

    /// Mark an entity dead. Removal happens at the end of the step.
    fn kill(&mut self, id: EntityId, events: &mut TickEvents) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let faction = entity.faction;
        let kind = entity.kind().unwrap_or(EntityKind::Unit);
        let class = entity.unit.map(|u| u.class);

        if let Some(fsm) = entity.state_machine.as_mut() {
            let Some(transition) = fsm.kill() else {
                return;
            };
            events.transitions.push(TransitionEvent {
                entity: id,
                transition,
            });
            if let Some(combat) = entity.combat.as_mut() {
                combat.clear();
            }
        }

        if kind == EntityKind::Unit {
            self.economies[faction].decrement_units();
        }
        self.grid.remove(id);
        events.deaths.push(DeathEvent {
            entity: id,
            faction,
            kind,
            class,
        });
        tracing::debug!(id, %faction, ?kind, "Entity destroyed");
    }

    fn remove_dead(&mut self, ids: &[EntityId]) {
        for &id in ids {
            let dead = self.entities.get(id).is_some_and(|e| !e.is_alive());
            if dead {
                self.entities.remove(id);
                self.grid.remove(id);
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        for (faction, economy) in self.economies.iter() {
            debug_assert!(
                economy.resources.is_non_negative(),
                "{faction} resources went negative"
            );
            debug_assert!(self.queues[faction].len() <= self.config.production.capacity);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Check whether a faction has no live ships, shipyards or turrets.
    #[must_use]
    pub fn is_eliminated(&self, faction: Faction) -> bool {
        !self.entities.iter().any(|(_, e)| {
            e.faction == faction
                && e.is_alive()
                && matches!(
                    e.kind(),
                    Some(EntityKind::Unit | EntityKind::Shipyard | EntityKind::Turret)
                )
        })
    }

    /// Current match outcome.
    #[must_use]
    pub fn outcome(&self) -> GameOutcome {
        match (
            self.is_eliminated(Faction::Player),
            self.is_eliminated(Faction::Enemy),
        ) {
            (false, false) => GameOutcome::InProgress,
            (true, true) => GameOutcome::Draw,
            (true, false) => GameOutcome::Victory(Faction::Enemy),
            (false, true) => GameOutcome::Victory(Faction::Player),
        }
    }

    /// Snapshot for display layers.
    #[must_use]
    pub fn telemetry(&self) -> Telemetry {
        let factions = Faction::ALL
            .into_iter()
            .map(|faction| {
                let economy = &self.economies[faction];
                let queue = &self.queues[faction];
                let roster = queue.roster_counts();
                let turrets = self
                    .entities
                    .iter()
                    .filter(|(_, e)| e.faction == faction && e.turret.is_some() && e.is_alive())
                    .count();

                FactionTelemetry {
                    faction,
                    resources: economy.resources,
                    components: economy.components,
                    live_units: economy.live_units(),
                    queue_length: queue.len(),
                    shipyards: roster,
                    turrets: u32::try_from(turrets).unwrap_or(u32::MAX),
                    rates: economy.rate_report(
                        &roster,
                        self.config.shipyard.build_cooldown,
                        self.last_dt,
                    ),
                }
            })
            .collect();

        let units = self
            .entities
            .sorted_ids()
            .into_iter()
            .filter_map(|id| {
                let e = self.entities.get(id)?;
                let unit = e.unit?;
                let health = e.health?;
                Some(UnitTelemetry {
                    id,
                    class: unit.class,
                    faction: e.faction,
                    state: e.unit_state()?,
                    health: health.current,
                    max_health: health.max,
                    position: e.position,
                })
            })
            .collect();

        Telemetry {
            time: self.time,
            tick: self.tick,
            factions,
            units,
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default(), FactionRegistry::default())
    }
}

impl WorldView for Simulation {
    fn target_info(&self, id: EntityId) -> Option<TargetInfo> {
        let entity = self.entities.get(id)?;
        if !entity.is_alive() {
            return None;
        }

        let (kind, class, orbit_range) = match (entity.unit, entity.turret) {
            (_, Some(turret)) => (EntityKind::Turret, None, turret.orbit_range),
            (Some(unit), None) => {
                let orbit_range = entity.combat.map_or_else(
                    || self.config.unit_stats(unit.class).orbit_range,
                    |c| c.orbit_range,
                );
                (EntityKind::Unit, Some(unit.class), orbit_range)
            }
            (None, None) => return None,
        };

        Some(TargetInfo {
            id,
            faction: entity.faction,
            kind,
            class,
            position: entity.position,
            orbit_range,
        })
    }
}
