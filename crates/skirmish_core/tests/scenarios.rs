//! End-to-end scenarios: crafting timeline, a Light/Heavy duel and a
//! starved shipyard.

use skirmish_core::economy::{ComponentStock, ResourceEconomy};
use skirmish_core::prelude::*;
use skirmish_core::simulation::DamageEvent;
use skirmish_test_utils::fixtures::{run_ticks, starved_config, Duel};

#[test]
fn test_first_tube_batch_at_ten_seconds() {
    let mut economy = ResourceEconomy::default();

    for _ in 0..39 {
        economy.tick(0.25);
    }
    assert_eq!(economy.resources.iron, 97.5);
    assert_eq!(economy.resources.energy, 48.75);
    assert_eq!(economy.components.metal_tubes, 0);

    let report = economy.tick(0.25);
    assert_eq!(report.crafted, ComponentStock::new(10, 0, 0));
    assert_eq!(economy.components.metal_tubes, 10);
    assert!(economy.resources.iron.abs() < 1e-3);
    assert!(economy.resources.energy.abs() < 1e-3);
    // Copper and silicon are still short of wiring and circuits.
    assert_eq!(economy.components.wiring, 0);
    assert_eq!(economy.components.circuits, 0);
}

#[test]
fn test_first_tube_batch_inside_simulation() {
    let mut sim = Simulation::default();

    run_ticks(&mut sim, 99, 0.1);
    assert_eq!(sim.economy(Faction::Player).components.metal_tubes, 0);

    let events = sim.tick(0.1);
    assert!((sim.time() - 10.0).abs() < 1e-3);
    for faction in Faction::ALL {
        assert_eq!(events.crafted[faction].crafted.metal_tubes, 10);
        assert_eq!(sim.economy(faction).components.metal_tubes, 10);
    }
}

#[test]
fn test_light_beats_heavy_on_schedule() {
    let mut duel = Duel::new(UnitClass::Light, UnitClass::Heavy, 0.05);
    let (light, heavy) = (duel.first, duel.second);

    let mut hits: Vec<(f32, DamageEvent)> = Vec::new();
    let mut heavy_death = None;
    for _ in 0..40 {
        let events = duel.sim.tick(0.25);
        let now = duel.sim.time();
        hits.extend(events.damage.into_iter().map(|d| (now, d)));
        if events.deaths.iter().any(|d| d.entity == heavy) {
            heavy_death = Some(now);
            break;
        }
    }

    let light_hits: Vec<_> = hits
        .iter()
        .filter(|(_, d)| d.attacker == light)
        .map(|(t, d)| (*t, d.amount))
        .collect();
    assert_eq!(
        light_hits,
        vec![(1.0, 25.0), (2.0, 25.0), (3.0, 25.0), (4.0, 25.0), (5.0, 25.0), (6.0, 25.0)]
    );

    let heavy_hits: Vec<_> = hits
        .iter()
        .filter(|(_, d)| d.attacker == heavy)
        .map(|(t, d)| (*t, d.amount))
        .collect();
    assert_eq!(heavy_hits, vec![(1.5, 15.0), (3.0, 15.0), (4.5, 15.0)]);

    assert_eq!(heavy_death, Some(6.0));
    assert_eq!(duel.health(light), Some(5.0));
    assert_eq!(duel.health(heavy), None);
    assert_eq!(duel.sim.outcome(), GameOutcome::Victory(Faction::Player));
    assert_eq!(duel.sim.economy(Faction::Enemy).live_units(), 0);
    assert_eq!(duel.sim.economy(Faction::Player).live_units(), 1);
}

#[test]
fn test_survivor_returns_to_moving_after_kill() {
    let mut duel = Duel::new(UnitClass::Light, UnitClass::Heavy, 0.05);
    run_ticks(&mut duel.sim, 24, 0.25);
    assert_eq!(
        duel.sim.get_entity(duel.first).and_then(|e| e.unit_state()),
        Some(UnitState::Attacking)
    );

    duel.sim.tick(0.25);
    assert_eq!(
        duel.sim.get_entity(duel.first).and_then(|e| e.unit_state()),
        Some(UnitState::Moving)
    );
}

#[test]
fn test_starved_shipyard_holds_one_request() {
    let mut sim = Simulation::new(starved_config(), FactionRegistry::default());
    sim.place_shipyard(UnitClass::Light, Faction::Player, Vec2::new(-8.5, 0.0));

    let events = run_ticks(&mut sim, 100, 0.05);

    assert!(events.iter().all(|e| e.spawned.is_empty()));
    assert_eq!(sim.queue(Faction::Player).len(), 1);
    assert_eq!(sim.economy(Faction::Player).live_units(), 0);
}

#[test]
fn test_starved_shipyard_enqueues_once_per_cooldown() {
    let mut sim = Simulation::new(starved_config(), FactionRegistry::default());
    sim.place_shipyard(UnitClass::Light, Faction::Player, Vec2::new(-8.5, 0.0));

    run_ticks(&mut sim, 1000, 0.05);

    assert_eq!(sim.queue(Faction::Player).len(), 10);
}

#[test]
fn test_full_queue_reports_dropped_requests() {
    let mut sim = Simulation::new(starved_config(), FactionRegistry::default());
    let yards: Vec<_> = (0..60_u8)
        .map(|i| sim.place_shipyard(UnitClass::Light, Faction::Player, Vec2::new(-20.0, f32::from(i))))
        .collect();

    let events = run_ticks(&mut sim, 100, 0.05);
    let dropped: Vec<_> = events.iter().flat_map(|e| e.dropped_builds.iter().copied()).collect();

    assert_eq!(sim.queue(Faction::Player).len(), 50);
    assert_eq!(dropped.len(), 10);
    assert!(dropped.iter().all(|d| d.faction == Faction::Player));
    let dropped_yards: Vec<_> = dropped.iter().map(|d| d.shipyard).collect();
    assert_eq!(dropped_yards, yards[50..]);
}

#[test]
fn test_starved_request_builds_once_resources_arrive() {
    let mut sim = Simulation::new(starved_config(), FactionRegistry::default());
    let yard = sim.place_shipyard(UnitClass::Light, Faction::Player, Vec2::new(-8.5, 0.0));
    run_ticks(&mut sim, 100, 0.05);

    sim.economy_mut(Faction::Player).components = ComponentStock::new(5, 2, 0);
    let events = sim.tick(0.05);

    assert_eq!(events.spawned.len(), 1);
    assert_eq!(events.spawned[0].shipyard, yard);
    assert_eq!(events.spawned[0].class, UnitClass::Light);
    assert!(sim.queue(Faction::Player).is_empty());
    assert_eq!(sim.economy(Faction::Player).components, ComponentStock::default());
    assert_eq!(sim.economy(Faction::Player).live_units(), 1);
}
