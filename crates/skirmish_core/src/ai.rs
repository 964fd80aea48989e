//! Structure placement: the opening layout and the enemy build AI.
//!
//! Both only produce [`Placement`]s. The simulation turns them into
//! entities exactly like placements coming from a UI layer.

use serde::{Deserialize, Serialize};

use crate::buildings::{Placement, StructureKind};
use crate::components::UnitClass;
use crate::config::EnemyAiConfig;
use crate::factions::{Faction, FactionRegistry};
use crate::math::{approx_ge, Vec2};

/// Distance of the opening shipyards from their planet.
pub const OPENING_SHIPYARD_DISTANCE: f32 = 1.5;

/// Distance of the opening turret from its planet.
pub const OPENING_TURRET_DISTANCE: f32 = 3.0;

/// Angle between consecutive AI placements, in radians.
pub const GOLDEN_ANGLE: f32 = 2.399_963;

/// Opening layout for one faction: three Light shipyards and a turret.
#[must_use]
pub fn opening_placements(registry: &FactionRegistry, faction: Faction) -> Vec<Placement> {
    let center = registry.planet(faction).position;
    let d = OPENING_SHIPYARD_DISTANCE;

    let mut placements: Vec<Placement> = [Vec2::new(d, 0.0), Vec2::new(-d, 0.0), Vec2::new(0.0, d)]
        .into_iter()
        .map(|offset| Placement {
            structure: StructureKind::Shipyard(UnitClass::Light),
            faction,
            position: center + offset,
        })
        .collect();

    let turret_angle = match faction {
        Faction::Player => 45.0_f32,
        Faction::Enemy => 225.0_f32,
    }
    .to_radians();
    placements.push(Placement {
        structure: StructureKind::Turret,
        faction,
        position: center + Vec2::from_angle(turret_angle) * OPENING_TURRET_DISTANCE,
    });

    placements
}

/// Structure cycle the AI builds through.
const BUILD_ORDER: [StructureKind; 4] = [
    StructureKind::Shipyard(UnitClass::Light),
    StructureKind::Shipyard(UnitClass::Heavy),
    StructureKind::Shipyard(UnitClass::Drone),
    StructureKind::Turret,
];

/// Places one structure near its home planet every build interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyAiController {
    /// Faction this controller builds for.
    pub faction: Faction,
    config: EnemyAiConfig,
    build_timer: f32,
    placed: u32,
}

impl EnemyAiController {
    /// Create a controller for `faction`.
    #[must_use]
    pub const fn new(faction: Faction, config: EnemyAiConfig) -> Self {
        Self {
            faction,
            config,
            build_timer: 0.0,
            placed: 0,
        }
    }

    /// Number of structures placed so far.
    #[must_use]
    pub const fn placed(&self) -> u32 {
        self.placed
    }

    /// Advance the build timer, returning a placement when one is due.
    pub fn tick(&mut self, dt: f32, registry: &FactionRegistry) -> Option<Placement> {
        self.build_timer += dt.max(0.0);
        if !approx_ge(self.build_timer, self.config.build_interval) {
            return None;
        }
        self.build_timer = 0.0;

        let n = self.placed;
        self.placed += 1;

        let structure = BUILD_ORDER[n as usize % BUILD_ORDER.len()];
        let distance = if n % 2 == 0 {
            self.config.min_distance
        } else {
            self.config.max_distance
        };
        let angle = n as f32 * GOLDEN_ANGLE;
        let position = registry.planet(self.faction).position + Vec2::from_angle(angle) * distance;

        tracing::debug!(faction = %self.faction, ?structure, x = position.x, y = position.y, "AI placing structure");
        Some(Placement {
            structure,
            faction: self.faction,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_layout() {
        let registry = FactionRegistry::default();
        let placements = opening_placements(&registry, Faction::Player);

        assert_eq!(placements.len(), 4);
        assert_eq!(placements[0].position, Vec2::new(-8.5, 0.0));
        assert_eq!(placements[1].position, Vec2::new(-11.5, 0.0));
        assert_eq!(placements[2].position, Vec2::new(-10.0, 1.5));

        let turret = placements[3];
        assert_eq!(turret.structure, StructureKind::Turret);
        let planet = registry.planet(Faction::Player).position;
        assert!((turret.position.distance(planet) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_ai_cycles_structures_on_interval() {
        let registry = FactionRegistry::default();
        let mut ai = EnemyAiController::new(Faction::Enemy, EnemyAiConfig::default());

        let mut placed = Vec::new();
        for _ in 0..400 {
            if let Some(p) = ai.tick(0.1, &registry) {
                placed.push(p);
            }
        }

        assert_eq!(placed.len(), 4);
        assert_eq!(
            placed.iter().map(|p| p.structure).collect::<Vec<_>>(),
            BUILD_ORDER.to_vec()
        );

        let home = registry.planet(Faction::Enemy).position;
        for p in &placed {
            let d = p.position.distance(home);
            assert!((1.5 - 1e-4..=3.5 + 1e-4).contains(&d));
            assert_eq!(p.faction, Faction::Enemy);
        }
    }
}
