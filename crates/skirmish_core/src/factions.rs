//! Faction identifiers and the per-faction planet registry.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// One of the two competing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// The human-controlled side.
    Player,
    /// The AI-controlled side.
    Enemy,
}

impl Faction {
    /// Both factions, in processing order.
    pub const ALL: [Faction; 2] = [Faction::Player, Faction::Enemy];

    /// The opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    /// Check whether `other` is hostile to this faction.
    #[must_use]
    pub fn is_hostile_to(self, other: Self) -> bool {
        self != other
    }

    /// Get the short name for this faction.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A value held once per faction, indexed in O(1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionMap<T> {
    /// Value for [`Faction::Player`].
    pub player: T,
    /// Value for [`Faction::Enemy`].
    pub enemy: T,
}

impl<T> FactionMap<T> {
    /// Create a map from explicit per-faction values.
    pub const fn new(player: T, enemy: T) -> Self {
        Self { player, enemy }
    }

    /// Build a map by calling `f` once per faction.
    pub fn from_fn(mut f: impl FnMut(Faction) -> T) -> Self {
        Self {
            player: f(Faction::Player),
            enemy: f(Faction::Enemy),
        }
    }

    /// Borrow the value for a faction.
    pub fn get(&self, faction: Faction) -> &T {
        match faction {
            Faction::Player => &self.player,
            Faction::Enemy => &self.enemy,
        }
    }

    /// Mutably borrow the value for a faction.
    pub fn get_mut(&mut self, faction: Faction) -> &mut T {
        match faction {
            Faction::Player => &mut self.player,
            Faction::Enemy => &mut self.enemy,
        }
    }

    /// Iterate `(faction, value)` pairs in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (Faction, &T)> {
        [(Faction::Player, &self.player), (Faction::Enemy, &self.enemy)].into_iter()
    }
}

impl<T> std::ops::Index<Faction> for FactionMap<T> {
    type Output = T;

    fn index(&self, faction: Faction) -> &T {
        self.get(faction)
    }
}

impl<T> std::ops::IndexMut<Faction> for FactionMap<T> {
    fn index_mut(&mut self, faction: Faction) -> &mut T {
        self.get_mut(faction)
    }
}

/// A faction's home planet.
///
/// Planets are navigation anchors, not combatants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// World position.
    pub position: Vec2,
    /// Body radius.
    pub radius: f32,
}

impl Planet {
    /// Create a planet at a position with the default radius.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            radius: 1.0,
        }
    }
}

/// Faction → home planet lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionRegistry {
    planets: FactionMap<Planet>,
}

impl FactionRegistry {
    /// Create a registry from both home planets.
    #[must_use]
    pub const fn new(player_planet: Planet, enemy_planet: Planet) -> Self {
        Self {
            planets: FactionMap::new(player_planet, enemy_planet),
        }
    }

    /// Home planet of a faction.
    #[must_use]
    pub fn planet(&self, faction: Faction) -> &Planet {
        &self.planets[faction]
    }

    /// The planet a faction's ships fly toward (the opponent's home).
    #[must_use]
    pub fn target_planet(&self, faction: Faction) -> &Planet {
        &self.planets[faction.opponent()]
    }
}

impl Default for FactionRegistry {
    fn default() -> Self {
        Self::new(
            Planet::at(Vec2::new(-10.0, 0.0)),
            Planet::at(Vec2::new(10.0, 0.0)),
        )
    }
}
