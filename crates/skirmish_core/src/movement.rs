//! Ship movement controller.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Where a ship is heading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MoveTarget {
    /// The opposing faction's planet.
    #[default]
    Planet,
    /// A fixed point, such as a stand-off or orbit point.
    Point(Vec2),
}

/// Movement part of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitMovement {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Position of the planet this ship flies toward.
    pub target_planet: Vec2,
    target: MoveTarget,
}

impl UnitMovement {
    /// Create a controller heading for `target_planet`.
    #[must_use]
    pub const fn new(speed: f32, target_planet: Vec2) -> Self {
        Self {
            speed,
            target_planet,
            target: MoveTarget::Planet,
        }
    }

    /// Current move target.
    #[must_use]
    pub const fn target(&self) -> MoveTarget {
        self.target
    }

    /// Replace the move target.
    pub fn set_target(&mut self, target: MoveTarget) {
        self.target = target;
    }

    /// Head back to the target planet.
    pub fn retarget_planet(&mut self) {
        self.target = MoveTarget::Planet;
    }

    /// The world position of the current move target.
    #[must_use]
    pub fn destination(&self) -> Vec2 {
        match self.target {
            MoveTarget::Planet => self.target_planet,
            MoveTarget::Point(point) => point,
        }
    }

    /// Position after `dt` seconds of travel from `position`.
    ///
    /// Never overshoots the destination.
    #[must_use]
    pub fn step(&self, position: Vec2, dt: f32) -> Vec2 {
        position.move_towards(self.destination(), self.speed * dt.max(0.0))
    }
}
