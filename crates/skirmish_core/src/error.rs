//! Error types for the skirmish simulation.
//!
//! Only configuration faults and broken invariants are errors. Expected
//! runtime conditions (lost targets, unaffordable builds, full queues) are
//! reported as values through tick events instead.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Sub-component a unit entity needs before it may be ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitPart {
    /// Movement controller.
    Movement,
    /// Combat controller.
    Combat,
    /// State machine.
    StateMachine,
    /// Health pool.
    Health,
}

impl std::fmt::Display for UnitPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Movement => "movement",
            Self::Combat => "combat",
            Self::StateMachine => "state machine",
            Self::Health => "health",
        };
        f.write_str(name)
    }
}

/// Top-level error type for all simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A unit was assembled without one of its required parts.
    ///
    /// Fatal for that entity: the simulation refuses to tick it.
    #[error("Entity {entity} is missing its {part} part")]
    MissingCollaborator {
        /// The misconfigured entity.
        entity: EntityId,
        /// The absent part.
        part: UnitPart,
    },

    /// A payment was attempted without enough stock to cover it.
    #[error("Insufficient {component}: need {required}, have {available}")]
    InsufficientResources {
        /// Component name.
        component: &'static str,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Configuration file parsing error.
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
