//! # Skirmish Core
//!
//! Simulation core for a two-faction orbital skirmish.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No system randomness
//!
//! Time advances in caller-supplied real-valued steps. Every entity is
//! processed in ascending id order, so identical inputs give identical
//! results.
//!
//! ## Crate Structure
//!
//! - [`economy`] - Raw resources, crafting and component stock
//! - [`production`] - Build request arbitration
//! - [`buildings`] - Shipyards and defense turrets
//! - [`state_machine`], [`combat`], [`movement`] - Ship behavior
//! - [`projectile`] - Homing projectiles
//! - [`spatial`] - Nearby-entity queries
//! - [`ai`] - Opening layout and the enemy build AI
//! - [`simulation`] - The phase-ordered tick loop
//! - [`config`] - Tunable constants

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod buildings;
pub mod combat;
pub mod components;
pub mod config;
pub mod economy;
pub mod error;
pub mod factions;
pub mod math;
pub mod movement;
pub mod production;
pub mod projectile;
pub mod simulation;
pub mod spatial;
pub mod state_machine;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{Placement, StructureKind};
    pub use crate::combat::damage_for;
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::economy::{ComponentStock, RateStatus, RawResources, ResourceEconomy};
    pub use crate::error::{GameError, Result, UnitPart};
    pub use crate::factions::{Faction, FactionRegistry, Planet};
    pub use crate::math::Vec2;
    pub use crate::production::{BuildCost, EnqueueOutcome, ProductionQueue};
    pub use crate::simulation::{GameOutcome, Simulation, Telemetry, TickEvents};
    pub use crate::state_machine::UnitState;
}
