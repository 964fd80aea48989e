//! # Skirmish Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture builders (duels, starved economies, opening layouts)
//! - A repeatability harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod repeatability;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
