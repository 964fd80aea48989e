//! Ship lifecycle state machine.
//!
//! ```text
//! Idle ──init──▶ Moving ◀──target lost──▶ Attacking
//!                  │                          │
//!                  └──────── destroyed ───────┴──▶ Dead
//! ```
//!
//! `Dead` is terminal. Every accepted transition is logged and returned
//! so the caller can surface it.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitState {
    /// Freshly spawned, inert.
    #[default]
    Idle,
    /// Travelling toward the target planet or an acquired target.
    Moving,
    /// In weapons range, orbiting and firing.
    Attacking,
    /// Destroyed. No further behavior.
    Dead,
}

/// Why a transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// First tick after spawning.
    Initialized,
    /// A hostile target entered attack range.
    TargetInRange,
    /// The target died, vanished or left range.
    TargetLost,
    /// Hit points reached zero.
    Destroyed,
}

/// An accepted state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Previous state.
    pub from: UnitState,
    /// New state.
    pub to: UnitState,
    /// Trigger.
    pub cause: TransitionCause,
}

/// Per-ship state holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitStateMachine {
    state: UnitState,
}

impl UnitStateMachine {
    /// A machine in the `Idle` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: UnitState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Check whether the ship is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state == UnitState::Dead
    }

    /// Request a state change.
    ///
    /// Returns `None` when the state is unchanged or the machine is dead.
    pub fn set_state(&mut self, to: UnitState, cause: TransitionCause) -> Option<StateTransition> {
        if self.state == to || self.state == UnitState::Dead {
            return None;
        }

        let transition = StateTransition {
            from: self.state,
            to,
            cause,
        };
        tracing::debug!(from = ?transition.from, to = ?to, cause = ?cause, "Unit state changed");
        self.state = to;
        Some(transition)
    }

    /// Enter `Dead`. Returns the transition only the first time.
    pub fn kill(&mut self) -> Option<StateTransition> {
        self.set_state(UnitState::Dead, TransitionCause::Destroyed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        assert_eq!(UnitStateMachine::new().state(), UnitState::Idle);
    }

    #[test]
    fn test_same_state_is_not_a_transition() {
        let mut fsm = UnitStateMachine::new();
        assert!(fsm
            .set_state(UnitState::Moving, TransitionCause::Initialized)
            .is_some());
        assert!(fsm
            .set_state(UnitState::Moving, TransitionCause::TargetLost)
            .is_none());
    }

    #[test]
    fn test_dead_is_terminal_and_entered_once() {
        let mut fsm = UnitStateMachine::new();
        fsm.set_state(UnitState::Attacking, TransitionCause::TargetInRange);

        let first = fsm.kill().unwrap();
        assert_eq!(first.from, UnitState::Attacking);
        assert_eq!(first.to, UnitState::Dead);

        assert!(fsm.kill().is_none());
        assert!(fsm
            .set_state(UnitState::Moving, TransitionCause::TargetLost)
            .is_none());
        assert!(fsm.is_dead());
    }
}
