//! gridmind Models - Concrete grid environments for the engine
//!
//! This crate builds the environments the engine consumes: the stochastic
//! grid-world MDP for value iteration and the pursuit game for adversarial
//! search. The engine only ever sees them through its `MdpModel` and
//! `GameState`/`Perception` traits.

pub mod gridworld;
pub mod pursuit;

pub use gridworld::{GridAction, GridState, Gridworld};
pub use pursuit::{Move, Outcome, PursuitState};
