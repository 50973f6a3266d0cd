//! gridmind Engine - Decision-making cores for grid-world agents
//!
//! Two independent algorithm families live here: adversarial game-tree
//! search (minimax, alpha-beta, expectimax) over the `GameState` trait, and
//! MDP value iteration (synchronous, cyclic, prioritized sweeping) over the
//! `MdpModel` trait. The engine consumes environments, it never defines
//! them; concrete grids live in the `gridmind-models` crate, and the
//! `test_game`/`test_mdp` modules hold the synthetic fixtures used by tests
//! and benchmarks.

pub mod game;
pub mod heuristic;
pub mod mdp;
pub mod queue;
pub mod search;
pub mod test_game;
pub mod test_mdp;
