//! Static evaluation functions for grid-world game states
//!
//! `score_evaluation` is the default: the game's own score, nothing else.
//! `tactical_evaluation` folds in food, ghost, and capsule distances through
//! the `Perception` trait; its weights are fixed and its output is part of
//! the conformance surface, so treat the formula as frozen.

use crate::game::GameState;

/// Grid position as integer coordinates.
pub type Position = (i32, i32);

/// What the evaluation function sees of one ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostInfo {
    pub position: Position,
    /// Moves remaining in the scared state; 0 means active.
    pub scared_timer: u32,
}

impl GhostInfo {
    pub fn is_scared(&self) -> bool {
        self.scared_timer > 0
    }
}

/// Domain accessors a grid game exposes to `tactical_evaluation`.
///
/// Only the heuristic needs these; the search core itself consumes states
/// through `GameState` alone.
pub trait Perception {
    /// Current game score.
    fn score(&self) -> f64;
    /// Position of the controlled agent.
    fn agent_position(&self) -> Position;
    /// Positions of the remaining food pellets.
    fn food(&self) -> Vec<Position>;
    /// Remaining pellet count.
    fn food_count(&self) -> usize;
    /// All ghosts with their scared timers.
    fn ghosts(&self) -> Vec<GhostInfo>;
    /// Positions of the remaining capsules.
    fn capsules(&self) -> Vec<Position>;
}

/// Manhattan distance between two grid positions.
pub fn manhattan(a: Position, b: Position) -> f64 {
    ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f64
}

/// Default evaluation: the raw game score.
pub fn score_evaluation<S: GameState>(state: &S) -> f64 {
    state.score()
}

/// Food-, ghost-, and capsule-aware evaluation.
///
/// Starting from the game score:
/// - minus 2 x distance to the nearest pellet (0 when none remain)
/// - minus 5 x remaining pellet count
/// - minus 12 x distance to each active ghost
/// - plus 1 x distance to each scared ghost
/// - when no ghost is scared, minus 0.65 x (capsule count + distance to the
///   nearest capsule, 0 when none remain)
pub fn tactical_evaluation<S: Perception>(state: &S) -> f64 {
    let mut score = state.score();
    let position = state.agent_position();

    let food = state.food();
    if !food.is_empty() {
        let nearest = food
            .iter()
            .map(|&pellet| manhattan(position, pellet))
            .fold(f64::INFINITY, f64::min);
        score -= 2.0 * nearest;
    }
    score -= 5.0 * state.food_count() as f64;

    let mut any_scared = false;
    for ghost in state.ghosts() {
        if ghost.is_scared() {
            score += manhattan(position, ghost.position);
            any_scared = true;
        } else {
            score -= 12.0 * manhattan(position, ghost.position);
        }
    }

    if !any_scared {
        let capsules = state.capsules();
        let nearest = capsules
            .iter()
            .map(|&capsule| manhattan(position, capsule))
            .fold(f64::INFINITY, f64::min);
        let nearest = if capsules.is_empty() { 0.0 } else { nearest };
        score -= 0.65 * (capsules.len() as f64 + nearest);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal stand-in state: the fields are the perception.
    struct Snapshot {
        score: f64,
        position: Position,
        food: Vec<Position>,
        ghosts: Vec<GhostInfo>,
        capsules: Vec<Position>,
    }

    impl Perception for Snapshot {
        fn score(&self) -> f64 {
            self.score
        }
        fn agent_position(&self) -> Position {
            self.position
        }
        fn food(&self) -> Vec<Position> {
            self.food.clone()
        }
        fn food_count(&self) -> usize {
            self.food.len()
        }
        fn ghosts(&self) -> Vec<GhostInfo> {
            self.ghosts.clone()
        }
        fn capsules(&self) -> Vec<Position> {
            self.capsules.clone()
        }
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan((0, 0), (3, 4)), 7.0);
        assert_eq!(manhattan((2, 5), (2, 5)), 0.0);
        assert_eq!(manhattan((-1, 2), (1, -2)), 6.0);
    }

    #[test]
    fn test_bare_board_keeps_game_score() {
        // No food, no ghosts, no capsules: only the capsule term applies,
        // and it is 0 + 0.
        let state = Snapshot {
            score: 42.0,
            position: (0, 0),
            food: vec![],
            ghosts: vec![],
            capsules: vec![],
        };
        assert!((tactical_evaluation(&state) - 42.0).abs() < 1e-10);
    }

    #[test]
    fn test_full_formula_with_active_ghost() {
        let state = Snapshot {
            score: 100.0,
            position: (0, 0),
            food: vec![(2, 0), (5, 5)],
            ghosts: vec![GhostInfo {
                position: (3, 1),
                scared_timer: 0,
            }],
            capsules: vec![(1, 1)],
        };
        // 100 - 2*2 (nearest food) - 5*2 (pellets) - 12*4 (active ghost)
        //     - 0.65*(1 + 2) (capsules, no ghost scared)
        let expected = 100.0 - 4.0 - 10.0 - 48.0 - 0.65 * 3.0;
        assert!((tactical_evaluation(&state) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_scared_ghost_flips_ghost_and_capsule_terms() {
        let state = Snapshot {
            score: 100.0,
            position: (0, 0),
            food: vec![(2, 0)],
            ghosts: vec![GhostInfo {
                position: (3, 1),
                scared_timer: 7,
            }],
            capsules: vec![(1, 1)],
        };
        // Scared ghost adds its distance and suppresses the capsule term.
        let expected = 100.0 - 2.0 * 2.0 - 5.0 * 1.0 + 4.0;
        assert!((tactical_evaluation(&state) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_mixed_ghosts_count_separately() {
        let state = Snapshot {
            score: 0.0,
            position: (0, 0),
            food: vec![],
            ghosts: vec![
                GhostInfo {
                    position: (1, 0),
                    scared_timer: 0,
                },
                GhostInfo {
                    position: (0, 2),
                    scared_timer: 3,
                },
            ],
            capsules: vec![(4, 4)],
        };
        // One scared ghost suppresses the capsule term for the whole board.
        let expected = 0.0 - 12.0 * 1.0 + 2.0;
        assert!((tactical_evaluation(&state) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_no_capsules_means_zero_distance_term() {
        let state = Snapshot {
            score: 10.0,
            position: (0, 0),
            food: vec![],
            ghosts: vec![GhostInfo {
                position: (2, 2),
                scared_timer: 0,
            }],
            capsules: vec![],
        };
        let expected = 10.0 - 12.0 * 4.0 - 0.65 * 0.0;
        assert!((tactical_evaluation(&state) - expected).abs() < 1e-10);
    }
}
