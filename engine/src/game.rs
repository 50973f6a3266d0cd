//! Game-state interface consumed by the adversarial search core
//!
//! The engine never owns a game: it consumes an opaque state through this
//! trait and asks only for legal actions, successors, agent count, and
//! win/loss flags. States are treated as immutable — generating a successor
//! must never mutate the input.

/// Index of an agent in the turn order.
///
/// Index 0 is always the controlled agent; indices 1..N-1 are opponents.
/// Turns advance in strictly increasing index order and wrap back to 0.
pub type AgentIndex = usize;

/// A multi-agent, turn-based game state.
///
/// Every non-terminal state must offer at least one legal action to every
/// agent; the search core treats an empty action set at a non-terminal node
/// as a precondition violation.
pub trait GameState: Clone {
    /// Action type for this game.
    type Action: Clone;

    /// Legal actions for the given agent at this state.
    fn legal_actions(&self, agent: AgentIndex) -> Vec<Self::Action>;

    /// The state reached after `agent` takes `action`.
    fn successor(&self, agent: AgentIndex, action: &Self::Action) -> Self;

    /// Total number of agents, controlled agent included. Always >= 1.
    fn num_agents(&self) -> usize;

    /// Whether this state is a won game.
    fn is_win(&self) -> bool;

    /// Whether this state is a lost game.
    fn is_lose(&self) -> bool;

    /// Current game score. Higher is better for the controlled agent.
    fn score(&self) -> f64;
}

/// Next `(agent, depth)` after `agent` moves.
///
/// Depth counts completed agent cycles: it increments only when the turn
/// wraps from the last agent back to agent 0.
pub fn advance(agent: AgentIndex, depth: usize, num_agents: usize) -> (AgentIndex, usize) {
    if agent + 1 == num_agents {
        (0, depth + 1)
    } else {
        (agent + 1, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_mid_cycle() {
        assert_eq!(advance(0, 0, 3), (1, 0));
        assert_eq!(advance(1, 0, 3), (2, 0));
    }

    #[test]
    fn test_advance_wraps_and_deepens() {
        assert_eq!(advance(2, 0, 3), (0, 1));
        assert_eq!(advance(2, 4, 3), (0, 5));
    }

    #[test]
    fn test_advance_single_agent() {
        // A one-agent game deepens on every move.
        assert_eq!(advance(0, 0, 1), (0, 1));
    }
}
