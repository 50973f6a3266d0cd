//! Adversarial game-tree search: minimax, alpha-beta pruning, and expectimax
//!
//! All three strategies share one recursive evaluator (`node_value`)
//! parameterized by how opponent turns are aggregated (minimum for
//! adversarial opponents, arithmetic mean for uniform-random ones) and by an
//! optional alpha-beta pruning window. Pruning never changes the value of
//! the chosen action relative to plain minimax — it only reduces the number
//! of nodes visited.
//!
//! The search holds no state across calls: every invocation is an
//! independent pure recursion over immutable game states.

use crate::game::{advance, AgentIndex, GameState};
use log::debug;

/// Search strategy for `choose_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Exact minimax: opponents pick their best reply.
    Minimax,
    /// Minimax with alpha-beta pruning. Same values, fewer node visits.
    AlphaBeta,
    /// Opponents modeled as uniform-random: opponent turns average instead
    /// of minimize.
    Expectimax,
}

/// Precondition violations surfaced by the search entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The controlled agent has no legal action at the root state.
    NoLegalActions,
    /// `max_depth` must be at least 1.
    ZeroDepth,
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLegalActions => write!(f, "no legal actions for the controlled agent"),
            Self::ZeroDepth => write!(f, "search depth must be at least 1"),
        }
    }
}

impl std::error::Error for SearchError {}

/// How opponent (index >= 1) turns combine their children's values.
#[derive(Debug, Clone, Copy)]
enum Opponents {
    /// Take the minimum: opponents play adversarially.
    Adversarial,
    /// Take the unweighted mean: opponents play uniformly at random.
    Uniform,
}

/// Alpha-beta pruning window threaded through the recursion.
///
/// `alpha` is the best value the maximizer can already guarantee, `beta` the
/// best the minimizer can. `None` disables pruning entirely.
#[derive(Debug, Clone, Copy)]
struct Window {
    alpha: f64,
    beta: f64,
}

impl Window {
    fn open() -> Self {
        Window {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }
}

/// Recursive node value at `(state, agent, depth)`.
///
/// Depth counts completed agent cycles; the recursion bottoms out at
/// `depth == max_depth` or at a won/lost state, returning `eval(state)`
/// regardless of strategy.
fn node_value<S, F>(
    state: &S,
    agent: AgentIndex,
    depth: usize,
    max_depth: usize,
    eval: &F,
    opponents: Opponents,
    window: Option<Window>,
) -> f64
where
    S: GameState,
    F: Fn(&S) -> f64,
{
    if depth == max_depth || state.is_win() || state.is_lose() {
        return eval(state);
    }

    let (next_agent, next_depth) = advance(agent, depth, state.num_agents());
    let actions = state.legal_actions(agent);

    if agent == 0 {
        // Max agent. Iterate left to right, raising alpha; stop as soon as a
        // child strictly exceeds beta (the minimizer above avoids this branch).
        let mut best = f64::NEG_INFINITY;
        let mut window = window;
        for action in &actions {
            let successor = state.successor(agent, action);
            let v = node_value(
                &successor, next_agent, next_depth, max_depth, eval, opponents, window,
            );
            best = best.max(v);
            if let Some(w) = &mut window {
                if best > w.beta {
                    return best;
                }
                w.alpha = w.alpha.max(best);
            }
        }
        best
    } else {
        match opponents {
            Opponents::Adversarial => {
                // Min agent, symmetric to the max case: lower beta, stop once
                // a child falls strictly below alpha.
                let mut worst = f64::INFINITY;
                let mut window = window;
                for action in &actions {
                    let successor = state.successor(agent, action);
                    let v = node_value(
                        &successor, next_agent, next_depth, max_depth, eval, opponents, window,
                    );
                    worst = worst.min(v);
                    if let Some(w) = &mut window {
                        if worst < w.alpha {
                            return worst;
                        }
                        w.beta = w.beta.min(worst);
                    }
                }
                worst
            }
            Opponents::Uniform => {
                // Chance-style turn: every legal action is equally likely.
                let mut total = 0.0;
                for action in &actions {
                    let successor = state.successor(agent, action);
                    total += node_value(
                        &successor, next_agent, next_depth, max_depth, eval, opponents, window,
                    );
                }
                total / actions.len() as f64
            }
        }
    }
}

/// Evaluate every root action of the controlled agent.
///
/// Returns `(action, value)` pairs in the state's enumeration order. For
/// `Strategy::AlphaBeta` the values of actions explored after the running
/// best may be window-clipped lower results, but the maximum (and therefore
/// the first action achieving it) is identical to plain minimax.
pub fn evaluate_actions<S, F>(
    state: &S,
    max_depth: usize,
    eval: &F,
    strategy: Strategy,
) -> Result<Vec<(S::Action, f64)>, SearchError>
where
    S: GameState,
    F: Fn(&S) -> f64,
{
    if max_depth == 0 {
        return Err(SearchError::ZeroDepth);
    }
    let actions = state.legal_actions(0);
    if actions.is_empty() {
        return Err(SearchError::NoLegalActions);
    }

    let opponents = match strategy {
        Strategy::Expectimax => Opponents::Uniform,
        Strategy::Minimax | Strategy::AlphaBeta => Opponents::Adversarial,
    };
    let mut window = match strategy {
        Strategy::AlphaBeta => Some(Window::open()),
        Strategy::Minimax | Strategy::Expectimax => None,
    };
    let (next_agent, next_depth) = advance(0, 0, state.num_agents());

    let mut values = Vec::with_capacity(actions.len());
    for action in actions {
        let successor = state.successor(0, &action);
        let v = node_value(
            &successor, next_agent, next_depth, max_depth, eval, opponents, window,
        );
        // Root beta stays +inf, so only alpha moves between root actions.
        if let Some(w) = &mut window {
            w.alpha = w.alpha.max(v);
        }
        values.push((action, v));
    }
    Ok(values)
}

/// Pick the controlled agent's best root action.
///
/// Ties break to the first action achieving the maximum, in the state's
/// enumeration order. Errors on `max_depth == 0` or when agent 0 has no
/// legal action.
pub fn choose_action<S, F>(
    state: &S,
    max_depth: usize,
    eval: &F,
    strategy: Strategy,
) -> Result<S::Action, SearchError>
where
    S: GameState,
    F: Fn(&S) -> f64,
{
    let mut values = evaluate_actions(state, max_depth, eval, strategy)?;
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, (_, v)) in values.iter().enumerate() {
        if *v > best_value {
            best_value = *v;
            best_index = i;
        }
    }
    debug!(
        "{:?} depth {}: picked root action {} of {} (value {})",
        strategy,
        max_depth,
        best_index,
        values.len(),
        best_value
    );
    Ok(values.swap_remove(best_index).0)
}
