//! MDP value iteration: synchronous, cyclic asynchronous, and prioritized
//! sweeping schedules
//!
//! A `ValueIteration` instance consumes an `MdpModel`, runs its schedule to
//! completion at construction time, and thereafter answers `value`,
//! `q_value`, and `policy` queries against the frozen table. All three
//! schedules share one Q-value computation; they differ only in which state
//! gets updated when, so each schedule is a short loop over the same
//! per-state update rule.

use crate::queue::SweepQueue;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A finite Markov decision process, consumed but never owned mutably.
///
/// Transition distributions returned by `transitions` must sum to 1, and
/// every non-terminal state must have at least one action; both are checked
/// once at solver construction.
pub trait MdpModel {
    type State: Clone + Eq + Hash;
    type Action: Clone;

    /// All states, in a fixed enumeration order. The cyclic schedule relies
    /// on this order being stable across calls.
    fn states(&self) -> Vec<Self::State>;

    /// Legal actions at `state`. Empty exactly at terminal states.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Outcome distribution of taking `action` at `state`, as
    /// `(next state, probability)` pairs.
    fn transitions(&self, state: &Self::State, action: &Self::Action)
        -> Vec<(Self::State, f64)>;

    /// Reward for the `(state, action, next state)` transition.
    fn reward(&self, state: &Self::State, action: &Self::Action, next: &Self::State) -> f64;

    /// Whether `state` is terminal. Terminal values stay 0 forever.
    fn is_terminal(&self, state: &Self::State) -> bool;
}

/// Which update order a `ValueIteration` instance runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule {
    /// Jacobi-style batch rounds: each round computes a fresh table from the
    /// previous round's table and swaps it in atomically.
    Synchronous,
    /// Gauss-Seidel single-state steps: iteration `i` updates
    /// `states[i % n]` in place, immediately visible to later steps.
    Cyclic,
    /// Priority-ordered sweep driven by Bellman residuals; `theta` is the
    /// convergence threshold below which predecessors are not requeued.
    Prioritized { theta: f64 },
}

/// Model defects detected before any iteration runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A transition distribution does not sum to 1.
    BadTransitionSum { sum: f64 },
    /// A non-terminal state has no legal action.
    NoActions,
    /// Discount factor outside `[0, 1]`.
    BadDiscount(f64),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadTransitionSum { sum } => {
                write!(f, "transition probabilities sum to {} instead of 1", sum)
            }
            Self::NoActions => write!(f, "non-terminal state has no legal actions"),
            Self::BadDiscount(d) => write!(f, "discount {} outside [0, 1]", d),
        }
    }
}

impl std::error::Error for ModelError {}

/// Tolerance for transition distributions summing to 1.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Map each state to the set of states that can reach it in one action with
/// nonzero probability. Terminal states contribute no outgoing edges.
pub fn predecessor_index<M: MdpModel>(model: &M) -> HashMap<M::State, HashSet<M::State>> {
    let mut index: HashMap<M::State, HashSet<M::State>> = HashMap::new();
    for state in model.states() {
        if model.is_terminal(&state) {
            continue;
        }
        for action in model.actions(&state) {
            for (next, probability) in model.transitions(&state, &action) {
                if probability > 0.0 {
                    index.entry(next).or_default().insert(state.clone());
                }
            }
        }
    }
    index
}

/// Value-function solver over a finite MDP.
///
/// Owns its value table exclusively; nothing is shared across instances.
pub struct ValueIteration<M: MdpModel> {
    model: M,
    discount: f64,
    /// State -> value. Lookups default to 0 for states never assigned.
    values: HashMap<M::State, f64>,
}

impl<M: MdpModel> ValueIteration<M> {
    /// Validate the model, then run `iterations` steps of `schedule` to
    /// completion. `iterations = 0` is valid and leaves the all-zero table.
    pub fn new(
        model: M,
        discount: f64,
        iterations: usize,
        schedule: Schedule,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&discount) {
            return Err(ModelError::BadDiscount(discount));
        }
        validate(&model)?;

        let mut solver = ValueIteration {
            model,
            discount,
            values: HashMap::new(),
        };
        match schedule {
            Schedule::Synchronous => solver.run_synchronous(iterations),
            Schedule::Cyclic => solver.run_cyclic(iterations),
            Schedule::Prioritized { theta } => solver.run_prioritized(iterations, theta),
        }
        Ok(solver)
    }

    /// Value of `state` under the frozen table; 0 for unassigned states.
    pub fn value(&self, state: &M::State) -> f64 {
        self.values.get(state).copied().unwrap_or(0.0)
    }

    /// Expected discounted return of taking `action` at `state` and then
    /// following the value table:
    /// `sum over (s', p) of p * (reward(s, a, s') + discount * V[s'])`.
    pub fn q_value(&self, state: &M::State, action: &M::Action) -> f64 {
        self.model
            .transitions(state, action)
            .into_iter()
            .map(|(next, p)| {
                p * (self.model.reward(state, action, &next) + self.discount * self.value(&next))
            })
            .sum()
    }

    /// Greedy action at `state`: the first action achieving the maximal
    /// Q-value in the model's enumeration order. `None` at terminal states.
    pub fn policy(&self, state: &M::State) -> Option<M::Action> {
        if self.model.is_terminal(state) {
            return None;
        }
        let mut best: Option<(M::Action, f64)> = None;
        for action in self.model.actions(state) {
            let q = self.q_value(state, &action);
            match &best {
                Some((_, best_q)) if q <= *best_q => {}
                _ => best = Some((action, q)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Max over legal actions of `q_value`. Only called on validated
    /// non-terminal states, which always have at least one action.
    fn best_value(&self, state: &M::State) -> f64 {
        self.model
            .actions(state)
            .iter()
            .map(|action| self.q_value(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn run_synchronous(&mut self, iterations: usize) {
        let states = self.model.states();
        for round in 0..iterations {
            let mut next = HashMap::new();
            for state in &states {
                if self.model.is_terminal(state) {
                    continue;
                }
                next.insert(state.clone(), self.best_value(state));
            }
            self.values = next;
            debug!("synchronous round {} of {} done", round + 1, iterations);
        }
    }

    fn run_cyclic(&mut self, iterations: usize) {
        let states = self.model.states();
        if states.is_empty() {
            return;
        }
        for i in 0..iterations {
            let state = &states[i % states.len()];
            if self.model.is_terminal(state) {
                continue;
            }
            let updated = self.best_value(state);
            self.values.insert(state.clone(), updated);
        }
    }

    fn run_prioritized(&mut self, iterations: usize, theta: f64) {
        let predecessors = predecessor_index(&self.model);

        // Seed every non-terminal state, keyed by the negative absolute
        // Bellman residual so the largest residual pops first.
        let mut queue = SweepQueue::new();
        for state in self.model.states() {
            if self.model.is_terminal(&state) {
                continue;
            }
            let residual = (self.value(&state) - self.best_value(&state)).abs();
            queue.push(state, -residual);
        }

        for _ in 0..iterations {
            let Some(state) = queue.pop() else {
                debug!("sweep queue drained before iteration budget");
                break;
            };
            // Terminal states never enter the queue; skip just in case.
            if self.model.is_terminal(&state) {
                continue;
            }
            let updated = self.best_value(&state);
            self.values.insert(state.clone(), updated);

            let Some(preds) = predecessors.get(&state) else {
                continue;
            };
            for pred in preds {
                if self.model.is_terminal(pred) {
                    continue;
                }
                let residual = (self.value(pred) - self.best_value(pred)).abs();
                if residual > theta {
                    queue.update(pred.clone(), -residual);
                }
            }
        }
    }
}

/// Check action sets and transition distributions across the whole model.
fn validate<M: MdpModel>(model: &M) -> Result<(), ModelError> {
    for state in model.states() {
        let actions = model.actions(&state);
        if actions.is_empty() && !model.is_terminal(&state) {
            return Err(ModelError::NoActions);
        }
        for action in actions {
            let sum: f64 = model
                .transitions(&state, &action)
                .iter()
                .map(|(_, p)| p)
                .sum();
            if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(ModelError::BadTransitionSum { sum });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mdp::{
        bad_distribution, bandit, chain, corridor, dead_end, reversed_corridor,
    };

    #[test]
    fn test_zero_iterations_leaves_zero_table() {
        for schedule in [
            Schedule::Synchronous,
            Schedule::Cyclic,
            Schedule::Prioritized { theta: 1e-5 },
        ] {
            let solver = ValueIteration::new(bandit(), 0.9, 0, schedule).unwrap();
            assert_eq!(solver.value(&"s"), 0.0);
            assert_eq!(solver.value(&"end"), 0.0);
        }
    }

    #[test]
    fn test_policy_on_zero_table_follows_immediate_rewards() {
        // With an all-zero table the Q-values reduce to expected immediate
        // rewards; nothing special-cases this degenerate setup.
        let solver = ValueIteration::new(bandit(), 0.9, 0, Schedule::Synchronous).unwrap();
        assert_eq!(solver.policy(&"s"), Some("risky"));
    }

    #[test]
    fn test_discount_zero_converges_in_one_round() {
        let solver = ValueIteration::new(bandit(), 0.0, 1, Schedule::Synchronous).unwrap();
        // max_a E[reward]: safe = 1, risky = 0.5 * 4 = 2.
        assert!((solver.value(&"s") - 2.0).abs() < 1e-10);
        // Further rounds change nothing at discount 0.
        let more = ValueIteration::new(bandit(), 0.0, 10, Schedule::Synchronous).unwrap();
        assert!((more.value(&"s") - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_chain_values_after_one_and_two_rounds() {
        let one = ValueIteration::new(chain(), 0.9, 1, Schedule::Synchronous).unwrap();
        assert!((one.value(&"a") - 1.0).abs() < 1e-10);
        assert_eq!(one.value(&"b"), 0.0);

        let two = ValueIteration::new(chain(), 0.9, 2, Schedule::Synchronous).unwrap();
        assert!((two.value(&"a") - 1.0).abs() < 1e-10);
        assert_eq!(two.value(&"b"), 0.0);
    }

    #[test]
    fn test_synchronous_rounds_are_batch_updates() {
        // One Jacobi round only moves the reward one step back.
        let one = ValueIteration::new(corridor(), 0.9, 1, Schedule::Synchronous).unwrap();
        assert!((one.value(&"s3") - 1.0).abs() < 1e-10);
        assert_eq!(one.value(&"s2"), 0.0);
        assert_eq!(one.value(&"s0"), 0.0);

        // Four rounds reach the far end: V[s0] = 0.9^3.
        let four = ValueIteration::new(corridor(), 0.9, 4, Schedule::Synchronous).unwrap();
        assert!((four.value(&"s0") - 0.9f64.powi(3)).abs() < 1e-10);
    }

    #[test]
    fn test_cyclic_updates_one_state_per_iteration() {
        // states() order is s0, s1, s2, s3, exit; one iteration touches s0
        // only, whose successor is still worth 0.
        let one = ValueIteration::new(corridor(), 0.9, 1, Schedule::Cyclic).unwrap();
        assert_eq!(one.value(&"s0"), 0.0);
        assert_eq!(one.value(&"s3"), 0.0);

        // Four iterations walk s0..s3 once; only s3 sees a reward.
        let four = ValueIteration::new(corridor(), 0.9, 4, Schedule::Cyclic).unwrap();
        assert!((four.value(&"s3") - 1.0).abs() < 1e-10);
        assert_eq!(four.value(&"s0"), 0.0);
    }

    #[test]
    fn test_cyclic_updates_are_immediately_visible() {
        // Goal-end-first enumeration: one Gauss-Seidel pass drags the reward
        // all the way back, which a single synchronous round cannot do.
        let cyclic = ValueIteration::new(reversed_corridor(), 0.9, 4, Schedule::Cyclic).unwrap();
        assert!((cyclic.value(&"s0") - 0.9f64.powi(3)).abs() < 1e-10);

        let sync = ValueIteration::new(reversed_corridor(), 0.9, 1, Schedule::Synchronous).unwrap();
        assert_eq!(sync.value(&"s0"), 0.0);
    }

    #[test]
    fn test_cyclic_skips_terminal_iterations() {
        // Every fifth iteration lands on the terminal exit state and must be
        // a no-op; four full cycles still drag the reward back to s0.
        let solver = ValueIteration::new(corridor(), 0.9, 20, Schedule::Cyclic).unwrap();
        assert_eq!(solver.value(&"exit"), 0.0);
        assert!((solver.value(&"s0") - 0.9f64.powi(3)).abs() < 1e-10);
    }

    #[test]
    fn test_prioritized_matches_synchronous_fixed_point() {
        let theta = 1e-5;
        let sync = ValueIteration::new(corridor(), 0.9, 50, Schedule::Synchronous).unwrap();
        let swept =
            ValueIteration::new(corridor(), 0.9, 100, Schedule::Prioritized { theta }).unwrap();
        for state in ["s0", "s1", "s2", "s3", "exit"] {
            assert!(
                (sync.value(&state) - swept.value(&state)).abs() < 1e-4,
                "{}: {} vs {}",
                state,
                sync.value(&state),
                swept.value(&state)
            );
        }
    }

    #[test]
    fn test_prioritized_processes_largest_residual_first() {
        // Only s3 has a nonzero residual at the start, so a single sweep
        // iteration must update exactly that state.
        let one =
            ValueIteration::new(corridor(), 0.9, 1, Schedule::Prioritized { theta: 1e-5 }).unwrap();
        assert!((one.value(&"s3") - 1.0).abs() < 1e-10);
        assert_eq!(one.value(&"s2"), 0.0);
        assert_eq!(one.value(&"s0"), 0.0);
    }

    #[test]
    fn test_policy_is_none_at_terminal_states() {
        for schedule in [
            Schedule::Synchronous,
            Schedule::Cyclic,
            Schedule::Prioritized { theta: 1e-5 },
        ] {
            let solver = ValueIteration::new(chain(), 0.9, 10, schedule).unwrap();
            assert_eq!(solver.policy(&"b"), None);
        }
    }

    #[test]
    fn test_policy_finds_dominant_action_under_every_schedule() {
        for schedule in [
            Schedule::Synchronous,
            Schedule::Cyclic,
            Schedule::Prioritized { theta: 1e-5 },
        ] {
            let solver = ValueIteration::new(bandit(), 0.9, 20, schedule).unwrap();
            assert_eq!(solver.policy(&"s"), Some("risky"), "{:?}", schedule);
        }
    }

    #[test]
    fn test_policy_ties_break_to_first_action() {
        let mut mdp = crate::test_mdp::TableMdp::new();
        mdp.add_state("s");
        mdp.add_terminal("end");
        mdp.add_transition("s", "left", &[("end", 1.0, 3.0)]);
        mdp.add_transition("s", "right", &[("end", 1.0, 3.0)]);
        let solver = ValueIteration::new(mdp, 0.9, 5, Schedule::Synchronous).unwrap();
        assert_eq!(solver.policy(&"s"), Some("left"));
    }

    #[test]
    fn test_q_value_discounts_successor_values() {
        let solver = ValueIteration::new(corridor(), 0.9, 50, Schedule::Synchronous).unwrap();
        let q = solver.q_value(&"s2", &"fwd");
        assert!((q - 0.9 * solver.value(&"s3")).abs() < 1e-10);
    }

    #[test]
    fn test_predecessor_index_is_reproducible() {
        let first = predecessor_index(&corridor());
        let second = predecessor_index(&corridor());
        assert_eq!(first, second);
        assert_eq!(first[&"s1"], HashSet::from(["s0"]));
        assert_eq!(first[&"exit"], HashSet::from(["s3"]));
        assert!(!first.contains_key(&"s0"), "s0 has no predecessors");
    }

    #[test]
    fn test_bad_transition_sum_is_rejected() {
        let err = ValueIteration::new(bad_distribution(), 0.9, 1, Schedule::Synchronous)
            .err()
            .unwrap();
        assert!(matches!(err, ModelError::BadTransitionSum { .. }));
    }

    #[test]
    fn test_missing_actions_are_rejected() {
        let err = ValueIteration::new(dead_end(), 0.9, 1, Schedule::Synchronous)
            .err()
            .unwrap();
        assert_eq!(err, ModelError::NoActions);
    }

    #[test]
    fn test_discount_out_of_range_is_rejected() {
        let err = ValueIteration::new(chain(), 1.5, 1, Schedule::Synchronous)
            .err()
            .unwrap();
        assert_eq!(err, ModelError::BadDiscount(1.5));
    }
}
