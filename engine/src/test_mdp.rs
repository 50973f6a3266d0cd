//! Hand-built tabular MDPs for value-iteration validation
//!
//! `TableMdp` stores states, actions, transition distributions, and rewards
//! in plain lookup tables, with everything named by static strings so test
//! assertions read naturally. Fixtures below cover the shapes the solver
//! tests need: a deterministic chain, a one-shot bandit, a longer reward
//! propagation chain, and two deliberately malformed models.

use crate::mdp::MdpModel;
use std::collections::{HashMap, HashSet};

type Name = &'static str;

/// Tabular MDP with explicit transition and reward tables.
#[derive(Debug, Clone, Default)]
pub struct TableMdp {
    states: Vec<Name>,
    terminals: HashSet<Name>,
    actions: HashMap<Name, Vec<Name>>,
    transitions: HashMap<(Name, Name), Vec<(Name, f64)>>,
    rewards: HashMap<(Name, Name, Name), f64>,
}

impl TableMdp {
    pub fn new() -> Self {
        TableMdp::default()
    }

    /// Register a non-terminal state. Enumeration order follows call order.
    pub fn add_state(&mut self, name: Name) {
        self.states.push(name);
    }

    /// Register a terminal state.
    pub fn add_terminal(&mut self, name: Name) {
        self.states.push(name);
        self.terminals.insert(name);
    }

    /// Register `action` at `state` with its `(next, probability, reward)`
    /// outcomes. Action enumeration order follows call order.
    pub fn add_transition(&mut self, state: Name, action: Name, outcomes: &[(Name, f64, f64)]) {
        self.actions.entry(state).or_default().push(action);
        let mut distribution = Vec::with_capacity(outcomes.len());
        for &(next, probability, reward) in outcomes {
            distribution.push((next, probability));
            self.rewards.insert((state, action, next), reward);
        }
        self.transitions.insert((state, action), distribution);
    }
}

impl MdpModel for TableMdp {
    type State = Name;
    type Action = Name;

    fn states(&self) -> Vec<Name> {
        self.states.clone()
    }

    fn actions(&self, state: &Name) -> Vec<Name> {
        self.actions.get(state).cloned().unwrap_or_default()
    }

    fn transitions(&self, state: &Name, action: &Name) -> Vec<(Name, f64)> {
        self.transitions
            .get(&(*state, *action))
            .cloned()
            .unwrap_or_default()
    }

    fn reward(&self, state: &Name, action: &Name, next: &Name) -> f64 {
        self.rewards
            .get(&(*state, *action, *next))
            .copied()
            .unwrap_or(0.0)
    }

    fn is_terminal(&self, state: &Name) -> bool {
        self.terminals.contains(state)
    }
}

/// Two states: `a --go--> b` with reward 1, `b` terminal.
pub fn chain() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("a");
    mdp.add_terminal("b");
    mdp.add_transition("a", "go", &[("b", 1.0, 1.0)]);
    mdp
}

/// One decision state with a safe arm (reward 1) and a risky arm worth 2 in
/// expectation (reward 4 half the time). Both end the episode.
pub fn bandit() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("s");
    mdp.add_terminal("end");
    mdp.add_terminal("bust");
    mdp.add_transition("s", "safe", &[("end", 1.0, 1.0)]);
    mdp.add_transition("s", "risky", &[("end", 0.5, 4.0), ("bust", 0.5, 0.0)]);
    mdp
}

/// Deterministic four-step corridor ending in a reward-1 exit; good for
/// watching a reward propagate backwards across schedules.
pub fn corridor() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("s0");
    mdp.add_state("s1");
    mdp.add_state("s2");
    mdp.add_state("s3");
    mdp.add_terminal("exit");
    mdp.add_transition("s0", "fwd", &[("s1", 1.0, 0.0)]);
    mdp.add_transition("s1", "fwd", &[("s2", 1.0, 0.0)]);
    mdp.add_transition("s2", "fwd", &[("s3", 1.0, 0.0)]);
    mdp.add_transition("s3", "fwd", &[("exit", 1.0, 1.0)]);
    mdp
}

/// Corridor enumerated goal-end-first, so a single cyclic pass propagates
/// the reward all the way back while a single synchronous round does not.
pub fn reversed_corridor() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("s3");
    mdp.add_state("s2");
    mdp.add_state("s1");
    mdp.add_state("s0");
    mdp.add_terminal("exit");
    mdp.add_transition("s0", "fwd", &[("s1", 1.0, 0.0)]);
    mdp.add_transition("s1", "fwd", &[("s2", 1.0, 0.0)]);
    mdp.add_transition("s2", "fwd", &[("s3", 1.0, 0.0)]);
    mdp.add_transition("s3", "fwd", &[("exit", 1.0, 1.0)]);
    mdp
}

/// Transition distribution that sums to 0.8 instead of 1.
pub fn bad_distribution() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("s");
    mdp.add_terminal("end");
    mdp.add_transition("s", "go", &[("end", 0.5, 0.0), ("s", 0.3, 0.0)]);
    mdp
}

/// Non-terminal state with no legal action.
pub fn dead_end() -> TableMdp {
    let mut mdp = TableMdp::new();
    mdp.add_state("stuck");
    mdp
}
