//! Hand-built synthetic game trees for search validation
//!
//! A `TreeGame` is an explicit tree of branch and leaf nodes; a `TreeState`
//! points at one node and implements `GameState` with child indices as
//! actions. Leaves end the game (non-negative payoff counts as a win,
//! negative as a loss); branches carry a static score so depth-cutoff
//! behavior can be observed directly.
//!
//! Nodes are pushed in ID order so that `nodes[id]` is the node with that id.

use crate::game::{AgentIndex, GameState};
use std::sync::Arc;

/// Node in a hand-built game tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Internal node: `agent` is to move, one child per action.
    Branch {
        agent: AgentIndex,
        children: Vec<usize>,
        score: f64,
    },
    /// Game-over node with a fixed payoff.
    Leaf { score: f64 },
}

/// Explicit game tree shared by all states derived from it.
#[derive(Debug, Clone)]
pub struct TreeGame {
    pub nodes: Vec<TreeNode>,
    pub num_agents: usize,
}

impl TreeGame {
    /// Root state (node 0) of this tree.
    pub fn root(self) -> TreeState {
        TreeState {
            game: Arc::new(self),
            current: 0,
        }
    }
}

/// A position inside a `TreeGame`. Actions are child indices (0-based).
#[derive(Debug, Clone)]
pub struct TreeState {
    game: Arc<TreeGame>,
    current: usize,
}

impl TreeState {
    fn node(&self) -> &TreeNode {
        &self.game.nodes[self.current]
    }
}

impl GameState for TreeState {
    type Action = usize;

    fn legal_actions(&self, _agent: AgentIndex) -> Vec<usize> {
        match self.node() {
            TreeNode::Branch { children, .. } => (0..children.len()).collect(),
            TreeNode::Leaf { .. } => Vec::new(),
        }
    }

    fn successor(&self, _agent: AgentIndex, action: &usize) -> Self {
        match self.node() {
            TreeNode::Branch { children, .. } => TreeState {
                game: Arc::clone(&self.game),
                current: children[*action],
            },
            TreeNode::Leaf { .. } => panic!("successor of a leaf node"),
        }
    }

    fn num_agents(&self) -> usize {
        self.game.num_agents
    }

    fn is_win(&self) -> bool {
        matches!(self.node(), TreeNode::Leaf { score } if *score >= 0.0)
    }

    fn is_lose(&self) -> bool {
        matches!(self.node(), TreeNode::Leaf { score } if *score < 0.0)
    }

    fn score(&self) -> f64 {
        match self.node() {
            TreeNode::Branch { score, .. } => *score,
            TreeNode::Leaf { score } => *score,
        }
    }
}

/// One max decision over immediate leaf payoffs.
///
/// Structure: node 0 is the controlled agent's branch; node `1 + i` is the
/// leaf with payoff `scores[i]`.
pub fn depth_one(scores: &[f64], num_agents: usize) -> TreeState {
    let mut nodes = vec![TreeNode::Branch {
        agent: 0,
        children: (1..=scores.len()).collect(),
        score: 0.0,
    }];
    nodes.extend(scores.iter().map(|&score| TreeNode::Leaf { score }));
    TreeGame { nodes, num_agents }.root()
}

/// Two-agent, two-ply tree: a max root over one min branch per row, each min
/// branch over that row's leaf payoffs.
///
/// Structure for R rows:
///   0:        Branch agent 0  [row 0 → 1, row 1 → 2, ...]
///   1..=R:    Branch agent 1, children are the row's leaves
///   R+1..:    Leaves, row by row
pub fn max_min_tree(rows: &[&[f64]]) -> TreeState {
    let r = rows.len();
    let mut nodes = vec![TreeNode::Branch {
        agent: 0,
        children: (1..=r).collect(),
        score: 0.0,
    }];
    let mut next_leaf = 1 + r;
    for row in rows {
        nodes.push(TreeNode::Branch {
            agent: 1,
            children: (next_leaf..next_leaf + row.len()).collect(),
            score: 0.0,
        });
        next_leaf += row.len();
    }
    for row in rows {
        nodes.extend(row.iter().map(|&score| TreeNode::Leaf { score }));
    }
    TreeGame {
        nodes,
        num_agents: 2,
    }
    .root()
}

/// Two-agent tree where the depth cutoff changes the answer.
///
/// Structure:
///   0: Branch agent 0            [→ 1, → 2]
///   1: Branch agent 1            [→ 3]
///   2: Branch agent 1            [→ 4]
///   3: Branch agent 0, score 10  [→ 5]
///   4: Branch agent 0, score 3   [→ 6]
///   5: Leaf -100
///   6: Leaf 50
///
/// At depth 1 the agent-0 branches are cut off at their static scores
/// (10 vs 3, pick action 0); at depth 2 the leaves decide (-100 vs 50,
/// pick action 1).
pub fn cutoff_tree() -> TreeState {
    let nodes = vec![
        TreeNode::Branch {
            agent: 0,
            children: vec![1, 2],
            score: 0.0,
        },
        TreeNode::Branch {
            agent: 1,
            children: vec![3],
            score: 0.0,
        },
        TreeNode::Branch {
            agent: 1,
            children: vec![4],
            score: 0.0,
        },
        TreeNode::Branch {
            agent: 0,
            children: vec![5],
            score: 10.0,
        },
        TreeNode::Branch {
            agent: 0,
            children: vec![6],
            score: 3.0,
        },
        TreeNode::Leaf { score: -100.0 },
        TreeNode::Leaf { score: 50.0 },
    ];
    TreeGame {
        nodes,
        num_agents: 2,
    }
    .root()
}

/// Root with no legal action at all, for precondition tests.
pub fn stuck_root() -> TreeState {
    TreeGame {
        nodes: vec![TreeNode::Branch {
            agent: 0,
            children: vec![],
            score: 0.0,
        }],
        num_agents: 2,
    }
    .root()
}
