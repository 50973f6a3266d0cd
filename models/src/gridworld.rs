//! Stochastic grid-world MDP
//!
//! The classic textbook grid: an agent moves between non-wall cells, each
//! move goes in the intended direction with probability `1 - noise` and
//! slips to either perpendicular direction with probability `noise / 2`;
//! blocked moves leave the agent in place. Cells carrying an exit reward
//! offer only the `Exit` action, which pays the reward and moves to a single
//! absorbing sink state. Every other move pays the living reward.

use gridmind_engine::mdp::MdpModel;
use std::collections::{HashMap, HashSet};

/// A grid cell, or the absorbing sink reached through `Exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridState {
    Cell(i32, i32),
    Sink,
}

/// Movement actions plus the exit from reward cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAction {
    North,
    South,
    East,
    West,
    Exit,
}

impl GridAction {
    /// Unit displacement, y pointing up. `Exit` does not displace.
    fn delta(self) -> (i32, i32) {
        match self {
            GridAction::North => (0, 1),
            GridAction::South => (0, -1),
            GridAction::East => (1, 0),
            GridAction::West => (-1, 0),
            GridAction::Exit => (0, 0),
        }
    }

    /// The two directions a noisy move can slip to.
    fn perpendicular(self) -> [GridAction; 2] {
        match self {
            GridAction::North | GridAction::South => [GridAction::East, GridAction::West],
            GridAction::East | GridAction::West => [GridAction::North, GridAction::South],
            GridAction::Exit => unreachable!("Exit moves deterministically"),
        }
    }
}

/// Grid-world model parameters.
#[derive(Debug, Clone)]
pub struct Gridworld {
    width: i32,
    height: i32,
    walls: HashSet<(i32, i32)>,
    exits: HashMap<(i32, i32), f64>,
    noise: f64,
    living_reward: f64,
    start: (i32, i32),
}

impl Gridworld {
    pub fn new(
        width: i32,
        height: i32,
        walls: HashSet<(i32, i32)>,
        exits: HashMap<(i32, i32), f64>,
        start: (i32, i32),
    ) -> Self {
        Gridworld {
            width,
            height,
            walls,
            exits,
            noise: 0.2,
            living_reward: 0.0,
            start,
        }
    }

    /// Override the slip probability (default 0.2).
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Override the per-move reward (default 0.0).
    pub fn with_living_reward(mut self, living_reward: f64) -> Self {
        self.living_reward = living_reward;
        self
    }

    /// The 4x3 grid from the textbook: a wall in the middle, +1 and -1
    /// exits in the east column, start in the southwest corner.
    pub fn book_grid() -> Self {
        Gridworld::new(
            4,
            3,
            HashSet::from([(1, 1)]),
            HashMap::from([((3, 2), 1.0), ((3, 1), -1.0)]),
            (0, 0),
        )
    }

    /// A narrow bridge between a small and a large payoff, flanked by
    /// steep-penalty exits.
    pub fn bridge_grid() -> Self {
        let mut exits = HashMap::from([((0, 1), 1.0), ((6, 1), 10.0)]);
        for x in 1..=5 {
            exits.insert((x, 0), -100.0);
            exits.insert((x, 2), -100.0);
        }
        Gridworld::new(
            7,
            3,
            HashSet::from([(0, 0), (6, 0), (0, 2), (6, 2)]),
            exits,
            (1, 1),
        )
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> GridState {
        GridState::Cell(self.start.0, self.start.1)
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.walls.contains(&(x, y))
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Where a move from `(x, y)` actually lands: blocked moves stay put.
    fn step(&self, x: i32, y: i32, action: GridAction) -> (i32, i32) {
        let (dx, dy) = action.delta();
        let (nx, ny) = (x + dx, y + dy);
        if self.in_bounds(nx, ny) && !self.is_wall(nx, ny) {
            (nx, ny)
        } else {
            (x, y)
        }
    }

    /// Accumulate `probability` onto `next`, merging duplicate outcomes so
    /// the returned distribution has one entry per distinct state.
    fn accumulate(outcomes: &mut Vec<(GridState, f64)>, next: GridState, probability: f64) {
        for (state, p) in outcomes.iter_mut() {
            if *state == next {
                *p += probability;
                return;
            }
        }
        outcomes.push((next, probability));
    }
}

impl MdpModel for Gridworld {
    type State = GridState;
    type Action = GridAction;

    fn states(&self) -> Vec<GridState> {
        let mut states = vec![GridState::Sink];
        for x in 0..self.width {
            for y in 0..self.height {
                if !self.is_wall(x, y) {
                    states.push(GridState::Cell(x, y));
                }
            }
        }
        states
    }

    fn actions(&self, state: &GridState) -> Vec<GridAction> {
        match state {
            GridState::Sink => Vec::new(),
            GridState::Cell(x, y) if self.exits.contains_key(&(*x, *y)) => {
                vec![GridAction::Exit]
            }
            GridState::Cell(..) => vec![
                GridAction::North,
                GridAction::South,
                GridAction::East,
                GridAction::West,
            ],
        }
    }

    fn transitions(&self, state: &GridState, action: &GridAction) -> Vec<(GridState, f64)> {
        let (x, y) = match state {
            GridState::Sink => return Vec::new(),
            GridState::Cell(x, y) => (*x, *y),
        };
        if *action == GridAction::Exit {
            return vec![(GridState::Sink, 1.0)];
        }

        let mut outcomes = Vec::with_capacity(3);
        let (ix, iy) = self.step(x, y, *action);
        Self::accumulate(&mut outcomes, GridState::Cell(ix, iy), 1.0 - self.noise);
        for slip in action.perpendicular() {
            let (sx, sy) = self.step(x, y, slip);
            Self::accumulate(&mut outcomes, GridState::Cell(sx, sy), self.noise / 2.0);
        }
        outcomes
    }

    fn reward(&self, state: &GridState, action: &GridAction, _next: &GridState) -> f64 {
        match state {
            GridState::Sink => 0.0,
            GridState::Cell(x, y) => {
                if *action == GridAction::Exit {
                    self.exits.get(&(*x, *y)).copied().unwrap_or(0.0)
                } else {
                    self.living_reward
                }
            }
        }
    }

    fn is_terminal(&self, state: &GridState) -> bool {
        matches!(state, GridState::Sink)
    }
}
