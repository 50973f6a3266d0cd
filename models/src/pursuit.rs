//! Grid pursuit game: one controlled agent, chasing ghosts, food, capsules
//!
//! A compact pellet-collection game that gives the search core something
//! real to chew on. Agent 0 moves around a walled grid collecting pellets;
//! ghosts are the opposing agents. Eating a capsule scares every ghost for a
//! fixed number of ghost moves. The game is won when the last pellet is
//! eaten and lost on contact with an active ghost.
//!
//! Scoring: -1 per agent move, +10 per pellet, +200 per eaten scared ghost,
//! +500 on a win, -500 on a loss.
//!
//! Layouts parse from ASCII maps: `%` wall, `.` pellet, `o` capsule, `P`
//! agent start, `G` ghost start, space empty. The bottom text row is y = 0.

use gridmind_engine::game::{AgentIndex, GameState};
use gridmind_engine::heuristic::{manhattan, GhostInfo, Perception, Position};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Ghost moves a capsule keeps ghosts scared for.
const SCARE_DURATION: u32 = 40;
const STEP_PENALTY: f64 = 1.0;
const PELLET_BONUS: f64 = 10.0;
const GHOST_BONUS: f64 = 200.0;
const WIN_BONUS: f64 = 500.0;
const LOSS_PENALTY: f64 = 500.0;

/// Movement action; `Stop` is always legal for the controlled agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    North,
    South,
    East,
    West,
    Stop,
}

impl Move {
    fn delta(self) -> (i32, i32) {
        match self {
            Move::North => (0, 1),
            Move::South => (0, -1),
            Move::East => (1, 0),
            Move::West => (-1, 0),
            Move::Stop => (0, 0),
        }
    }

    /// The four real directions, in tie-break order.
    const DIRECTIONS: [Move; 4] = [Move::North, Move::South, Move::East, Move::West];
}

/// Static board geometry, shared by every state of one game.
#[derive(Debug)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    walls: BTreeSet<Position>,
}

impl Layout {
    pub fn is_wall(&self, position: Position) -> bool {
        self.walls.contains(&position)
    }
}

/// A ghost: current position, spawn cell, and scared countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub position: Position,
    pub home: Position,
    pub scared_timer: u32,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

/// Full game state. Cloning is cheap: the layout is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PursuitState {
    layout: Arc<Layout>,
    agent: Position,
    ghosts: Vec<Ghost>,
    food: BTreeSet<Position>,
    capsules: Vec<Position>,
    score: f64,
    outcome: Option<Outcome>,
}

impl PursuitState {
    /// Parse an ASCII layout. Panics on maps without a `P`, so only call
    /// this on literal layouts.
    pub fn parse(map: &str) -> Self {
        let lines: Vec<&str> = map.lines().filter(|line| !line.trim().is_empty()).collect();
        let height = lines.len() as i32;
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0) as i32;

        let mut walls = BTreeSet::new();
        let mut food = BTreeSet::new();
        let mut capsules = Vec::new();
        let mut ghosts = Vec::new();
        let mut agent = None;

        for (row, line) in lines.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (col, symbol) in line.chars().enumerate() {
                let position = (col as i32, y);
                match symbol {
                    '%' => {
                        walls.insert(position);
                    }
                    '.' => {
                        food.insert(position);
                    }
                    'o' => capsules.push(position),
                    'P' => agent = Some(position),
                    'G' => ghosts.push(Ghost {
                        position,
                        home: position,
                        scared_timer: 0,
                    }),
                    _ => {}
                }
            }
        }

        debug!(
            "parsed {}x{} layout: {} pellets, {} capsules, {} ghosts",
            width,
            height,
            food.len(),
            capsules.len(),
            ghosts.len()
        );
        PursuitState {
            layout: Arc::new(Layout {
                width,
                height,
                walls,
            }),
            agent: agent.expect("layout needs a P cell"),
            ghosts,
            food,
            capsules,
            score: 0.0,
            outcome: None,
        }
    }

    /// Small two-ghost board used by the demo CLI and tests.
    pub fn classic() -> Self {
        PursuitState::parse(
            "%%%%%%%%\n\
             %P.. o.%\n\
             %.%%.%.%\n\
             %..G..G%\n\
             %%%%%%%%",
        )
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    fn target(&self, from: Position, mv: Move) -> Position {
        let (dx, dy) = mv.delta();
        (from.0 + dx, from.1 + dy)
    }

    fn open(&self, position: Position) -> bool {
        position.0 >= 0
            && position.0 < self.layout.width
            && position.1 >= 0
            && position.1 < self.layout.height
            && !self.layout.is_wall(position)
    }

    /// Directions a ghost can take from `from`; `Stop` only when boxed in.
    fn ghost_moves(&self, from: Position) -> Vec<Move> {
        let moves: Vec<Move> = Move::DIRECTIONS
            .iter()
            .copied()
            .filter(|mv| self.open(self.target(from, *mv)))
            .collect();
        if moves.is_empty() {
            vec![Move::Stop]
        } else {
            moves
        }
    }

    /// Resolve the agent landing on (or a ghost landing on the agent's)
    /// square. Scared ghosts are eaten and sent home; active ghosts end
    /// the game.
    fn resolve_contact(&mut self) {
        for i in 0..self.ghosts.len() {
            if self.ghosts[i].position != self.agent || self.outcome.is_some() {
                continue;
            }
            if self.ghosts[i].scared_timer > 0 {
                self.score += GHOST_BONUS;
                self.ghosts[i].position = self.ghosts[i].home;
                self.ghosts[i].scared_timer = 0;
            } else {
                self.score -= LOSS_PENALTY;
                self.outcome = Some(Outcome::Lose);
            }
        }
    }

    /// Deterministic ghost behavior for episode playback: chase the agent,
    /// flee while scared, first direction wins ties. The search itself never
    /// uses this; it models ghosts through the game tree instead.
    pub fn chase_move(&self, ghost_index: usize) -> Move {
        let ghost = &self.ghosts[ghost_index];
        let mut best = Move::Stop;
        let mut best_distance = f64::NEG_INFINITY;
        for mv in self.ghost_moves(ghost.position) {
            let distance = manhattan(self.target(ghost.position, mv), self.agent);
            let keyed = if ghost.scared_timer > 0 {
                distance
            } else {
                -distance
            };
            if keyed > best_distance {
                best_distance = keyed;
                best = mv;
            }
        }
        best
    }
}

impl GameState for PursuitState {
    type Action = Move;

    fn legal_actions(&self, agent: AgentIndex) -> Vec<Move> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        if agent == 0 {
            let mut moves: Vec<Move> = Move::DIRECTIONS
                .iter()
                .copied()
                .filter(|mv| self.open(self.target(self.agent, *mv)))
                .collect();
            moves.push(Move::Stop);
            moves
        } else {
            self.ghost_moves(self.ghosts[agent - 1].position)
        }
    }

    fn successor(&self, agent: AgentIndex, action: &Move) -> Self {
        let mut next = self.clone();
        if agent == 0 {
            let landing = next.target(next.agent, *action);
            if next.open(landing) {
                next.agent = landing;
            }
            next.score -= STEP_PENALTY;
            if next.food.remove(&next.agent) {
                next.score += PELLET_BONUS;
                if next.food.is_empty() {
                    next.score += WIN_BONUS;
                    next.outcome = Some(Outcome::Win);
                }
            }
            if let Some(i) = next.capsules.iter().position(|&c| c == next.agent) {
                next.capsules.remove(i);
                for ghost in &mut next.ghosts {
                    ghost.scared_timer = SCARE_DURATION;
                }
            }
            next.resolve_contact();
        } else {
            let position = next.ghosts[agent - 1].position;
            let landing = next.target(position, *action);
            let landing = if next.open(landing) { landing } else { position };
            let ghost = &mut next.ghosts[agent - 1];
            ghost.position = landing;
            ghost.scared_timer = ghost.scared_timer.saturating_sub(1);
            next.resolve_contact();
        }
        next
    }

    fn num_agents(&self) -> usize {
        1 + self.ghosts.len()
    }

    fn is_win(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    fn is_lose(&self) -> bool {
        self.outcome == Some(Outcome::Lose)
    }

    fn score(&self) -> f64 {
        self.score
    }
}

impl Perception for PursuitState {
    fn score(&self) -> f64 {
        self.score
    }

    fn agent_position(&self) -> Position {
        self.agent
    }

    fn food(&self) -> Vec<Position> {
        self.food.iter().copied().collect()
    }

    fn food_count(&self) -> usize {
        self.food.len()
    }

    fn ghosts(&self) -> Vec<GhostInfo> {
        self.ghosts
            .iter()
            .map(|ghost| GhostInfo {
                position: ghost.position,
                scared_timer: ghost.scared_timer,
            })
            .collect()
    }

    fn capsules(&self) -> Vec<Position> {
        self.capsules.clone()
    }
}
