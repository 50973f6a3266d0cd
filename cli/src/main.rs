//! gridmind CLI - Demo harness for the decision cores
//!
//! `gridmind values` runs a value-iteration schedule over a bundled grid
//! world and prints the value table and greedy policy. `gridmind play` runs
//! a pursuit episode where the agent picks moves with game-tree search and
//! the ghosts follow their chase rule.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gridmind_engine::game::GameState;
use gridmind_engine::heuristic::{score_evaluation, tactical_evaluation};
use gridmind_engine::mdp::{Schedule, ValueIteration};
use gridmind_engine::search::{choose_action, Strategy};
use gridmind_models::{GridAction, GridState, Gridworld, PursuitState};
use log::info;

#[derive(Parser)]
#[command(name = "gridmind", version, about = "Grid-world decision core demos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run value iteration over a grid world and print values and policy.
    Values {
        #[arg(long, value_enum, default_value_t = GridArg::Book)]
        grid: GridArg,
        #[arg(long, default_value_t = 0.9)]
        discount: f64,
        #[arg(long, default_value_t = 100)]
        iterations: usize,
        #[arg(long, value_enum, default_value_t = ScheduleArg::Sync)]
        schedule: ScheduleArg,
        /// Convergence threshold for the sweep schedule.
        #[arg(long, default_value_t = 1e-5)]
        theta: f64,
        /// Slip probability for noisy movement.
        #[arg(long, default_value_t = 0.2)]
        noise: f64,
    },
    /// Play a pursuit episode with game-tree search.
    Play {
        #[arg(long, default_value_t = 2)]
        depth: usize,
        #[arg(long, value_enum, default_value_t = StrategyArg::Expectimax)]
        strategy: StrategyArg,
        #[arg(long, value_enum, default_value_t = EvalArg::Tactical)]
        eval: EvalArg,
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GridArg {
    Book,
    Bridge,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScheduleArg {
    Sync,
    Cyclic,
    Sweep,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Minimax,
    Alphabeta,
    Expectimax,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Minimax => Strategy::Minimax,
            StrategyArg::Alphabeta => Strategy::AlphaBeta,
            StrategyArg::Expectimax => Strategy::Expectimax,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EvalArg {
    /// Raw game score.
    Score,
    /// Food-, ghost-, and capsule-aware heuristic.
    Tactical,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Values {
            grid,
            discount,
            iterations,
            schedule,
            theta,
            noise,
        } => run_values(grid, discount, iterations, schedule, theta, noise),
        Command::Play {
            depth,
            strategy,
            eval,
            max_steps,
        } => run_play(depth, strategy.into(), eval, max_steps),
    }
}

fn run_values(
    grid: GridArg,
    discount: f64,
    iterations: usize,
    schedule: ScheduleArg,
    theta: f64,
    noise: f64,
) -> Result<()> {
    let grid = match grid {
        GridArg::Book => Gridworld::book_grid(),
        GridArg::Bridge => Gridworld::bridge_grid(),
    }
    .with_noise(noise);
    let schedule = match schedule {
        ScheduleArg::Sync => Schedule::Synchronous,
        ScheduleArg::Cyclic => Schedule::Cyclic,
        ScheduleArg::Sweep => Schedule::Prioritized { theta },
    };
    info!(
        "value iteration: {:?}, discount {}, {} iterations",
        schedule, discount, iterations
    );

    let width = grid.width();
    let height = grid.height();
    let solver = ValueIteration::new(grid.clone(), discount, iterations, schedule)?;

    println!("Values:");
    for y in (0..height).rev() {
        for x in 0..width {
            if grid.is_wall(x, y) {
                print!("   ####  ");
            } else {
                print!(" {:8.3}", solver.value(&GridState::Cell(x, y)));
            }
        }
        println!();
    }

    println!("Policy:");
    for y in (0..height).rev() {
        for x in 0..width {
            let glyph = if grid.is_wall(x, y) {
                '#'
            } else {
                match solver.policy(&GridState::Cell(x, y)) {
                    Some(GridAction::North) => '^',
                    Some(GridAction::South) => 'v',
                    Some(GridAction::East) => '>',
                    Some(GridAction::West) => '<',
                    Some(GridAction::Exit) => 'x',
                    None => ' ',
                }
            };
            print!(" {}", glyph);
        }
        println!();
    }
    Ok(())
}

fn run_play(depth: usize, strategy: Strategy, eval: EvalArg, max_steps: usize) -> Result<()> {
    let eval: fn(&PursuitState) -> f64 = match eval {
        EvalArg::Score => score_evaluation::<PursuitState>,
        EvalArg::Tactical => tactical_evaluation::<PursuitState>,
    };

    let mut state = PursuitState::classic();
    let mut steps = 0;
    while state.outcome().is_none() && steps < max_steps {
        let action = choose_action(&state, depth, &eval, strategy)?;
        println!(
            "step {:3}: {:?} at {:?}, score {:.0}",
            steps,
            action,
            state.agent(),
            state.score()
        );
        state = state.successor(0, &action);

        for agent in 1..state.num_agents() {
            if state.outcome().is_some() {
                break;
            }
            let ghost_move = state.chase_move(agent - 1);
            state = state.successor(agent, &ghost_move);
        }
        steps += 1;
    }

    match state.outcome() {
        Some(outcome) => println!("{:?} after {} steps, final score {:.0}", outcome, steps, state.score()),
        None => println!("stopped after {} steps, score {:.0}", steps, state.score()),
    }
    Ok(())
}
