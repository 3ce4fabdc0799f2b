use std::time::Instant;

use clap::Parser;
use glidebox::{
    CancelToken, Levels, SolverOptions, State,
    effects::Effect,
    filters::MoveSequence,
    session::{Session, parse_moves},
    solve,
    solver::{SolveOutcome, Termination},
};
use log::error;

fn describe(effect: &Effect) -> String {
    match *effect {
        Effect::EntityMoved { actor, from, to } => format!("{:?} moved {} -> {}", actor, from, to),
        Effect::TileChanged { pos, from, to } => {
            format!("tile {} changed {} -> {}", pos, from.name(), to.name())
        }
        Effect::BoxFell {
            pos,
            kind,
            player_inside,
        } => {
            if player_inside {
                format!("{} fell into {} with the player inside", kind.name(), pos)
            } else {
                format!("{} fell into {}", kind.name(), pos)
            }
        }
        Effect::PlayerLaunched {
            from,
            to,
            direction,
            distance,
        } => format!("launched {} from {} to {} ({} cells)", direction, from, to, distance),
        Effect::PlayerEnteredBox { kind, pos, entry } => {
            format!("entered {} at {} moving {}", kind.name(), pos, entry)
        }
        Effect::PlayerExitedBox { kind, pos, exit } => {
            format!("left {} at {} moving {}", kind.name(), pos, exit)
        }
        Effect::HeavyNeutral { pos, neutral } => {
            if neutral {
                format!("heavy box at {} turned neutral", pos)
            } else {
                format!("heavy box at {} took a new axis", pos)
            }
        }
        Effect::Bump { pos, direction } => format!("bumped at {} moving {}", pos, direction),
    }
}

fn print_sequence(state: &State, title: &str, sequence: &MoveSequence) {
    println!("\n{} ({} moves): {}", title, sequence.length, sequence.moves);
    println!("Starting position:\n{}", state);

    let dirs = match parse_moves(&sequence.moves) {
        Ok(dirs) => dirs,
        Err(e) => {
            error!("cannot replay {:?}: {}", sequence.moves, e);
            return;
        }
    };
    let mut session = Session::new(state.clone());
    let total = dirs.len();
    for (count, dir) in dirs.into_iter().enumerate() {
        let step = session.apply(dir);
        let effects: Vec<String> = step.effects.iter().map(describe).collect();
        println!(
            "Move {} ({}/{}): {}\n{}",
            dir,
            count + 1,
            total,
            effects.join("; "),
            session.state()
        );
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    nodes_expanded: usize,
    dead_ends: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    options: SolverOptions,
    print_solution: bool,
    print_dead_ends: bool,
    json: bool,
}

fn solve_level(state: &State, opts: SolveOpts) -> LevelStats {
    let start = Instant::now();
    let mut progress = |status: &str| log::debug!("level {}: {}", opts.level_num, status);
    let outcome: SolveOutcome = solve(state, opts.options, CancelToken::new(), &mut progress);
    let elapsed_ms = start.elapsed().as_millis();

    let shortest = outcome.solutions.first();
    let solved_char = match (shortest, outcome.stats.termination) {
        (Some(_), _) => 'Y',
        (None, Termination::Exhausted) => 'X',
        (None, _) => 'N',
    };
    let steps = shortest.map_or(0, |s| s.length);

    if opts.json {
        match serde_json::to_string(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("cannot serialize level {}: {}", opts.level_num, e),
        }
    } else {
        println!(
            "level: {:<3}  solved: {}  steps: {:<5}  solutions: {:<3}  dead ends: {:<4}  states: {:<10}  elapsed: {} ms",
            opts.level_num,
            solved_char,
            steps,
            outcome.solutions.len(),
            outcome.dead_ends.len(),
            outcome.stats.nodes_expanded,
            elapsed_ms
        );
    }

    if opts.print_solution {
        if let Some(solution) = shortest {
            print_sequence(state, "Solution", solution);
        }
    }
    if opts.print_dead_ends {
        for dead_end in &outcome.dead_ends {
            print_sequence(state, "Dead end", dead_end);
        }
    }

    LevelStats {
        solved: shortest.is_some(),
        steps,
        nodes_expanded: outcome.stats.nodes_expanded,
        dead_ends: outcome.dead_ends.len(),
        elapsed_ms,
    }
}

#[derive(Parser)]
#[command(name = "glidebox")]
#[command(about = "An exhaustive solver for box-riding puzzles", long_about = None)]
struct Args {
    /// Path to the levels file (text boards, or JSON documents with a .json extension)
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Level number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the shortest solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Print every dead end step-by-step
    #[arg(long)]
    dead_ends: bool,

    /// Print the full search outcome as JSON
    #[arg(long)]
    json: bool,

    /// Maximum search depth in moves
    #[arg(long, default_value = "100")]
    max_depth: usize,

    /// Maximum number of nodes to expand before giving up
    #[arg(short = 'n', long, default_value = "200000")]
    max_nodes: usize,

    /// Stop after this many solutions
    #[arg(long, default_value = "50")]
    max_solutions: usize,

    /// Seed for state fingerprints (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    let level_end = args.level_end.unwrap_or(args.level_start);

    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;
    if (args.print_solution || args.dead_ends) && num_levels > 1 {
        eprintln!("Error: step-by-step printing only supported when solving a single level");
        std::process::exit(1);
    }

    let options = SolverOptions {
        max_depth: args.max_depth,
        max_nodes: args.max_nodes,
        max_solutions: args.max_solutions,
        seed: args.seed,
        ..SolverOptions::default()
    };

    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_nodes = 0;
    let mut total_dead_ends = 0;
    let mut total_time_ms = 0;

    for (level_num, state) in (args.level_start..=level_end)
        .filter_map(|num| levels.get(num - 1).map(|state| (num, state)))
    {
        let opts = SolveOpts {
            level_num,
            options,
            print_solution: args.print_solution,
            print_dead_ends: args.dead_ends,
            json: args.json,
        };
        let stats = solve_level(state, opts);

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_nodes += stats.nodes_expanded;
        total_dead_ends += stats.dead_ends;
        total_time_ms += stats.elapsed_ms;
    }

    if num_levels > 1 && !args.json {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  dead ends: {:<4}  states: {:<10}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_dead_ends, total_nodes, total_time_ms
        );
    }
}
