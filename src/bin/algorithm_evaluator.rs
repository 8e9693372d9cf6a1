use bottle_sort_solver::engine::Collection;
use bottle_sort_solver::solver::{solve, Algorithm, SearchLimits, SearchOutcome};
use clap::Parser;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare DFS and A* on seeded random puzzles", long_about = None)]
struct Args {
    /// Number of random puzzles to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: u64,

    /// Seed of the first puzzle; later puzzles use consecutive seeds
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of colors (full containers) per puzzle
    #[clap(long, default_value_t = 4)]
    colors: usize,

    /// Container capacity
    #[clap(long, default_value_t = 4)]
    capacity: usize,

    /// Number of extra empty containers
    #[clap(long, default_value_t = 2)]
    empty: usize,

    /// Maximum number of states each search may expand
    #[clap(long, default_value_t = 1_000_000)]
    max_expansions: usize,
}

#[derive(Default)]
struct Tally {
    solved: u32,
    unsolvable: u32,
    limited: u32,
    total_moves: usize,
    total_expanded: usize,
    total_secs: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let limits = SearchLimits {
        max_expansions: Some(args.max_expansions),
        deadline: None,
    };
    let algorithms = [Algorithm::Dfs, Algorithm::AStar];
    let mut tallies: Vec<Tally> = algorithms.iter().map(|_| Tally::default()).collect();

    println!("Starting algorithm evaluation for {} puzzles...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx;
        let puzzle = match Collection::new_random_with_seed(
            args.colors,
            args.capacity,
            args.empty,
            current_seed,
        ) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        };
        println!("\nEvaluating Puzzle {} (Seed: {})", board_idx, current_seed);

        for (algorithm, tally) in algorithms.iter().zip(tallies.iter_mut()) {
            let started = Instant::now();
            let outcome = solve(&puzzle, *algorithm, &limits);
            let secs = started.elapsed().as_secs_f64();
            tally.total_expanded += outcome.expanded();
            tally.total_secs += secs;

            let moves = match &outcome {
                SearchOutcome::Solved(solution) => {
                    tally.solved += 1;
                    tally.total_moves += solution.moves.len();
                    solution.moves.len().to_string()
                }
                SearchOutcome::Unsolvable { .. } => {
                    tally.unsolvable += 1;
                    "unsolvable".to_string()
                }
                SearchOutcome::LimitReached { .. } => {
                    tally.limited += 1;
                    "limit".to_string()
                }
            };
            println!(
                "  Algorithm: {:<20} Moves: {:<10} Expanded: {:<10} Time: {:.3}s",
                algorithm.to_string(),
                moves,
                outcome.expanded(),
                secs
            );
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of puzzles evaluated: {}", args.boards);
    println!("\n--- Averages ---");
    for (algorithm, tally) in algorithms.iter().zip(tallies.iter()) {
        let avg_moves = if tally.solved > 0 {
            tally.total_moves as f64 / tally.solved as f64
        } else {
            0.0
        };
        let runs = args.boards.max(1) as f64;
        println!(
            "{:<20}: solved {}, unsolvable {}, limit {}, avg moves {:.2}, avg expanded {:.1}, avg time {:.3}s",
            algorithm.to_string(),
            tally.solved,
            tally.unsolvable,
            tally.limited,
            avg_moves,
            tally.total_expanded as f64 / runs,
            tally.total_secs / runs
        );
    }
}
