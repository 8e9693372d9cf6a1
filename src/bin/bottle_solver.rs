use bottle_sort_solver::config::SolverConfig;
use bottle_sort_solver::engine::Collection;
use bottle_sort_solver::solver::{solve, Algorithm, SearchOutcome};
use bottle_sort_solver::utils::load_collection;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file (.json or .txt)
    puzzle: PathBuf,

    /// Search algorithm: DFS or A*. Prompted for when omitted.
    #[clap(short, long)]
    algorithm: Option<Algorithm>,

    /// Container capacity for puzzles that do not set one
    #[clap(short, long)]
    capacity: Option<usize>,

    /// Maximum number of states to expand
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Time limit for the search, in seconds
    #[clap(long)]
    time_limit: Option<u64>,

    /// Path to a TOML configuration file
    #[clap(long)]
    config: Option<PathBuf>,
}

fn prompt_algorithm() -> Result<Algorithm, String> {
    loop {
        print!("Algorithm, please type DFS or A*: ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| format!("Error reading input: {}", e))?;
        if read == 0 {
            return Err("No algorithm given.".to_string());
        }
        match input.parse() {
            Ok(algorithm) => return Ok(algorithm),
            Err(e) => println!("{}", e),
        }
    }
}

fn build_config(args: &Args) -> Result<SolverConfig, String> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path).map_err(|e| e.to_string())?,
        None => SolverConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.default_capacity = capacity;
    }
    if args.max_expansions.is_some() {
        config.max_expansions = args.max_expansions;
    }
    if args.time_limit.is_some() {
        config.time_limit_secs = args.time_limit;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn print_result(start: &Collection, outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Solved(solution) => {
            println!("Solved in {} moves\n", solution.moves.len());
            println!("{}\n", solution.collection);
            if solution.moves.is_empty() {
                println!("No moves needed.");
            } else {
                for (i, mv) in solution.moves.iter().enumerate() {
                    println!("  Move {}: {}", i + 1, mv);
                }
            }
        }
        SearchOutcome::Unsolvable { .. } => {
            println!("Cannot be solved :(");
            println!("\n{}", start);
        }
        SearchOutcome::LimitReached { expanded } => {
            println!("Search stopped after expanding {} states without a solution.", expanded);
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = build_config(&args)?;
    let start = load_collection(&args.puzzle, config.default_capacity)
        .map_err(|e| format!("Invalid PUZZLE: {}", e))?;
    println!("Here is the input:\n");
    println!("{}\n", start);

    let algorithm = match args.algorithm {
        Some(algorithm) => algorithm,
        None => prompt_algorithm()?,
    };
    println!("Searching using {}\n", algorithm);

    let started = Instant::now();
    let outcome = solve(&start, algorithm, &config.limits());
    let elapsed = started.elapsed();

    print_result(&start, &outcome);
    println!(
        "\nExpanded {} states in {:.3}s",
        outcome.expanded(),
        elapsed.as_secs_f64()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
