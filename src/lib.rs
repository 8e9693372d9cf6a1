//! # Bottle Sort Solver Library
//!
//! This library provides the puzzle model for the bottle (water/ball) sorting
//! puzzle and two solvers for it: an exhaustive depth-first search and a
//! heuristic best-first (A*-style) search.
//!
//! A puzzle is a row of containers, each holding a stack of colored items up
//! to a fixed capacity. A move pours the run of same-colored items on top of
//! one container onto another container that is empty or has the same color
//! on top. The puzzle is solved when every container is empty or full of a
//! single color.
//!
//! It is used by two binaries:
//! - `bottle_solver`: Loads a puzzle file and solves it with the chosen algorithm.
//! - `algorithm_evaluator`: Compares both algorithms on seeded random puzzles.
//!
//! ## Modules
//! - `engine`: The puzzle model: `Item`, `Container`, `Move` and `Collection`
//!   (move legality, move generation, canonical state equality).
//! - `heuristics`: The minimum-required-moves estimate used by the A* search.
//! - `solver`: `solve_dfs`, `solve_astar` and the `solve` entry point with search limits.
//! - `utils`: Puzzle parsing from strings, text files and JSON files.
//! - `config`: Solver configuration, loadable from TOML.
//! - `error`: Structured error types.

pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod solver;
pub mod utils;
