pub mod tabu_search;
pub mod types;

pub use tabu_search::search::{save_best_so_far_csv, solve, SolveOutcome};
