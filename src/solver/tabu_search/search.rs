//! Main tabu-search loop: construct an initial solution, then alternate
//! relocate moves targeting the current bottleneck agent with periodic ALNS
//! repair and random diversification, until the wall-clock budget runs out
//! or the iteration cap is reached.
//!
//! Construct once, then loop swap-neighbourhood search with tabu
//! bookkeeping, scheduled rollback/steer-to-best mutation, and scheduled
//! final mutation, generalized to this problem: the neighbourhood is
//! relocate-from-bottleneck instead of swap, and the scheduled mutations
//! are ALNS repair and random relocation.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, span, Level};

use crate::config::{PlannerParams, Timing};
use crate::distance::DistanceOracle;
use crate::domain::Catalog;
use crate::solver::tabu_search::construction::construct_initial;
use crate::solver::tabu_search::diversification::perturb;
use crate::solver::tabu_search::neighborhood::find_relocation_moves;
use crate::solver::tabu_search::repair::alns_destroy_and_repair;
use crate::solver::tabu_search::tabu::{choose_best_move, TabuList};
use crate::solver::types::{append_unit, remove_unit, WorkingSolution};

/// How many non-improving iterations trigger a random perturbation.
const STAGNATION_PERTURB_THRESHOLD: u32 = 25;
/// Tabu tenure, in relocations.
const TABU_TENURE: usize = 12;
/// Makespan-minutes margin used by the aspiration criterion.
const ASPIRATION_MARGIN_MINUTES: u32 = 5;

pub enum SolveOutcome {
    /// A solution was found; `unresolved_units` lists anything that could
    /// not be placed on any agent at all (capacity/zone/deadline
    /// infeasible in every combination tried).
    Feasible {
        solution: WorkingSolution,
        unresolved_units: Vec<usize>,
        /// `(iteration, makespan)` recorded every time local search beats its
        /// prior best, for [`save_best_so_far_csv`].
        best_so_far_history: Vec<(u32, u32)>,
    },
    /// Nothing could be constructed at all (e.g. no compatible agents).
    Infeasible { unresolved_units: Vec<usize> },
}

/// Writes the best-so-far makespan history to a CSV file. Opt-in: the CLI
/// calls this when asked to, the library never writes to disk on its own.
pub fn save_best_so_far_csv(history: &[(u32, u32)], path: &std::path::Path) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["iteration", "best_so_far_makespan_minutes"])?;
    for (iteration, makespan) in history {
        writer.write_record([iteration.to_string(), makespan.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Runs construction followed by the tabu-search local search loop within
/// `params`' time and iteration budget.
pub fn solve(catalog: &Catalog, oracle: &DistanceOracle, params: &PlannerParams) -> SolveOutcome {
    if let Some(workers) = std::num::NonZeroUsize::new(params.num_search_workers) {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .build_global();
    }

    let loop_span = span!(Level::INFO, "tabu_search", max_iterations = params.max_iterations);
    let _guard = loop_span.enter();

    let timing = params.timing();

    let construction = construct_initial(catalog, oracle, timing);
    if construction.solution.agent_states.iter().all(|s| !s.is_active()) && !construction.unresolved_units.is_empty() {
        info!(count = construction.unresolved_units.len(), "construction placed nothing");
        return SolveOutcome::Infeasible {
            unresolved_units: construction.unresolved_units,
        };
    }

    let mut solution = construction.solution;
    let mut unresolved_units = construction.unresolved_units;
    if !unresolved_units.is_empty() {
        unresolved_units = alns_destroy_and_repair(catalog, oracle, &mut solution, &unresolved_units, timing);
    }

    let budget = Duration::from_secs(params.time_budget_seconds(catalog.units.len()));
    let deadline = Instant::now() + budget;

    let mut rng = ChaCha8Rng::seed_from_u64(params.random_seed);
    let mut tabu_list = TabuList::new(TABU_TENURE);
    let mut best_makespan = solution.makespan(catalog, oracle, timing);
    let mut best_solution = solution.clone();
    let mut stagnation = 0u32;
    let mut best_so_far_history = vec![(0u32, best_makespan)];

    let mut iteration = 0u32;
    while iteration < params.max_iterations && Instant::now() < deadline {
        iteration += 1;
        let iter_span = span!(Level::DEBUG, "iteration", iter = iteration);
        let _iter_guard = iter_span.enter();

        let moves = find_relocation_moves(catalog, oracle, &solution, timing);
        let Some(chosen) = choose_best_move(&moves, &tabu_list, best_makespan, ASPIRATION_MARGIN_MINUTES) else {
            stagnation += 1;
            if stagnation >= STAGNATION_PERTURB_THRESHOLD {
                perturb(catalog, oracle, &mut solution, &mut rng, timing);
                stagnation = 0;
            }
            continue;
        };

        remove_unit(&mut solution.agent_states[chosen.from_agent], catalog, oracle, chosen.unit_index, timing);
        let to_agent = &catalog.agents[chosen.to_agent];
        solution.pair_cart(catalog, to_agent);
        let to_agent = &catalog.agents[chosen.to_agent];
        let to_state = &mut solution.agent_states[chosen.to_agent];
        append_unit(
            catalog,
            oracle,
            to_agent,
            to_state,
            chosen.unit_index,
            chosen.placement,
            chosen.resulting_visit_time,
        );
        tabu_list.insert(chosen.unit_index);

        let makespan = solution.makespan(catalog, oracle, timing);
        if makespan < best_makespan {
            debug!(iteration, makespan, "new best makespan");
            best_makespan = makespan;
            best_solution = solution.clone();
            best_so_far_history.push((iteration, makespan));
            stagnation = 0;
        } else {
            stagnation += 1;
            if stagnation >= STAGNATION_PERTURB_THRESHOLD {
                perturb(catalog, oracle, &mut solution, &mut rng, timing);
                stagnation = 0;
            }
        }
    }

    info!(iterations = iteration, best_makespan, "tabu search finished");

    SolveOutcome::Feasible {
        solution: best_solution,
        unresolved_units,
        best_so_far_history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_so_far_csv_has_a_header_and_one_row_per_entry() {
        let path = std::env::temp_dir().join(format!("best_so_far_{}.csv", std::process::id()));
        let history = vec![(0u32, 120u32), (5, 95), (12, 80)];

        save_best_so_far_csv(&history, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "iteration,best_so_far_makespan_minutes");
        assert_eq!(lines.len(), 1 + history.len());
        assert_eq!(lines[2], "5,95");
    }
}
