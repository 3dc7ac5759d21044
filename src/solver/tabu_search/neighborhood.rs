//! Candidate move generation for the local-search loop: relocating the last
//! picked unit off one of the currently worst-finishing ("bottleneck")
//! agents onto whichever other compatible agent can take it.
//!
//! Scores every candidate relocation in parallel via rayon, generalized to
//! this problem's move shape: relocating a unit across agents/trips rather
//! than swapping two positions within one shared route.

use rayon::prelude::*;

use crate::config::Timing;
use crate::distance::DistanceOracle;
use crate::domain::Catalog;
use crate::solver::tabu_search::construction::compatible_and_feasible;
use crate::solver::types::{compute_visit_times, Placement, WorkingSolution};

#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub unit_index: usize,
    pub from_agent: usize,
    pub to_agent: usize,
    pub placement: Placement,
    pub resulting_visit_time: u32,
}

/// How many of the worst-finishing active agents are considered as
/// relocation sources per round. This is a min-max objective, so only the
/// current bottleneck(s) can possibly improve the makespan.
const BOTTLENECK_CANDIDATES: usize = 3;

fn agent_finish_time(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &WorkingSolution,
    agent_index: usize,
    timing: Timing,
) -> u32 {
    let state = &solution.agent_states[agent_index];
    let agent = &catalog.agents[agent_index];
    let times = compute_visit_times(catalog, oracle, agent.speed_m_per_s, &state.trips, timing);
    times.iter().flatten().max().copied().unwrap_or(0)
}

fn bottleneck_agents(catalog: &Catalog, oracle: &DistanceOracle, solution: &WorkingSolution, timing: Timing) -> Vec<usize> {
    let mut finish_times: Vec<(usize, u32)> = solution
        .agent_states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_active())
        .map(|(i, _)| (i, agent_finish_time(catalog, oracle, solution, i, timing)))
        .collect();
    finish_times.sort_by_key(|&(i, t)| (std::cmp::Reverse(t), i));
    finish_times.into_iter().take(BOTTLENECK_CANDIDATES).map(|(i, _)| i).collect()
}

/// Generates relocate moves for the last-picked unit of each bottleneck
/// agent's last trip, evaluated against every other agent in parallel.
pub fn find_relocation_moves(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &WorkingSolution,
    timing: Timing,
) -> Vec<Move> {
    let sources = bottleneck_agents(catalog, oracle, solution, timing);

    sources
        .par_iter()
        .flat_map(|&from_agent| {
            let state = &solution.agent_states[from_agent];
            let Some(last_trip) = state.trips.last() else {
                return Vec::new();
            };
            let Some(&unit_index) = last_trip.unit_indices.last() else {
                return Vec::new();
            };

            (0..catalog.agents.len())
                .into_par_iter()
                .filter(|&to_agent| to_agent != from_agent)
                .filter_map(|to_agent| {
                    compatible_and_feasible(catalog, oracle, solution, to_agent, unit_index, timing).map(
                        |(placement, resulting_visit_time)| Move {
                            unit_index,
                            from_agent,
                            to_agent,
                            placement,
                            resulting_visit_time,
                        },
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
