//! ALNS-style destroy and repair: when a unit can't be placed anywhere
//! during construction, frees room on the busiest compatible agent's trip
//! and retries, then best-effort reinserts whatever it displaced.
//!
//! Destroy targets the busiest *trip* of an agent compatible with the stuck
//! unit (ranked via [`crate::domain::solution::trip_loads_by_excess`]), and
//! repair is a best-effort reinsertion through the same feasibility check
//! construction uses.

use crate::config::Timing;
use crate::distance::DistanceOracle;
use crate::domain::solution::trip_loads_by_excess;
use crate::domain::Catalog;
use crate::solver::tabu_search::construction::place_unit;
use crate::solver::types::{remove_unit, WorkingSolution};

/// Attempts to place every unit in `unresolved_units`, displacing the
/// trailing unit of the busiest compatible agent's trip when necessary.
/// Displaced units are reinserted best-effort afterwards. Returns whatever
/// remains unplaceable.
pub fn alns_destroy_and_repair(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &mut WorkingSolution,
    unresolved_units: &[usize],
    timing: Timing,
) -> Vec<usize> {
    let mut displaced = Vec::new();
    let mut still_stuck = Vec::new();

    for &unit_index in unresolved_units {
        if place_unit(catalog, oracle, solution, unit_index, timing) {
            continue;
        }

        let product = catalog.product(&catalog.unit(unit_index).product_id);
        let plan = solution.to_plan(catalog, oracle, timing);
        let loads = trip_loads_by_excess(&catalog.agents, &plan.agent_routes, catalog);

        let target = loads.into_iter().find(|load| {
            let agent = &catalog.agents[load.agent_index];
            agent.can_handle(product, &catalog.warehouse)
                && solution.agent_states[load.agent_index]
                    .trips
                    .iter()
                    .any(|t| t.trip == load.trip && !t.unit_indices.is_empty())
        });

        let Some(target) = target else {
            still_stuck.push(unit_index);
            continue;
        };

        let state = &mut solution.agent_states[target.agent_index];
        let evicted = state
            .trips
            .iter()
            .find(|t| t.trip == target.trip)
            .and_then(|t| t.unit_indices.last().copied());

        let Some(evicted) = evicted else {
            still_stuck.push(unit_index);
            continue;
        };

        remove_unit(state, catalog, oracle, evicted, timing);
        displaced.push(evicted);

        if !place_unit(catalog, oracle, solution, unit_index, timing) {
            still_stuck.push(unit_index);
        }
    }

    for unit_index in displaced {
        if !place_unit(catalog, oracle, solution, unit_index, timing) {
            still_stuck.push(unit_index);
        }
    }

    still_stuck
}
