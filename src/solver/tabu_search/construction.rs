//! Greedy initial construction: places every product unit on the agent and
//! placement (same trip / new trip) that lets it be visited earliest,
//! subject to capacity, zone-access, incompatibility and priority-ordering
//! feasibility. Express units are placed before standard ones so no trip
//! ever picks a standard unit ahead of an express one (see
//! [`crate::solver::types::AgentPlanState::has_standard`]).
//!
//! A single-pass nearest-feasible insertion, generalized from one vehicle
//! dimension to the agent/trip/capacity/priority problem here.

use crate::config::Timing;
use crate::distance::DistanceOracle;
use crate::domain::{Catalog, Priority};
use crate::solver::types::{append_unit, evaluate_placement, AgentPlanState, Placement, WorkingSolution};

pub struct ConstructionResult {
    pub solution: WorkingSolution,
    /// Unit indices that no agent could take within deadline/capacity/zone
    /// constraints. Non-empty means the instance is infeasible.
    pub unresolved_units: Vec<usize>,
}

fn compatible_agent_indices(catalog: &Catalog, solution: &WorkingSolution, unit_index: usize) -> Vec<usize> {
    let unit = catalog.unit(unit_index);
    let product = catalog.product(&unit.product_id);
    catalog
        .agents
        .iter()
        .enumerate()
        .filter(|(_, agent)| agent.can_handle(product, &catalog.warehouse))
        .filter(|(_, agent)| solution.can_use_cart(catalog, agent))
        .map(|(i, _)| i)
        .collect()
}

/// Finds the best feasible `(agent_index, placement, visit_time)` for
/// `unit_index` against the agent states as they currently stand, without
/// mutating `solution`. Ties break on agent id for determinism.
pub fn best_placement(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &WorkingSolution,
    unit_index: usize,
    timing: Timing,
) -> Option<(usize, Placement, u32)> {
    let mut best: Option<(usize, Placement, u32)> = None;
    for agent_index in compatible_agent_indices(catalog, solution, unit_index) {
        let agent = &catalog.agents[agent_index];
        let state = &solution.agent_states[agent_index];

        for placement in [Placement::SameTrip, Placement::NewTrip] {
            if let Some(visit_time) = evaluate_placement(catalog, oracle, agent, state, unit_index, placement, timing) {
                let better = match &best {
                    None => true,
                    Some((_, _, best_time)) => {
                        visit_time < *best_time
                            || (visit_time == *best_time
                                && agent.id < catalog.agents[best.as_ref().unwrap().0].id)
                    }
                };
                if better {
                    best = Some((agent_index, placement, visit_time));
                }
            }
        }
    }
    best
}

/// Checks whether `to_agent` can take `unit_index` right now, preferring
/// `SameTrip` over `NewTrip` when both are feasible (cheaper: no extra depot
/// detour). Used by the local-search neighborhood to probe a relocation
/// target without committing to it.
pub fn compatible_and_feasible(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &WorkingSolution,
    to_agent: usize,
    unit_index: usize,
    timing: Timing,
) -> Option<(Placement, u32)> {
    let unit = catalog.unit(unit_index);
    let product = catalog.product(&unit.product_id);
    let agent = &catalog.agents[to_agent];
    if !agent.can_handle(product, &catalog.warehouse) {
        return None;
    }
    if !solution.can_use_cart(catalog, agent) {
        return None;
    }
    let state = &solution.agent_states[to_agent];
    for placement in [Placement::SameTrip, Placement::NewTrip] {
        if let Some(visit_time) = evaluate_placement(catalog, oracle, agent, state, unit_index, placement, timing) {
            return Some((placement, visit_time));
        }
    }
    None
}

/// Commits `unit_index` to the best feasible placement found, pairing a cart
/// with a human first if that's what was chosen. Returns `false` (and
/// leaves `solution` untouched) when no agent can take the unit at all.
pub fn place_unit(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &mut WorkingSolution,
    unit_index: usize,
    timing: Timing,
) -> bool {
    let Some((agent_index, placement, visit_time)) = best_placement(catalog, oracle, solution, unit_index, timing) else {
        return false;
    };
    let agent = &catalog.agents[agent_index];
    solution.pair_cart(catalog, agent);
    let agent = &catalog.agents[agent_index];
    let state: &mut AgentPlanState = &mut solution.agent_states[agent_index];
    append_unit(catalog, oracle, agent, state, unit_index, placement, visit_time);
    true
}

/// Processing order for construction: express units before standard ones
/// (required for the express-before-standard ordering to hold by
/// construction), tightest deadline first within each priority class, unit
/// index as a final deterministic tiebreak.
pub fn construction_order(catalog: &Catalog) -> Vec<usize> {
    let mut order: Vec<usize> = (0..catalog.units.len()).collect();
    order.sort_by_key(|&i| {
        let unit = catalog.unit(i);
        (unit.priority != Priority::Express, unit.deadline_minutes, i)
    });
    order
}

pub fn construct_initial(catalog: &Catalog, oracle: &DistanceOracle, timing: Timing) -> ConstructionResult {
    let mut solution = WorkingSolution::new(catalog.agents.len());
    let mut unresolved_units = Vec::new();

    for unit_index in construction_order(catalog) {
        if !place_unit(catalog, oracle, &mut solution, unit_index, timing) {
            unresolved_units.push(unit_index);
        }
    }

    ConstructionResult {
        solution,
        unresolved_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Agent, AgentKind, Cell, NavGrid, Order, OrderItem, Priority as P, Product, ProductUnit, Warehouse,
    };
    use std::collections::{HashMap, HashSet};

    fn simple_catalog() -> Catalog {
        let grid = NavGrid::new(vec![vec![1; 11]; 10]);
        let mut products = HashMap::new();
        products.insert(
            "widget".to_string(),
            Product {
                id: "widget".to_string(),
                name: "widget".to_string(),
                category: "misc".to_string(),
                weight_grams: 1_000,
                volume_dm3: 1,
                fragile: false,
                location: "storage".to_string(),
                pickup_location: Cell::new(3, 3),
                incompatible_with: HashSet::new(),
            },
        );
        let orders = vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 180,
            priority: P::Standard,
            items: vec![OrderItem {
                product_id: "widget".to_string(),
                quantity: 1,
            }],
        }];
        let units = vec![ProductUnit {
            index: 0,
            unit_id: "O1-widget#0".to_string(),
            product_id: "widget".to_string(),
            order_id: "O1".to_string(),
            deadline_minutes: 180,
            priority: P::Standard,
        }];
        Catalog {
            warehouse: Warehouse {
                width: 11,
                height: 10,
                grid,
                entry_point: Cell::new(6, 10),
                preparation_zone: Cell::new(6, 5),
                zones: vec![],
                robot_accessible_storage: HashSet::new(),
                depot_pool: vec![Cell::new(7, 5)],
            },
            products,
            agents: vec![Agent {
                id: "H1".to_string(),
                kind: AgentKind::Human,
                capacity_weight_grams: 35_000,
                capacity_volume_dm3: 50,
                speed_m_per_s: 1.5,
                restrictions: None,
            }],
            orders,
            units,
        }
    }

    #[test]
    fn single_unit_is_placed_on_the_only_compatible_agent() {
        let catalog = simple_catalog();
        let oracle = DistanceOracle::build(&catalog);
        let result = construct_initial(&catalog, &oracle, Timing::default());
        assert!(result.unresolved_units.is_empty());
        assert!(result.solution.agent_states[0].is_active());
    }
}
