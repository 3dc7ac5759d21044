//! Random diversification: occasionally relocates a randomly chosen placed
//! unit to shake the search out of a local optimum, on a schedule.
//!
//! A segment-reversal/3-opt-style shuffle adapted to this problem's
//! representation: pick a random placed unit, remove it, and let
//! construction's own placement search choose where it lands next.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::config::Timing;
use crate::distance::DistanceOracle;
use crate::domain::Catalog;
use crate::solver::tabu_search::construction::place_unit;
use crate::solver::types::{remove_unit, WorkingSolution};

/// Relocates one randomly chosen placed unit elsewhere. Returns `true` when
/// a unit was actually moved (a no-op, reported as `false`, can happen on an
/// empty solution).
pub fn perturb(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    solution: &mut WorkingSolution,
    rng: &mut ChaCha8Rng,
    timing: Timing,
) -> bool {
    let placed_units: Vec<usize> = solution
        .agent_states
        .iter()
        .flat_map(|s| s.trips.iter().flat_map(|t| t.unit_indices.iter().copied()))
        .collect();
    let Some(&unit_index) = placed_units.choose(rng) else {
        return false;
    };

    let from_agent = solution
        .agent_states
        .iter()
        .position(|s| s.trips.iter().any(|t| t.unit_indices.contains(&unit_index)));
    let Some(from_agent) = from_agent else {
        return false;
    };

    remove_unit(&mut solution.agent_states[from_agent], catalog, oracle, unit_index, timing);
    // Best-effort: if nothing can take the unit back (shouldn't happen since
    // it fit somewhere a moment ago), it is simply dropped from the working
    // solution and will show up as unresolved in the final plan.
    place_unit(catalog, oracle, solution, unit_index, timing);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Agent, AgentKind, Cell, NavGrid, Priority, Product, ProductUnit, Warehouse};
    use crate::solver::tabu_search::construction::construct_initial;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn catalog() -> Catalog {
        let grid = NavGrid::new(vec![vec![1; 11]; 10]);
        let mut products = HashMap::new();
        products.insert(
            "p".to_string(),
            Product {
                id: "p".to_string(),
                name: "p".to_string(),
                category: "misc".to_string(),
                weight_grams: 1_000,
                volume_dm3: 1,
                fragile: false,
                location: "storage".to_string(),
                pickup_location: Cell::new(3, 3),
                incompatible_with: HashSet::new(),
            },
        );
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
            orders: vec![],
            units: vec![ProductUnit {
                index: 0,
                unit_id: "u0".to_string(),
                product_id: "p".to_string(),
                order_id: "O1".to_string(),
                deadline_minutes: 400,
                priority: Priority::Standard,
            }],
        }
    }

    #[test]
    fn perturb_keeps_the_unit_placed_somewhere() {
        let catalog = catalog();
        let oracle = DistanceOracle::build(&catalog);
        let mut result = construct_initial(&catalog, &oracle, Timing::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(perturb(&catalog, &oracle, &mut result.solution, &mut rng, Timing::default()));
        assert!(result.solution.agent_states[0].is_active());
    }
}
