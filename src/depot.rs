//! Depot assigner: gives each active agent a unique drop-off cell adjacent
//! to the preparation zone.

use std::collections::HashMap;

use tracing::warn;

use crate::config::constant::DEPOT_POOL_OFFSETS;
use crate::domain::{Cell, NavGrid};

/// Builds the eight-cell pool around `preparation_zone`, excluding it,
/// keeping only cells that are in bounds and traversable.
pub fn default_depot_pool(preparation_zone: Cell, grid: &NavGrid) -> Vec<Cell> {
    DEPOT_POOL_OFFSETS
        .iter()
        .filter_map(|(dx, dy)| {
            let x = preparation_zone.x as i64 + *dx as i64;
            let y = preparation_zone.y as i64 + *dy as i64;
            if x < 1 || y < 1 {
                return None;
            }
            let cell = Cell::new(x as u32, y as u32);
            if grid.is_traversable(cell) {
                Some(cell)
            } else {
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct DepotAssignment {
    pub by_agent: HashMap<String, Cell>,
    /// `true` when the pool was exhausted and one or more agents fell back
    /// to sharing the preparation zone; not fatal.
    pub exhausted: bool,
}

/// Assigns each agent id in `active_agent_ids` (iterated in the given,
/// stable order) the next unused cell from `depot_pool`. Falls back to
/// `preparation_zone` once the pool is exhausted.
pub fn assign_depots(
    active_agent_ids: &[String],
    depot_pool: &[Cell],
    preparation_zone: Cell,
) -> DepotAssignment {
    let mut by_agent = HashMap::new();
    let mut exhausted = false;

    for (i, agent_id) in active_agent_ids.iter().enumerate() {
        let cell = match depot_pool.get(i) {
            Some(cell) => *cell,
            None => {
                exhausted = true;
                preparation_zone
            }
        };
        by_agent.insert(agent_id.clone(), cell);
    }

    if exhausted {
        warn!(
            agents = active_agent_ids.len(),
            pool_size = depot_pool.len(),
            "depot pool exhausted, degrading to shared preparation zone"
        );
    }

    DepotAssignment { by_agent, exhausted }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_unique_depots_when_pool_is_large_enough() {
        let pool = vec![Cell::new(5, 5), Cell::new(6, 5), Cell::new(7, 5)];
        let agents = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = assign_depots(&agents, &pool, Cell::new(6, 4));
        assert!(!result.exhausted);
        let mut assigned: Vec<Cell> = result.by_agent.values().copied().collect();
        assigned.sort();
        let mut expected = pool.clone();
        expected.sort();
        assert_eq!(assigned, expected);
    }

    #[test]
    fn falls_back_to_preparation_zone_when_pool_exhausted() {
        let pool = vec![Cell::new(5, 5)];
        let agents = vec!["a".to_string(), "b".to_string()];
        let prep = Cell::new(6, 4);
        let result = assign_depots(&agents, &pool, prep);
        assert!(result.exhausted);
        assert_eq!(result.by_agent["b"], prep);
    }
}
