//! Distance oracle: a symmetric table of cell-count distances between the
//! entry point and every product pickup, and between every pair of
//! pickups, keyed by id pairs with `"entry"` as a distinguished id.

use std::collections::HashMap;

use tracing::info;

use crate::config::constant::OPTIMIZER_METERS_PER_CELL;
use crate::domain::{Catalog, Cell};
use crate::pathfinding::grid_distance;

pub const ENTRY_ID: &str = "entry";

#[derive(Debug, Clone)]
pub struct DistanceOracle {
    locations: HashMap<String, Cell>,
    distances: HashMap<(String, String), u32>,
}

impl DistanceOracle {
    /// Builds the table from the catalog's warehouse grid and every product
    /// referenced by a unit in the plan request.
    pub fn build(catalog: &Catalog) -> Self {
        let grid = &catalog.warehouse.grid;
        let mut locations = HashMap::new();
        locations.insert(ENTRY_ID.to_string(), catalog.warehouse.entry_point);

        let mut seen_products: Vec<&str> = Vec::new();
        for unit in &catalog.units {
            if !seen_products.contains(&unit.product_id.as_str()) {
                seen_products.push(&unit.product_id);
            }
        }
        for product_id in &seen_products {
            let product = catalog.product(product_id);
            locations.insert(product_id.to_string(), product.pickup_location);
        }

        let mut ids: Vec<String> = locations.keys().cloned().collect();
        ids.sort();

        let mut distances = HashMap::new();
        for from_id in &ids {
            let from_cell = locations[from_id];
            for to_id in &ids {
                let to_cell = locations[to_id];
                let dist = grid_distance(from_cell, to_cell, grid);
                distances.insert((from_id.clone(), to_id.clone()), dist);
            }
        }

        info!(
            locations = ids.len(),
            pairs = distances.len(),
            "distance oracle built"
        );

        DistanceOracle {
            locations,
            distances,
        }
    }

    /// Cell-count distance between two ids (`"entry"` or a product id).
    /// Falls back to Manhattan distance between the raw cells if the ids
    /// were not present at construction time (defensive; never happens for
    /// a catalog built from one consistent request).
    pub fn distance(&self, from_id: &str, to_id: &str) -> u32 {
        if let Some(d) = self
            .distances
            .get(&(from_id.to_string(), to_id.to_string()))
        {
            return *d;
        }
        match (self.locations.get(from_id), self.locations.get(to_id)) {
            (Some(a), Some(b)) => a.manhattan_distance(*b),
            _ => 0,
        }
    }

    pub fn location(&self, id: &str) -> Option<Cell> {
        self.locations.get(id).copied()
    }
}

/// `floor(cells * meters_per_cell / (speed * 60)) + 1`, the optimizer's
/// travel-time conversion. The `+1` guarantees a minimum edge cost of one
/// minute.
pub fn travel_time_minutes(cells: u32, speed_m_per_s: f64) -> u32 {
    let seconds_per_cell = OPTIMIZER_METERS_PER_CELL / (speed_m_per_s * 60.0);
    (cells as f64 * seconds_per_cell).floor() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_time_has_minimum_of_one_minute() {
        assert_eq!(travel_time_minutes(0, 1.5), 1);
    }

    #[test]
    fn travel_time_grows_with_distance() {
        let near = travel_time_minutes(1, 1.0);
        let far = travel_time_minutes(100, 1.0);
        assert!(far > near);
    }
}
