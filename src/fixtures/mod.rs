//! Deterministic in-memory catalog builder, used by tests and the CLI's
//! `--demo` mode.
//!
//! A fixed, no-I/O warehouse and catalog construction: this crate's planning
//! inputs are structured JSON, not a flat list of locations, so there is
//! nothing left to generate randomly — only to lay out deterministically.

use std::collections::{HashMap, HashSet};

use crate::depot::default_depot_pool;
use crate::domain::{
    Agent, AgentKind, Catalog, Cell, NavGrid, Order, OrderItem, Priority, Product, ProductUnit,
    Warehouse, Zone, ZoneKind,
};

/// An 11x10 warehouse: entry at the bottom, preparation zone in the
/// middle, one robot-only storage aisle on the left, open storage on the
/// right.
pub fn demo_warehouse() -> Warehouse {
    let grid = NavGrid::new(vec![vec![1; 11]; 10]);
    let entry_point = Cell::new(6, 10);
    let preparation_zone = Cell::new(6, 5);
    let depot_pool = default_depot_pool(preparation_zone, &grid);

    let zones = vec![
        Zone {
            name: "robot_aisle".to_string(),
            kind: ZoneKind::Storage,
            cells: (2..=4).map(|x| Cell::new(x, 3)).collect(),
        },
        Zone {
            name: "open_storage".to_string(),
            kind: ZoneKind::Storage,
            cells: (7..=9).map(|x| Cell::new(x, 3)).collect(),
        },
    ];

    Warehouse {
        width: 11,
        height: 10,
        grid,
        entry_point,
        preparation_zone,
        zones,
        robot_accessible_storage: ["robot_aisle".to_string()].into_iter().collect(),
        depot_pool,
    }
}

/// One robot, two humans and a cart, sized for the default demo fleet.
pub fn demo_agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "robot-1".to_string(),
            kind: AgentKind::Robot,
            capacity_weight_grams: 20_000,
            capacity_volume_dm3: 40,
            speed_m_per_s: 2.0,
            restrictions: Some(crate::domain::RobotRestrictions {
                no_fragile: true,
                max_item_weight_grams: Some(15_000),
            }),
        },
        Agent {
            id: "human-1".to_string(),
            kind: AgentKind::Human,
            capacity_weight_grams: 35_000,
            capacity_volume_dm3: 50,
            speed_m_per_s: 1.5,
            restrictions: None,
        },
        Agent {
            id: "human-2".to_string(),
            kind: AgentKind::Human,
            capacity_weight_grams: 35_000,
            capacity_volume_dm3: 50,
            speed_m_per_s: 1.5,
            restrictions: None,
        },
        Agent {
            id: "cart-1".to_string(),
            kind: AgentKind::Cart,
            capacity_weight_grams: 60_000,
            capacity_volume_dm3: 80,
            speed_m_per_s: 1.3,
            restrictions: None,
        },
    ]
}

/// `num_orders` single-item orders, alternating express/standard priority
/// and alternating between the robot-only aisle and open storage, with
/// deadlines spread evenly across the 8-hour horizon.
pub fn demo_catalog(num_orders: usize) -> Catalog {
    let warehouse = demo_warehouse();
    let mut products = HashMap::new();
    let mut orders = Vec::with_capacity(num_orders);

    for i in 0..num_orders {
        let product_id = format!("product-{i}");
        let in_robot_aisle = i % 3 == 0;
        let x = if in_robot_aisle { 2 + (i as u32 % 3) } else { 7 + (i as u32 % 3) };
        products.insert(
            product_id.clone(),
            Product {
                id: product_id.clone(),
                name: format!("widget {i}"),
                category: "misc".to_string(),
                weight_grams: 1_000 + (i as u64 % 5) * 500,
                volume_dm3: 1 + (i as u64 % 3),
                fragile: i % 7 == 0,
                location: if in_robot_aisle { "robot_aisle".to_string() } else { "open_storage".to_string() },
                pickup_location: Cell::new(x, 3),
                incompatible_with: HashSet::new(),
            },
        );

        let priority = if i % 4 == 0 { Priority::Express } else { Priority::Standard };
        let deadline_minutes = 60 + ((i as u32) * 37) % 400;
        orders.push(Order {
            id: format!("order-{i}"),
            deadline_minutes,
            priority,
            items: vec![OrderItem {
                product_id,
                quantity: 1,
            }],
        });
    }

    let mut units = Vec::with_capacity(orders.len());
    for order in &orders {
        for item in &order.items {
            units.push(ProductUnit {
                index: units.len(),
                unit_id: format!("{}-{}#0", order.id, item.product_id),
                product_id: item.product_id.clone(),
                order_id: order.id.clone(),
                deadline_minutes: order.deadline_minutes,
                priority: order.priority,
            });
        }
    }

    Catalog {
        warehouse,
        products,
        agents: demo_agents(),
        orders,
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_expands_one_unit_per_order() {
        let catalog = demo_catalog(5);
        assert_eq!(catalog.orders.len(), 5);
        assert_eq!(catalog.units.len(), 5);
    }

    #[test]
    fn demo_catalog_is_deterministic_across_calls() {
        let a = demo_catalog(8);
        let b = demo_catalog(8);
        assert_eq!(a.units.len(), b.units.len());
        assert_eq!(a.orders[3].deadline_minutes, b.orders[3].deadline_minutes);
    }
}
