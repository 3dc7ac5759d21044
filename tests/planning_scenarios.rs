//! End-to-end planning scenarios (black-box, asserting on domain structs
//! rather than on printed output).

use std::collections::{HashMap, HashSet};

use warehouse_tour_planner::config::PlannerParams;
use warehouse_tour_planner::depot::default_depot_pool;
use warehouse_tour_planner::domain::{
    Agent, AgentKind, Catalog, Cell, NavGrid, Order, OrderItem, Priority, Product, ProductUnit,
    RobotRestrictions, Warehouse, Zone, ZoneKind,
};
use warehouse_tour_planner::{plan, PlanStatus};

fn base_warehouse() -> Warehouse {
    let grid = NavGrid::new(vec![vec![1; 11]; 10]);
    let entry_point = Cell::new(6, 10);
    let preparation_zone = Cell::new(6, 5);
    let depot_pool = default_depot_pool(preparation_zone, &grid);
    Warehouse {
        width: 11,
        height: 10,
        grid,
        entry_point,
        preparation_zone,
        zones: vec![],
        robot_accessible_storage: HashSet::new(),
        depot_pool,
    }
}

fn human(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        kind: AgentKind::Human,
        capacity_weight_grams: 35_000,
        capacity_volume_dm3: 50,
        speed_m_per_s: 1.5,
        restrictions: None,
    }
}

fn robot(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        kind: AgentKind::Robot,
        capacity_weight_grams: 20_000,
        capacity_volume_dm3: 40,
        speed_m_per_s: 2.0,
        restrictions: Some(RobotRestrictions {
            no_fragile: true,
            max_item_weight_grams: Some(15_000),
        }),
    }
}

fn product(id: &str, weight_grams: u64, location: &str, pickup: Cell) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        category: "misc".to_string(),
        weight_grams,
        volume_dm3: 1,
        fragile: false,
        location: location.to_string(),
        pickup_location: pickup,
        incompatible_with: HashSet::new(),
    }
}

fn unit(index: usize, product_id: &str, order_id: &str, deadline_minutes: u32, priority: Priority) -> ProductUnit {
    ProductUnit {
        index,
        unit_id: format!("{order_id}-{product_id}#{index}"),
        product_id: product_id.to_string(),
        order_id: order_id.to_string(),
        deadline_minutes,
        priority,
    }
}

/// Empty orders.
#[test]
fn empty_orders_yields_a_trivially_successful_empty_plan() {
    let catalog = Catalog {
        warehouse: base_warehouse(),
        products: HashMap::new(),
        agents: vec![human("H1")],
        orders: vec![],
        units: vec![],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    assert_eq!(result.report.makespan_minutes, 0);
    assert_eq!(result.report.total_cost, 0.0);
    assert!(result.plan.agent_routes.values().all(|r| r.picks.is_empty()));
}

/// One trivial order assigned to the only human, one trip, within
/// deadline.
#[test]
fn single_trivial_order_is_assigned_to_the_only_agent() {
    let mut products = HashMap::new();
    products.insert("widget".to_string(), product("widget", 2_000, "open_storage", Cell::new(3, 3)));

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![human("H1")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 180,
            priority: Priority::Standard,
            items: vec![OrderItem { product_id: "widget".to_string(), quantity: 1 }],
        }],
        units: vec![unit(0, "widget", "O1", 180, Priority::Standard)],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    let route = &result.plan.agent_routes["H1"];
    assert_eq!(route.picks.len(), 1);
    assert_eq!(route.trip_numbers(), vec![1]);
    assert!(route.picks[0].visit_time_minutes <= 180);
    assert!(result.report.makespan_minutes <= 180);
}

/// A unit in robot-accessible storage must go to the robot even though
/// a cheaper/faster human is also available.
#[test]
fn robot_accessible_storage_forces_a_robot_assignment() {
    let mut warehouse = base_warehouse();
    warehouse.robot_accessible_storage.insert("robot_aisle".to_string());

    let mut products = HashMap::new();
    products.insert("gizmo".to_string(), product("gizmo", 2_000, "robot_aisle", Cell::new(3, 3)));

    let catalog = Catalog {
        warehouse,
        products,
        agents: vec![human("H1"), robot("R1")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 200,
            priority: Priority::Standard,
            items: vec![OrderItem { product_id: "gizmo".to_string(), quantity: 1 }],
        }],
        units: vec![unit(0, "gizmo", "O1", 200, Priority::Standard)],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    assert!(result.plan.agent_routes.get("R1").is_some_and(|r| !r.picks.is_empty()));
    assert!(result.plan.agent_routes.get("H1").is_none_or(|r| r.picks.is_empty()));
}

/// Three 15kg units against a 20kg capacity force at least two trips.
#[test]
fn capacity_overflow_forces_multiple_trips() {
    let mut products = HashMap::new();
    products.insert("crate".to_string(), product("crate", 15_000, "open_storage", Cell::new(3, 3)));

    let units: Vec<ProductUnit> = (0..3).map(|i| unit(i, "crate", "O1", 400, Priority::Standard)).collect();

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![Agent {
            id: "H1".to_string(),
            kind: AgentKind::Human,
            capacity_weight_grams: 20_000,
            capacity_volume_dm3: 50,
            speed_m_per_s: 1.5,
            restrictions: None,
        }],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Standard,
            items: vec![OrderItem { product_id: "crate".to_string(), quantity: 3 }],
        }],
        units,
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    let route = &result.plan.agent_routes["H1"];
    assert_eq!(route.picks.len(), 3);
    assert!(route.trip_numbers().len() >= 2, "three 15kg units in a 20kg agent must need >=2 trips");

    for trip in route.trip_numbers() {
        let weight: u64 = route.picks_in_trip(trip).map(|_| 15_000u64).sum();
        assert!(weight <= 20_000);
    }
}

/// Mutually incompatible units may share an agent but never a trip.
#[test]
fn incompatible_units_never_share_a_trip() {
    let mut products = HashMap::new();
    let mut a = product("a", 1_000, "open_storage", Cell::new(3, 3));
    let mut b = product("b", 1_000, "open_storage", Cell::new(4, 3));
    a.incompatible_with.insert("b".to_string());
    b.incompatible_with.insert("a".to_string());
    products.insert("a".to_string(), a);
    products.insert("b".to_string(), b);

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![human("H1")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Standard,
            items: vec![
                OrderItem { product_id: "a".to_string(), quantity: 1 },
                OrderItem { product_id: "b".to_string(), quantity: 1 },
            ],
        }],
        units: vec![
            unit(0, "a", "O1", 400, Priority::Standard),
            unit(1, "b", "O1", 400, Priority::Standard),
        ],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    let route = &result.plan.agent_routes["H1"];
    assert_eq!(route.picks.len(), 2);
    let trip_of = |idx: usize| route.picks.iter().find(|p| p.unit_index == idx).unwrap().trip;
    assert_ne!(trip_of(0), trip_of(1));
}

/// Express units always finish strictly before standard units on the
/// same agent.
#[test]
fn express_units_strictly_precede_standard_units_on_the_same_agent() {
    let mut products = HashMap::new();
    products.insert("fast".to_string(), product("fast", 1_000, "open_storage", Cell::new(3, 3)));
    products.insert("slow".to_string(), product("slow", 1_000, "open_storage", Cell::new(4, 3)));

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![human("H1")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Express,
            items: vec![OrderItem { product_id: "fast".to_string(), quantity: 1 }],
        }],
        units: vec![
            unit(0, "fast", "O1", 400, Priority::Express),
            unit(1, "slow", "O1", 400, Priority::Standard),
        ],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    let route = &result.plan.agent_routes["H1"];
    let express_time = route.picks.iter().find(|p| p.unit_index == 0).unwrap().visit_time_minutes;
    let standard_time = route.picks.iter().find(|p| p.unit_index == 1).unwrap().visit_time_minutes;
    assert!(express_time < standard_time);
}

/// Two agents whose trajectories would otherwise collide converge to a
/// collision-free schedule.
#[test]
fn colliding_agents_resolve_to_zero_residual_collisions() {
    let mut products = HashMap::new();
    products.insert("p1".to_string(), product("p1", 1_000, "open_storage", Cell::new(3, 3)));
    products.insert("p2".to_string(), product("p2", 1_000, "open_storage", Cell::new(3, 3)));

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![human("H1"), human("H2")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Standard,
            items: vec![
                OrderItem { product_id: "p1".to_string(), quantity: 1 },
                OrderItem { product_id: "p2".to_string(), quantity: 1 },
            ],
        }],
        units: vec![
            unit(0, "p1", "O1", 400, Priority::Standard),
            unit(1, "p2", "O1", 400, Priority::Standard),
        ],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    assert!(result.collision_report.residual_collisions.is_empty());
}

/// A cart can only be active when paired with exactly one human, and that
/// human is never paired with more than one cart.
#[test]
fn active_carts_are_paired_with_exactly_one_human() {
    let mut products = HashMap::new();
    products.insert("heavy".to_string(), product("heavy", 1_000, "open_storage", Cell::new(3, 3)));

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![
            human("H1"),
            Agent {
                id: "cart-1".to_string(),
                kind: AgentKind::Cart,
                capacity_weight_grams: 60_000,
                capacity_volume_dm3: 80,
                speed_m_per_s: 1.3,
                restrictions: None,
            },
        ],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Standard,
            items: vec![OrderItem { product_id: "heavy".to_string(), quantity: 1 }],
        }],
        units: vec![unit(0, "heavy", "O1", 400, Priority::Standard)],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    if result.plan.agent_routes.get("cart-1").is_some_and(|r| !r.picks.is_empty()) {
        let paired_humans: Vec<&String> = result
            .plan
            .human_to_cart
            .iter()
            .filter(|(_, cart)| cart.as_str() == "cart-1")
            .map(|(human, _)| human)
            .collect();
        assert_eq!(paired_humans.len(), 1);
    }
    let mut seen_carts: HashSet<&String> = HashSet::new();
    for cart in result.plan.human_to_cart.values() {
        assert!(seen_carts.insert(cart), "a cart must not be paired with more than one human");
    }
}

/// Every active agent's depot cell is unique when the pool has enough
/// capacity.
#[test]
fn active_agents_get_unique_depots() {
    let mut products = HashMap::new();
    products.insert("a".to_string(), product("a", 1_000, "open_storage", Cell::new(3, 3)));
    products.insert("b".to_string(), product("b", 1_000, "open_storage", Cell::new(4, 3)));

    let catalog = Catalog {
        warehouse: base_warehouse(),
        products,
        agents: vec![human("H1"), human("H2")],
        orders: vec![Order {
            id: "O1".to_string(),
            deadline_minutes: 400,
            priority: Priority::Standard,
            items: vec![
                OrderItem { product_id: "a".to_string(), quantity: 1 },
                OrderItem { product_id: "b".to_string(), quantity: 1 },
            ],
        }],
        units: vec![
            unit(0, "a", "O1", 400, Priority::Standard),
            unit(1, "b", "O1", 400, Priority::Standard),
        ],
    };

    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);
    let depots: Vec<Cell> = result.depots.by_agent.values().copied().collect();
    let unique: HashSet<Cell> = depots.iter().copied().collect();
    assert_eq!(depots.len(), unique.len());
}

/// Using the deterministic demo fixture end-to-end, exercising the full
/// catalog loader-free pipeline with a more realistic fleet/order mix.
#[test]
fn demo_catalog_plans_successfully_and_assigns_every_unit() {
    let catalog = warehouse_tour_planner::fixtures::demo_catalog(12);
    let result = plan(&catalog, &PlannerParams::default()).unwrap();
    assert_eq!(result.status, PlanStatus::Success);

    let assigned_units: usize = result.plan.agent_routes.values().map(|r| r.picks.len()).sum();
    assert_eq!(assigned_units, catalog.units.len());

    for unit in &catalog.units {
        let product = catalog.product(&unit.product_id);
        if catalog.warehouse.is_robot_accessible(&product.location) {
            let carried_by_robot = result.plan.agent_routes.iter().any(|(agent_id, route)| {
                route.picks.iter().any(|p| p.unit_index == unit.index)
                    && catalog.agents.iter().any(|a| &a.id == agent_id && a.kind == AgentKind::Robot)
            });
            assert!(carried_by_robot, "unit {} must be carried by a robot", unit.unit_id);
        }
    }
}
