//! Catalog loading: parses the warehouse/products/agents/orders JSON
//! catalogs into the typed domain model.
//!
//! This has no algorithmic depth by design — it exists so the crate can be
//! exercised end-to-end from fixtures on disk.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::types::{
    Agent, AgentKind, Catalog, Cell, NavGrid, Order, OrderItem, Priority, Product, ProductUnit,
    RobotRestrictions, Warehouse, Zone, ZoneKind,
};
use crate::error::{PlanError, Result};

#[derive(Debug, Deserialize)]
struct WarehouseDims {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneJson {
    kind: ZoneKind,
    coords: Vec<[u32; 2]>,
}

#[derive(Debug, Deserialize)]
struct WarehouseJson {
    dimensions: WarehouseDims,
    entry_point: [u32; 2],
    preparation_zone: [u32; 2],
    zones: HashMap<String, ZoneJson>,
    navigation_grid: Vec<Vec<u8>>,
    #[serde(default)]
    robot_accessible_storage: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProductJson {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    weight: f64,
    #[serde(default)]
    volume: u64,
    #[serde(default)]
    fragile: bool,
    location: String,
    pickup_location: [u32; 2],
    #[serde(default)]
    incompatible_with: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AgentKindJson {
    Robot,
    Human,
    Cart,
}

#[derive(Debug, Deserialize, Default)]
struct RestrictionsJson {
    #[serde(default)]
    no_fragile: bool,
    #[serde(default)]
    max_item_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AgentJson {
    id: String,
    #[serde(rename = "type")]
    kind: AgentKindJson,
    capacity_weight: f64,
    capacity_volume: u64,
    speed: f64,
    #[serde(default)]
    restrictions: Option<RestrictionsJson>,
}

#[derive(Debug, Deserialize)]
struct OrderItemJson {
    product_id: String,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct OrderJson {
    id: String,
    deadline: String,
    priority: Priority,
    items: Vec<OrderItemJson>,
}

/// Converts a kilogram weight to whole grams, matching the data model's
/// choice of internal integer-gram units for exact capacity arithmetic.
pub(crate) fn kg_to_grams(kg: f64) -> u64 {
    (kg * 1000.0).round() as u64
}

/// Parses `"HH:MM"` into minutes since midnight.
fn parse_deadline(deadline: &str) -> Result<u32> {
    let (h, m) = deadline
        .split_once(':')
        .ok_or_else(|| PlanError::InvalidInput(format!("malformed deadline {deadline:?}")))?;
    let h: u32 = h
        .parse()
        .map_err(|_| PlanError::InvalidInput(format!("malformed deadline {deadline:?}")))?;
    let m: u32 = m
        .parse()
        .map_err(|_| PlanError::InvalidInput(format!("malformed deadline {deadline:?}")))?;
    Ok(h * 60 + m)
}

/// Converts minutes since `start_hour:00` back to an `"HH:MM"` string, using
/// `chrono` for the formatting.
pub fn minutes_to_clock(start_hour: u32, minutes_since_start: u32) -> String {
    let total = start_hour * 60 + minutes_since_start;
    let naive = chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        + chrono::Duration::minutes(total as i64 % (24 * 60));
    naive.format("%H:%M").to_string()
}

fn build_warehouse(raw: WarehouseJson) -> Result<Warehouse> {
    let grid = NavGrid::new(raw.navigation_grid);
    let entry_point = Cell::new(raw.entry_point[0], raw.entry_point[1]);
    let preparation_zone = Cell::new(raw.preparation_zone[0], raw.preparation_zone[1]);

    if !grid.is_traversable(entry_point) {
        return Err(PlanError::InvalidInput(format!(
            "entry point {entry_point:?} is not traversable"
        )));
    }
    if !grid.in_bounds(preparation_zone) {
        return Err(PlanError::InvalidInput(format!(
            "preparation zone {preparation_zone:?} is out of bounds"
        )));
    }

    let mut zones = Vec::with_capacity(raw.zones.len());
    for (name, zone) in raw.zones {
        zones.push(Zone {
            name,
            kind: zone.kind,
            cells: zone.coords.into_iter().map(|[x, y]| Cell::new(x, y)).collect(),
        });
    }
    zones.sort_by(|a, b| a.name.cmp(&b.name));

    let depot_pool = crate::depot::default_depot_pool(preparation_zone, &grid);
    if depot_pool.is_empty() {
        return Err(PlanError::InvalidInput(format!(
            "depot pool is empty around preparation zone {preparation_zone:?}"
        )));
    }

    Ok(Warehouse {
        width: raw.dimensions.width,
        height: raw.dimensions.height,
        grid,
        entry_point,
        preparation_zone,
        zones,
        robot_accessible_storage: raw.robot_accessible_storage.into_iter().collect(),
        depot_pool,
    })
}

fn build_products(raw: Vec<ProductJson>) -> HashMap<String, Product> {
    raw.into_iter()
        .map(|p| {
            (
                p.id.clone(),
                Product {
                    id: p.id,
                    name: p.name,
                    category: p.category,
                    weight_grams: kg_to_grams(p.weight),
                    volume_dm3: p.volume,
                    fragile: p.fragile,
                    location: p.location,
                    pickup_location: Cell::new(p.pickup_location[0], p.pickup_location[1]),
                    incompatible_with: p.incompatible_with.into_iter().collect(),
                },
            )
        })
        .collect()
}

fn build_agents(raw: Vec<AgentJson>) -> Vec<Agent> {
    raw.into_iter()
        .map(|a| {
            let kind = match a.kind {
                AgentKindJson::Robot => AgentKind::Robot,
                AgentKindJson::Human => AgentKind::Human,
                AgentKindJson::Cart => AgentKind::Cart,
            };
            let restrictions = a.restrictions.map(|r| RobotRestrictions {
                no_fragile: r.no_fragile,
                max_item_weight_grams: r.max_item_weight.map(kg_to_grams),
            });
            Agent {
                id: a.id,
                kind,
                capacity_weight_grams: kg_to_grams(a.capacity_weight),
                capacity_volume_dm3: a.capacity_volume,
                speed_m_per_s: a.speed,
                restrictions,
            }
        })
        .collect()
}

fn build_orders(raw: Vec<OrderJson>) -> Result<Vec<Order>> {
    raw.into_iter()
        .map(|o| {
            Ok(Order {
                id: o.id,
                deadline_minutes: parse_deadline(&o.deadline)?,
                priority: o.priority,
                items: o
                    .items
                    .into_iter()
                    .map(|i| OrderItem {
                        product_id: i.product_id,
                        quantity: i.quantity,
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Expands every order item's quantity into individual [`ProductUnit`]s.
fn expand_units(orders: &[Order]) -> Vec<ProductUnit> {
    let mut units = Vec::new();
    for order in orders {
        for item in &order.items {
            for seq in 0..item.quantity {
                let index = units.len();
                units.push(ProductUnit {
                    index,
                    unit_id: format!("{}-{}#{}", order.id, item.product_id, seq),
                    product_id: item.product_id.clone(),
                    order_id: order.id.clone(),
                    deadline_minutes: order.deadline_minutes,
                    priority: order.priority,
                });
            }
        }
    }
    units
}

/// Loads a catalog from four JSON files in `dir`:
/// `warehouse.json`, `products.json`, `agents.json`, `orders.json`.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog> {
    let warehouse_raw: WarehouseJson = read_json(&dir.join("warehouse.json"))?;
    let products_raw: Vec<ProductJson> = read_json(&dir.join("products.json"))?;
    let agents_raw: Vec<AgentJson> = read_json(&dir.join("agents.json"))?;
    let orders_raw: Vec<OrderJson> = read_json(&dir.join("orders.json"))?;

    let warehouse = build_warehouse(warehouse_raw)?;
    let products = build_products(products_raw);
    let agents = build_agents(agents_raw);
    let orders = build_orders(orders_raw)?;
    let units = expand_units(&orders);

    info!(
        products = products.len(),
        agents = agents.len(),
        orders = orders.len(),
        units = units.len(),
        "catalog loaded"
    );

    validate_catalog(&warehouse, &products, &units)?;

    Ok(Catalog {
        warehouse,
        products,
        agents,
        orders,
        units,
    })
}

fn validate_catalog(
    warehouse: &Warehouse,
    products: &HashMap<String, Product>,
    units: &[ProductUnit],
) -> Result<()> {
    for unit in units {
        let product = products.get(&unit.product_id).ok_or_else(|| {
            PlanError::InvalidInput(format!(
                "order {} references unknown product {}",
                unit.order_id, unit.product_id
            ))
        })?;
        if !warehouse.grid.is_traversable(product.pickup_location) {
            return Err(PlanError::InvalidInput(format!(
                "product {} pickup location {:?} is not traversable",
                product.id, product.pickup_location
            )));
        }
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
