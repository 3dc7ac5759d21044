//! Typed domain records.
//!
//! The source keeps products, agents, orders and plans as dynamically keyed
//! tables; here every one of those is a tagged record with explicit fields,
//! and agent kind dispatch goes through [`AgentKind`] rather than string
//! comparison.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A 1-based grid coordinate, `x in [1, W]`, `y in [1, H]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Cell { x, y }
    }

    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(u32, u32)> for Cell {
    fn from((x, y): (u32, u32)) -> Self {
        Cell { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Passage,
    Storage,
    Pickup,
    Refrigerated,
    Preparation,
    EntryExit,
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub name: String,
    pub kind: ZoneKind,
    pub cells: Vec<Cell>,
}

/// Dense navigation grid: `rows[0]` corresponds to `y = height`.
#[derive(Debug, Clone)]
pub struct NavGrid {
    pub width: u32,
    pub height: u32,
    rows: Vec<Vec<u8>>,
}

impl NavGrid {
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        NavGrid {
            width,
            height,
            rows,
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 1 && cell.x <= self.width && cell.y >= 1 && cell.y <= self.height
    }

    /// `true` when `cell` is traversable. Out-of-bounds cells are never
    /// traversable.
    pub fn is_traversable(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        let row = self.height - cell.y;
        let col = cell.x - 1;
        self.rows[row as usize][col as usize] == 1
    }

    /// Returns a grid clamped/padded to `(new_width, new_height)`: cells
    /// within the original bounds keep their traversability, cells newly
    /// added by growing the grid default to blocked. Used to honor a
    /// warehouse width/height override without guessing at unseen layout.
    pub fn resized(&self, new_width: u32, new_height: u32) -> NavGrid {
        let mut rows = vec![vec![0u8; new_width as usize]; new_height as usize];
        for (new_row_index, row) in rows.iter_mut().enumerate() {
            let y = new_height - new_row_index as u32;
            if y < 1 || y > self.height {
                continue;
            }
            let old_row_index = (self.height - y) as usize;
            for (col_index, cell) in row.iter_mut().enumerate() {
                let x = col_index as u32 + 1;
                if x >= 1 && x <= self.width {
                    *cell = self.rows[old_row_index][(x - 1) as usize];
                }
            }
        }
        NavGrid::new(rows)
    }
}

#[derive(Debug, Clone)]
pub struct Warehouse {
    pub width: u32,
    pub height: u32,
    pub grid: NavGrid,
    pub entry_point: Cell,
    pub preparation_zone: Cell,
    pub zones: Vec<Zone>,
    /// Names of storage zones that robots may enter; units located there
    /// must be carried by a robot.
    pub robot_accessible_storage: HashSet<String>,
    /// Cells adjacent to `preparation_zone`, excluding it, used as unique
    /// per-agent drop-off cells.
    pub depot_pool: Vec<Cell>,
}

impl Warehouse {
    pub fn zone_named(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn is_robot_accessible(&self, zone_name: &str) -> bool {
        self.robot_accessible_storage.contains(zone_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Robot,
    Human,
    Cart,
}

#[derive(Debug, Clone, Default)]
pub struct RobotRestrictions {
    pub no_fragile: bool,
    pub max_item_weight_grams: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: String,
    pub kind: AgentKind,
    pub capacity_weight_grams: u64,
    pub capacity_volume_dm3: u64,
    pub speed_m_per_s: f64,
    pub restrictions: Option<RobotRestrictions>,
}

impl Agent {
    /// Whether `product` may be carried by this agent at all (ignoring
    /// capacity, which is evaluated per trip).
    pub fn can_handle(&self, product: &Product, warehouse: &Warehouse) -> bool {
        if warehouse.is_robot_accessible(&product.location) && self.kind != AgentKind::Robot {
            return false;
        }
        if let Some(restrictions) = &self.restrictions {
            if restrictions.no_fragile && product.fragile {
                return false;
            }
            if let Some(max_weight) = restrictions.max_item_weight_grams {
                if product.weight_grams > max_weight {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub weight_grams: u64,
    pub volume_dm3: u64,
    pub fragile: bool,
    pub location: String,
    pub pickup_location: Cell,
    pub incompatible_with: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Express,
    Standard,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub deadline_minutes: u32,
    pub priority: Priority,
    pub items: Vec<OrderItem>,
}

/// One atomic pickable: a product id with quantity expanded to 1.
#[derive(Debug, Clone)]
pub struct ProductUnit {
    /// Index into [`Catalog::units`]; the canonical identity used
    /// throughout the optimizer.
    pub index: usize,
    pub unit_id: String,
    pub product_id: String,
    pub order_id: String,
    pub deadline_minutes: u32,
    pub priority: Priority,
}

/// Everything the planner needs for one request, already expanded from
/// orders into individual units.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub warehouse: Warehouse,
    pub products: HashMap<String, Product>,
    pub agents: Vec<Agent>,
    pub orders: Vec<Order>,
    pub units: Vec<ProductUnit>,
}

impl Catalog {
    pub fn product(&self, id: &str) -> &Product {
        self.products
            .get(id)
            .unwrap_or_else(|| panic!("unit referenced unknown product id {id}"))
    }

    pub fn unit(&self, index: usize) -> &ProductUnit {
        &self.units[index]
    }
}
