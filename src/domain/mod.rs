pub mod catalog;
pub mod solution;
pub mod types;

pub use solution::{AgentRoute, PickEntry, Plan, TripLoad};
pub use types::{
    Agent, AgentKind, Catalog, Cell, NavGrid, Order, OrderItem, Priority, Product, ProductUnit,
    RobotRestrictions, Warehouse, Zone, ZoneKind,
};
