//! Multi-agent warehouse tour planning: grid pathfinding, a tabu-search
//! tour optimizer, trajectory expansion, and collision resolution, wired
//! together by [`plan`].

pub mod collision;
pub mod config;
pub mod depot;
pub mod distance;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod pathfinding;
pub mod plan;
pub mod report;
pub mod solver;
pub mod trajectory;

pub use domain::Catalog;
pub use error::{PlanError, Result};
pub use plan::{plan, PlanResult, PlanStatus};
