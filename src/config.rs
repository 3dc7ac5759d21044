//! Tunable constants and the parameter bag exposed at the planner entry point.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::AgentKind;

pub mod constant {
    /// Maximum number of trips a single agent may be assigned.
    pub const MAX_TRIPS: u32 = 15;

    /// Planning horizon in minutes from `start_hour`.
    pub const TIME_HORIZON_MINUTES: u32 = 480;

    /// Minutes spent picking a single unit once an agent is at its pickup cell.
    pub const PICKING_TIME_MINUTES: u32 = 1;

    /// Minutes an agent dwells at the preparation zone / its depot on a trip change.
    pub const DEPOT_TIME_MINUTES: u32 = 2;

    /// Cell side used by the optimizer's travel-time arithmetic.
    ///
    /// Kept distinct from [`TRAJECTORY_METERS_PER_CELL`] on purpose: unifying the
    /// two scales would change the optimizer's notion of travel time relative to
    /// the trajectory layer's actual 1-cell-per-minute pace.
    pub const OPTIMIZER_METERS_PER_CELL: f64 = 3.0;

    /// Cell side nominally used by the trajectory layer. The trajectory builder
    /// advances one cell per minute regardless of agent speed, so this constant
    /// is not read by [`crate::trajectory`]; it is kept so the discrepancy with
    /// [`OPTIMIZER_METERS_PER_CELL`] stays documented rather than disappearing.
    #[allow(dead_code)]
    pub const TRAJECTORY_METERS_PER_CELL: f64 = 5.0;

    pub const DEFAULT_START_HOUR: u32 = 9;

    pub const DEFAULT_COST_RATE_ROBOT: f64 = 5.0;
    pub const DEFAULT_COST_RATE_HUMAN: f64 = 25.0;
    pub const DEFAULT_COST_RATE_CART: f64 = 3.0;

    /// Default collision-resolver iteration cap for the batch entry point.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

    pub const DEFAULT_RANDOM_SEED: u64 = 12345;
    pub const DEFAULT_NUM_SEARCH_WORKERS: usize = 9;

    /// Eight cells surrounding the preparation zone, excluding the zone itself.
    pub const DEPOT_POOL_OFFSETS: [(i32, i32); 8] = [
        (-1, 1),
        (0, 1),
        (1, 1),
        (-1, 0),
        (1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];
}

/// Adaptive solver wall-clock budget by order count, per the optimizer's
/// configuration table.
pub fn solver_time_budget_seconds(num_orders: usize) -> u64 {
    if num_orders <= 20 {
        45
    } else if num_orders <= 50 {
        120
    } else {
        300
    }
}

/// Per-agent-kind overrides for capacity and speed. Any field left `None`
/// keeps the catalog's own value for agents of that kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpecOverride {
    pub capacity_weight_kg: Option<f64>,
    pub capacity_volume_dm3: Option<u64>,
    pub speed_m_per_s: Option<f64>,
}

/// Parameters accepted by the planner entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerParams {
    pub random_seed: u64,
    pub num_search_workers: usize,
    pub max_time_seconds: Option<u64>,
    pub max_iterations: u32,
    pub depot_time_minutes: u32,
    pub picking_time_minutes: u32,
    pub cost_rate_robot: f64,
    pub cost_rate_human: f64,
    pub cost_rate_cart: f64,
    pub start_hour: u32,
    /// Per-agent-kind capacity/speed overrides, applied to every agent of
    /// that kind before solving.
    pub agent_overrides: HashMap<AgentKind, AgentSpecOverride>,
    /// Overrides the catalog's warehouse grid size. Growing the grid pads
    /// with blocked cells; shrinking it truncates.
    pub warehouse_width: Option<u32>,
    pub warehouse_height: Option<u32>,
}

impl Default for PlannerParams {
    fn default() -> Self {
        PlannerParams {
            random_seed: constant::DEFAULT_RANDOM_SEED,
            num_search_workers: constant::DEFAULT_NUM_SEARCH_WORKERS,
            max_time_seconds: None,
            max_iterations: constant::DEFAULT_MAX_ITERATIONS,
            depot_time_minutes: constant::DEPOT_TIME_MINUTES,
            picking_time_minutes: constant::PICKING_TIME_MINUTES,
            cost_rate_robot: constant::DEFAULT_COST_RATE_ROBOT,
            cost_rate_human: constant::DEFAULT_COST_RATE_HUMAN,
            cost_rate_cart: constant::DEFAULT_COST_RATE_CART,
            start_hour: constant::DEFAULT_START_HOUR,
            agent_overrides: HashMap::new(),
            warehouse_width: None,
            warehouse_height: None,
        }
    }
}

impl PlannerParams {
    pub fn time_budget_seconds(&self, num_orders: usize) -> u64 {
        self.max_time_seconds
            .unwrap_or_else(|| solver_time_budget_seconds(num_orders))
    }

    pub fn cost_rate(&self, kind: crate::domain::AgentKind) -> f64 {
        match kind {
            crate::domain::AgentKind::Robot => self.cost_rate_robot,
            crate::domain::AgentKind::Human => self.cost_rate_human,
            crate::domain::AgentKind::Cart => self.cost_rate_cart,
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            picking_time_minutes: self.picking_time_minutes,
            depot_time_minutes: self.depot_time_minutes,
        }
    }

    /// Applies `agent_overrides` and `warehouse_width`/`warehouse_height` to
    /// a clone of `catalog`, so the solving pipeline never has to special-case
    /// overridden values itself.
    pub fn apply_overrides(&self, catalog: &crate::domain::Catalog) -> crate::domain::Catalog {
        let mut catalog = catalog.clone();

        for agent in &mut catalog.agents {
            let Some(overrides) = self.agent_overrides.get(&agent.kind) else {
                continue;
            };
            if let Some(capacity_weight_kg) = overrides.capacity_weight_kg {
                agent.capacity_weight_grams = crate::domain::catalog::kg_to_grams(capacity_weight_kg);
            }
            if let Some(capacity_volume_dm3) = overrides.capacity_volume_dm3 {
                agent.capacity_volume_dm3 = capacity_volume_dm3;
            }
            if let Some(speed_m_per_s) = overrides.speed_m_per_s {
                agent.speed_m_per_s = speed_m_per_s;
            }
        }

        let new_width = self.warehouse_width.unwrap_or(catalog.warehouse.width);
        let new_height = self.warehouse_height.unwrap_or(catalog.warehouse.height);
        if new_width != catalog.warehouse.width || new_height != catalog.warehouse.height {
            catalog.warehouse.grid = catalog.warehouse.grid.resized(new_width, new_height);
            catalog.warehouse.width = new_width;
            catalog.warehouse.height = new_height;
        }

        catalog
    }
}

/// The two configurable per-pick/per-depot-visit durations, threaded through
/// the optimizer's timing recurrence and the trajectory builder's depot
/// dwells instead of reading the `constant` module's defaults directly.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub picking_time_minutes: u32,
    pub depot_time_minutes: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            picking_time_minutes: constant::PICKING_TIME_MINUTES,
            depot_time_minutes: constant::DEPOT_TIME_MINUTES,
        }
    }
}
