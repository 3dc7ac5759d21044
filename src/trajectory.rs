//! Trajectory builder: expands one agent's trip-sorted picks into a dense
//! minute-by-minute path, including depot drop-offs and the final return to
//! the entry point.
//!
//! Per-minute stamping dwells until each pick's `visit_time`, with a
//! two-minute depot dwell on trip change and at the end of the route.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{AgentRoute, Catalog, Cell, NavGrid};
use crate::pathfinding::astar_path;

/// A dense minute -> cell mapping for one agent.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub stamps: HashMap<u32, Cell>,
    /// Cells (and the minute they were reached) at which the agent dropped
    /// off a trip's cargo.
    pub depot_events: Vec<(u32, Cell)>,
}

impl Trajectory {
    pub fn last_minute(&self) -> u32 {
        self.stamps.keys().copied().max().unwrap_or(0)
    }

    pub fn position_at(&self, minute: u32) -> Option<Cell> {
        self.stamps.get(&minute).copied()
    }
}

/// Walks `from` -> `to` on `grid`, stamping one cell per minute starting the
/// minute *after* `t`, returning the new clock and position. Falls back to a
/// Manhattan-shaped (X-then-Y) walk when no grid path exists — never fatal.
fn walk(
    trajectory: &mut Trajectory,
    grid: &NavGrid,
    from: Cell,
    to: Cell,
    mut t: u32,
) -> (Cell, u32) {
    let path = astar_path(from, to, grid).unwrap_or_else(|| {
        warn!(?from, ?to, "no grid path, falling back to Manhattan-shape walk");
        manhattan_shape_path(from, to)
    });

    for cell in path.into_iter().skip(1) {
        t += 1;
        trajectory.stamps.insert(t, cell);
    }
    (to, t)
}

/// X-then-Y walk used when the pathfinder cannot find a path (never assumes
/// traversability; purely a shape fallback).
fn manhattan_shape_path(from: Cell, to: Cell) -> Vec<Cell> {
    let mut path = vec![from];
    let mut current = from;
    while current.x != to.x {
        current.x = if current.x < to.x {
            current.x + 1
        } else {
            current.x - 1
        };
        path.push(current);
    }
    while current.y != to.y {
        current.y = if current.y < to.y {
            current.y + 1
        } else {
            current.y - 1
        };
        path.push(current);
    }
    path
}

fn dwell_until(trajectory: &mut Trajectory, cell: Cell, t: &mut u32, until: u32) {
    while *t < until {
        *t += 1;
        trajectory.stamps.insert(*t, cell);
    }
}

fn dwell_for(trajectory: &mut Trajectory, cell: Cell, t: &mut u32, minutes: u32) {
    for _ in 0..minutes {
        *t += 1;
        trajectory.stamps.insert(*t, cell);
    }
}

/// Builds the full trajectory for one agent's route.
///
/// `start_delay` shifts the whole trajectory later in the clock (used by the
/// collision resolver, C5, to push a colliding agent out of the way).
pub fn build_trajectory(
    catalog: &Catalog,
    route: &AgentRoute,
    entry_point: Cell,
    depot: Cell,
    start_delay: u32,
    depot_time_minutes: u32,
) -> Trajectory {
    let grid = &catalog.warehouse.grid;
    let mut trajectory = Trajectory::default();
    let mut current_pos = entry_point;
    let mut t = start_delay;
    trajectory.stamps.insert(t, current_pos);

    let mut picks = route.picks.clone();
    picks.sort_by_key(|p| (p.trip, p.visit_time_minutes));

    for (i, pick) in picks.iter().enumerate() {
        let unit = catalog.unit(pick.unit_index);
        let product = catalog.product(&unit.product_id);

        let (new_pos, new_t) = walk(&mut trajectory, grid, current_pos, product.pickup_location, t);
        current_pos = new_pos;
        t = new_t;

        dwell_until(&mut trajectory, current_pos, &mut t, pick.visit_time_minutes + start_delay);

        let next_is_different_trip = picks
            .get(i + 1)
            .map(|next| next.trip != pick.trip)
            .unwrap_or(false);
        if next_is_different_trip {
            let (depot_pos, depot_t) = walk(&mut trajectory, grid, current_pos, depot, t);
            current_pos = depot_pos;
            t = depot_t;
            dwell_for(&mut trajectory, current_pos, &mut t, depot_time_minutes);
            trajectory.depot_events.push((t, current_pos));
        }
    }

    if !picks.is_empty() {
        let (depot_pos, depot_t) = walk(&mut trajectory, grid, current_pos, depot, t);
        current_pos = depot_pos;
        t = depot_t;
        dwell_for(&mut trajectory, current_pos, &mut t, depot_time_minutes);
        trajectory.depot_events.push((t, current_pos));

        let (final_pos, final_t) = walk(&mut trajectory, grid, current_pos, entry_point, t);
        trajectory.stamps.insert(final_t, final_pos);
    }

    trajectory
}
