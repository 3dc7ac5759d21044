//! Collision resolver: detects same-cell-same-minute collisions across
//! agent trajectories and iteratively delays the worst offender until the
//! plan is conflict-free or the iteration budget runs out.
//!
//! Edge (swap) collisions across a minute boundary are deliberately not
//! detected.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::{Cell, Plan};
use crate::trajectory::{build_trajectory, Trajectory};
use crate::Catalog;

/// Two distinct agents occupying the same cell at the same integer minute.
#[derive(Debug, Clone)]
pub struct Collision {
    pub minute: u32,
    pub cell: Cell,
    pub agents: (String, String),
}

#[derive(Debug, Clone)]
pub struct CollisionReport {
    pub trajectories: HashMap<String, Trajectory>,
    pub residual_collisions: Vec<Collision>,
    pub delays: HashMap<String, u32>,
    pub iterations_used: u32,
}

impl CollisionReport {
    /// UI-facing severity bucket.
    pub fn severity(&self) -> &'static str {
        match self.residual_collisions.len() {
            0 => "none",
            1..=3 => "minor",
            4..=10 => "warning",
            _ => "severe",
        }
    }
}

fn build_all_trajectories(
    catalog: &Catalog,
    plan: &Plan,
    depots: &HashMap<String, Cell>,
    delays: &HashMap<String, u32>,
    active_agent_ids: &[String],
    depot_time_minutes: u32,
) -> HashMap<String, Trajectory> {
    let mut out = HashMap::new();
    for agent_id in active_agent_ids {
        let route = &plan.agent_routes[agent_id];
        let depot = depots
            .get(agent_id)
            .copied()
            .unwrap_or(catalog.warehouse.preparation_zone);
        let delay = delays.get(agent_id).copied().unwrap_or(0);
        let trajectory = build_trajectory(
            catalog,
            route,
            catalog.warehouse.entry_point,
            depot,
            delay,
            depot_time_minutes,
        );
        out.insert(agent_id.clone(), trajectory);
    }
    out
}

fn detect_collisions(
    trajectories: &HashMap<String, Trajectory>,
    active_agent_ids: &[String],
) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for (i, a) in active_agent_ids.iter().enumerate() {
        for b in &active_agent_ids[i + 1..] {
            let traj_a = &trajectories[a];
            let traj_b = &trajectories[b];
            for (minute, cell_a) in &traj_a.stamps {
                if let Some(cell_b) = traj_b.stamps.get(minute) {
                    if cell_a == cell_b {
                        collisions.push(Collision {
                            minute: *minute,
                            cell: *cell_a,
                            agents: (a.clone(), b.clone()),
                        });
                    }
                }
            }
        }
    }
    collisions
}

/// Runs the fixed-point delay loop.
pub fn resolve_collisions(
    catalog: &Catalog,
    plan: &Plan,
    depots: &HashMap<String, Cell>,
    max_iterations: u32,
    depot_time_minutes: u32,
) -> CollisionReport {
    let active_agent_ids = plan.active_agent_ids();
    let mut delays: HashMap<String, u32> = active_agent_ids
        .iter()
        .map(|id| (id.clone(), 0))
        .collect();

    let mut trajectories =
        build_all_trajectories(catalog, plan, depots, &delays, &active_agent_ids, depot_time_minutes);
    let mut collisions = detect_collisions(&trajectories, &active_agent_ids);
    let mut iterations_used = 0;

    while !collisions.is_empty() && iterations_used < max_iterations {
        iterations_used += 1;

        let mut participation_counts: HashMap<&str, u32> = HashMap::new();
        for collision in &collisions {
            *participation_counts.entry(collision.agents.0.as_str()).or_insert(0) += 1;
            *participation_counts.entry(collision.agents.1.as_str()).or_insert(0) += 1;
        }

        // Deterministic tie-break: first in `active_agent_ids` order wins
        // among agents with equal collision counts. `max_by_key` returns the
        // LAST maximal element on ties, so scan in reverse to land on the
        // first one instead.
        let victim = active_agent_ids
            .iter()
            .rev()
            .max_by_key(|id| participation_counts.get(id.as_str()).copied().unwrap_or(0))
            .cloned();

        let Some(victim) = victim else { break };
        *delays.get_mut(&victim).unwrap() += 2;

        trajectories =
            build_all_trajectories(catalog, plan, depots, &delays, &active_agent_ids, depot_time_minutes);
        collisions = detect_collisions(&trajectories, &active_agent_ids);
    }

    if collisions.is_empty() {
        info!(iterations_used, "collisions fully resolved");
    } else {
        warn!(
            iterations_used,
            residual = collisions.len(),
            "collision resolution stopped with residual collisions"
        );
    }

    CollisionReport {
        trajectories,
        residual_collisions: collisions,
        delays,
        iterations_used,
    }
}
