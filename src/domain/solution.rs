//! Plan representation and the trip-partitioning helpers the solver and
//! reporter both build on.
//!
//! Generalizes a flat route split at depot markers, then sorted by load,
//! from one vehicle dimension to the per-agent, per-trip, weight-and-volume
//! partitioning this problem needs.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::domain::types::Catalog;

/// One unit visited by an agent, already placed in a trip and a time.
#[derive(Debug, Clone, Copy)]
pub struct PickEntry {
    pub unit_index: usize,
    pub trip: u32,
    pub visit_time_minutes: u32,
}

/// An agent's full route: picks in `(trip, visit_time)` order.
#[derive(Debug, Clone, Default)]
pub struct AgentRoute {
    pub picks: Vec<PickEntry>,
}

impl AgentRoute {
    pub fn sort(&mut self) {
        self.picks
            .sort_by_key(|p| (p.trip, p.visit_time_minutes));
    }

    pub fn trip_numbers(&self) -> Vec<u32> {
        let mut trips: Vec<u32> = self.picks.iter().map(|p| p.trip).collect();
        trips.sort_unstable();
        trips.dedup();
        trips
    }

    pub fn picks_in_trip(&self, trip: u32) -> impl Iterator<Item = &PickEntry> {
        self.picks.iter().filter(move |p| p.trip == trip)
    }

    pub fn last_visit_time(&self) -> Option<u32> {
        self.picks.iter().map(|p| p.visit_time_minutes).max()
    }
}

/// Optimizer output: per-agent routes plus the human-to-cart pairing map.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub agent_routes: HashMap<String, AgentRoute>,
    /// human agent id -> cart agent id.
    pub human_to_cart: HashMap<String, String>,
}

impl Plan {
    pub fn active_agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .agent_routes
            .iter()
            .filter(|(_, route)| !route.picks.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn makespan(&self) -> u32 {
        self.agent_routes
            .values()
            .filter_map(|r| r.last_visit_time())
            .max()
            .unwrap_or(0)
    }
}

/// Per-trip weight/volume load, used by capacity checks and the ALNS-style
/// repair step when a candidate solution overflows capacity.
#[derive(Debug, Clone, Copy)]
pub struct TripLoad {
    pub agent_index: usize,
    pub trip: u32,
    pub weight_grams: u64,
    pub volume_dm3: u64,
    pub weight_capacity_grams: u64,
    pub volume_capacity_dm3: u64,
}

impl TripLoad {
    pub fn weight_excess(&self) -> i64 {
        self.weight_grams as i64 - self.weight_capacity_grams as i64
    }

    pub fn volume_excess(&self) -> i64 {
        self.volume_dm3 as i64 - self.volume_capacity_dm3 as i64
    }

    pub fn is_overloaded(&self) -> bool {
        self.weight_excess() > 0 || self.volume_excess() > 0
    }
}

/// Compute the per-trip loads across all agents, sorted by weight excess
/// descending so the repair step can target the worst offenders first.
pub fn trip_loads_by_excess(
    agent_order: &[crate::domain::types::Agent],
    routes: &HashMap<String, AgentRoute>,
    catalog: &Catalog,
) -> Vec<TripLoad> {
    let mut loads = Vec::new();
    for (agent_index, agent) in agent_order.iter().enumerate() {
        let Some(route) = routes.get(&agent.id) else {
            continue;
        };
        for trip in route.trip_numbers() {
            let mut weight_grams = 0u64;
            let mut volume_dm3 = 0u64;
            for pick in route.picks_in_trip(trip) {
                let unit = catalog.unit(pick.unit_index);
                let product = catalog.product(&unit.product_id);
                weight_grams += product.weight_grams;
                volume_dm3 += product.volume_dm3;
            }
            loads.push(TripLoad {
                agent_index,
                trip,
                weight_grams,
                volume_dm3,
                weight_capacity_grams: agent.capacity_weight_grams,
                volume_capacity_dm3: agent.capacity_volume_dm3,
            });
        }
    }
    loads.sort_by_key(|l| Reverse(l.weight_excess().max(l.volume_excess())));
    loads
}
