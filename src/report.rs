//! Cost & reporter: per-agent cost, makespan, trip/unit counts, and the
//! bottleneck (last-finishing) agent.
//!
//! Preserves human/cart double-billing behavior by default — an active
//! cart's paired human is billed a second time, at the human rate, over the
//! cart's own working window.

use crate::config::PlannerParams;
use crate::domain::{AgentKind, Plan};
use crate::Catalog;

#[derive(Debug, Clone)]
pub struct AgentStats {
    pub agent_id: String,
    pub kind: AgentKind,
    pub trips: u32,
    pub units: u32,
    pub end_time_minutes: u32,
    pub picking_cost: f64,
    /// Extra cost billed for escorting a paired cart, over and above
    /// `picking_cost` (zero unless this agent is a human paired to an
    /// active cart).
    pub escort_cost: f64,
}

impl AgentStats {
    pub fn total_cost(&self) -> f64 {
        self.picking_cost + self.escort_cost
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub makespan_minutes: u32,
    pub total_cost: f64,
    pub total_units: u32,
    pub total_trips: u32,
    pub bottleneck_agent: Option<String>,
    pub agent_stats: Vec<AgentStats>,
}

/// `(end_time_minutes - start_delay) / 60 * rate`, which with
/// `end_time_minutes = visit_time + start_delay` reduces to
/// `visit_time / 60 * rate` — the formula is kept in this expanded form in
/// the call sites below so the cancellation stays visible rather than
/// silently collapsed.
fn hourly_cost(visit_time_minutes: u32, start_delay: u32, rate_per_hour: f64) -> f64 {
    let end_time_minutes = visit_time_minutes + start_delay;
    ((end_time_minutes - start_delay) as f64 / 60.0) * rate_per_hour
}

pub fn build_report(
    catalog: &Catalog,
    plan: &Plan,
    delays: &std::collections::HashMap<String, u32>,
    params: &PlannerParams,
) -> Report {
    let mut cart_to_human: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();
    for (human, cart) in &plan.human_to_cart {
        cart_to_human.insert(cart.as_str(), human.as_str());
    }

    let mut agent_stats = Vec::new();
    let mut total_units = 0u32;
    let mut total_trips = 0u32;

    for agent in &catalog.agents {
        let Some(route) = plan.agent_routes.get(&agent.id) else {
            continue;
        };
        if route.picks.is_empty() {
            continue;
        }
        let delay = delays.get(&agent.id).copied().unwrap_or(0);
        let end_time = route.last_visit_time().unwrap_or(0);
        let rate = params.cost_rate(agent.kind);
        let trips = route.trip_numbers().len() as u32;
        let units = route.picks.len() as u32;

        total_units += units;
        total_trips += trips;

        agent_stats.push(AgentStats {
            agent_id: agent.id.clone(),
            kind: agent.kind,
            trips,
            units,
            end_time_minutes: end_time,
            picking_cost: hourly_cost(end_time, delay, rate),
            escort_cost: 0.0,
        });
    }

    // Human-cart double billing, preserved by default:
    // every active cart's working window also bills its paired human.
    for stats in &mut agent_stats {
        if stats.kind != AgentKind::Human {
            continue;
        }
        let Some(cart_id) = plan.human_to_cart.get(&stats.agent_id) else {
            continue;
        };
        let Some(cart_route) = plan.agent_routes.get(cart_id) else {
            continue;
        };
        if cart_route.picks.is_empty() {
            continue;
        }
        let cart_delay = delays.get(cart_id).copied().unwrap_or(0);
        let cart_end_time = cart_route.last_visit_time().unwrap_or(0);
        stats.escort_cost += hourly_cost(cart_end_time, cart_delay, params.cost_rate_human);
    }

    let makespan_minutes = plan.makespan();
    let total_cost = agent_stats.iter().map(|s| s.total_cost()).sum();
    let bottleneck_agent = agent_stats
        .iter()
        .max_by_key(|s| s.end_time_minutes)
        .map(|s| s.agent_id.clone());

    Report {
        makespan_minutes,
        total_cost,
        total_units,
        total_trips,
        bottleneck_agent,
        agent_stats,
    }
}
