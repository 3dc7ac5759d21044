//! Shared working representation for the tour optimizer: a per-agent list of
//! trips, each an ordered list of unit indices, plus the conversions to and
//! from the public [`Plan`] type and the visit-time recurrence.

use std::collections::HashMap;

use crate::config::constant::MAX_TRIPS;
use crate::config::Timing;
use crate::distance::{travel_time_minutes, DistanceOracle, ENTRY_ID};
use crate::domain::{Agent, AgentKind, AgentRoute, Catalog, Cell, PickEntry, Plan, Priority};

#[derive(Debug, Clone, Default)]
pub struct TripSlot {
    pub trip: u32,
    pub unit_indices: Vec<usize>,
    pub weight_grams: u64,
    pub volume_dm3: u64,
}

/// One agent's working state during construction and local search.
///
/// `last_position_id`/`last_visit_time` are the incremental counterparts of
/// [`compute_visit_times`]'s recurrence, maintained as units are appended so
/// placement feasibility can be evaluated in O(1) instead of replaying the
/// whole route.
#[derive(Debug, Clone)]
pub struct AgentPlanState {
    pub agent_index: usize,
    pub trips: Vec<TripSlot>,
    pub last_position_id: String,
    pub last_visit_time: u32,
    /// Set once a standard-priority unit has been appended. Since visit
    /// times only increase as units are appended, an express unit can
    /// never be placed after a standard one without violating the "every
    /// express strictly before every standard" ordering.
    pub has_standard: bool,
}

impl Default for AgentPlanState {
    fn default() -> Self {
        AgentPlanState {
            agent_index: 0,
            trips: Vec::new(),
            last_position_id: ENTRY_ID.to_string(),
            last_visit_time: 0,
            has_standard: false,
        }
    }
}

impl AgentPlanState {
    pub fn is_active(&self) -> bool {
        self.trips.iter().any(|t| !t.unit_indices.is_empty())
    }

    pub fn next_trip_number(&self) -> u32 {
        self.trips.len() as u32 + 1
    }

    /// Renumbers trips 1..K after a removal may have left a gap or an empty
    /// trip behind.
    pub fn renumber_trips(&mut self) {
        self.trips.retain(|t| !t.unit_indices.is_empty());
        for (i, trip) in self.trips.iter_mut().enumerate() {
            trip.trip = (i + 1) as u32;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkingSolution {
    pub agent_states: Vec<AgentPlanState>,
    pub human_to_cart: HashMap<String, String>,
}

impl WorkingSolution {
    pub fn new(num_agents: usize) -> Self {
        WorkingSolution {
            agent_states: (0..num_agents)
                .map(|i| AgentPlanState {
                    agent_index: i,
                    ..AgentPlanState::default()
                })
                .collect(),
            human_to_cart: HashMap::new(),
        }
    }

    /// Whether `agent` (a cart) is already paired, or could be paired with a
    /// still-unpaired human. Does not mutate; callers commit the pairing via
    /// [`WorkingSolution::pair_cart`] only once the agent is actually chosen.
    pub fn can_use_cart(&self, catalog: &Catalog, agent: &Agent) -> bool {
        if agent.kind != AgentKind::Cart {
            return true;
        }
        if self.human_to_cart.values().any(|c| c == &agent.id) {
            return true;
        }
        catalog
            .agents
            .iter()
            .any(|a| a.kind == AgentKind::Human && !self.human_to_cart.contains_key(&a.id))
    }

    /// Pairs `cart` with the first still-unpaired human, if one exists and
    /// the cart isn't already paired. A no-op for non-cart agents.
    pub fn pair_cart(&mut self, catalog: &Catalog, agent: &Agent) {
        if agent.kind != AgentKind::Cart {
            return;
        }
        if self.human_to_cart.values().any(|c| c == &agent.id) {
            return;
        }
        if let Some(human) = catalog
            .agents
            .iter()
            .find(|a| a.kind == AgentKind::Human && !self.human_to_cart.contains_key(&a.id))
        {
            self.human_to_cart.insert(human.id.clone(), agent.id.clone());
        }
    }

    /// Converts this working representation into the public [`Plan`],
    /// computing every unit's visit time along the way.
    pub fn to_plan(&self, catalog: &Catalog, oracle: &DistanceOracle, timing: Timing) -> Plan {
        let mut agent_routes = HashMap::new();
        for state in &self.agent_states {
            if !state.is_active() {
                continue;
            }
            let agent = &catalog.agents[state.agent_index];
            let visit_times = compute_visit_times(catalog, oracle, agent.speed_m_per_s, &state.trips, timing);
            let mut picks = Vec::new();
            for (trip, times) in state.trips.iter().zip(visit_times.iter()) {
                for (&unit_index, &visit_time) in trip.unit_indices.iter().zip(times.iter()) {
                    picks.push(PickEntry {
                        unit_index,
                        trip: trip.trip,
                        visit_time_minutes: visit_time,
                    });
                }
            }
            agent_routes.insert(agent.id.clone(), AgentRoute { picks });
        }
        Plan {
            agent_routes,
            human_to_cart: self.human_to_cart.clone(),
        }
    }

    /// Makespan of this working solution without materializing a [`Plan`].
    pub fn makespan(&self, catalog: &Catalog, oracle: &DistanceOracle, timing: Timing) -> u32 {
        let mut makespan = 0;
        for state in &self.agent_states {
            if !state.is_active() {
                continue;
            }
            let agent = &catalog.agents[state.agent_index];
            let visit_times = compute_visit_times(catalog, oracle, agent.speed_m_per_s, &state.trips, timing);
            if let Some(last) = visit_times.iter().flatten().max() {
                makespan = makespan.max(*last);
            }
        }
        makespan
    }
}

fn cell_for_id(catalog: &Catalog, id: &str) -> Cell {
    if id == ENTRY_ID {
        catalog.warehouse.entry_point
    } else {
        catalog.product(id).pickup_location
    }
}

/// Recomputes every unit's visit time for one agent's trip list: same-trip
/// consecutive picks add `travel + PICKING_TIME`; a trip change routes
/// through the preparation zone and adds `DEPOT_TIME` (Manhattan distance
/// suffices for the depot legs).
pub fn compute_visit_times(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    speed_m_per_s: f64,
    trips: &[TripSlot],
    timing: Timing,
) -> Vec<Vec<u32>> {
    let mut result = Vec::with_capacity(trips.len());
    let mut prev_id = ENTRY_ID.to_string();
    let mut prev_time: u32 = 0;
    let mut is_first_unit = true;

    for trip in trips {
        let mut times = Vec::with_capacity(trip.unit_indices.len());
        for (k, &unit_index) in trip.unit_indices.iter().enumerate() {
            let unit = catalog.unit(unit_index);
            let cur_id = unit.product_id.clone();

            let visit_time = if is_first_unit {
                let d = oracle.distance(&prev_id, &cur_id);
                travel_time_minutes(d, speed_m_per_s)
            } else if k == 0 {
                let prep = catalog.warehouse.preparation_zone;
                let prev_cell = cell_for_id(catalog, &prev_id);
                let cur_cell = cell_for_id(catalog, &cur_id);
                let to_prep = prev_cell.manhattan_distance(prep);
                let from_prep = prep.manhattan_distance(cur_cell);
                prev_time
                    + travel_time_minutes(to_prep, speed_m_per_s)
                    + timing.depot_time_minutes
                    + travel_time_minutes(from_prep, speed_m_per_s)
            } else {
                let d = oracle.distance(&prev_id, &cur_id);
                prev_time + travel_time_minutes(d, speed_m_per_s) + timing.picking_time_minutes
            };

            times.push(visit_time);
            prev_time = visit_time;
            prev_id = cur_id;
            is_first_unit = false;
        }
        result.push(times);
    }
    result
}

/// Candidate placement for one unit: either appended to the agent's current
/// last trip, or starting a fresh trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    SameTrip,
    NewTrip,
}

/// Evaluates whether `unit_index` can be placed on `agent`'s current state
/// at `placement`, returning the resulting visit time when feasible.
///
/// This is the incremental counterpart of [`compute_visit_times`]: it reads
/// `state.last_position_id`/`last_visit_time` rather than replaying the
/// whole route, so construction and local search can probe placements in
/// O(1) per candidate.
pub fn evaluate_placement(
    catalog: &Catalog,
    oracle: &DistanceOracle,
    agent: &Agent,
    state: &AgentPlanState,
    unit_index: usize,
    placement: Placement,
    timing: Timing,
) -> Option<u32> {
    let unit = catalog.unit(unit_index);
    let product = catalog.product(&unit.product_id);

    // An express unit can never be appended once a standard unit has been
    // placed on this agent, since appends only ever move time forward.
    if unit.priority == Priority::Express && state.has_standard {
        return None;
    }

    match placement {
        Placement::SameTrip => {
            let trip = state.trips.last()?;
            if trip.weight_grams + product.weight_grams > agent.capacity_weight_grams {
                return None;
            }
            if trip.volume_dm3 + product.volume_dm3 > agent.capacity_volume_dm3 {
                return None;
            }
            if trip.unit_indices.iter().any(|&existing| {
                let existing_unit = catalog.unit(existing);
                product.incompatible_with.contains(&existing_unit.product_id)
                    || catalog
                        .product(&existing_unit.product_id)
                        .incompatible_with
                        .contains(&product.id)
            }) {
                return None;
            }

            let d = oracle.distance(&state.last_position_id, &product.id);
            let visit_time =
                state.last_visit_time + travel_time_minutes(d, agent.speed_m_per_s) + timing.picking_time_minutes;
            if visit_time > unit.deadline_minutes {
                return None;
            }
            Some(visit_time)
        }
        Placement::NewTrip => {
            if state.trips.len() as u32 >= MAX_TRIPS {
                return None;
            }
            if product.weight_grams > agent.capacity_weight_grams
                || product.volume_dm3 > agent.capacity_volume_dm3
            {
                return None;
            }

            let visit_time = if state.trips.is_empty() {
                let d = oracle.distance(ENTRY_ID, &product.id);
                travel_time_minutes(d, agent.speed_m_per_s)
            } else {
                let prep = catalog.warehouse.preparation_zone;
                let prev_cell = cell_for_id(catalog, &state.last_position_id);
                let from_prep = prep.manhattan_distance(product.pickup_location);
                let to_prep = prev_cell.manhattan_distance(prep);
                state.last_visit_time
                    + travel_time_minutes(to_prep, agent.speed_m_per_s)
                    + timing.depot_time_minutes
                    + travel_time_minutes(from_prep, agent.speed_m_per_s)
            };
            if visit_time > unit.deadline_minutes {
                return None;
            }
            Some(visit_time)
        }
    }
}

/// Appends `unit_index` to `state` per `placement`, updating running
/// weight/volume/position bookkeeping. `visit_time` must be the value
/// previously returned by [`evaluate_placement`] for the same arguments.
pub fn append_unit(
    catalog: &Catalog,
    _oracle: &DistanceOracle,
    _agent: &Agent,
    state: &mut AgentPlanState,
    unit_index: usize,
    placement: Placement,
    visit_time: u32,
) {
    let unit = catalog.unit(unit_index);
    let product = catalog.product(&unit.product_id);

    match placement {
        Placement::SameTrip => {
            let trip = state.trips.last_mut().expect("SameTrip requires an existing trip");
            trip.unit_indices.push(unit_index);
            trip.weight_grams += product.weight_grams;
            trip.volume_dm3 += product.volume_dm3;
        }
        Placement::NewTrip => {
            state.trips.push(TripSlot {
                trip: state.next_trip_number(),
                unit_indices: vec![unit_index],
                weight_grams: product.weight_grams,
                volume_dm3: product.volume_dm3,
            });
        }
    }
    state.last_position_id = product.id.clone();
    state.last_visit_time = visit_time;
    if unit.priority == Priority::Standard {
        state.has_standard = true;
    }
}

/// Removes `unit_index` from wherever it currently sits in `state`, fixing
/// up weight/volume and trip numbering. Leaves `last_position_id`/
/// `last_visit_time` stale on purpose — callers that remove and then
/// reinsert units (repair, diversification) always go through
/// [`evaluate_placement`] again afterwards, which only reads those fields
/// for the *last* trip, recomputed fresh by [`recompute_tail_position`].
pub fn remove_unit(
    state: &mut AgentPlanState,
    catalog: &Catalog,
    oracle: &DistanceOracle,
    unit_index: usize,
    timing: Timing,
) {
    for trip in &mut state.trips {
        if let Some(pos) = trip.unit_indices.iter().position(|&u| u == unit_index) {
            let unit = catalog.unit(unit_index);
            let product = catalog.product(&unit.product_id);
            trip.unit_indices.remove(pos);
            trip.weight_grams -= product.weight_grams;
            trip.volume_dm3 -= product.volume_dm3;
            break;
        }
    }
    state.renumber_trips();
    recompute_tail_position(state, catalog, oracle, timing);
}

/// Restores `last_position_id`/`last_visit_time`/`has_standard` from
/// scratch by replaying the agent's current trips. Used after a removal,
/// where the incremental fields may no longer reflect the new tail.
pub fn recompute_tail_position(state: &mut AgentPlanState, catalog: &Catalog, oracle: &DistanceOracle, timing: Timing) {
    state.last_position_id = ENTRY_ID.to_string();
    state.last_visit_time = 0;
    state.has_standard = false;
    for trip in &state.trips {
        for &unit_index in &trip.unit_indices {
            let unit = catalog.unit(unit_index);
            if unit.priority == Priority::Standard {
                state.has_standard = true;
            }
        }
    }
    if !state.trips.is_empty() {
        let agent = &catalog.agents[state.agent_index];
        let times = compute_visit_times(catalog, oracle, agent.speed_m_per_s, &state.trips, timing);
        if let Some(last_trip_unit) = state.trips.last().and_then(|t| t.unit_indices.last()) {
            state.last_position_id = catalog.unit(*last_trip_unit).product_id.clone();
        }
        if let Some(last) = times.last().and_then(|t| t.last()) {
            state.last_visit_time = *last;
        }
    }
}
