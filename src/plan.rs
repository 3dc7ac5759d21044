//! Top-level planning entry point: wires the distance oracle, tour
//! optimizer, depot assigner, trajectory builder, collision resolver and
//! reporter into the single call the CLI (and tests) use.

use tracing::{info, span, Level};

use crate::collision::{resolve_collisions, CollisionReport};
use crate::config::PlannerParams;
use crate::depot::{assign_depots, DepotAssignment};
use crate::distance::DistanceOracle;
use crate::domain::Plan;
use crate::error::Result;
use crate::report::{build_report, Report};
use crate::solver::{solve, SolveOutcome};
use crate::Catalog;

/// Outcome of a planning call: `Infeasible` is ordinary data, not an error —
/// only malformed input or a setup failure propagates via
/// [`crate::error::PlanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Success,
    Infeasible,
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub status: PlanStatus,
    pub plan: Plan,
    pub depots: DepotAssignment,
    pub collision_report: CollisionReport,
    pub report: Report,
    /// Unit indices that no agent could ever take. Non-empty implies
    /// `status == Infeasible`.
    pub unresolved_units: Vec<usize>,
    /// `(iteration, makespan)` recorded each time local search beat its
    /// prior best; empty on an infeasible result. Exposed so callers can
    /// optionally export it via
    /// [`crate::solver::tabu_search::search::save_best_so_far_csv`].
    pub best_so_far_history: Vec<(u32, u32)>,
}

impl PlanResult {
    fn infeasible(unresolved_units: Vec<usize>) -> Self {
        PlanResult {
            status: PlanStatus::Infeasible,
            plan: Plan::default(),
            depots: DepotAssignment::default(),
            collision_report: CollisionReport {
                trajectories: Default::default(),
                residual_collisions: Vec::new(),
                delays: Default::default(),
                iterations_used: 0,
            },
            report: Report {
                makespan_minutes: 0,
                total_cost: 0.0,
                total_units: 0,
                total_trips: 0,
                bottleneck_agent: None,
                agent_stats: Vec::new(),
            },
            unresolved_units,
            best_so_far_history: Vec::new(),
        }
    }
}

/// Plans tours for `catalog` under `params`. Only fatal, non-recoverable
/// problems (malformed input, detected earlier at catalog-build time)
/// return `Err`; an unsatisfiable instance comes back as `Ok` with
/// `status == Infeasible`.
pub fn plan(catalog: &Catalog, params: &PlannerParams) -> Result<PlanResult> {
    let catalog = &params.apply_overrides(catalog);
    let plan_span = span!(Level::INFO, "plan", units = catalog.units.len(), agents = catalog.agents.len());
    let _guard = plan_span.enter();

    let oracle = DistanceOracle::build(catalog);

    let outcome = solve(catalog, &oracle, params);
    let (working_solution, unresolved_units, best_so_far_history) = match outcome {
        SolveOutcome::Infeasible { unresolved_units } => {
            return Ok(PlanResult::infeasible(unresolved_units));
        }
        SolveOutcome::Feasible { unresolved_units, .. } if !unresolved_units.is_empty() => {
            return Ok(PlanResult::infeasible(unresolved_units));
        }
        SolveOutcome::Feasible { solution, unresolved_units, best_so_far_history } => {
            (solution, unresolved_units, best_so_far_history)
        }
    };

    let plan = working_solution.to_plan(catalog, &oracle, params.timing());
    let active_agent_ids = plan.active_agent_ids();
    let depots = assign_depots(&active_agent_ids, &catalog.warehouse.depot_pool, catalog.warehouse.preparation_zone);

    let collision_report = resolve_collisions(
        catalog,
        &plan,
        &depots.by_agent,
        params.max_iterations,
        params.depot_time_minutes,
    );
    let report = build_report(catalog, &plan, &collision_report.delays, params);

    info!(
        makespan = report.makespan_minutes,
        total_cost = report.total_cost,
        residual_collisions = collision_report.residual_collisions.len(),
        "plan complete"
    );

    Ok(PlanResult {
        status: PlanStatus::Success,
        plan,
        depots,
        collision_report,
        report,
        unresolved_units,
        best_so_far_history,
    })
}
