//! Batch CLI entry point: loads a catalog, runs the planner, and prints a
//! colored human-readable summary via `tracing_subscriber` and `colored`.

use std::path::PathBuf;
use std::process::ExitCode;

use colored::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use warehouse_tour_planner::config::PlannerParams;
use warehouse_tour_planner::domain::catalog::load_catalog_dir;
use warehouse_tour_planner::fixtures::demo_catalog;
use warehouse_tour_planner::solver::save_best_so_far_csv;
use warehouse_tour_planner::{plan, Catalog, PlanStatus};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE).compact())
        .init();
}

enum Source {
    Catalog(PathBuf),
    Demo(usize),
}

struct Args {
    source: Source,
    history_csv: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let history_csv = args
        .iter()
        .position(|a| a == "--history-csv")
        .and_then(|i| {
            if i + 1 < args.len() {
                let path = PathBuf::from(args[i + 1].clone());
                args.drain(i..=i + 1);
                Some(path)
            } else {
                args.remove(i);
                None
            }
        });

    let source = match args.first().map(String::as_str) {
        Some("--demo") => {
            let count = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
            Source::Demo(count)
        }
        Some(dir) => Source::Catalog(PathBuf::from(dir)),
        None => Source::Demo(10),
    };

    Args { source, history_csv }
}

fn load(source: Source) -> warehouse_tour_planner::Result<Catalog> {
    match source {
        Source::Catalog(dir) => load_catalog_dir(&dir),
        Source::Demo(count) => Ok(demo_catalog(count)),
    }
}

fn print_summary(result: &warehouse_tour_planner::PlanResult) {
    match result.status {
        PlanStatus::Success => {
            println!("{}", "plan: success".green().bold());
        }
        PlanStatus::Infeasible => {
            println!("{}", "plan: infeasible".red().bold());
            println!("unresolved units: {}", result.unresolved_units.len());
            return;
        }
    }

    println!("makespan: {} minutes", result.report.makespan_minutes);
    println!("total cost: {:.2}", result.report.total_cost);
    println!("total units: {}, total trips: {}", result.report.total_units, result.report.total_trips);
    if let Some(bottleneck) = &result.report.bottleneck_agent {
        println!("bottleneck agent: {bottleneck}");
    }

    for stats in &result.report.agent_stats {
        println!(
            "  {} ({:?}): {} trips, {} units, ends at {} min, cost {:.2}",
            stats.agent_id, stats.kind, stats.trips, stats.units, stats.end_time_minutes, stats.total_cost()
        );
    }

    let severity = result.collision_report.severity();
    let line = format!(
        "collisions: {} residual ({}), {} iterations",
        result.collision_report.residual_collisions.len(),
        severity,
        result.collision_report.iterations_used
    );
    match severity {
        "none" => println!("{}", line.green()),
        "minor" => println!("{}", line.yellow()),
        _ => println!("{}", line.red()),
    }

    if result.depots.exhausted {
        println!("{}", "depot pool exhausted: agents shared the preparation zone".yellow());
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = parse_args();
    let catalog = match load(args.source) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("{}", format!("invalid input: {err}").red());
            return ExitCode::from(2);
        }
    };

    let params = PlannerParams::default();
    match plan(&catalog, &params) {
        Ok(result) => {
            print_summary(&result);
            if let Some(path) = &args.history_csv {
                if let Err(err) = save_best_so_far_csv(&result.best_so_far_history, path) {
                    eprintln!("{}", format!("failed to write history csv: {err}").yellow());
                }
            }
            match result.status {
                PlanStatus::Success => ExitCode::SUCCESS,
                PlanStatus::Infeasible => ExitCode::from(1),
            }
        }
        Err(err) => {
            eprintln!("{}", format!("error: {err}").red());
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
