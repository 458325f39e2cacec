//! Moonbase Headless Simulation Harness
//!
//! Drives the colony engine end to end against an in-memory store: builds a
//! colony from a JSON plan, runs the day loop and checks the results.
//!
//! Usage:
//!   cargo run -p moonbase-simtest
//!   cargo run -p moonbase-simtest -- --verbose --days 90 --seed 7
//!   cargo run -p moonbase-simtest -- --terrain zones.json --snapshot base.bin

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use moonbase_logic::colony::{ColonyId, LinkKey, LinkKind};
use moonbase_logic::constants::{habitat, ZONE_COUNT};
use moonbase_logic::engine::{ColonyEngine, PlacementRequest};
use moonbase_logic::error::EngineError;
use moonbase_logic::modules::ModuleKind;
use moonbase_logic::resources::ResourceKind;
use moonbase_logic::store::MemoryStore;
use moonbase_logic::terrain::{self, Terrain};
use moonbase_logic::SimConfig;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ── Build plan (default plan ships with the repo) ───────────────────────
const PLAN_JSON: &str = include_str!("../../../data/colony_plan.json");

#[derive(Debug, Deserialize)]
struct BuildPlan {
    name: String,
    steps: Vec<PlanStep>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PlanStep {
    Place {
        module: ModuleKind,
        zone: usize,
        x: i32,
        y: i32,
    },
    Link {
        kind: LinkKind,
        zone_a: usize,
        zone_b: usize,
    },
}

#[derive(Parser, Debug)]
#[command(name = "moonbase-simtest")]
#[command(about = "Headless Moonbase colony simulation harness", long_about = None)]
struct Args {
    /// Economy balance overrides (JSON).
    #[arg(short, long, env = "MOONBASE_CONFIG")]
    config: Option<PathBuf>,

    /// Zone grids (JSON). Without it a synthetic map is generated.
    #[arg(short, long, env = "MOONBASE_TERRAIN")]
    terrain: Option<PathBuf>,

    /// Build plan (JSON). Defaults to the bundled plan.
    #[arg(short, long)]
    plan: Option<PathBuf>,

    /// Seed for the synthetic terrain.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Days to simulate after the build.
    #[arg(long, default_value_t = 60)]
    days: u32,

    /// Also write the final store snapshot here.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("=== Moonbase Simulation Harness ===\n");

    let config = match &args.config {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };
    let terrain = match &args.terrain {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidInput(e.to_string()))
            .and_then(|text| Terrain::from_json_str(&text))
        {
            Ok(t) => t,
            Err(e) => {
                eprintln!("terrain {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => Terrain::synthetic(args.seed),
    };
    let plan_text = match &args.plan {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("plan {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => PLAN_JSON.to_string(),
    };

    let terrain = terrain::install(terrain);
    let engine = match ColonyEngine::with_global_terrain(MemoryStore::new(), config.clone()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("engine: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Catalogue and terrain
    results.extend(validate_catalogue(&engine, args.verbose));

    // 2. Founding
    let (colony, founding) = validate_founding(&engine, args.verbose);
    results.extend(founding);

    if let Some(colony) = colony {
        // 3. Build plan
        results.extend(validate_build_plan(&engine, colony, &plan_text, args.verbose));

        // 4. Placement rejections
        results.extend(validate_rejections(&engine, colony, args.verbose));

        // 5. Economy day loop
        results.extend(validate_day_loop(&engine, colony, args.days, args.verbose));

        // 6. Scoring
        results.extend(validate_scoring(&engine, colony, args.verbose));

        // 7. Persistence
        results.extend(validate_persistence(
            &engine,
            colony,
            &terrain,
            &config,
            args.snapshot.as_ref(),
            args.verbose,
        ));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalogue and terrain ────────────────────────────────────────────

fn validate_catalogue(engine: &ColonyEngine<MemoryStore>, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalogue & Terrain ---");
    let mut results = Vec::new();

    let types = engine.module_types();
    results.push(TestResult::new(
        "catalogue_size",
        types.len() == ModuleKind::all().len(),
        format!("{} module types", types.len()),
    ));

    let bad_ids: Vec<_> = ModuleKind::all()
        .iter()
        .filter(|k| ModuleKind::from_id(k.id()) != Some(**k))
        .collect();
    results.push(TestResult::new(
        "catalogue_ids_roundtrip",
        bad_ids.is_empty(),
        if bad_ids.is_empty() {
            "every type id maps back to its kind".to_string()
        } else {
            format!("{:?} do not round-trip", bad_ids)
        },
    ));

    let bad_size: Vec<_> = ModuleKind::all()
        .iter()
        .filter(|k| k.spec().width <= 0 || k.spec().height <= 0)
        .map(|k| k.spec().name)
        .collect();
    results.push(TestResult::new(
        "catalogue_positive_footprints",
        bad_size.is_empty(),
        if bad_size.is_empty() {
            "all footprints are positive".to_string()
        } else {
            format!("non-positive footprint: {}", bad_size.join(", "))
        },
    ));

    let terrain = engine.terrain();
    results.push(TestResult::new(
        "terrain_zone_count",
        terrain.zone_count() == ZONE_COUNT,
        format!("{} zones", terrain.zone_count()),
    ));

    let mut asymmetric = Vec::new();
    for a in 0..terrain.zone_count() {
        for b in 0..terrain.zone_count() {
            if terrain.distance(a, b) != terrain.distance(b, a) {
                asymmetric.push((a, b));
            }
        }
    }
    results.push(TestResult::new(
        "terrain_distances_symmetric",
        asymmetric.is_empty(),
        format!("{} asymmetric pairs", asymmetric.len()),
    ));

    let dark: Vec<_> = terrain
        .zones()
        .iter()
        .filter(|z| !(0..=100).contains(&z.illumination))
        .map(|z| z.name.as_str())
        .collect();
    results.push(TestResult::new(
        "terrain_illumination_range",
        dark.is_empty(),
        if dark.is_empty() {
            "illumination within 0..=100".to_string()
        } else {
            format!("out of range: {}", dark.join(", "))
        },
    ));

    if verbose {
        for (id, zone) in terrain.zones().iter().enumerate() {
            println!(
                "  zone {} {:<24} {}x{} light {}",
                id,
                zone.name,
                zone.width(),
                zone.height(),
                zone.illumination
            );
        }
    }

    results
}

// ── 2. Founding ─────────────────────────────────────────────────────────

fn validate_founding(
    engine: &ColonyEngine<MemoryStore>,
    verbose: bool,
) -> (Option<ColonyId>, Vec<TestResult>) {
    println!("--- Founding ---");
    let mut results = Vec::new();

    let colony = match engine.create_colony("Harness Base") {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult::new("colony_create", false, e.to_string()));
            return (None, results);
        }
    };
    results.push(TestResult::new(
        "colony_created_dormant",
        !colony.alive,
        format!("colony {} alive={}", colony.id, colony.alive),
    ));

    let check = engine.check_placement(
        colony.id,
        &PlacementRequest::new(ModuleKind::Hallway, 0, 0, 0),
    );
    results.push(TestResult::new(
        "check_before_founding",
        check.is_ok(),
        "placement checks allowed on a dormant colony",
    ));

    match engine.colonize(colony.id) {
        Ok(snap) => {
            let stocks_match = ResourceKind::all().iter().all(|&kind| {
                snap.resources
                    .iter()
                    .find(|e| e.kind == kind)
                    .map(|e| e.stock)
                    == Some(engine.config().starting_stock(kind))
            });
            results.push(TestResult::new(
                "colonize_seeds_ledger",
                snap.colony.alive && snap.colony.day == 0 && stocks_match,
                format!(
                    "day {}, {} ledger rows, countdown {}",
                    snap.colony.day,
                    snap.resources.len(),
                    snap.colony.days_before_delivery
                ),
            ));
            if verbose {
                for e in &snap.resources {
                    println!("  {:<16} {:>10}", e.kind.name(), e.stock);
                }
            }
        }
        Err(e) => {
            results.push(TestResult::new("colonize_seeds_ledger", false, e.to_string()));
            return (None, results);
        }
    }

    let again = engine.colonize(colony.id);
    results.push(TestResult::new(
        "colonize_twice_rejected",
        matches!(again, Err(EngineError::ColonyAlreadyAlive(_))),
        format!("{:?}", again.err()),
    ));

    (Some(colony.id), results)
}

// ── 3. Build plan ───────────────────────────────────────────────────────

fn validate_build_plan(
    engine: &ColonyEngine<MemoryStore>,
    colony: ColonyId,
    plan_text: &str,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Build Plan ---");
    let mut results = Vec::new();

    let plan: BuildPlan = match serde_json::from_str(plan_text) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult::new(
                "plan_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return results;
        }
    };
    if verbose {
        println!("  plan '{}': {} steps", plan.name, plan.steps.len());
    }

    for (n, step) in plan.steps.iter().enumerate() {
        let before = material(engine, colony);
        match *step {
            PlanStep::Place { module, zone, x, y } => {
                let request = PlacementRequest::new(module, zone, x, y);
                let name = format!("plan_{:02}_{:?}", n, module);
                match engine.place_module(colony, &request) {
                    Ok(placed) => {
                        let charged = before - material(engine, colony);
                        results.push(TestResult::new(
                            name,
                            charged == placed.cost,
                            format!(
                                "#{} in zone {} at ({}, {}) cost {}",
                                placed.module.id, zone, x, y, placed.cost
                            ),
                        ));
                    }
                    Err(e) => results.push(TestResult::new(name, false, e.to_string())),
                }
            }
            PlanStep::Link {
                kind,
                zone_a,
                zone_b,
            } => {
                let name = format!("plan_{:02}_{}", n, LinkKey::new(kind, zone_a, zone_b));
                match engine.create_link(colony, kind, zone_a, zone_b) {
                    Ok(charge) => {
                        let expected = match kind {
                            LinkKind::Logistics => {
                                i64::from(engine.terrain().distance(zone_a, zone_b))
                            }
                            LinkKind::Power => 0,
                        };
                        let charged = before - material(engine, colony);
                        results.push(TestResult::new(
                            name,
                            charge == expected && charged == charge,
                            format!("charged {}", charge),
                        ));
                    }
                    Err(e) => results.push(TestResult::new(name, false, e.to_string())),
                }
            }
        }
    }

    match engine.snapshot(colony) {
        Ok(snap) => {
            let placed = plan
                .steps
                .iter()
                .filter(|s| matches!(s, PlanStep::Place { .. }))
                .count();
            results.push(TestResult::new(
                "plan_all_built",
                snap.modules.len() == placed && snap.colony.alive,
                format!(
                    "{} modules, {} links, alive={}",
                    snap.modules.len(),
                    snap.links.len(),
                    snap.colony.alive
                ),
            ));
        }
        Err(e) => results.push(TestResult::new("plan_all_built", false, e.to_string())),
    }

    match engine.optimality(colony) {
        Ok(report) => {
            let scored = report
                .iter()
                .filter(|a| a.relief.is_some() && a.rationality.is_some())
                .count();
            results.push(TestResult::new(
                "plan_optimality_report",
                scored > 0 && report.len() >= scored,
                format!("{}/{} modules still fully scored", scored, report.len()),
            ));
        }
        Err(e) => results.push(TestResult::new("plan_optimality_report", false, e.to_string())),
    }

    results
}

fn material(engine: &ColonyEngine<MemoryStore>, colony: ColonyId) -> i64 {
    engine
        .snapshot(colony)
        .ok()
        .and_then(|snap| {
            snap.resources
                .iter()
                .find(|e| e.kind == ResourceKind::Material)
                .map(|e| e.stock)
        })
        .unwrap_or(0)
}

// ── 4. Placement rejections ─────────────────────────────────────────────

fn validate_rejections(
    engine: &ColonyEngine<MemoryStore>,
    colony: ColonyId,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Placement Rejections ---");
    let mut results = Vec::new();

    let snap = match engine.snapshot(colony) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult::new("rejections_snapshot", false, e.to_string()));
            return results;
        }
    };
    let Some(first) = snap.modules.first().copied() else {
        results.push(TestResult::new("rejections_snapshot", false, "no modules built"));
        return results;
    };

    let cases = [
        (
            "reject_identical_footprint",
            PlacementRequest::new(first.kind, first.zone, first.x, first.y),
        ),
        (
            "reject_out_of_bounds",
            PlacementRequest::new(ModuleKind::Hallway, 0, -1, 0),
        ),
        (
            "reject_second_cosmodrome",
            PlacementRequest::new(ModuleKind::Cosmodrome, 2, 10, 10),
        ),
    ];
    for (name, request) in cases {
        match engine.check_placement(colony, &request) {
            Ok(report) => {
                if verbose {
                    println!(
                        "  {}: relief {:?}, rationality {:?}",
                        name, report.relief, report.rationality
                    );
                }
                results.push(TestResult::new(
                    name,
                    !report.possible,
                    format!("relief {:?}, rationality {:?}", report.relief, report.rationality),
                ));
            }
            Err(e) => results.push(TestResult::new(name, false, e.to_string())),
        }
    }

    let unknown_type = PlacementRequest {
        type_id: Some(99),
        ..PlacementRequest::new(ModuleKind::Hallway, 0, 0, 0)
    };
    let outcome = engine.check_placement(colony, &unknown_type);
    results.push(TestResult::new(
        "reject_unknown_type",
        matches!(outcome, Err(EngineError::InvalidInput(_))),
        format!("{:?}", outcome.err()),
    ));

    let duplicate = snap.links.first().map(|l| l.key);
    if let Some(key) = duplicate {
        let outcome = engine.create_link(colony, key.kind, key.zone_a, key.zone_b);
        results.push(TestResult::new(
            "reject_duplicate_link",
            matches!(outcome, Err(EngineError::DuplicateLink(_))),
            format!("{} -> {:?}", key, outcome.err()),
        ));
    }

    let outcome = engine.create_link(colony, LinkKind::Power, 3, 3);
    results.push(TestResult::new(
        "reject_self_link",
        matches!(outcome, Err(EngineError::InvalidInput(_))),
        format!("{:?}", outcome.err()),
    ));

    results
}

// ── 5. Economy day loop ─────────────────────────────────────────────────

fn validate_day_loop(
    engine: &ColonyEngine<MemoryStore>,
    colony: ColonyId,
    days: u32,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Day Loop ---");
    let mut results = Vec::new();

    if let Err(e) = engine.recompute_production(colony) {
        results.push(TestResult::new("recompute_production", false, e.to_string()));
        return results;
    }

    let interval = engine.config().delivery_interval;
    let mut last_day = 0;
    let mut deliveries = 0;
    let mut misplaced_delivery = None;
    let mut died_on = None;
    let mut failure = None;

    for _ in 0..days {
        match engine.advance_day(colony) {
            Ok(report) => {
                if report.day != last_day + 1 {
                    failure = Some(format!("day jumped from {} to {}", last_day, report.day));
                    break;
                }
                last_day = report.day;
                if report.delivery {
                    deliveries += 1;
                    if report.day % interval != 0 {
                        misplaced_delivery = Some(report.day);
                    }
                }
                if verbose && (report.delivery || !report.alive) {
                    println!(
                        "  day {:>3}: delivery={} alive={} food {:+}",
                        report.day,
                        report.delivery,
                        report.alive,
                        report.diff(ResourceKind::Food)
                    );
                }
                if !report.alive {
                    died_on = Some(report.day);
                    break;
                }
            }
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        }
    }

    results.push(TestResult::new(
        "day_counter_advances",
        failure.is_none(),
        failure.unwrap_or_else(|| format!("reached day {}", last_day)),
    ));
    results.push(TestResult::new(
        "deliveries_on_schedule",
        misplaced_delivery.is_none() && deliveries == last_day / interval,
        match misplaced_delivery {
            Some(day) => format!("unexpected delivery on day {}", day),
            None => format!("{} deliveries every {} days", deliveries, interval),
        },
    ));

    match died_on {
        Some(day) => {
            let outcome = engine.advance_day(colony);
            results.push(TestResult::new(
                "dead_colony_frozen",
                matches!(outcome, Err(EngineError::ColonyNotAlive(_))),
                format!("died on day {}, further ticks refused", day),
            ));
        }
        None => {
            let alive = engine.snapshot(colony).map(|s| s.colony.alive);
            results.push(TestResult::new(
                "colony_survives",
                matches!(alive, Ok(true)),
                format!("alive after {} days", last_day),
            ));
        }
    }

    results
}

// ── 6. Scoring ──────────────────────────────────────────────────────────

fn validate_scoring(
    engine: &ColonyEngine<MemoryStore>,
    colony: ColonyId,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Scoring ---");
    let mut results = Vec::new();

    let stats = match engine.statistics(colony) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult::new("statistics", false, e.to_string()));
            return results;
        }
    };
    let snap = match engine.snapshot(colony) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult::new("statistics", false, e.to_string()));
            return results;
        }
    };

    let housing = snap.modules.iter().filter(|m| m.kind.is_housing()).count() as i32;
    results.push(TestResult::new(
        "population_housed",
        stats.success.population_housed == housing * habitat::RESIDENTS_PER_MODULE,
        format!(
            "{} housed, {} needed",
            stats.success.population_housed, stats.success.population_needed
        ),
    ));

    results.push(TestResult::new(
        "statistics_cover_every_zone",
        stats.zones.len() == engine.terrain().zone_count(),
        format!("{} zone rows", stats.zones.len()),
    ));

    let s = stats.success;
    results.push(TestResult::new(
        "subscores_bounded",
        (0..=100).contains(&s.centralization_score) && (0..=100).contains(&s.research_score),
        format!(
            "centralization {}, research {}",
            s.centralization_score, s.research_score
        ),
    ));

    let direct = engine.success(colony);
    results.push(TestResult::new(
        "success_matches_statistics",
        direct.as_ref().ok() == Some(&s),
        format!("success index {}", s.success),
    ));

    if verbose {
        println!(
            "  day {} alive={} success {} mood {} resources {}",
            stats.day, stats.alive, s.success, s.mood, s.resource_score
        );
        for zone in &stats.zones {
            let power = zone.flows.production[ResourceKind::Power]
                - zone.flows.consumption[ResourceKind::Power];
            println!("  zone {} {:<24} net power {:+}", zone.zone, zone.name, power);
        }
    }

    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(
    engine: &ColonyEngine<MemoryStore>,
    colony: ColonyId,
    terrain: &Arc<Terrain>,
    config: &SimConfig,
    path: Option<&PathBuf>,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut bytes = Vec::new();
    if let Err(e) = engine.store().save_snapshot(&mut bytes) {
        results.push(TestResult::new("snapshot_save", false, e.to_string()));
        return results;
    }
    if verbose {
        println!("  snapshot {} bytes", bytes.len());
    }

    let restored = match MemoryStore::load_snapshot(bytes.as_slice()) {
        Ok(store) => ColonyEngine::new(store, terrain.clone(), config.clone()),
        Err(e) => {
            results.push(TestResult::new("snapshot_load", false, e.to_string()));
            return results;
        }
    };
    let same = match (engine.snapshot(colony), restored.snapshot(colony)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    results.push(TestResult::new(
        "snapshot_roundtrip",
        same,
        format!("{} bytes restore colony {}", bytes.len(), colony),
    ));

    if let Some(path) = path {
        let written = std::fs::write(path, &bytes);
        results.push(TestResult::new(
            "snapshot_written",
            written.is_ok(),
            match written {
                Ok(()) => format!("wrote {}", path.display()),
                Err(e) => format!("{}: {}", path.display(), e),
            },
        ));
    }

    results
}
