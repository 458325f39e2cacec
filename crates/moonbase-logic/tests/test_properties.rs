//! Property tests for the geometry kernel and the greedy rules.

use moonbase_logic::colony::{Colony, Module};
use moonbase_logic::config::SimConfig;
use moonbase_logic::economy::{advance_day, seed_ledger};
use moonbase_logic::geometry::{shadow_efficiency, Footprint, SolarObject, UnionFind};
use moonbase_logic::modules::ModuleKind;
use moonbase_logic::placement::{repair_coverage, PlacementContext};
use moonbase_logic::resources::Ledger;
use moonbase_logic::terrain::Terrain;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_footprint() -> impl Strategy<Value = Footprint> {
    (-20i32..40, -20i32..40, 1i32..8, 1i32..8).prop_map(|(x, y, w, h)| Footprint::new(x, y, w, h))
}

fn arb_unions(size: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..size, 0..size), 0..20)
}

// ---------------------------------------------------------------------------
// Union-find
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn union_find_joins_transitively(unions in arb_unions(12)) {
        let mut uf = UnionFind::new(12);
        for &(a, b) in &unions {
            uf.union(a, b);
        }
        for &(a, b) in &unions {
            prop_assert_eq!(uf.find(a), uf.find(b));
        }
        // Chains: a-b and b-c imply a-c.
        for &(a, b) in &unions {
            for &(c, d) in &unions {
                if b == c {
                    prop_assert!(uf.connected(a, d));
                }
            }
        }
    }

    #[test]
    fn union_find_find_is_idempotent(unions in arb_unions(12), node in 0usize..12) {
        let mut uf = UnionFind::new(12);
        for (a, b) in unions {
            uf.union(a, b);
        }
        let root = uf.find(node);
        prop_assert_eq!(uf.find(root), root);
        prop_assert_eq!(uf.find(node), root);
    }
}

// ---------------------------------------------------------------------------
// Footprints and shadows
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn overlap_is_symmetric(a in arb_footprint(), b in arb_footprint()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn footprint_overlaps_itself(a in arb_footprint()) {
        prop_assert!(a.overlaps(&a));
    }

    #[test]
    fn shadow_efficiency_never_exceeds_baseline(
        obstacles in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, 0.0f64..5.0), 0..10),
        baseline in 0i32..=100,
    ) {
        let station = SolarObject::new(0.0, 0.0, 0.0);
        let obstacles: Vec<SolarObject> = obstacles
            .into_iter()
            .map(|(x, y, r)| SolarObject::new(x, y, r))
            .collect();
        let eff = shadow_efficiency(station, &obstacles, baseline);
        prop_assert!(eff >= 0);
        prop_assert!(eff <= baseline);
    }
}

// ---------------------------------------------------------------------------
// Greedy coverage and the day tick
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn repair_coverage_is_capped(
        plants in prop::collection::vec((0i32..20, 0i32..20), 0..40),
        repairs in prop::collection::vec((0i32..20, 0i32..20), 1..4),
    ) {
        let terrain = Terrain::uniform(32, 1.0);
        let config = SimConfig::default();
        let mut modules = Vec::new();
        let mut id = 0;
        for (x, y) in plants.iter().chain(repairs.iter()) {
            id += 1;
            let kind = if id as usize > plants.len() {
                ModuleKind::RepairModule
            } else {
                ModuleKind::SolarPowerPlant
            };
            modules.push(Module { id, colony: 1, zone: 0, kind, x: *x, y: *y });
        }
        let ctx = PlacementContext {
            terrain: &terrain,
            config: &config,
            modules: &modules,
            links: &[],
            ledger: Ledger::new(&[]),
        };
        for m in modules.iter().filter(|m| m.kind == ModuleKind::RepairModule) {
            let covered = repair_coverage(&ctx, m);
            prop_assert!((0..=12).contains(&covered));
        }
    }

    #[test]
    fn balanced_tick_keeps_stocks(rate in 0i64..1_000_000, days in 1usize..60) {
        let config = SimConfig::default();
        let mut colony = Colony { alive: true, days_before_delivery: 30, ..Colony::new(1, "P") };
        let mut entries = seed_ledger(&config);
        for e in entries.iter_mut() {
            e.production = rate;
            e.consumption = rate;
        }
        let before: Vec<i64> = entries.iter().map(|e| e.stock).collect();
        for _ in 0..days {
            let report = advance_day(&mut colony, &mut entries, &config).unwrap();
            prop_assert!(report.alive);
        }
        let after: Vec<i64> = entries.iter().map(|e| e.stock).collect();
        prop_assert_eq!(before, after);
    }
}
