//! Pure economy logic: production tallies, link upkeep and the day tick.

use serde::{Deserialize, Serialize};

use crate::colony::{Colony, ColonyId, Link, LinkKind};
use crate::config::SimConfig;
use crate::error::{EngineError, EngineResult};
use crate::placement::{ModuleBehavior, PlacementContext, ZoneScope};
use crate::resources::{ResourceEntry, ResourceKind, ResourceTally};
use crate::terrain::Terrain;

/// Production and consumption rates summed over a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flows {
    pub production: ResourceTally,
    pub consumption: ResourceTally,
}

/// Sum every module's contribution within `scope`. Link upkeep is not
/// included.
pub fn tally(ctx: &PlacementContext<'_>, scope: ZoneScope) -> Flows {
    let mut flows = Flows::default();
    for module in ctx.modules {
        module.production(ctx, scope, &mut flows.production);
        module.consumption(ctx, scope, &mut flows.consumption);
    }
    flows
}

/// Daily power upkeep of all power links.
pub fn link_upkeep(terrain: &Terrain, links: &[Link], config: &SimConfig) -> i64 {
    let distance: i64 = links
        .iter()
        .filter(|l| l.key.kind == LinkKind::Power)
        .map(|l| i64::from(terrain.distance(l.key.zone_a, l.key.zone_b)))
        .sum();
    config.link_upkeep(distance)
}

/// Index of each resource's ledger row. Fails if a row is missing.
fn rows(colony: ColonyId, entries: &[ResourceEntry]) -> EngineResult<[usize; ResourceKind::COUNT]> {
    let mut rows = [0; ResourceKind::COUNT];
    for kind in ResourceKind::all() {
        rows[kind.index()] = entries
            .iter()
            .position(|e| e.kind == *kind)
            .ok_or(EngineError::UnknownResource {
                colony,
                kind: *kind,
            })?;
    }
    Ok(rows)
}

/// Rebuild the instantaneous rates of every ledger row from the colony's
/// modules and links. Stocks are untouched.
pub fn recompute(
    ctx: &PlacementContext<'_>,
    colony: ColonyId,
    entries: &mut [ResourceEntry],
) -> EngineResult<()> {
    let rows = rows(colony, entries)?;
    let mut flows = tally(ctx, ZoneScope::Colony);
    flows.consumption[ResourceKind::Power] += link_upkeep(ctx.terrain, ctx.links, ctx.config);
    for kind in ResourceKind::all() {
        let entry = &mut entries[rows[kind.index()]];
        entry.production = flows.production[*kind];
        entry.consumption = flows.consumption[*kind];
    }
    Ok(())
}

/// Outcome of one day tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub day: i32,
    pub delivery: bool,
    /// Net change applied to each stock, in ledger order.
    pub diffs: [i64; ResourceKind::COUNT],
    pub alive: bool,
}

impl DayReport {
    pub fn diff(&self, kind: ResourceKind) -> i64 {
        self.diffs[kind.index()]
    }
}

/// Advance a colony by one day.
///
/// Oxygen shortfall is covered by electrolysis, paid in power and water,
/// and the adjusted rates stay in the ledger. On delivery days negative
/// flows of everything except power receive the resupply correction.
pub fn advance_day(
    colony: &mut Colony,
    entries: &mut [ResourceEntry],
    config: &SimConfig,
) -> EngineResult<DayReport> {
    let rows = rows(colony.id, entries)?;
    let row = |kind: ResourceKind| rows[kind.index()];

    colony.day += 1;
    let delivery = colony.days_before_delivery == 1;
    if delivery {
        colony.days_before_delivery = config.delivery_interval;
    } else {
        colony.days_before_delivery -= 1;
    }

    let oxygen = &entries[row(ResourceKind::Oxygen)];
    let deficit = oxygen.consumption - oxygen.production;
    if deficit > 0 {
        entries[row(ResourceKind::Power)].consumption +=
            deficit * config.power_per_kg_oxygen / 1000;
        entries[row(ResourceKind::Water)].consumption +=
            (deficit as f64 * config.water_per_kg_oxygen) as i64;
        entries[row(ResourceKind::Oxygen)].production += deficit;
    }

    let mut diffs = [0; ResourceKind::COUNT];
    for kind in ResourceKind::all() {
        let entry = &mut entries[row(*kind)];
        let mut diff = entry.net();
        if delivery && diff < 0 && *kind != ResourceKind::Power {
            diff -= diff * i64::from(config.delivery_interval) + (entry.stock + diff * 5);
        }
        entry.stock += diff;
        entry.total_production += entry.production;
        entry.total_consumption += entry.consumption;
        diffs[kind.index()] = diff;
    }

    colony.alive = entries.iter().all(|e| e.stock >= 0);
    Ok(DayReport {
        day: colony.day,
        delivery,
        diffs,
        alive: colony.alive,
    })
}

/// Fresh ledger rows holding the starting stock table.
pub fn seed_ledger(config: &SimConfig) -> Vec<ResourceEntry> {
    ResourceKind::all()
        .iter()
        .map(|&kind| ResourceEntry::seeded(kind, config.starting_stock(kind)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::{LinkKey, Module};
    use crate::modules::ModuleKind;
    use crate::resources::Ledger;

    fn live_colony() -> Colony {
        Colony {
            id: 1,
            name: "Test".into(),
            day: 0,
            days_before_delivery: 30,
            alive: true,
        }
    }

    fn set_rates(entries: &mut [ResourceEntry], kind: ResourceKind, prod: i64, cons: i64) {
        let e = entries.iter_mut().find(|e| e.kind == kind).unwrap();
        e.production = prod;
        e.consumption = cons;
    }

    fn stock(entries: &[ResourceEntry], kind: ResourceKind) -> i64 {
        entries.iter().find(|e| e.kind == kind).unwrap().stock
    }

    #[test]
    fn test_balanced_tick_keeps_stocks() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        for kind in ResourceKind::all() {
            set_rates(&mut entries, *kind, 500, 500);
        }
        let before: Vec<i64> = entries.iter().map(|e| e.stock).collect();
        let report = advance_day(&mut colony, &mut entries, &config).unwrap();
        let after: Vec<i64> = entries.iter().map(|e| e.stock).collect();
        assert_eq!(before, after);
        assert!(report.alive);
        assert_eq!(report.day, 1);
        assert_eq!(colony.days_before_delivery, 29);
        assert_eq!(stock(&entries, ResourceKind::Water), 600);
    }

    #[test]
    fn test_oxygen_deficit_paid_by_electrolysis() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        set_rates(&mut entries, ResourceKind::Oxygen, 0, 100);
        set_rates(&mut entries, ResourceKind::Power, 10_000, 1_000);
        set_rates(&mut entries, ResourceKind::Water, 1_000, 100);
        let report = advance_day(&mut colony, &mut entries, &config).unwrap();

        let power = entries.iter().find(|e| e.kind == ResourceKind::Power).unwrap();
        assert_eq!(power.consumption, 1_000 + 525);
        let water = entries.iter().find(|e| e.kind == ResourceKind::Water).unwrap();
        assert_eq!(water.consumption, 100 + 88);
        assert_eq!(report.diff(ResourceKind::Oxygen), 0);
        assert_eq!(report.diff(ResourceKind::Power), 10_000 - 1_525);
        assert!(report.alive);
    }

    #[test]
    fn test_negative_stock_kills_colony() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        set_rates(&mut entries, ResourceKind::Food, 0, 451);
        let report = advance_day(&mut colony, &mut entries, &config).unwrap();
        assert!(!report.alive);
        assert!(!colony.alive);
        assert_eq!(stock(&entries, ResourceKind::Food), -1);
    }

    #[test]
    fn test_delivery_day_correction() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        colony.days_before_delivery = 1;
        let mut entries = seed_ledger(&config);
        set_rates(&mut entries, ResourceKind::Food, 0, 10);
        set_rates(&mut entries, ResourceKind::Power, 0, 10);
        let report = advance_day(&mut colony, &mut entries, &config).unwrap();
        assert!(report.delivery);
        assert_eq!(colony.days_before_delivery, 30);
        // -10 - (-300 + (450 - 50))
        assert_eq!(report.diff(ResourceKind::Food), -110);
        assert_eq!(stock(&entries, ResourceKind::Food), 340);
        // Power never gets the correction.
        assert_eq!(report.diff(ResourceKind::Power), -10);
        assert!(!report.alive);
    }

    #[test]
    fn test_delivery_every_thirty_days() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        let deliveries: Vec<i32> = (0..90)
            .filter_map(|_| {
                let report = advance_day(&mut colony, &mut entries, &config).unwrap();
                report.delivery.then_some(report.day)
            })
            .collect();
        assert_eq!(deliveries, vec![30, 60, 90]);
    }

    #[test]
    fn test_lifetime_sums_accumulate() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        set_rates(&mut entries, ResourceKind::Fuel, 7, 3);
        for _ in 0..3 {
            advance_day(&mut colony, &mut entries, &config).unwrap();
        }
        let fuel = entries.iter().find(|e| e.kind == ResourceKind::Fuel).unwrap();
        assert_eq!(fuel.total_production, 21);
        assert_eq!(fuel.total_consumption, 9);
        assert_eq!(fuel.stock, 12);
    }

    #[test]
    fn test_missing_row_is_error() {
        let config = SimConfig::default();
        let mut colony = live_colony();
        let mut entries = seed_ledger(&config);
        entries.retain(|e| e.kind != ResourceKind::Garbage);
        assert!(matches!(
            advance_day(&mut colony, &mut entries, &config),
            Err(EngineError::UnknownResource {
                kind: ResourceKind::Garbage,
                ..
            })
        ));
        assert_eq!(colony.day, 0);
    }

    #[test]
    fn test_recompute_adds_power_link_upkeep() {
        let terrain = Terrain::uniform(20, 1.0);
        let config = SimConfig::default();
        let modules = [Module {
            id: 1,
            colony: 1,
            zone: 0,
            kind: ModuleKind::Plantation,
            x: 0,
            y: 0,
        }];
        let links = [
            Link {
                colony: 1,
                key: LinkKey::new(LinkKind::Power, 0, 1),
            },
            Link {
                colony: 1,
                key: LinkKey::new(LinkKind::Logistics, 0, 2),
            },
        ];
        let mut entries = seed_ledger(&config);
        let snapshot = entries.clone();
        let ctx = PlacementContext {
            terrain: &terrain,
            config: &config,
            modules: &modules,
            links: &links,
            ledger: Ledger::new(&snapshot),
        };
        recompute(&ctx, 1, &mut entries).unwrap();
        let power = entries.iter().find(|e| e.kind == ResourceKind::Power).unwrap();
        // 8200 * 12 / 10000 = 9
        assert_eq!(power.consumption, 175_000 + 9);
        let food = entries.iter().find(|e| e.kind == ResourceKind::Food).unwrap();
        assert_eq!(food.production, 1640);
        assert_eq!(food.stock, 450);
    }
}
