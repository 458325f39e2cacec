//! Placement and rationality rules.
//!
//! A [`PlacementContext`] is a read-only view of one colony (modules sorted
//! by id, links, resource ledger) plus the terrain. Every [`Module`], stored
//! or candidate, answers the [`ModuleBehavior`] capabilities against it.
//!
//! Greedy rules (`enough_people`, repair coverage) walk modules in id order,
//! which is creation order. A candidate that has not been stored yet places
//! no demand on staffing and is walked as the newest module for repair
//! coverage.

use crate::colony::{Link, LinkKind, Module};
use crate::config::SimConfig;
use crate::constants::{cosmodrome, habitat, repair, solar};
use crate::geometry::{shadow_efficiency, Footprint, SolarObject, UnionFind};
use crate::modules::ModuleKind;
use crate::resources::{Ledger, ResourceKind, ResourceTally};
use crate::terrain::Terrain;

/// Which modules feed a production/consumption tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneScope {
    Colony,
    Zone(usize),
}

impl ZoneScope {
    pub fn includes(self, zone: usize) -> bool {
        match self {
            Self::Colony => true,
            Self::Zone(z) => z == zone,
        }
    }
}

/// Read-only colony view the rules evaluate against.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub terrain: &'a Terrain,
    pub config: &'a SimConfig,
    /// Must be sorted by id.
    pub modules: &'a [Module],
    pub links: &'a [Link],
    pub ledger: Ledger<'a>,
}

impl<'a> PlacementContext<'a> {
    /// Modules in id order with `module` included; a candidate goes last.
    fn ordered_with(&self, module: &Module) -> Vec<Module> {
        debug_assert!(self.modules.windows(2).all(|w| w[0].id < w[1].id));
        let mut ordered = self.modules.to_vec();
        if !self.modules.iter().any(|m| m.id == module.id) {
            ordered.push(*module);
        }
        ordered
    }

    /// Other modules in `module`'s zone.
    fn neighbours<'m>(&'m self, module: &'m Module) -> impl Iterator<Item = &'a Module> + 'm {
        self.modules
            .iter()
            .filter(move |m| m.zone == module.zone && m.id != module.id)
    }

    /// Other modules anywhere in the colony.
    fn others<'m>(&'m self, module: &'m Module) -> impl Iterator<Item = &'a Module> + 'm {
        self.modules.iter().filter(move |m| m.id != module.id)
    }

    fn exists(&self, kind: ModuleKind) -> bool {
        self.modules.iter().any(|m| m.kind == kind)
    }

    fn count(&self, kind: ModuleKind) -> usize {
        self.modules.iter().filter(|m| m.kind == kind).count()
    }
}

/// Relief and rationality of one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub relief: Option<i32>,
    pub rationality: Option<i32>,
}

impl Assessment {
    pub fn possible(&self) -> bool {
        self.relief.is_some() && self.rationality.is_some()
    }
}

/// Capabilities every module kind answers.
pub trait ModuleBehavior {
    /// Buildability from the slope under the footprint. `None` is unbuildable.
    fn relief(&self, ctx: &PlacementContext<'_>) -> Option<i32>;
    /// Viability score, or `None` when the placement is invalid.
    fn rationality(&self, ctx: &PlacementContext<'_>) -> Option<i32>;
    fn production(&self, ctx: &PlacementContext<'_>, scope: ZoneScope, tally: &mut ResourceTally);
    fn consumption(&self, ctx: &PlacementContext<'_>, scope: ZoneScope, tally: &mut ResourceTally);
    fn overlaps(&self, other: &Footprint) -> bool;
    fn radius(&self) -> i32;

    fn assess(&self, ctx: &PlacementContext<'_>) -> Assessment {
        Assessment {
            relief: self.relief(ctx),
            rationality: self.rationality(ctx),
        }
    }
}

impl ModuleBehavior for Module {
    fn relief(&self, ctx: &PlacementContext<'_>) -> Option<i32> {
        let spec = self.kind.spec();
        let mut steepest = 0.0_f64;
        for dy in 0..spec.height {
            for dx in 0..spec.width {
                let cell = ctx.terrain.cell(self.zone, self.x + dx, self.y + dy).ok()?;
                steepest = steepest.max(cell.angle);
            }
        }
        let relief = ((spec.tolerance - steepest) * 10.0).round() as i32;
        (relief > 0).then_some(relief)
    }

    fn rationality(&self, ctx: &PlacementContext<'_>) -> Option<i32> {
        use ModuleKind::*;
        match self.kind {
            LiveModuleX | LiveModuleY => {
                clear_site(ctx, self, true)?;
                Some(if touches_habitable(ctx, self) { 100 } else { 50 })
            }
            LiveAdministrativeModule | AdministrativeModule => administrative(ctx, self),
            SportModule | MedicalModule => {
                require(enough_people(ctx, self))?;
                clear_site(ctx, self, true)?;
                require(touches_habitable(ctx, self))?;
                Some(shared_score(ctx, self))
            }
            Plantation => {
                require(enough_people(ctx, self))?;
                clear_site(ctx, self, true)?;
                require(touches_habitable(ctx, self))?;
                let production = ctx.ledger.production(ResourceKind::Food);
                let consumption = ctx.ledger.consumption(ResourceKind::Food);
                if consumption == 0 {
                    return Some(100);
                }
                Some((production / consumption * 1000 / 3).min(100) as i32)
            }
            ResearchModulePlantation
            | ResearchModuleMine
            | ResearchModuleTelescope
            | ResearchModuleTerritory => {
                require(enough_people(ctx, self))?;
                clear_site(ctx, self, true)?;
                require(touches_habitable(ctx, self))?;
                let prerequisite = match self.kind {
                    ResearchModulePlantation => Some(Plantation),
                    ResearchModuleMine => Some(MineBase),
                    ResearchModuleTelescope => Some(AstronomicalSite),
                    _ => None,
                };
                if let Some(kind) = prerequisite {
                    require(ctx.exists(kind))?;
                }
                Some(shared_score(ctx, self))
            }
            Hallway => {
                clear_site(ctx, self, true)?;
                require(touches_habitable(ctx, self))?;
                Some(100)
            }
            SolarPowerPlant => {
                require(enough_people(ctx, self))?;
                require(clear_site(ctx, self, false)?)?;
                Some(solar_efficiency(ctx, self))
            }
            RepairModule => {
                require(enough_people(ctx, self))?;
                require(clear_site(ctx, self, true)?)?;
                Some(repair_coverage(ctx, self) / repair::MAX_COVERAGE * 100)
            }
            Cosmodrome => {
                require(!ctx.others(self).any(|m| m.kind == Cosmodrome))?;
                clear_site(ctx, self, true)?;
                let warehouses = [WarehouseFood, WarehouseFuel, WarehouseGases, WarehouseMaterial]
                    .iter()
                    .filter(|&&kind| ctx.exists(kind))
                    .count() as i32;
                Some(20 + 20 * warehouses)
            }
            CommunicationTower => {
                require(clear_site(ctx, self, true)?)?;
                let crowded = ctx.neighbours(self).any(|m| m.kind == CommunicationTower);
                Some(if crowded { 50 } else { 100 })
            }
            Landfill | LandfillBio => {
                require(enough_people(ctx, self))?;
                let source = if ctx.modules.iter().any(|m| m.kind.is_housing()) {
                    50
                } else {
                    0
                };
                // Stored landfills do not count themselves here either.
                let unique = if ctx.others(self).any(|m| m.kind == self.kind) {
                    0
                } else {
                    50
                };
                require(clear_site(ctx, self, true)?)?;
                Some(source + unique)
            }
            ManufacturingEnterprise => {
                require(enough_people(ctx, self))?;
                require(clear_site(ctx, self, true)?)?;
                require(ctx.neighbours(self).any(|m| m.kind == MineBase))?;
                let oxygen = shortfall(ctx, ResourceKind::Oxygen);
                let water = shortfall(ctx, ResourceKind::Water);
                let material = shortfall(ctx, ResourceKind::Material);
                Some(((oxygen + 2 * water + material) / 4).max(0) as i32)
            }
            ManufacturingEnterpriseFuel => {
                require(enough_people(ctx, self))?;
                require(clear_site(ctx, self, true)?)?;
                let fuel = ctx.ledger.production(ResourceKind::Fuel);
                let stocked = fuel * i64::from(ctx.config.delivery_interval) * 6;
                Some((100 - stocked / ctx.config.mass * 100) as i32)
            }
            AstronomicalSite => {
                require(clear_site(ctx, self, true)?)?;
                Some(100 - ctx.terrain.illumination(self.zone))
            }
            MineBase => {
                require(enough_people(ctx, self))?;
                require(clear_site(ctx, self, true)?)?;
                Some(shortfall(ctx, ResourceKind::Material).clamp(0, 100) as i32)
            }
            WarehouseFood | WarehouseGases | WarehouseFuel | WarehouseMaterial => {
                require(clear_site(ctx, self, true)?)?;
                let at_port = ctx
                    .modules
                    .iter()
                    .any(|m| m.kind == Cosmodrome && m.zone == self.zone);
                Some(if at_port { 100 } else { 50 })
            }
        }
    }

    fn production(&self, ctx: &PlacementContext<'_>, scope: ZoneScope, tally: &mut ResourceTally) {
        if !scope.includes(self.zone) {
            return;
        }
        for &(kind, amount) in self.kind.fixed_production() {
            tally.add(kind, amount);
        }
        match self.kind {
            ModuleKind::SolarPowerPlant => {
                let score = i64::from(self.rationality(ctx).unwrap_or(0));
                tally.add(ResourceKind::Power, solar::POWER_PER_POINT * score);
            }
            ModuleKind::LandfillBio => {
                let mass = landfill_mass(ctx, self.kind);
                tally.add(ResourceKind::CarbonDioxide, mass * 1730);
                tally.add(ResourceKind::Water, mass * 560);
                tally.add(ResourceKind::Garbage, mass * 30);
            }
            ModuleKind::Landfill => {
                let mass = landfill_mass(ctx, self.kind);
                tally.add(ResourceKind::Material, mass * 20);
            }
            _ => {}
        }
    }

    fn consumption(&self, ctx: &PlacementContext<'_>, scope: ZoneScope, tally: &mut ResourceTally) {
        if !scope.includes(self.zone) {
            return;
        }
        for &(kind, amount) in self.kind.fixed_consumption() {
            tally.add(kind, amount);
        }
        match self.kind {
            ModuleKind::RepairModule => {
                let covered = repair_coverage(ctx, self);
                tally.add(ResourceKind::Power, 4800 + 2000 * i64::from(covered));
                let material = repair::MATERIAL_PER_COVERED * f64::from(covered) * 1000.0;
                tally.add(ResourceKind::Material, material as i64);
            }
            ModuleKind::LandfillBio => {
                let mass = landfill_mass(ctx, self.kind);
                tally.add(ResourceKind::Power, mass * 3);
                tally.add(ResourceKind::Oxygen, mass * 1320);
            }
            ModuleKind::Landfill => {
                let mass = landfill_mass(ctx, self.kind);
                tally.add(ResourceKind::Garbage, mass * 30);
                tally.add(ResourceKind::Power, mass * 3);
            }
            _ => {}
        }
    }

    fn overlaps(&self, other: &Footprint) -> bool {
        self.footprint().overlaps(other)
    }

    fn radius(&self) -> i32 {
        self.kind.radius()
    }
}

fn require(condition: bool) -> Option<()> {
    condition.then_some(())
}

/// The cosmodrome footprint grown by its danger zone.
pub fn cosmodrome_buffer(port: &Module) -> Footprint {
    port.footprint().expanded(cosmodrome::DANGER_ZONE)
}

/// Shared site check: no overlap with any other module in the zone and,
/// when `respect_buffer`, no intrusion into a cosmodrome's danger zone.
/// Returns whether an administrative module is present in the zone.
fn clear_site(ctx: &PlacementContext<'_>, module: &Module, respect_buffer: bool) -> Option<bool> {
    let footprint = module.footprint();
    let mut admin = false;
    for other in ctx.neighbours(module) {
        if other.footprint().overlaps(&footprint) {
            return None;
        }
        if respect_buffer
            && other.kind == ModuleKind::Cosmodrome
            && cosmodrome_buffer(other).overlaps(&footprint)
        {
            return None;
        }
        admin |= other.kind.is_admin();
    }
    Some(admin)
}

fn touches_habitable(ctx: &PlacementContext<'_>, module: &Module) -> bool {
    let footprint = module.footprint();
    ctx.neighbours(module)
        .filter(|m| m.kind.spec().habitable)
        .any(|m| footprint.adjacent_to(&m.footprint()))
}

/// Residents housed against residents needed, walking modules in id order.
///
/// Housing capacity counts every housing module in the colony. Demand counts
/// stored non-housing modules up to and including `module`; an unstored
/// candidate adds nothing, so every stored module counts against it.
pub fn enough_people(ctx: &PlacementContext<'_>, module: &Module) -> bool {
    let mut capacity = 0;
    let mut demand = 0;
    let mut reached = false;
    for m in ctx.modules {
        if m.kind.is_housing() {
            capacity += habitat::RESIDENTS_PER_MODULE;
        } else if !reached {
            demand += m.kind.spec().people;
            reached = m.id == module.id;
        }
    }
    capacity >= demand
}

/// `100 / n` where `n` counts same-kind modules including this one.
fn shared_score(ctx: &PlacementContext<'_>, module: &Module) -> i32 {
    // Self is excluded by id, so a stored duplicate scores the same as the
    // candidate did; optimality reports for such duplicates run higher than
    // a count that also matches the module itself.
    let others = ctx.others(module).filter(|m| m.kind == module.kind).count() as i32;
    100 / (others + 1)
}

/// `100 - production / consumption * 100` in whole units; zero with no demand.
fn shortfall(ctx: &PlacementContext<'_>, kind: ResourceKind) -> i64 {
    let consumption = ctx.ledger.consumption(kind);
    if consumption == 0 {
        return 0;
    }
    100 - ctx.ledger.production(kind) / consumption * 100
}

/// Administrative placement: one admin-class module per zone, and the zone
/// must reach the cosmodrome over logistics links.
fn administrative(ctx: &PlacementContext<'_>, module: &Module) -> Option<i32> {
    require(!ctx.neighbours(module).any(|m| m.kind.is_admin()))?;
    let port = ctx
        .modules
        .iter()
        .find(|m| m.kind == ModuleKind::Cosmodrome)?;
    clear_site(ctx, module, true)?;
    if port.zone == module.zone {
        return Some(100);
    }
    let mut graph = UnionFind::new(ctx.terrain.zone_count());
    for link in ctx.links.iter().filter(|l| l.key.kind == LinkKind::Logistics) {
        graph.union(link.key.zone_a, link.key.zone_b);
    }
    graph.connected(port.zone, module.zone).then_some(100)
}

/// Shadow efficiency of a solar plant against every other module in its zone.
fn solar_efficiency(ctx: &PlacementContext<'_>, module: &Module) -> i32 {
    let scale = solar::CELL_SCALE;
    let station = SolarObject::new(
        f64::from(module.x) * scale,
        f64::from(module.y) * scale,
        f64::from(module.radius()),
    );
    let obstacles: Vec<SolarObject> = ctx
        .neighbours(module)
        .map(|m| {
            SolarObject::new(
                f64::from(m.x) * scale,
                f64::from(m.y) * scale,
                f64::from(m.radius()),
            )
        })
        .collect();
    shadow_efficiency(station, &obstacles, ctx.terrain.illumination(module.zone))
}

/// Modules in `module`'s service range that it maintains, capped at
/// [`repair::MAX_COVERAGE`].
///
/// Walking the zone in id order, every earlier repair module claims up to the
/// cap from the unclaimed earlier modules that fall inside `module`'s range.
/// `module` then takes what is left in range, and every newer module in
/// range counts while the cap allows, repair modules included.
pub fn repair_coverage(ctx: &PlacementContext<'_>, module: &Module) -> i32 {
    let cap = repair::MAX_COVERAGE;
    let range = module.footprint().expanded(repair::RADIUS);

    let mut pool: Vec<Footprint> = Vec::new();
    let mut covered = 0;
    let mut reached = false;
    for m in ctx
        .ordered_with(module)
        .into_iter()
        .filter(|m| m.zone == module.zone)
    {
        if m.id == module.id {
            covered = claim(&mut pool, &range, cap);
            reached = true;
        } else if reached {
            if covered < cap && m.footprint().overlaps(&range) {
                covered += 1;
            }
        } else if m.kind == ModuleKind::RepairModule {
            claim(&mut pool, &range, cap);
        } else {
            pool.push(m.footprint());
        }
    }
    covered
}

/// Remove up to `cap` pool entries inside `range`; returns how many.
fn claim(pool: &mut Vec<Footprint>, range: &Footprint, cap: i32) -> i32 {
    let mut claimed = 0;
    pool.retain(|target| {
        if claimed < cap && target.overlaps(range) {
            claimed += 1;
            false
        } else {
            true
        }
    });
    claimed
}

/// Landfill throughput: housing waste plus biological or industrial waste.
fn landfill_mass(ctx: &PlacementContext<'_>, kind: ModuleKind) -> i64 {
    let housing = ctx.modules.iter().filter(|m| m.kind.is_housing()).count() as f64;
    let feed = match kind {
        ModuleKind::LandfillBio => ctx.count(ModuleKind::Plantation) as f64 * 4.9,
        _ => {
            ctx.modules
                .iter()
                .filter(|m| !m.kind.spec().habitable)
                .count() as f64
                * 0.5
        }
    };
    (housing * 1.6 + feed) as i64
}
