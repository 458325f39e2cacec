//! The colony engine facade.
//!
//! [`ColonyEngine`] exposes every colony operation over a [`ColonyStore`].
//! Each operation loads the colony snapshot, evaluates the rules and writes
//! the result back while holding the colony's lock.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::colony::{Colony, ColonyId, ColonySnapshot, Link, LinkKey, LinkKind, Module, ModuleId};
use crate::config::SimConfig;
use crate::constants::FLAT_ANGLE;
use crate::economy::{self, DayReport, Flows};
use crate::error::{EngineError, EngineResult};
use crate::modules::{self, ModuleKind, ModuleTypeInfo};
use crate::placement::{ModuleBehavior, PlacementContext, ZoneScope};
use crate::resources::{Ledger, ResourceEntry, ResourceKind};
use crate::scoring::{self, Success};
use crate::store::ColonyStore;
use crate::sync::ColonyLocks;
use crate::terrain::{self, Terrain};

/// A placement query as it arrives from a caller. Every field is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub type_id: Option<u8>,
    pub zone: Option<usize>,
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl PlacementRequest {
    pub fn new(kind: ModuleKind, zone: usize, x: i32, y: i32) -> Self {
        Self {
            type_id: Some(kind.id()),
            zone: Some(zone),
            x: Some(x),
            y: Some(y),
        }
    }
}

/// Result of a placement check. Terrain fields describe the anchor cell and
/// are empty when it lies outside the zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub possible: bool,
    pub relief: Option<i32>,
    pub rationality: Option<i32>,
    pub zone_name: Option<String>,
    pub height: Option<i32>,
    pub angle: Option<f64>,
    pub illumination: Option<i32>,
    pub width_second: Option<i32>,
    pub longitude_second: Option<i32>,
    pub is_flat: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedModule {
    pub module: Module,
    /// Material charged.
    pub cost: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAssessment {
    pub module_id: ModuleId,
    pub relief: Option<i32>,
    pub rationality: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFlows {
    pub zone: usize,
    pub name: String,
    pub flows: Flows,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub day: i32,
    pub alive: bool,
    pub success: Success,
    pub resources: Vec<ResourceEntry>,
    pub zones: Vec<ZoneFlows>,
}

pub struct ColonyEngine<S: ColonyStore> {
    store: S,
    terrain: Arc<Terrain>,
    config: SimConfig,
    locks: ColonyLocks,
}

impl<S: ColonyStore> ColonyEngine<S> {
    pub fn new(store: S, terrain: Arc<Terrain>, config: SimConfig) -> Self {
        Self {
            store,
            terrain,
            config,
            locks: ColonyLocks::new(),
        }
    }

    /// Build an engine over the process-wide terrain.
    pub fn with_global_terrain(store: S, config: SimConfig) -> EngineResult<Self> {
        let terrain = terrain::global()
            .ok_or_else(|| EngineError::InvalidInput("no terrain installed".into()))?;
        Ok(Self::new(store, terrain, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ── Colony lifecycle ────────────────────────────────────────────────

    /// Register a new colony record. It must be colonized before use.
    pub fn create_colony(&self, name: &str) -> EngineResult<Colony> {
        let colony = self.store.insert_colony(name)?;
        log::info!("Registered colony {} ({})", colony.id, colony.name);
        Ok(colony)
    }

    /// Start (or restart) a colony: day 0, full countdown, starting stocks.
    pub fn colonize(&self, colony_id: ColonyId) -> EngineResult<ColonySnapshot> {
        self.locks.with(colony_id, || {
            let mut colony = self.colony(colony_id)?;
            if colony.alive {
                return Err(EngineError::ColonyAlreadyAlive(colony_id));
            }
            self.store.purge_colony(colony_id)?;
            colony.day = 0;
            colony.days_before_delivery = self.config.delivery_interval;
            colony.alive = true;
            self.store.save_colony(&colony)?;
            self.store
                .save_resources(colony_id, &economy::seed_ledger(&self.config))?;
            log::info!("Colony {} founded", colony_id);
            self.load(colony_id)
        })
    }

    /// Tear down a colony's built state. The record stays, marked not alive.
    pub fn abandon(&self, colony_id: ColonyId) -> EngineResult<()> {
        self.locks.with(colony_id, || {
            let mut colony = self.colony(colony_id)?;
            self.store.purge_colony(colony_id)?;
            colony.alive = false;
            self.store.save_colony(&colony)?;
            log::info!("Colony {} abandoned on day {}", colony_id, colony.day);
            Ok(())
        })
    }

    pub fn snapshot(&self, colony_id: ColonyId) -> EngineResult<ColonySnapshot> {
        self.locks.with(colony_id, || self.load(colony_id))
    }

    // ── Placement ───────────────────────────────────────────────────────

    /// Evaluate a placement without changing anything.
    pub fn check_placement(
        &self,
        colony_id: ColonyId,
        request: &PlacementRequest,
    ) -> EngineResult<PlacementReport> {
        let candidate = self.candidate(colony_id, request)?;
        let snap = self.snapshot(colony_id)?;
        let assessment = candidate.assess(&self.context(&snap));

        let anchor = self.terrain.cell(candidate.zone, candidate.x, candidate.y).ok();
        let zone = self.terrain.zone(candidate.zone);
        Ok(PlacementReport {
            possible: assessment.possible(),
            relief: assessment.relief,
            rationality: assessment.rationality,
            zone_name: anchor.and(zone).map(|z| z.name.clone()),
            height: anchor.map(|c| c.height),
            angle: anchor.map(|c| c.angle),
            illumination: anchor.and(zone).map(|z| z.illumination),
            width_second: anchor.map(|c| c.width_second),
            longitude_second: anchor.map(|c| c.longitude_second),
            is_flat: anchor.map(|c| c.angle < FLAT_ANGLE),
        })
    }

    /// Validate and build a module, then recount the economy and charge its
    /// cost. Overdrawing material kills the colony instead of failing.
    pub fn place_module(
        &self,
        colony_id: ColonyId,
        request: &PlacementRequest,
    ) -> EngineResult<PlacedModule> {
        self.locks.with(colony_id, || {
            let candidate = self.candidate(colony_id, request)?;
            let mut snap = self.load(colony_id)?;
            require_alive(&snap.colony)?;
            let assessment = candidate.assess(&self.context(&snap));
            if !assessment.possible() {
                log::debug!(
                    "Colony {}: rejected {:?} at zone {} ({}, {})",
                    colony_id,
                    candidate.kind,
                    candidate.zone,
                    candidate.x,
                    candidate.y
                );
                return Err(EngineError::PlacementRejected {
                    relief: assessment.relief,
                    rationality: assessment.rationality,
                });
            }

            // Store ids are monotonic, so the module recounts as the newest.
            let provisional = snap.modules.last().map_or(1, |m| m.id + 1);
            snap.modules.push(Module {
                id: provisional,
                ..candidate
            });
            self.recount(&mut snap)?;
            let module = self.store.insert_module(candidate)?;
            let cost = module.kind.spec().cost;
            self.charge_material(&mut snap, cost)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            log::info!(
                "Colony {}: built {:?} #{} in zone {} for {}",
                colony_id,
                module.kind,
                module.id,
                module.zone,
                cost
            );
            Ok(PlacedModule { module, cost })
        })
    }

    pub fn remove_module(&self, colony_id: ColonyId, module_id: ModuleId) -> EngineResult<()> {
        self.locks.with(colony_id, || {
            let mut snap = self.load(colony_id)?;
            require_alive(&snap.colony)?;
            let module = self
                .store
                .load_module(module_id)?
                .filter(|m| m.colony == colony_id)
                .ok_or(EngineError::UnknownModule(module_id))?;
            snap.modules.retain(|m| m.id != module.id);
            self.recount(&mut snap)?;
            self.store.delete_module(module.id)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            log::info!("Colony {}: removed {:?} #{}", colony_id, module.kind, module.id);
            Ok(())
        })
    }

    /// Current relief and rationality of every placed module.
    pub fn optimality(&self, colony_id: ColonyId) -> EngineResult<Vec<ModuleAssessment>> {
        let snap = self.snapshot(colony_id)?;
        let ctx = self.context(&snap);
        Ok(snap
            .modules
            .iter()
            .map(|m| {
                let a = m.assess(&ctx);
                ModuleAssessment {
                    module_id: m.id,
                    relief: a.relief,
                    rationality: a.rationality,
                }
            })
            .collect())
    }

    // ── Links ───────────────────────────────────────────────────────────

    /// Connect two zones. Logistics links charge their distance in material
    /// and return the charge; power links add daily upkeep and return 0.
    pub fn create_link(
        &self,
        colony_id: ColonyId,
        kind: LinkKind,
        zone_a: usize,
        zone_b: usize,
    ) -> EngineResult<i64> {
        self.locks.with(colony_id, || {
            let mut snap = self.load(colony_id)?;
            require_alive(&snap.colony)?;
            let zones = self.terrain.zone_count();
            if zone_a >= zones || zone_b >= zones || zone_a == zone_b {
                return Err(EngineError::InvalidInput(format!(
                    "cannot link zone {zone_a} to zone {zone_b}"
                )));
            }
            let key = LinkKey::new(kind, zone_a, zone_b);
            if snap.links.iter().any(|l| l.key == key) {
                return Err(EngineError::DuplicateLink(key));
            }

            let link = Link {
                colony: colony_id,
                key,
            };
            snap.links.push(link);
            self.recount(&mut snap)?;
            self.store.save_link(link)?;
            let charge = match kind {
                LinkKind::Logistics => i64::from(self.terrain.distance(zone_a, zone_b)),
                LinkKind::Power => 0,
            };
            self.charge_material(&mut snap, charge)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            log::info!("Colony {}: opened link {} for {}", colony_id, key, charge);
            Ok(charge)
        })
    }

    /// Remove a link. Logistics material is not refunded.
    pub fn delete_link(&self, colony_id: ColonyId, key: LinkKey) -> EngineResult<()> {
        self.locks.with(colony_id, || {
            let mut snap = self.load(colony_id)?;
            require_alive(&snap.colony)?;
            if !snap.links.iter().any(|l| l.key == key) {
                return Err(EngineError::UnknownLink(key));
            }
            snap.links.retain(|l| l.key != key);
            self.recount(&mut snap)?;
            self.store.delete_link(colony_id, &key)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            log::info!("Colony {}: closed link {}", colony_id, key);
            Ok(())
        })
    }

    // ── Economy and scoring ─────────────────────────────────────────────

    /// Rebuild every production/consumption rate from the current modules
    /// and links.
    pub fn recompute_production(&self, colony_id: ColonyId) -> EngineResult<Vec<ResourceEntry>> {
        self.locks.with(colony_id, || {
            let mut snap = self.load(colony_id)?;
            self.recount(&mut snap)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            Ok(snap.resources)
        })
    }

    pub fn advance_day(&self, colony_id: ColonyId) -> EngineResult<DayReport> {
        self.locks.with(colony_id, || {
            let mut snap = self.load(colony_id)?;
            require_alive(&snap.colony)?;
            let report = economy::advance_day(&mut snap.colony, &mut snap.resources, &self.config)?;
            self.store.save_resources(colony_id, &snap.resources)?;
            self.store.save_colony(&snap.colony)?;
            if report.delivery {
                log::info!("Colony {}: delivery on day {}", colony_id, report.day);
            }
            if !report.alive {
                log::warn!("Colony {} died on day {}", colony_id, report.day);
            } else {
                log::debug!("Colony {}: day {}", colony_id, report.day);
            }
            Ok(report)
        })
    }

    pub fn success(&self, colony_id: ColonyId) -> EngineResult<Success> {
        let snap = self.snapshot(colony_id)?;
        Ok(self.score(&snap))
    }

    /// Day, success, ledger and per-zone rates in one report.
    pub fn statistics(&self, colony_id: ColonyId) -> EngineResult<Statistics> {
        let snap = self.snapshot(colony_id)?;
        let ctx = self.context(&snap);
        let zones = self
            .terrain
            .zones()
            .iter()
            .enumerate()
            .map(|(id, zone)| ZoneFlows {
                zone: id,
                name: zone.name.clone(),
                flows: economy::tally(&ctx, ZoneScope::Zone(id)),
            })
            .collect();
        Ok(Statistics {
            day: snap.colony.day,
            alive: snap.colony.alive,
            success: self.score(&snap),
            resources: snap.resources.clone(),
            zones,
        })
    }

    pub fn module_types(&self) -> Vec<ModuleTypeInfo> {
        modules::catalogue()
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn colony(&self, colony_id: ColonyId) -> EngineResult<Colony> {
        self.store
            .load_colony(colony_id)?
            .ok_or(EngineError::UnknownColony(colony_id))
    }

    fn load(&self, colony_id: ColonyId) -> EngineResult<ColonySnapshot> {
        let colony = self.colony(colony_id)?;
        let mut modules = self.store.load_modules(colony_id)?;
        modules.sort_by_key(|m| m.id);
        Ok(ColonySnapshot {
            colony,
            modules,
            links: self.store.load_links(colony_id)?,
            resources: self.store.load_resources(colony_id)?,
        })
    }

    fn context<'a>(&'a self, snap: &'a ColonySnapshot) -> PlacementContext<'a> {
        PlacementContext {
            terrain: &self.terrain,
            config: &self.config,
            modules: &snap.modules,
            links: &snap.links,
            ledger: Ledger::new(&snap.resources),
        }
    }

    fn candidate(&self, colony_id: ColonyId, request: &PlacementRequest) -> EngineResult<Module> {
        let missing = |field: &str| EngineError::InvalidInput(format!("missing {field}"));
        let type_id = request.type_id.ok_or_else(|| missing("module type"))?;
        let zone = request.zone.ok_or_else(|| missing("zone"))?;
        let x = request.x.ok_or_else(|| missing("x"))?;
        let y = request.y.ok_or_else(|| missing("y"))?;
        let kind = ModuleKind::from_id(type_id)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown module type {type_id}")))?;
        if zone >= self.terrain.zone_count() {
            return Err(EngineError::InvalidInput(format!("unknown zone {zone}")));
        }
        Ok(Module::candidate(colony_id, kind, zone, x, y))
    }

    fn recount(&self, snap: &mut ColonySnapshot) -> EngineResult<()> {
        let previous = snap.resources.clone();
        let ctx = PlacementContext {
            terrain: &self.terrain,
            config: &self.config,
            modules: &snap.modules,
            links: &snap.links,
            ledger: Ledger::new(&previous),
        };
        economy::recompute(&ctx, snap.colony.id, &mut snap.resources)
    }

    /// Deduct material; an overdraft flips the colony to not alive.
    fn charge_material(&self, snap: &mut ColonySnapshot, amount: i64) -> EngineResult<()> {
        let colony_id = snap.colony.id;
        let material = snap
            .resources
            .iter_mut()
            .find(|e| e.kind == ResourceKind::Material)
            .ok_or(EngineError::UnknownResource {
                colony: colony_id,
                kind: ResourceKind::Material,
            })?;
        material.stock -= amount;
        if material.stock < 0 {
            log::warn!(
                "Colony {} overdrew material ({}); colony lost",
                colony_id,
                material.stock
            );
            snap.colony.alive = false;
            self.store.save_colony(&snap.colony)?;
        }
        Ok(())
    }

    fn score(&self, snap: &ColonySnapshot) -> Success {
        scoring::score(
            &snap.modules,
            &snap.resources,
            self.terrain.zone_count(),
            &self.config,
        )
    }
}

fn require_alive(colony: &Colony) -> EngineResult<()> {
    if colony.alive {
        Ok(())
    } else {
        Err(EngineError::ColonyNotAlive(colony.id))
    }
}
