//! Pure simulation logic for Moonbase.
//!
//! This crate contains the placement-validation and colony-economy engine,
//! independent of any transport layer or database. Rules take plain data
//! and return results; the [`engine::ColonyEngine`] facade wires them to a
//! [`store::ColonyStore`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`colony`] | Colony records, placed modules, zone links, snapshots |
//! | [`config`] | Economy balance (delivery cadence, starting stocks, rates) |
//! | [`constants`] | Footprints, safety zones, coverage caps, zone table |
//! | [`economy`] | Production tallies, link upkeep, the day tick |
//! | [`engine`] | Colony operations facade with per-colony locking |
//! | [`error`] | Engine and storage error types |
//! | [`geometry`] | Footprint overlap, union-find, shadow ring |
//! | [`modules`] | Module type catalogue (26 kinds) |
//! | [`placement`] | Relief, rationality and per-module resource flows |
//! | [`resources`] | Resource kinds, ledger rows, tallies |
//! | [`scoring`] | Success index and sub-scores |
//! | [`store`] | Storage trait, in-memory store, bincode snapshots |
//! | [`sync`] | Per-colony mutual exclusion |
//! | [`terrain`] | Zone grids, illumination, distances |

pub mod colony;
pub mod config;
pub mod constants;
pub mod economy;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod modules;
pub mod placement;
pub mod resources;
pub mod scoring;
pub mod store;
pub mod sync;
pub mod terrain;

pub use colony::{Colony, ColonyId, ColonySnapshot, Link, LinkKey, LinkKind, Module, ModuleId};
pub use config::SimConfig;
pub use engine::{ColonyEngine, PlacementReport, PlacementRequest};
pub use error::{EngineError, EngineResult, StoreError};
pub use modules::ModuleKind;
pub use resources::ResourceKind;
pub use store::{ColonyStore, MemoryStore};
pub use terrain::Terrain;
