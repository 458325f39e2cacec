//! Colony entities: colony records, placed modules, zone links.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Footprint;
use crate::modules::ModuleKind;
use crate::resources::ResourceEntry;

pub type ColonyId = u64;
/// Module ids increase with creation order; greedy rules rely on that.
pub type ModuleId = u64;

/// A player's colony record. Survives abandonment; only its built state is
/// purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub name: String,
    pub day: i32,
    pub days_before_delivery: i32,
    pub alive: bool,
}

impl Colony {
    /// A fresh, not-yet-colonized record.
    pub fn new(id: ColonyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            day: 0,
            days_before_delivery: 0,
            alive: false,
        }
    }
}

/// A module placed in a colony zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub colony: ColonyId,
    pub zone: usize,
    pub kind: ModuleKind,
    pub x: i32,
    pub y: i32,
}

impl Module {
    /// Id carried by a not-yet-stored candidate. Real ids start at 1.
    pub const CANDIDATE_ID: ModuleId = 0;

    pub fn candidate(colony: ColonyId, kind: ModuleKind, zone: usize, x: i32, y: i32) -> Self {
        Self {
            id: Self::CANDIDATE_ID,
            colony,
            zone,
            kind,
            x,
            y,
        }
    }

    pub fn footprint(&self) -> Footprint {
        let spec = self.kind.spec();
        Footprint::new(self.x, self.y, spec.width, spec.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum LinkKind {
    /// One-time transport route; charges material equal to the distance.
    Logistics = 0,
    /// Persistent power/transit tunnel; charges power upkeep every day.
    Power = 1,
}

impl LinkKind {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Logistics),
            1 => Some(Self::Power),
            _ => None,
        }
    }
}

/// Link identity within a colony. `(a, b)` and `(b, a)` are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkKey {
    pub kind: LinkKind,
    pub zone_a: usize,
    pub zone_b: usize,
}

impl LinkKey {
    pub fn new(kind: LinkKind, zone_a: usize, zone_b: usize) -> Self {
        Self {
            kind,
            zone_a,
            zone_b,
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}-{})", self.kind, self.zone_a, self.zone_b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub colony: ColonyId,
    pub key: LinkKey,
}

/// Everything the rules read about one colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub colony: Colony,
    /// Sorted by id.
    pub modules: Vec<Module>,
    pub links: Vec<Link>,
    pub resources: Vec<ResourceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_colony_is_not_alive() {
        let colony = Colony::new(3, "Tranquility");
        assert!(!colony.alive);
        assert_eq!(colony.day, 0);
    }

    #[test]
    fn test_candidate_footprint_uses_catalogue_size() {
        let m = Module::candidate(1, ModuleKind::Plantation, 0, 4, 5);
        assert_eq!(m.id, Module::CANDIDATE_ID);
        assert_eq!(m.footprint(), Footprint::new(4, 5, 3, 3));
    }

    #[test]
    fn test_link_key_display() {
        let key = LinkKey::new(LinkKind::Power, 1, 4);
        assert_eq!(key.to_string(), "Power(1-4)");
        assert_eq!(LinkKind::from_id(0), Some(LinkKind::Logistics));
        assert_eq!(LinkKind::from_id(2), None);
    }
}
