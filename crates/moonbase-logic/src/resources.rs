//! Resource kinds, per-colony ledger entries and production tallies.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// The eight tracked resources, in ledger order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceKind {
    Water = 0,
    Fuel = 1,
    Food = 2,
    /// Electric power ("WT").
    Power = 3,
    Oxygen = 4,
    CarbonDioxide = 5,
    Garbage = 6,
    Material = 7,
}

impl ResourceKind {
    pub const COUNT: usize = 8;

    pub fn all() -> &'static [ResourceKind; Self::COUNT] {
        &[
            Self::Water,
            Self::Fuel,
            Self::Food,
            Self::Power,
            Self::Oxygen,
            Self::CarbonDioxide,
            Self::Garbage,
            Self::Material,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Fuel => "fuel",
            Self::Food => "food",
            Self::Power => "power",
            Self::Oxygen => "oxygen",
            Self::CarbonDioxide => "carbon_dioxide",
            Self::Garbage => "garbage",
            Self::Material => "material",
        }
    }
}

/// One resource row of a colony's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    pub stock: i64,
    /// Instantaneous production per day.
    pub production: i64,
    /// Instantaneous consumption per day.
    pub consumption: i64,
    pub total_production: i64,
    pub total_consumption: i64,
}

impl ResourceEntry {
    pub fn seeded(kind: ResourceKind, stock: i64) -> Self {
        Self {
            kind,
            stock,
            production: 0,
            consumption: 0,
            total_production: 0,
            total_consumption: 0,
        }
    }

    /// Production minus consumption.
    pub fn net(&self) -> i64 {
        self.production - self.consumption
    }
}

/// Running per-resource totals that module contributions add into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTally([i64; ResourceKind::COUNT]);

impl ResourceTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ResourceKind, amount: i64) {
        self.0[kind.index()] += amount;
    }

    pub fn get(&self, kind: ResourceKind) -> i64 {
        self.0[kind.index()]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

impl Index<ResourceKind> for ResourceTally {
    type Output = i64;

    fn index(&self, kind: ResourceKind) -> &i64 {
        &self.0[kind.index()]
    }
}

impl IndexMut<ResourceKind> for ResourceTally {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut i64 {
        &mut self.0[kind.index()]
    }
}

/// Read-only view of a colony ledger, indexed by resource kind.
///
/// Missing rows read as zero so rationality rules can be evaluated for a
/// colony whose ledger was purged.
#[derive(Debug, Clone, Copy)]
pub struct Ledger<'a> {
    entries: &'a [ResourceEntry],
}

impl<'a> Ledger<'a> {
    pub fn new(entries: &'a [ResourceEntry]) -> Self {
        Self { entries }
    }

    pub fn entry(&self, kind: ResourceKind) -> Option<&'a ResourceEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn production(&self, kind: ResourceKind) -> i64 {
        self.entry(kind).map_or(0, |e| e.production)
    }

    pub fn consumption(&self, kind: ResourceKind) -> i64 {
        self.entry(kind).map_or(0, |e| e.consumption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_index_roundtrip() {
        for (i, kind) in ResourceKind::all().iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(ResourceKind::from_index(i), Some(*kind));
        }
        assert_eq!(ResourceKind::from_index(8), None);
    }

    #[test]
    fn test_tally_accumulates() {
        let mut tally = ResourceTally::new();
        tally.add(ResourceKind::Power, 1200);
        tally.add(ResourceKind::Power, 800);
        tally[ResourceKind::Food] += 5;
        assert_eq!(tally.get(ResourceKind::Power), 2000);
        assert_eq!(tally[ResourceKind::Food], 5);
        assert_eq!(tally.get(ResourceKind::Water), 0);
    }

    #[test]
    fn test_ledger_missing_row_reads_zero() {
        let entries = vec![ResourceEntry {
            production: 10,
            consumption: 4,
            ..ResourceEntry::seeded(ResourceKind::Food, 450)
        }];
        let ledger = Ledger::new(&entries);
        assert_eq!(ledger.production(ResourceKind::Food), 10);
        assert_eq!(ledger.consumption(ResourceKind::Food), 4);
        assert_eq!(ledger.production(ResourceKind::Oxygen), 0);
        assert_eq!(entries[0].net(), 6);
    }
}
