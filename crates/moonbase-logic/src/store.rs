//! Storage collaborator: the [`ColonyStore`] trait, an in-memory
//! implementation and bincode snapshots of it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::colony::{Colony, ColonyId, Link, LinkKey, Module, ModuleId};
use crate::error::StoreError;
use crate::resources::ResourceEntry;

pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot format version (increment when the layout changes).
const SNAPSHOT_VERSION: u32 = 1;

/// Persistence for colonies and their built state.
///
/// List calls return empty vectors when nothing matches. Module ids are
/// assigned by the store and increase with insertion order.
pub trait ColonyStore: Send + Sync {
    fn load_colony(&self, id: ColonyId) -> StoreResult<Option<Colony>>;

    fn save_colony(&self, colony: &Colony) -> StoreResult<()>;

    /// Register a new, not-yet-colonized record under a fresh id.
    fn insert_colony(&self, name: &str) -> StoreResult<Colony>;

    /// All modules of a colony, sorted by id.
    fn load_modules(&self, colony: ColonyId) -> StoreResult<Vec<Module>>;

    fn load_module(&self, id: ModuleId) -> StoreResult<Option<Module>>;

    /// Store a module under a fresh id and return it.
    fn insert_module(&self, module: Module) -> StoreResult<Module>;

    fn delete_module(&self, id: ModuleId) -> StoreResult<bool>;

    fn load_links(&self, colony: ColonyId) -> StoreResult<Vec<Link>>;

    fn save_link(&self, link: Link) -> StoreResult<()>;

    fn delete_link(&self, colony: ColonyId, key: &LinkKey) -> StoreResult<bool>;

    fn load_resources(&self, colony: ColonyId) -> StoreResult<Vec<ResourceEntry>>;

    /// Replace a colony's ledger rows.
    fn save_resources(&self, colony: ColonyId, entries: &[ResourceEntry]) -> StoreResult<()>;

    /// Delete every module, link and ledger row of a colony. The colony
    /// record itself is kept.
    fn purge_colony(&self, colony: ColonyId) -> StoreResult<()>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    colonies: BTreeMap<ColonyId, Colony>,
    modules: BTreeMap<ModuleId, Module>,
    links: BTreeMap<(ColonyId, LinkKey), Link>,
    resources: BTreeMap<ColonyId, Vec<ResourceEntry>>,
    next_colony: ColonyId,
    next_module: ModuleId,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    tables: Tables,
}

/// In-memory store for the harness and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the whole store as a versioned bincode snapshot.
    pub fn save_snapshot<W: Write>(&self, writer: W) -> StoreResult<()> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            tables: self.tables.read().clone(),
        };
        bincode::serialize_into(writer, &file)?;
        Ok(())
    }

    /// Rebuild a store from a snapshot written by [`MemoryStore::save_snapshot`].
    pub fn load_snapshot<R: Read>(reader: R) -> StoreResult<Self> {
        let file: SnapshotFile = bincode::deserialize_from(reader)?;
        if file.version != SNAPSHOT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: file.version,
            });
        }
        Ok(Self {
            tables: RwLock::new(file.tables),
        })
    }

    pub fn colony_count(&self) -> usize {
        self.tables.read().colonies.len()
    }
}

impl ColonyStore for MemoryStore {
    fn load_colony(&self, id: ColonyId) -> StoreResult<Option<Colony>> {
        Ok(self.tables.read().colonies.get(&id).cloned())
    }

    fn save_colony(&self, colony: &Colony) -> StoreResult<()> {
        self.tables
            .write()
            .colonies
            .insert(colony.id, colony.clone());
        Ok(())
    }

    fn insert_colony(&self, name: &str) -> StoreResult<Colony> {
        let mut tables = self.tables.write();
        tables.next_colony += 1;
        let colony = Colony::new(tables.next_colony, name);
        tables.colonies.insert(colony.id, colony.clone());
        Ok(colony)
    }

    fn load_modules(&self, colony: ColonyId) -> StoreResult<Vec<Module>> {
        Ok(self
            .tables
            .read()
            .modules
            .values()
            .filter(|m| m.colony == colony)
            .copied()
            .collect())
    }

    fn load_module(&self, id: ModuleId) -> StoreResult<Option<Module>> {
        Ok(self.tables.read().modules.get(&id).copied())
    }

    fn insert_module(&self, module: Module) -> StoreResult<Module> {
        let mut tables = self.tables.write();
        tables.next_module += 1;
        let stored = Module {
            id: tables.next_module,
            ..module
        };
        tables.modules.insert(stored.id, stored);
        Ok(stored)
    }

    fn delete_module(&self, id: ModuleId) -> StoreResult<bool> {
        Ok(self.tables.write().modules.remove(&id).is_some())
    }

    fn load_links(&self, colony: ColonyId) -> StoreResult<Vec<Link>> {
        Ok(self
            .tables
            .read()
            .links
            .values()
            .filter(|l| l.colony == colony)
            .copied()
            .collect())
    }

    fn save_link(&self, link: Link) -> StoreResult<()> {
        self.tables
            .write()
            .links
            .insert((link.colony, link.key), link);
        Ok(())
    }

    fn delete_link(&self, colony: ColonyId, key: &LinkKey) -> StoreResult<bool> {
        Ok(self.tables.write().links.remove(&(colony, *key)).is_some())
    }

    fn load_resources(&self, colony: ColonyId) -> StoreResult<Vec<ResourceEntry>> {
        Ok(self
            .tables
            .read()
            .resources
            .get(&colony)
            .cloned()
            .unwrap_or_default())
    }

    fn save_resources(&self, colony: ColonyId, entries: &[ResourceEntry]) -> StoreResult<()> {
        self.tables
            .write()
            .resources
            .insert(colony, entries.to_vec());
        Ok(())
    }

    fn purge_colony(&self, colony: ColonyId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables.modules.retain(|_, m| m.colony != colony);
        tables.links.retain(|(owner, _), _| *owner != colony);
        tables.resources.remove(&colony);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::LinkKind;
    use crate::modules::ModuleKind;
    use crate::resources::ResourceKind;

    #[test]
    fn test_module_ids_increase() {
        let store = MemoryStore::new();
        let colony = store.insert_colony("A").unwrap();
        let a = store
            .insert_module(Module::candidate(colony.id, ModuleKind::Hallway, 0, 0, 0))
            .unwrap();
        let b = store
            .insert_module(Module::candidate(colony.id, ModuleKind::Hallway, 0, 5, 0))
            .unwrap();
        assert!(a.id >= 1);
        assert!(b.id > a.id);
        let loaded = store.load_modules(colony.id).unwrap();
        assert_eq!(loaded.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    }

    #[test]
    fn test_unknown_colony_lists_are_empty() {
        let store = MemoryStore::new();
        assert!(store.load_colony(9).unwrap().is_none());
        assert!(store.load_modules(9).unwrap().is_empty());
        assert!(store.load_links(9).unwrap().is_empty());
        assert!(store.load_resources(9).unwrap().is_empty());
    }

    #[test]
    fn test_purge_keeps_other_colonies() {
        let store = MemoryStore::new();
        let a = store.insert_colony("A").unwrap();
        let b = store.insert_colony("B").unwrap();
        for id in [a.id, b.id] {
            store
                .insert_module(Module::candidate(id, ModuleKind::Hallway, 0, 0, 0))
                .unwrap();
            store
                .save_link(Link {
                    colony: id,
                    key: LinkKey::new(LinkKind::Power, 0, 1),
                })
                .unwrap();
            store
                .save_resources(id, &[ResourceEntry::seeded(ResourceKind::Food, 1)])
                .unwrap();
        }
        store.purge_colony(a.id).unwrap();
        assert!(store.load_modules(a.id).unwrap().is_empty());
        assert!(store.load_links(a.id).unwrap().is_empty());
        assert!(store.load_resources(a.id).unwrap().is_empty());
        assert!(store.load_colony(a.id).unwrap().is_some());
        assert_eq!(store.load_modules(b.id).unwrap().len(), 1);
        assert_eq!(store.load_links(b.id).unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_restores_tables() {
        let store = MemoryStore::new();
        let colony = store.insert_colony("Snap").unwrap();
        store
            .insert_module(Module::candidate(colony.id, ModuleKind::Cosmodrome, 2, 10, 10))
            .unwrap();
        let mut buf = Vec::new();
        store.save_snapshot(&mut buf).unwrap();

        let restored = MemoryStore::load_snapshot(buf.as_slice()).unwrap();
        assert_eq!(restored.colony_count(), 1);
        assert_eq!(restored.load_modules(colony.id).unwrap().len(), 1);
        let next = restored
            .insert_module(Module::candidate(colony.id, ModuleKind::Hallway, 0, 0, 0))
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_snapshot_version_mismatch() {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION + 1,
            tables: Tables::default(),
        };
        let buf = bincode::serialize(&file).unwrap();
        assert!(matches!(
            MemoryStore::load_snapshot(buf.as_slice()),
            Err(StoreError::VersionMismatch { .. })
        ));
    }
}
