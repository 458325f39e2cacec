//! Read-only terrain store: per-zone elevation/slope grids, illumination and
//! inter-zone distances.
//!
//! A [`Terrain`] is built once and never mutated. The engine holds it behind
//! an `Arc`; [`install`] additionally publishes one process-wide instance.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::constants::{zones, ZONE_COUNT};
use crate::error::{EngineError, EngineResult};

/// One terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub height: i32,
    /// Slope angle in degrees.
    pub angle: f64,
    /// Selenographic latitude of the cell, in arcseconds.
    pub width_second: i32,
    /// Selenographic longitude of the cell, in arcseconds.
    pub longitude_second: i32,
}

/// A named terrain area with its own grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    /// Baseline illumination, in percent.
    pub illumination: i32,
    /// Transport distance to every zone, indexed by destination zone id.
    pub distances: Vec<i32>,
    /// Row-major grid: `cells[y][x]`.
    pub cells: Vec<Vec<Cell>>,
}

impl Zone {
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.cells.get(y)?.get(x)
    }
}

/// The full set of zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    zones: Vec<Zone>,
}

impl Terrain {
    /// Build a terrain from explicit zones. Every zone must carry a distance
    /// to every other zone.
    pub fn from_zones(zones: Vec<Zone>) -> EngineResult<Self> {
        if zones.is_empty() {
            return Err(EngineError::InvalidInput("terrain has no zones".into()));
        }
        for (id, zone) in zones.iter().enumerate() {
            if zone.distances.len() != zones.len() {
                return Err(EngineError::InvalidInput(format!(
                    "zone {id} lists {} distances for {} zones",
                    zone.distances.len(),
                    zones.len()
                )));
            }
            if zone.cells.iter().any(|row| row.len() != zone.width()) {
                return Err(EngineError::InvalidInput(format!(
                    "zone {id} has ragged rows"
                )));
            }
        }
        Ok(Self { zones })
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let terrain: Terrain = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidInput(format!("terrain: {e}")))?;
        Self::from_zones(terrain.zones)
    }

    /// The six canonical zones with a uniform slope everywhere.
    pub fn uniform(size: usize, angle: f64) -> Self {
        let zones = (0..ZONE_COUNT)
            .map(|id| Zone {
                name: zones::NAMES[id].to_string(),
                illumination: zones::ILLUMINATION[id],
                distances: canonical_distances(id),
                cells: (0..size)
                    .map(|y| {
                        (0..size)
                            .map(|x| Cell {
                                height: 0,
                                angle,
                                width_second: y as i32,
                                longitude_second: x as i32,
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        Self { zones }
    }

    /// The six canonical zones with deterministic pseudo-random relief.
    ///
    /// Plains are gentle, heights are rough, lowlands sit in between.
    pub fn synthetic(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let size = zones::SYNTHETIC_SIZE;
        let zones = (0..ZONE_COUNT)
            .map(|id| {
                let max_angle = match id {
                    0 | 1 => 4.0,
                    2 | 3 => 14.0,
                    _ => 8.0,
                };
                let base_height = rng.gen_range(-2000..2000);
                let cells = (0..size)
                    .map(|y| {
                        (0..size)
                            .map(|x| Cell {
                                height: base_height + rng.gen_range(-40..40),
                                angle: (rng.gen_range(0.0..max_angle) * 100.0_f64).round() / 100.0,
                                width_second: (id * 3600 + y) as i32,
                                longitude_second: (id * 3600 + x) as i32,
                            })
                            .collect()
                    })
                    .collect();
                Zone {
                    name: zones::NAMES[id].to_string(),
                    illumination: zones::ILLUMINATION[id],
                    distances: canonical_distances(id),
                    cells,
                }
            })
            .collect();
        Self { zones }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zone(&self, zone: usize) -> Option<&Zone> {
        self.zones.get(zone)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a cell; fails with `OutOfBounds` past any grid edge.
    pub fn cell(&self, zone: usize, x: i32, y: i32) -> EngineResult<&Cell> {
        self.zones
            .get(zone)
            .and_then(|z| z.cell(x, y))
            .ok_or(EngineError::OutOfBounds { zone, x, y })
    }

    /// Transport distance between two zones; zero for unknown ids.
    pub fn distance(&self, from: usize, to: usize) -> i32 {
        self.zones
            .get(from)
            .and_then(|z| z.distances.get(to))
            .copied()
            .unwrap_or(0)
    }

    /// Baseline illumination of a zone; zero for unknown ids.
    pub fn illumination(&self, zone: usize) -> i32 {
        self.zones.get(zone).map_or(0, |z| z.illumination)
    }
}

/// Symmetric distance row for the canonical map: neighbouring pairs are
/// close, the lowlands sit far from the heights.
fn canonical_distances(from: usize) -> Vec<i32> {
    const TABLE: [[i32; ZONE_COUNT]; ZONE_COUNT] = [
        [0, 8200, 21500, 24800, 16300, 19900],
        [8200, 0, 15600, 18200, 22700, 25100],
        [21500, 15600, 0, 6400, 31200, 33800],
        [24800, 18200, 6400, 0, 34500, 36100],
        [16300, 22700, 31200, 34500, 0, 7300],
        [19900, 25100, 33800, 36100, 7300, 0],
    ];
    TABLE[from].to_vec()
}

static GLOBAL: OnceLock<Arc<Terrain>> = OnceLock::new();

/// Publish the process-wide terrain. Returns the already-installed instance
/// if another caller got there first.
pub fn install(terrain: Terrain) -> Arc<Terrain> {
    GLOBAL.get_or_init(|| Arc::new(terrain)).clone()
}

/// The process-wide terrain, if installed.
pub fn global() -> Option<Arc<Terrain>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_has_six_zones() {
        let terrain = Terrain::uniform(10, 1.0);
        assert_eq!(terrain.zone_count(), 6);
        assert_eq!(terrain.illumination(2), 95);
        assert_eq!(terrain.illumination(4), 0);
        assert_eq!(terrain.zone(0).unwrap().width(), 10);
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let terrain = Terrain::uniform(10, 1.0);
        assert!(terrain.cell(0, 9, 9).is_ok());
        assert!(matches!(
            terrain.cell(0, 10, 0),
            Err(EngineError::OutOfBounds { x: 10, .. })
        ));
        assert!(terrain.cell(0, -1, 0).is_err());
        assert!(terrain.cell(6, 0, 0).is_err());
    }

    #[test]
    fn test_distances_symmetric() {
        let terrain = Terrain::uniform(2, 0.0);
        for a in 0..6 {
            assert_eq!(terrain.distance(a, a), 0);
            for b in 0..6 {
                assert_eq!(terrain.distance(a, b), terrain.distance(b, a));
            }
        }
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = Terrain::synthetic(7);
        let b = Terrain::synthetic(7);
        assert_eq!(a, b);
        let c = Terrain::synthetic(8);
        assert_ne!(a, c);
    }

    #[test]
    fn test_synthetic_plains_are_gentle() {
        let terrain = Terrain::synthetic(42);
        let plain = terrain.zone(0).unwrap();
        assert!(plain.cells.iter().flatten().all(|c| c.angle < 4.0));
    }

    #[test]
    fn test_json_rejects_missing_distances() {
        let json = r#"{ "zones": [ { "name": "A", "illumination": 10, "distances": [], "cells": [] } ] }"#;
        assert!(Terrain::from_json_str(json).is_err());
    }
}
