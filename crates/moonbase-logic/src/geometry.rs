//! Geometry and connectivity kernel.
//!
//! Footprint overlap, zone-graph reachability and the angular shadow model
//! used by solar plants. Plain data in, plain data out.

use serde::{Deserialize, Serialize};

// ── A. Footprints ───────────────────────────────────────────────────────

/// Axis-aligned module footprint in zone-grid cells.
///
/// Bounds are inclusive on both edges, so a footprint of width `w` spans
/// `x..=x + w`. Two modules that merely touch therefore overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Footprint {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies within the inclusive bounding rectangle.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Anchor-inclusion overlap: either footprint's anchor lies inside the
    /// other's rectangle. Symmetric, but misses cross-shaped intersections
    /// where neither anchor is covered.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.contains_point(other.x, other.y) || other.contains_point(self.x, self.y)
    }

    /// The same footprint shifted by `(dx, dy)`.
    pub fn shifted(&self, dx: i32, dy: i32) -> Footprint {
        Footprint::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The footprint grown by `margin` cells on every side.
    pub fn expanded(&self, margin: i32) -> Footprint {
        Footprint::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// 4-neighbour touch: `other` overlaps this footprint shifted one cell
    /// along either axis.
    pub fn adjacent_to(&self, other: &Footprint) -> bool {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .any(|&(dx, dy)| other.overlaps(&self.shifted(dx, dy)))
    }
}

// ── B. Zone connectivity ────────────────────────────────────────────────

/// Disjoint-set forest over zone ids, with path compression and
/// union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `node`'s set. Ids outside the forest are their
    /// own singleton set.
    pub fn find(&mut self, node: usize) -> usize {
        if node >= self.parent.len() {
            return node;
        }
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = node;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        if a >= self.parent.len() || b >= self.parent.len() {
            return;
        }
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

// ── C. Shadow model ─────────────────────────────────────────────────────

/// Number of one-degree buckets on the horizon ring.
pub const RING_BUCKETS: usize = 360;

/// A point with an influence radius, in shadow-model distance units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarObject {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl SolarObject {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }
}

/// Horizon ring of a station: one boolean per integer degree, lit until an
/// obstacle's arc covers it.
#[derive(Debug, Clone)]
pub struct ShadowRing {
    station: SolarObject,
    lit: [bool; RING_BUCKETS],
}

impl ShadowRing {
    pub fn new(station: SolarObject) -> Self {
        Self {
            station,
            lit: [true; RING_BUCKETS],
        }
    }

    /// Mark the arc shadowed by `obstacle`.
    ///
    /// Zero-radius obstacles cast nothing. An obstacle whose radius exceeds
    /// its distance to the station shadows the whole ring; at exactly that
    /// distance it covers a half circle.
    pub fn cast(&mut self, obstacle: &SolarObject) {
        if obstacle.radius <= 0.0 {
            return;
        }
        let dx = obstacle.x - self.station.x;
        let dy = obstacle.y - self.station.y;
        let distance = dx.hypot(dy);
        if obstacle.radius > distance {
            self.lit = [false; RING_BUCKETS];
            return;
        }
        let bearing = dy.atan2(dx).to_degrees().rem_euclid(360.0);
        let arc = 2.0 * (obstacle.radius / distance).asin().to_degrees();
        let start = (bearing - arc / 2.0).round() as i64;
        let end = (bearing + arc / 2.0).round() as i64;
        if end - start >= RING_BUCKETS as i64 {
            self.lit = [false; RING_BUCKETS];
            return;
        }
        for deg in start..end {
            self.lit[deg.rem_euclid(RING_BUCKETS as i64) as usize] = false;
        }
    }

    pub fn lit_buckets(&self) -> usize {
        self.lit.iter().filter(|&&b| b).count()
    }

    /// Lit fraction of the ring scaled by the zone's baseline illumination,
    /// truncated.
    pub fn efficiency(&self, baseline: i32) -> i32 {
        let lit_percent = self.lit_buckets() as f64 / RING_BUCKETS as f64 * 100.0;
        (baseline as f64 * lit_percent / 100.0) as i32
    }
}

/// Shadow efficiency of `station` against every obstacle.
pub fn shadow_efficiency(station: SolarObject, obstacles: &[SolarObject], baseline: i32) -> i32 {
    let mut ring = ShadowRing::new(station);
    for obstacle in obstacles {
        ring.cast(obstacle);
    }
    ring.efficiency(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_footprints_overlap() {
        let a = Footprint::new(3, 3, 2, 2);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn test_touching_footprints_overlap() {
        let a = Footprint::new(0, 0, 2, 2);
        let b = Footprint::new(2, 0, 1, 1);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_separated_footprints() {
        let a = Footprint::new(0, 0, 2, 2);
        let b = Footprint::new(3, 0, 1, 1);
        assert!(!a.overlaps(&b));
        assert!(a.adjacent_to(&b));
        let far = Footprint::new(10, 10, 1, 1);
        assert!(!a.adjacent_to(&far));
    }

    #[test]
    fn test_cross_shaped_intersection_is_missed() {
        let wide = Footprint::new(0, 5, 10, 1);
        let tall = Footprint::new(5, 0, 1, 10);
        assert!(!wide.overlaps(&tall));
    }

    #[test]
    fn test_expanded_buffer() {
        let cosmodrome = Footprint::new(20, 20, 6, 6).expanded(4);
        assert_eq!(cosmodrome, Footprint::new(16, 16, 14, 14));
        assert!(Footprint::new(30, 30, 1, 1).overlaps(&cosmodrome));
        assert!(!Footprint::new(31, 20, 1, 1).overlaps(&cosmodrome));
    }

    #[test]
    fn test_union_find_transitive() {
        let mut uf = UnionFind::new(6);
        uf.union(0, 1);
        uf.union(1, 2);
        uf.union(4, 5);
        assert!(uf.connected(0, 2));
        assert!(uf.connected(4, 5));
        assert!(!uf.connected(2, 4));
        assert!(!uf.connected(3, 0));
        assert_eq!(uf.len(), 6);
    }

    #[test]
    fn test_union_find_out_of_range_is_singleton() {
        let mut uf = UnionFind::new(2);
        uf.union(0, 7);
        assert_eq!(uf.find(7), 7);
        assert!(!uf.connected(0, 7));
    }

    #[test]
    fn test_single_obstacle_shadow() {
        let station = SolarObject::new(0.0, 0.0, 0.0);
        let obstacle = SolarObject::new(2.0, 0.0, 1.0);
        let mut ring = ShadowRing::new(station);
        ring.cast(&obstacle);
        assert_eq!(ring.lit_buckets(), 300);
        assert_eq!(ring.efficiency(40), 33);
    }

    #[test]
    fn test_shadow_wraps_across_north() {
        let station = SolarObject::new(0.0, 0.0, 0.0);
        let obstacle = SolarObject::new(10.0, -0.5, 1.0);
        let mut ring = ShadowRing::new(station);
        ring.cast(&obstacle);
        assert!(!ring.lit[0]);
        assert!(!ring.lit[359]);
        assert!(ring.lit[180]);
    }

    #[test]
    fn test_zero_radius_casts_nothing() {
        let station = SolarObject::new(0.0, 0.0, 0.0);
        let eff = shadow_efficiency(station, &[SolarObject::new(5.0, 5.0, 0.0)], 95);
        assert_eq!(eff, 95);
    }

    #[test]
    fn test_engulfing_obstacle_shadows_everything() {
        let station = SolarObject::new(0.0, 0.0, 0.0);
        let eff = shadow_efficiency(station, &[SolarObject::new(1.0, 0.0, 3.0)], 95);
        assert_eq!(eff, 0);
    }

    #[test]
    fn test_tangent_obstacle_shadows_half_ring() {
        let mut ring = ShadowRing::new(SolarObject::new(0.0, 0.0, 0.0));
        ring.cast(&SolarObject::new(10.0, 0.0, 10.0));
        assert_eq!(ring.lit_buckets(), 180);
        assert_eq!(ring.efficiency(40), 20);
    }
}
