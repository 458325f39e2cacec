//! Game constants for footprints, safety zones, coverage limits and the zone table.
//!
//! Plain constants with no storage dependency. Economy knobs that operators
//! may tune live in [`crate::config::SimConfig`] instead.

/// Number of terrain zones on the map.
pub const ZONE_COUNT: usize = 6;

pub mod zones {
    pub const NAMES: [&str; super::ZONE_COUNT] = [
        "Plain 1",
        "Plain 2",
        "Height 1",
        "Height 2",
        "Lowland 1",
        "Lowland 2",
    ];
    /// Baseline illumination per zone, in percent.
    pub const ILLUMINATION: [i32; super::ZONE_COUNT] = [40, 40, 95, 95, 0, 0];
    /// Side length of a synthetic zone grid, in cells.
    pub const SYNTHETIC_SIZE: usize = 64;
}

pub mod cosmodrome {
    pub const WIDTH: i32 = 6;
    pub const HEIGHT: i32 = 6;
    /// Safety buffer around a cosmodrome footprint, in cells.
    pub const DANGER_ZONE: i32 = 4;
}

pub mod repair {
    /// Most modules a single repair module can service.
    pub const MAX_COVERAGE: i32 = 12;
    /// Service radius around a repair module footprint, in cells.
    pub const RADIUS: i32 = 5;
    /// Material consumed per serviced module (× 1000 units).
    pub const MATERIAL_PER_COVERED: f64 = 0.5;
}

pub mod solar {
    /// Distance units per terrain cell in the shadow model.
    pub const CELL_SCALE: f64 = 5.0;
    /// Power produced per rationality point.
    pub const POWER_PER_POINT: i64 = 162_500;
}

pub mod habitat {
    /// Residents housed by each housing module.
    pub const RESIDENTS_PER_MODULE: i32 = 8;
}

/// Anchor-cell slope below which the check-placement report calls a site flat.
pub const FLAT_ANGLE: f64 = 0.3;
