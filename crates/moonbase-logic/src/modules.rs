//! Module type catalogue.
//!
//! Each [`ModuleKind`] carries static parameters via [`ModuleKind::spec`]
//! and fixed resource flows via [`ModuleKind::fixed_production`] /
//! [`ModuleKind::fixed_consumption`]. Placement rules and computed flows
//! live in [`crate::placement`].

use serde::{Deserialize, Serialize};

use crate::resources::ResourceKind;
use crate::resources::ResourceKind::{
    CarbonDioxide, Food, Fuel, Garbage, Material, Oxygen, Power, Water,
};

/// Static parameters of a module kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub width: i32,
    pub height: i32,
    /// Steepest slope the footprint tolerates, in degrees.
    pub tolerance: f64,
    /// Residents the module needs to operate.
    pub people: i32,
    /// Material charged on placement.
    pub cost: i64,
    /// Habitable modules are the adjacency anchors for life-support kinds.
    pub habitable: bool,
}

/// The 26 module kinds, in catalogue (type id) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModuleKind {
    LiveModuleX = 0,
    LiveModuleY,
    LiveAdministrativeModule,
    SportModule,
    MedicalModule,
    Plantation,
    ResearchModulePlantation,
    ResearchModuleMine,
    ResearchModuleTelescope,
    ResearchModuleTerritory,
    Hallway,
    AdministrativeModule,
    SolarPowerPlant,
    RepairModule,
    Cosmodrome,
    CommunicationTower,
    Landfill,
    LandfillBio,
    ManufacturingEnterprise,
    ManufacturingEnterpriseFuel,
    AstronomicalSite,
    MineBase,
    WarehouseFood,
    WarehouseGases,
    WarehouseFuel,
    WarehouseMaterial,
}

impl ModuleKind {
    pub fn all() -> &'static [ModuleKind] {
        &[
            Self::LiveModuleX,
            Self::LiveModuleY,
            Self::LiveAdministrativeModule,
            Self::SportModule,
            Self::MedicalModule,
            Self::Plantation,
            Self::ResearchModulePlantation,
            Self::ResearchModuleMine,
            Self::ResearchModuleTelescope,
            Self::ResearchModuleTerritory,
            Self::Hallway,
            Self::AdministrativeModule,
            Self::SolarPowerPlant,
            Self::RepairModule,
            Self::Cosmodrome,
            Self::CommunicationTower,
            Self::Landfill,
            Self::LandfillBio,
            Self::ManufacturingEnterprise,
            Self::ManufacturingEnterpriseFuel,
            Self::AstronomicalSite,
            Self::MineBase,
            Self::WarehouseFood,
            Self::WarehouseGases,
            Self::WarehouseFuel,
            Self::WarehouseMaterial,
        ]
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::all().get(id as usize).copied()
    }

    pub fn spec(self) -> ModuleSpec {
        let s = |name, width, height, tolerance, people, cost, habitable| ModuleSpec {
            name,
            width,
            height,
            tolerance,
            people,
            cost,
            habitable,
        };
        match self {
            Self::LiveModuleX => s("Living module (X)", 2, 1, 10.0, 0, 9500, true),
            Self::LiveModuleY => s("Living module (Y)", 1, 2, 10.0, 0, 9500, true),
            Self::LiveAdministrativeModule => {
                s("Living administrative module", 2, 2, 10.0, 2, 16000, true)
            }
            Self::SportModule => s("Sport module", 2, 2, 10.0, 0, 5000, true),
            Self::MedicalModule => s("Medical module", 2, 2, 10.0, 1, 5000, true),
            Self::Plantation => s("Plantation", 3, 3, 10.0, 3, 42000, true),
            Self::ResearchModulePlantation => {
                s("Research module (plantation)", 1, 1, 10.0, 1, 5000, true)
            }
            Self::ResearchModuleMine => s("Research module (mine)", 1, 1, 10.0, 1, 5000, true),
            Self::ResearchModuleTelescope => {
                s("Research module (telescope)", 1, 1, 10.0, 1, 5000, true)
            }
            Self::ResearchModuleTerritory => {
                s("Research module (territory)", 1, 1, 10.0, 1, 5000, true)
            }
            Self::Hallway => s("Hallway", 1, 1, 10.0, 0, 3500, true),
            Self::AdministrativeModule => s("Administrative module", 2, 2, 10.0, 2, 16000, false),
            Self::SolarPowerPlant => s("Solar power plant", 1, 1, 10.0, 0, 900, false),
            Self::RepairModule => s("Repair module", 2, 2, 10.0, 2, 15000, false),
            Self::Cosmodrome => s("Cosmodrome", 6, 6, 5.0, 2, 900, false),
            Self::CommunicationTower => s("Communication tower", 1, 1, 15.0, 0, 1000, false),
            Self::Landfill => s("Landfill", 2, 2, 10.0, 1, 15000, false),
            Self::LandfillBio => s("Biological landfill", 2, 2, 10.0, 1, 15000, false),
            Self::ManufacturingEnterprise => {
                s("Manufacturing enterprise", 1, 1, 10.0, 1, 4200, false)
            }
            Self::ManufacturingEnterpriseFuel => {
                s("Fuel manufacturing enterprise", 1, 1, 10.0, 1, 4200, false)
            }
            Self::AstronomicalSite => s("Astronomical site", 3, 3, 5.0, 0, 30000, false),
            Self::MineBase => s("Mine base", 3, 3, 20.0, 1, 20000, false),
            Self::WarehouseFood => s("Food warehouse", 2, 2, 10.0, 0, 14000, false),
            Self::WarehouseGases => s("Gas warehouse", 2, 2, 10.0, 0, 14000, false),
            Self::WarehouseFuel => s("Fuel warehouse", 2, 2, 10.0, 0, 14000, false),
            Self::WarehouseMaterial => s("Material warehouse", 2, 2, 10.0, 0, 14000, false),
        }
    }

    /// Housing modules provide resident capacity.
    pub fn is_housing(self) -> bool {
        matches!(self, Self::LiveModuleX | Self::LiveModuleY)
    }

    /// Administrative presence in a zone.
    pub fn is_admin(self) -> bool {
        matches!(
            self,
            Self::AdministrativeModule | Self::LiveAdministrativeModule
        )
    }

    pub fn is_warehouse(self) -> bool {
        matches!(
            self,
            Self::WarehouseFood | Self::WarehouseGases | Self::WarehouseFuel | Self::WarehouseMaterial
        )
    }

    pub fn is_research(self) -> bool {
        matches!(
            self,
            Self::ResearchModulePlantation
                | Self::ResearchModuleMine
                | Self::ResearchModuleTelescope
                | Self::ResearchModuleTerritory
        )
    }

    /// Influence radius in the shadow model. Habitable modules and the
    /// cosmodrome are low enough to cast none.
    pub fn radius(self) -> i32 {
        let spec = self.spec();
        if spec.habitable || self == Self::Cosmodrome {
            0
        } else {
            (spec.width + spec.height) / 4
        }
    }

    /// Constant daily output. Computed outputs (solar, landfills) are added
    /// by the placement rules.
    pub fn fixed_production(self) -> &'static [(ResourceKind, i64)] {
        match self {
            Self::LiveModuleX | Self::LiveModuleY => &[(CarbonDioxide, 8000), (Garbage, 1600)],
            Self::Plantation => &[(Food, 1640), (Oxygen, 3650)],
            Self::ManufacturingEnterprise => &[(Water, 4800), (Oxygen, 5550), (Material, 6150)],
            Self::ManufacturingEnterpriseFuel => &[(Fuel, 10000)],
            Self::MineBase => &[(Material, 8000)],
            _ => &[],
        }
    }

    /// Constant daily upkeep. Computed upkeep (repair, landfills) is added
    /// by the placement rules.
    pub fn fixed_consumption(self) -> &'static [(ResourceKind, i64)] {
        match self {
            Self::LiveModuleX | Self::LiveModuleY => &[
                (Oxygen, 6720),
                (Water, 24000),
                (Food, 4960),
                (Power, 24000),
            ],
            Self::LiveAdministrativeModule | Self::AdministrativeModule => &[(Power, 36800)],
            Self::SportModule => &[(Power, 12000)],
            Self::MedicalModule => &[(Power, 12000), (Water, 2000)],
            Self::Plantation => &[(CarbonDioxide, 5000), (Water, 25350), (Power, 175000)],
            Self::ResearchModulePlantation
            | Self::ResearchModuleMine
            | Self::ResearchModuleTelescope
            | Self::ResearchModuleTerritory => &[(Power, 10000)],
            Self::SolarPowerPlant => &[(Power, 1200)],
            Self::CommunicationTower => &[(Power, 5000)],
            Self::ManufacturingEnterprise => &[(Power, 34740)],
            Self::ManufacturingEnterpriseFuel => {
                &[(Power, 212000), (Water, 4500), (CarbonDioxide, 5500)]
            }
            Self::AstronomicalSite => &[(Power, 15000)],
            Self::MineBase => &[(Power, 60000)],
            Self::WarehouseFood
            | Self::WarehouseGases
            | Self::WarehouseFuel
            | Self::WarehouseMaterial => &[(Power, 3000)],
            _ => &[],
        }
    }
}

/// Catalogue row for listing the available module types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTypeInfo {
    pub id: u8,
    pub kind: ModuleKind,
    pub name: String,
    pub people: i32,
    pub cost: i64,
    pub habitable: bool,
    pub width: i32,
    pub height: i32,
    pub tolerance: f64,
}

impl From<ModuleKind> for ModuleTypeInfo {
    fn from(kind: ModuleKind) -> Self {
        let spec = kind.spec();
        Self {
            id: kind.id(),
            kind,
            name: spec.name.to_string(),
            people: spec.people,
            cost: spec.cost,
            habitable: spec.habitable,
            width: spec.width,
            height: spec.height,
            tolerance: spec.tolerance,
        }
    }
}

/// The full catalogue in type id order.
pub fn catalogue() -> Vec<ModuleTypeInfo> {
    ModuleKind::all().iter().copied().map(ModuleTypeInfo::from).collect()
}
