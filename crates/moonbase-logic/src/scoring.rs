//! Colony success index and its sub-scores.

use serde::{Deserialize, Serialize};

use crate::colony::Module;
use crate::config::SimConfig;
use crate::constants::habitat;
use crate::modules::ModuleKind;
use crate::resources::{Ledger, ResourceEntry, ResourceKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: i32,
    pub mood: i32,
    pub population_housed: i32,
    pub population_needed: i32,
    pub resource_score: i32,
    pub centralization_score: i32,
    pub research_score: i32,
}

/// Score a colony. `modules` must be sorted by id.
///
/// Administrative modules and research labs only count while the residents
/// needed so far (in id order) are fewer than the residents housed.
pub fn score(
    modules: &[Module],
    entries: &[ResourceEntry],
    zone_count: usize,
    config: &SimConfig,
) -> Success {
    let ledger = Ledger::new(entries);

    let shortfall: i64 = entries
        .iter()
        .map(|e| (e.consumption - e.production).max(0))
        .sum();
    let resource_score =
        (100 - shortfall * i64::from(config.delivery_interval) / config.mass * 100) as i32;

    let housed = modules.iter().filter(|m| m.kind.is_housing()).count() as i32
        * habitat::RESIDENTS_PER_MODULE;

    let mut needed = 0;
    let mut admins = 0;
    let mut research = [false; 4];
    let mut medical = 0;
    let mut sport = 0;
    for m in modules {
        let staffed = needed < housed;
        match m.kind {
            ModuleKind::AdministrativeModule | ModuleKind::LiveAdministrativeModule if staffed => {
                admins += 1
            }
            ModuleKind::ResearchModuleMine if staffed => research[0] = true,
            ModuleKind::ResearchModulePlantation if staffed => research[1] = true,
            ModuleKind::ResearchModuleTelescope if staffed => research[2] = true,
            ModuleKind::ResearchModuleTerritory if staffed => research[3] = true,
            ModuleKind::MedicalModule => medical += 1,
            ModuleKind::SportModule => sport += 1,
            _ => {}
        }
        needed += m.kind.spec().people;
    }

    let mood = if housed != 0 {
        let leisure = ((medical + sport) * 3 * 8 / housed * 25).min(50);
        let food = food_ratio(
            ledger.production(ResourceKind::Food),
            ledger.consumption(ResourceKind::Food),
        );
        let supply = (f64::from(resource_score) + food) / 4.0;
        if supply.is_nan() {
            0
        } else {
            (f64::from(leisure) + supply) as i32
        }
    } else {
        0
    };

    let zones = zone_count.max(1) as i32;
    let centralization_score = (admins / zones * 100).min(100);
    let research_score = (research.iter().filter(|&&f| f).count() as i32 * 25).min(100);

    let success = (f64::from(mood) * 0.19
        + f64::from(100 - (needed - housed).max(0) * 15) * 0.21
        + f64::from(resource_score) * 0.21
        + f64::from(centralization_score) * 0.21
        + f64::from(research_score) * 0.18) as i32;

    Success {
        success,
        mood,
        population_housed: housed,
        population_needed: needed,
        resource_score,
        centralization_score,
        research_score,
    }
}

/// `production / (consumption * 0.3)` capped at 100. NaN when both are zero.
fn food_ratio(production: i64, consumption: i64) -> f64 {
    let ratio = production as f64 / (consumption as f64 * 0.3);
    if ratio.is_nan() {
        ratio
    } else {
        ratio.min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::seed_ledger;

    fn module(id: u64, kind: ModuleKind) -> Module {
        Module {
            id,
            colony: 1,
            zone: 0,
            kind,
            x: 0,
            y: 0,
        }
    }

    #[test]
    fn test_empty_colony() {
        let config = SimConfig::default();
        let entries = seed_ledger(&config);
        let s = score(&[], &entries, 6, &config);
        assert_eq!(s.resource_score, 100);
        assert_eq!(s.mood, 0);
        assert_eq!(s.population_housed, 0);
        // 100*0.21 + 100*0.21
        assert_eq!(s.success, 42);
    }

    #[test]
    fn test_resource_score_penalises_deficits() {
        let config = SimConfig::default();
        let mut entries = seed_ledger(&config);
        entries[ResourceKind::Power.index()].consumption = 700_000;
        let s = score(&[], &entries, 6, &config);
        // 700000 * 30 / 10_000_000 = 2
        assert_eq!(s.resource_score, -100);
    }

    #[test]
    fn test_admin_counts_only_when_staffed() {
        let config = SimConfig::default();
        let entries = seed_ledger(&config);
        let modules = [
            module(1, ModuleKind::AdministrativeModule),
            module(2, ModuleKind::LiveModuleX),
            module(3, ModuleKind::ResearchModuleMine),
            module(4, ModuleKind::Plantation),
            module(5, ModuleKind::Plantation),
            module(6, ModuleKind::ResearchModuleTerritory),
        ];
        let s = score(&modules, &entries, 6, &config);
        assert_eq!(s.population_housed, 8);
        // 2 + 1 + 3 + 3 + 1
        assert_eq!(s.population_needed, 10);
        assert_eq!(s.research_score, 25);
        assert_eq!(s.centralization_score, 0);
    }

    #[test]
    fn test_mood_with_no_food_flow_is_zero() {
        let config = SimConfig::default();
        let entries = seed_ledger(&config);
        let modules = [
            module(1, ModuleKind::LiveModuleX),
            module(2, ModuleKind::MedicalModule),
        ];
        let s = score(&modules, &entries, 6, &config);
        assert_eq!(s.mood, 0);
    }

    #[test]
    fn test_mood_blends_leisure_and_supply() {
        let config = SimConfig::default();
        let mut entries = seed_ledger(&config);
        entries[ResourceKind::Food.index()].production = 1640;
        entries[ResourceKind::Food.index()].consumption = 4960;
        let modules = [
            module(1, ModuleKind::LiveModuleX),
            module(2, ModuleKind::MedicalModule),
            module(3, ModuleKind::SportModule),
        ];
        let s = score(&modules, &entries, 6, &config);
        // leisure: 2*3*8/8*25 = 150 -> 50; supply: (100 + 1.10) / 4 = 25.27
        assert_eq!(s.mood, 75);
        assert_eq!(s.population_needed, 1);
    }

    #[test]
    fn test_full_centralization() {
        let config = SimConfig::default();
        let entries = seed_ledger(&config);
        let mut modules = vec![module(1, ModuleKind::LiveModuleX), module(2, ModuleKind::LiveModuleY)];
        for id in 3..9 {
            modules.push(module(id, ModuleKind::AdministrativeModule));
        }
        let s = score(&modules, &entries, 6, &config);
        assert_eq!(s.centralization_score, 100);
        assert_eq!(s.population_needed, 12);
    }
}
