use crate::workflows::compliance::domain::{
    AssessedBuilding, BuildingRecord, ComplianceStatus, EnergyUsage,
};
use crate::workflows::compliance::scoring::RiskScorer;

const PROVINCES: [(&str, &str); 3] = [
    ("gauteng", "pretoria"),
    ("western cape", "cape town"),
    ("limpopo", "polokwane"),
];

/// Tall, grid-fed, unmetered and non-compliant: scores HIGH.
pub(super) fn heavy_building(key: &str, province: usize) -> BuildingRecord {
    let (province, city) = PROVINCES[province % PROVINCES.len()];
    let mut record = BuildingRecord::blank(key);
    record.entity_type = "national department".to_string();
    record.occupancy = "office".to_string();
    record.province = province.to_string();
    record.city = city.to_string();
    record.floors = Some(12.0);
    record.energy = EnergyUsage {
        grid: Some(4_800.0),
        ..EnergyUsage::zeroed()
    };
    record.smart_metered = false;
    record
}

/// Single storey, smart metered, no recorded usage: scores LOW once compliant.
pub(super) fn light_building(key: &str, province: usize) -> BuildingRecord {
    let mut record = heavy_building(key, province);
    record.floors = Some(1.0);
    record.energy = EnergyUsage::zeroed();
    record.smart_metered = true;
    record
}

pub(super) fn assess(record: BuildingRecord, status: ComplianceStatus) -> AssessedBuilding {
    let assessment = RiskScorer::default().assess(&record, status);
    AssessedBuilding {
        record,
        status,
        risk_score: assessment.score,
        risk_category: assessment.category,
        prediction: None,
    }
}

/// Every fourth building is HIGH risk; provinces cycle independently of risk.
pub(super) fn population(size: usize) -> Vec<AssessedBuilding> {
    (0..size)
        .map(|index| {
            let key = format!("REG-{index:03}");
            if index % 4 == 0 {
                assess(
                    heavy_building(&key, index),
                    ComplianceStatus::NonCompliant,
                )
            } else {
                assess(light_building(&key, index), ComplianceStatus::Compliant)
            }
        })
        .collect()
}

pub(super) fn small_forest() -> crate::config::ForestConfig {
    crate::config::ForestConfig {
        n_trees: 25,
        ..crate::config::ForestConfig::default()
    }
}
