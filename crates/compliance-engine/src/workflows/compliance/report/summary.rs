use super::super::domain::{AssessedBuilding, ComplianceStatus, Dimension, RiskCategory};
use super::views::{CategoryCount, KeyMetrics, ProvinceHotspot, StatusCount};
use crate::config::ProvinceCoordinates;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const MAX_MARKER_RADIUS: f64 = 30.0;
const BASE_MARKER_RADIUS: f64 = 5.0;
const BUILDINGS_PER_RADIUS_STEP: f64 = 50.0;
const HIGH_RISK_PER_RADIUS_STEP: f64 = 30.0;

/// Compliance counts for one value of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCompliance {
    pub value: String,
    pub total_buildings: usize,
    pub compliant_buildings: usize,
    pub non_compliant_buildings: usize,
    pub compliance_rate_pct: f64,
}

/// Compliance rates per distinct value of a dimension, lowest rate first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub dimension: Dimension,
    pub groups: Vec<GroupCompliance>,
}

impl ComplianceSummary {
    /// Group with the lowest compliance rate.
    pub fn worst(&self) -> Option<&GroupCompliance> {
        self.groups.first()
    }
}

fn rate(compliant: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        compliant as f64 / total as f64 * 100.0
    }
}

/// Groups buildings by the dimension's normalized value. Returns `None` when
/// the dimension's column was absent from the registered snapshot.
pub fn summarize(
    buildings: &[AssessedBuilding],
    dimension: Dimension,
    present_columns: &BTreeSet<&'static str>,
) -> Option<ComplianceSummary> {
    if !present_columns.contains(dimension.column()) {
        return None;
    }

    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for building in buildings {
        let entry = counts
            .entry(dimension.value(&building.record))
            .or_default();
        entry.0 += 1;
        if building.has_epc() {
            entry.1 += 1;
        }
    }

    let mut groups: Vec<GroupCompliance> = counts
        .into_iter()
        .map(|(value, (total, compliant))| GroupCompliance {
            value: value.to_string(),
            total_buildings: total,
            compliant_buildings: compliant,
            non_compliant_buildings: total - compliant,
            compliance_rate_pct: rate(compliant, total),
        })
        .collect();

    // Stable sort keeps the alphabetical order within equal rates.
    groups.sort_by(|left, right| {
        left.compliance_rate_pct
            .total_cmp(&right.compliance_rate_pct)
    });

    Some(ComplianceSummary { dimension, groups })
}

pub fn key_metrics(buildings: &[AssessedBuilding]) -> KeyMetrics {
    let total = buildings.len();
    let compliant = buildings.iter().filter(|building| building.has_epc()).count();
    KeyMetrics {
        total,
        compliant,
        non_compliant: total - compliant,
        compliance_rate_pct: rate(compliant, total),
    }
}

pub fn status_distribution(buildings: &[AssessedBuilding]) -> Vec<StatusCount> {
    ComplianceStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            status_label: status.label(),
            count: buildings
                .iter()
                .filter(|building| building.status == status)
                .count(),
        })
        .collect()
}

pub fn category_distribution(buildings: &[AssessedBuilding]) -> Vec<CategoryCount> {
    RiskCategory::ordered()
        .into_iter()
        .map(|category| CategoryCount {
            category,
            category_label: category.label(),
            count: buildings
                .iter()
                .filter(|building| building.risk_category == category)
                .count(),
        })
        .collect()
}

/// Building and HIGH-risk counts for provinces with a known centroid, busiest first.
pub fn province_hotspots(
    buildings: &[AssessedBuilding],
    provinces: &ProvinceCoordinates,
) -> Vec<ProvinceHotspot> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for building in buildings {
        let entry = counts.entry(building.record.province.as_str()).or_default();
        entry.0 += 1;
        if building.risk_category == RiskCategory::High {
            entry.1 += 1;
        }
    }

    let mut hotspots: Vec<ProvinceHotspot> = counts
        .into_iter()
        .filter_map(|(province, (total, high_risk))| {
            let centroid = provinces.get(province)?;
            Some(ProvinceHotspot {
                province: province.to_string(),
                latitude: centroid.latitude,
                longitude: centroid.longitude,
                buildings: total,
                high_risk,
                buildings_radius: marker_radius(total, BUILDINGS_PER_RADIUS_STEP),
                high_risk_radius: marker_radius(high_risk, HIGH_RISK_PER_RADIUS_STEP),
            })
        })
        .collect();

    hotspots.sort_by(|left, right| right.buildings.cmp(&left.buildings));
    hotspots
}

fn marker_radius(count: usize, per_step: f64) -> f64 {
    (BASE_MARKER_RADIUS + count as f64 / per_step).min(MAX_MARKER_RADIUS)
}
