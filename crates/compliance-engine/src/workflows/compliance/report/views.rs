use super::super::domain::{ComplianceStatus, RiskCategory};
use serde::Serialize;

/// Headline counts for a run. `compliant + non_compliant == total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub compliance_rate_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ComplianceStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: RiskCategory,
    pub category_label: &'static str,
    pub count: usize,
}

/// Per-province marker data for a map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceHotspot {
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub buildings: usize,
    pub high_risk: usize,
    pub buildings_radius: f64,
    pub high_risk_radius: f64,
}
