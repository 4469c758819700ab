use super::domain::{BuildingRecord, ComplianceStatus, RiskCategory};
use crate::config::RiskBins;
use serde::{Deserialize, Serialize};

pub const MAX_RISK_SCORE: u8 = 100;

/// Attribute that contributed points to a rule-based risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    NoCertificate,
    FloorCount,
    GridConsumption,
    FuelSources,
    NoSmartMeter,
    HealthcareOccupancy,
    OfficeOccupancy,
    EducationOccupancy,
}

/// Discrete contribution to a risk score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u8,
    pub notes: String,
}

/// Itemized rule score with its bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub category: RiskCategory,
    pub components: Vec<ScoreComponent>,
}

/// Deterministic rule-based scorer. Every term is non-negative and the total
/// is capped at [`MAX_RISK_SCORE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    bins: RiskBins,
}

impl RiskScorer {
    pub fn new(bins: RiskBins) -> Self {
        Self { bins }
    }

    pub fn score(&self, record: &BuildingRecord, status: ComplianceStatus) -> u8 {
        total(&score_components(record, status))
    }

    pub fn assess(&self, record: &BuildingRecord, status: ComplianceStatus) -> RiskAssessment {
        let components = score_components(record, status);
        let score = total(&components);
        RiskAssessment {
            score,
            category: self.categorize(score),
            components,
        }
    }

    /// Buckets are right-closed: LOW up to the first cut, MEDIUM up to the second.
    pub fn categorize(&self, score: u8) -> RiskCategory {
        let score = i32::from(score);
        if score <= self.bins.low_ceiling() {
            RiskCategory::Low
        } else if score <= self.bins.medium_ceiling() {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }
}

fn total(components: &[ScoreComponent]) -> u8 {
    let sum: u32 = components
        .iter()
        .map(|component| u32::from(component.points))
        .sum();
    sum.min(u32::from(MAX_RISK_SCORE)) as u8
}

fn positive(value: Option<f64>) -> bool {
    value.map(|value| value > 0.0).unwrap_or(false)
}

pub(crate) fn score_components(
    record: &BuildingRecord,
    status: ComplianceStatus,
) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    if status == ComplianceStatus::NonCompliant {
        components.push(ScoreComponent {
            factor: RiskFactor::NoCertificate,
            points: 50,
            notes: "no energy performance certificate issued".to_string(),
        });
    }

    if let Some(floors) = record.floors {
        let points = if floors >= 10.0 {
            15
        } else if floors >= 5.0 {
            10
        } else if floors >= 2.0 {
            5
        } else {
            0
        };
        if points > 0 {
            components.push(ScoreComponent {
                factor: RiskFactor::FloorCount,
                points,
                notes: format!("{floors} floor(s)"),
            });
        }
    }

    if positive(record.energy.grid) {
        components.push(ScoreComponent {
            factor: RiskFactor::GridConsumption,
            points: 10,
            notes: "draws grid electricity".to_string(),
        });
    }

    let fuel_sources = record
        .energy
        .fuel_sources()
        .into_iter()
        .filter(|usage| positive(*usage))
        .count() as u8;
    if fuel_sources > 0 {
        components.push(ScoreComponent {
            factor: RiskFactor::FuelSources,
            points: fuel_sources * 5,
            notes: format!("{fuel_sources} combustion fuel source(s) in use"),
        });
    }

    if !record.smart_metered {
        components.push(ScoreComponent {
            factor: RiskFactor::NoSmartMeter,
            points: 10,
            notes: "not smart metered".to_string(),
        });
    }

    let occupancy = record.occupancy.as_str();
    if occupancy.contains("hospital") || occupancy.contains("health") {
        components.push(ScoreComponent {
            factor: RiskFactor::HealthcareOccupancy,
            points: 10,
            notes: format!("healthcare occupancy '{occupancy}'"),
        });
    }
    if occupancy.contains("office") {
        components.push(ScoreComponent {
            factor: RiskFactor::OfficeOccupancy,
            points: 5,
            notes: format!("office occupancy '{occupancy}'"),
        });
    }
    if occupancy.contains("school") || occupancy.contains("education") {
        components.push(ScoreComponent {
            factor: RiskFactor::EducationOccupancy,
            points: 5,
            notes: format!("education occupancy '{occupancy}'"),
        });
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::compliance::domain::EnergyUsage;

    fn quiet_building() -> BuildingRecord {
        let mut record = BuildingRecord::blank("Q-1");
        record.floors = Some(1.0);
        record.smart_metered = true;
        record.occupancy = "retail".to_string();
        record
    }

    #[test]
    fn hospital_example_saturates_at_one_hundred() {
        let mut record = BuildingRecord::blank("H-1");
        record.floors = Some(12.0);
        record.energy = EnergyUsage {
            grid: Some(500.0),
            gas: Some(10.0),
            ..EnergyUsage::zeroed()
        };
        record.smart_metered = false;
        record.occupancy = "hospital ward".to_string();

        let assessment = RiskScorer::default().assess(&record, ComplianceStatus::NonCompliant);
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.category, RiskCategory::High);
        let points: u32 = assessment
            .components
            .iter()
            .map(|component| u32::from(component.points))
            .sum();
        assert_eq!(points, 100);
    }

    #[test]
    fn quiet_compliant_building_scores_zero() {
        let assessment =
            RiskScorer::default().assess(&quiet_building(), ComplianceStatus::Compliant);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.category, RiskCategory::Low);
        assert!(assessment.components.is_empty());
    }

    #[test]
    fn total_is_clamped_when_every_rule_fires() {
        let mut record = BuildingRecord::blank("MAX");
        record.floors = Some(40.0);
        record.energy = EnergyUsage {
            grid: Some(1.0),
            gas: Some(1.0),
            liquid_fuel: Some(1.0),
            solid_fuel: Some(1.0),
            renewable: Some(1.0),
            other: Some(1.0),
        };
        record.occupancy = "health office school".to_string();

        let components = score_components(&record, ComplianceStatus::NonCompliant);
        let raw: u32 = components.iter().map(|c| u32::from(c.points)).sum();
        assert_eq!(raw, 120);
        assert_eq!(
            RiskScorer::default().score(&record, ComplianceStatus::NonCompliant),
            100
        );
    }

    #[test]
    fn floor_steps_apply_only_when_known() {
        let scorer = RiskScorer::default();
        let mut record = quiet_building();
        for (floors, expected) in [
            (Some(1.0), 0),
            (Some(2.0), 5),
            (Some(4.9), 5),
            (Some(5.0), 10),
            (Some(9.0), 10),
            (Some(10.0), 15),
            (None, 0),
        ] {
            record.floors = floors;
            assert_eq!(
                scorer.score(&record, ComplianceStatus::Compliant),
                expected,
                "floors {floors:?}"
            );
        }
    }

    #[test]
    fn missing_usage_never_scores() {
        let mut record = quiet_building();
        record.energy = EnergyUsage::default();
        assert_eq!(
            RiskScorer::default().score(&record, ComplianceStatus::Compliant),
            0
        );

        record.energy.liquid_fuel = Some(3.0);
        record.energy.solid_fuel = Some(-2.0);
        assert_eq!(
            RiskScorer::default().score(&record, ComplianceStatus::Compliant),
            5
        );
    }

    #[test]
    fn category_boundaries_are_right_closed() {
        let scorer = RiskScorer::default();
        assert_eq!(scorer.categorize(0), RiskCategory::Low);
        assert_eq!(scorer.categorize(30), RiskCategory::Low);
        assert_eq!(scorer.categorize(31), RiskCategory::Medium);
        assert_eq!(scorer.categorize(60), RiskCategory::Medium);
        assert_eq!(scorer.categorize(61), RiskCategory::High);
        assert_eq!(scorer.categorize(100), RiskCategory::High);
    }

    #[test]
    fn every_score_lands_in_exactly_one_bucket() {
        let scorer = RiskScorer::default();
        for score in 0..=MAX_RISK_SCORE {
            let category = scorer.categorize(score);
            let expected = match score {
                0..=30 => RiskCategory::Low,
                31..=60 => RiskCategory::Medium,
                _ => RiskCategory::High,
            };
            assert_eq!(category, expected, "score {score}");
        }
    }

    #[test]
    fn alternate_bins_move_the_cut_points() {
        let bins = RiskBins::new([-1, 10, 20, 100]).expect("valid bins");
        let scorer = RiskScorer::new(bins);
        assert_eq!(scorer.categorize(10), RiskCategory::Low);
        assert_eq!(scorer.categorize(11), RiskCategory::Medium);
        assert_eq!(scorer.categorize(21), RiskCategory::High);
    }
}
