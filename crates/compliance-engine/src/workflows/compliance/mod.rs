pub mod domain;
pub mod filters;
pub mod matcher;
pub mod report;
pub mod scoring;

pub use domain::{
    AssessedBuilding, BuildingRecord, CertificateRecord, ComplianceStatus, Dimension,
    EnergyUsage, RiskCategory, RiskPrediction,
};
pub use filters::{by_risk_descending, BuildingFilter};
pub use matcher::{match_registries, MatchOutcome};
pub use report::{ComplianceSummary, GroupCompliance};
pub use scoring::{RiskAssessment, RiskFactor, RiskScorer, ScoreComponent};
