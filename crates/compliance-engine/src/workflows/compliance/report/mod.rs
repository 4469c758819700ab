mod insights;
mod summary;
pub mod views;

pub use insights::generate_recommendations;
pub use summary::{
    category_distribution, key_metrics, province_hotspots, status_distribution, summarize,
    ComplianceSummary, GroupCompliance,
};
