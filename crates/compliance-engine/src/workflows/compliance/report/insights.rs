use super::summary::ComplianceSummary;

/// Policy recommendations derived from the summaries. Province and occupancy
/// items are skipped when their summary is absent or has no groups.
pub fn generate_recommendations(
    province: Option<&ComplianceSummary>,
    occupancy: Option<&ComplianceSummary>,
    smart_meter_rate_pct: f64,
    high_risk_count: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(worst) = province.and_then(ComplianceSummary::worst) {
        recommendations.push(format!(
            "Increase inspections in '{}' (compliance rate: {:.1}%).",
            worst.value, worst.compliance_rate_pct
        ));
    }

    if let Some(worst) = occupancy.and_then(ComplianceSummary::worst) {
        recommendations.push(format!(
            "Target enforcement for '{}' buildings (compliance rate: {:.1}%).",
            worst.value, worst.compliance_rate_pct
        ));
    }

    recommendations.push(format!(
        "Promote smart metering rollout (current smart-meter rate: {smart_meter_rate_pct:.1}%)."
    ));
    recommendations.push(format!(
        "Prioritize audits for HIGH risk buildings: {high_risk_count} flagged."
    ));

    recommendations
}
