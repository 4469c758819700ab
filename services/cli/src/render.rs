use compliance_engine::error::AppError;
use compliance_engine::workflows::compliance::report::views::{
    CategoryCount, KeyMetrics, ProvinceHotspot, StatusCount,
};
use compliance_engine::workflows::compliance::{
    AssessedBuilding, BuildingFilter, ComplianceSummary, Dimension,
};
use compliance_engine::workflows::export::ExportManifest;
use compliance_engine::workflows::pipeline::{ComplianceRun, ModelOutcome, RankedPrediction};
use compliance_engine::workflows::risk_model::ConfusionMatrix;
use compliance_engine::workflows::snapshot::DataIssue;
use serde::Serialize;
use std::path::Path;

/// Groups printed per summary in text mode.
const SUMMARY_ROWS: usize = 5;

pub(crate) struct RenderOptions<'a> {
    pub(crate) filter: &'a BuildingFilter,
    pub(crate) limit: usize,
    pub(crate) manifest: Option<&'a ExportManifest>,
    pub(crate) export_dir: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct BuildingRow<'a> {
    registration_number: &'a str,
    province: &'a str,
    city: &'a str,
    occupancy: &'a str,
    compliance_status: &'static str,
    risk_score_rule: u8,
    risk_category_rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ml_high_risk_prob: Option<f64>,
}

impl<'a> From<&'a AssessedBuilding> for BuildingRow<'a> {
    fn from(building: &'a AssessedBuilding) -> Self {
        Self {
            registration_number: &building.record.reg_key,
            province: &building.record.province,
            city: &building.record.city,
            occupancy: &building.record.occupancy,
            compliance_status: building.status.label(),
            risk_score_rule: building.risk_score,
            risk_category_rule: building.risk_category.label(),
            ml_high_risk_prob: building
                .prediction
                .map(|prediction| prediction.probability),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum ModelView<'a> {
    Trained {
        accuracy: f64,
        train_size: usize,
        test_size: usize,
        feature_count: usize,
        n_trees: usize,
        confusion: ConfusionMatrix,
        top_predictions: &'a [RankedPrediction],
    },
    Skipped {
        reason: &'a str,
    },
    Disabled,
}

impl<'a> ModelView<'a> {
    fn new(run: &'a ComplianceRun) -> Self {
        match &run.model {
            ModelOutcome::Trained(report) => Self::Trained {
                accuracy: report.accuracy,
                train_size: report.train_size,
                test_size: report.test_size,
                feature_count: report.feature_count,
                n_trees: report.n_trees,
                confusion: report.confusion,
                top_predictions: &run.top_predictions,
            },
            ModelOutcome::Skipped { reason } => Self::Skipped { reason },
            ModelOutcome::Disabled => Self::Disabled,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    metrics: KeyMetrics,
    status_distribution: &'a [StatusCount],
    category_distribution: &'a [CategoryCount],
    summaries: Vec<&'a ComplianceSummary>,
    smart_meter_rate_pct: f64,
    recommendations: &'a [String],
    hotspots: &'a [ProvinceHotspot],
    orphan_count: usize,
    issues: &'a [DataIssue],
    matching_buildings: usize,
    buildings: Vec<BuildingRow<'a>>,
    model: ModelView<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<&'a ExportManifest>,
}

pub(crate) fn print_json(run: &ComplianceRun, options: &RenderOptions<'_>) -> Result<(), AppError> {
    let matching = run.filtered(options.filter);
    let report = JsonReport {
        metrics: run.metrics,
        status_distribution: &run.status_distribution,
        category_distribution: &run.category_distribution,
        summaries: Dimension::ordered()
            .into_iter()
            .filter_map(|dimension| run.summary(dimension))
            .collect(),
        smart_meter_rate_pct: run.smart_meter_rate_pct,
        recommendations: &run.recommendations,
        hotspots: &run.hotspots,
        orphan_count: run.orphans.len(),
        issues: &run.issues,
        matching_buildings: matching.len(),
        buildings: matching
            .iter()
            .take(options.limit)
            .map(|building| BuildingRow::from(*building))
            .collect(),
        model: ModelView::new(run),
        export: options.manifest,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn print_text(run: &ComplianceRun, options: &RenderOptions<'_>) {
    let metrics = &run.metrics;
    println!("EPC compliance run");
    println!(
        "- {} registered buildings | {} compliant | {} non-compliant | {:.1}% compliance rate",
        metrics.total, metrics.compliant, metrics.non_compliant, metrics.compliance_rate_pct
    );
    println!(
        "- {} certificates without a registered building",
        run.orphans.len()
    );
    if !run.issues.is_empty() {
        println!("- {} data issues recorded while reading snapshots", run.issues.len());
    }

    println!("\nCompliance status");
    for entry in &run.status_distribution {
        println!("- {}: {}", entry.status_label, entry.count);
    }

    println!("\nRule risk categories");
    for entry in &run.category_distribution {
        println!("- {}: {}", entry.category_label, entry.count);
    }

    for dimension in Dimension::ordered() {
        match run.summary(dimension) {
            Some(summary) => {
                println!("\nLowest compliance by {}", dimension.column());
                for group in summary.groups.iter().take(SUMMARY_ROWS) {
                    println!(
                        "- {}: {}/{} compliant ({:.1}%)",
                        display_value(&group.value),
                        group.compliant_buildings,
                        group.total_buildings,
                        group.compliance_rate_pct
                    );
                }
            }
            None => println!("\n{} column not present; summary skipped", dimension.column()),
        }
    }

    println!("\nPolicy recommendations");
    for recommendation in &run.recommendations {
        println!("- {}", recommendation);
    }

    if !run.hotspots.is_empty() {
        println!("\nProvince hotspots");
        for hotspot in &run.hotspots {
            println!(
                "- {} ({:.4}, {:.4}): {} buildings, {} HIGH risk",
                hotspot.province,
                hotspot.latitude,
                hotspot.longitude,
                hotspot.buildings,
                hotspot.high_risk
            );
        }
    }

    let matching = run.filtered(options.filter);
    println!(
        "\nBuildings by rule risk ({} matching, showing {})",
        matching.len(),
        matching.len().min(options.limit)
    );
    for building in matching.iter().take(options.limit) {
        let row = BuildingRow::from(*building);
        let ml = row
            .ml_high_risk_prob
            .map(|probability| format!(" | P(HIGH) {:.2}", probability))
            .unwrap_or_default();
        println!(
            "- {} | {} / {} | {} | {} {}{}",
            row.registration_number,
            display_value(row.city),
            display_value(row.province),
            row.compliance_status,
            row.risk_score_rule,
            row.risk_category_rule,
            ml
        );
    }

    println!("\nHIGH risk model");
    match &run.model {
        ModelOutcome::Trained(report) => {
            println!(
                "- accuracy {:.3} on {} held-out buildings ({} used for training, {} features, {} trees)",
                report.accuracy,
                report.test_size,
                report.train_size,
                report.feature_count,
                report.n_trees
            );
            let confusion = report.confusion;
            println!(
                "- confusion: TN {} | FP {} | FN {} | TP {}",
                confusion.true_negative,
                confusion.false_positive,
                confusion.false_negative,
                confusion.true_positive
            );
            if !run.top_predictions.is_empty() {
                println!("- most likely HIGH risk:");
                for entry in &run.top_predictions {
                    println!(
                        "  - {} ({}, {}) {} P(HIGH) {:.2} | rule {} {}",
                        entry.reg_key,
                        display_value(&entry.city),
                        display_value(&entry.province),
                        entry.status.label(),
                        entry.probability,
                        entry.risk_score,
                        entry.risk_category.label()
                    );
                }
            }
        }
        ModelOutcome::Skipped { reason } => println!("- skipped: {}", reason),
        ModelOutcome::Disabled => println!("- disabled"),
    }

    if let (Some(manifest), Some(dir)) = (options.manifest, options.export_dir) {
        println!("\nReport written to {}", dir.display());
        for section in &manifest.sections {
            println!("- {} ({} rows)", section.file, section.rows);
        }
        println!("- {}", manifest.flat_table);
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(blank)"
    } else {
        value
    }
}
