//! End-to-end run: snapshots in, augmented building table and reports out.

use crate::config::EngineConfig;
use crate::workflows::compliance::domain::{
    AssessedBuilding, CertificateRecord, ComplianceStatus, Dimension, RiskCategory,
};
use crate::workflows::compliance::filters::{by_risk_descending, BuildingFilter};
use crate::workflows::compliance::matcher::match_registries;
use crate::workflows::compliance::report::views::{
    CategoryCount, KeyMetrics, ProvinceHotspot, StatusCount,
};
use crate::workflows::compliance::report::{
    category_distribution, generate_recommendations, key_metrics, province_hotspots,
    status_distribution, summarize, ComplianceSummary,
};
use crate::workflows::compliance::scoring::RiskScorer;
use crate::workflows::risk_model::{evaluate_high_risk_model, ModelReport};
use crate::workflows::snapshot::{
    CertifiedSnapshot, DataIssue, DatasetKind, RegisteredSnapshot, Snapshot, SnapshotError,
    SnapshotReader,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where a snapshot comes from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// The two uploads a run needs. Either may be missing; the run then refuses to start.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub registered: Option<SnapshotSource>,
    pub certified: Option<SnapshotSource>,
}

impl PipelineInputs {
    pub fn from_paths(registered: impl Into<PathBuf>, certified: impl Into<PathBuf>) -> Self {
        Self {
            registered: Some(SnapshotSource::Path(registered.into())),
            certified: Some(SnapshotSource::Path(certified.into())),
        }
    }

    pub fn from_bytes(registered: impl Into<Vec<u8>>, certified: impl Into<Vec<u8>>) -> Self {
        Self {
            registered: Some(SnapshotSource::Bytes(registered.into())),
            certified: Some(SnapshotSource::Bytes(certified.into())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no {} snapshot was provided", .dataset.label())]
    InputAbsent { dataset: DatasetKind },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// What happened to the optional classifier stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelOutcome {
    Trained(ModelReport),
    /// Training was attempted but the data could not support it.
    Skipped { reason: String },
    Disabled,
}

impl ModelOutcome {
    pub fn report(&self) -> Option<&ModelReport> {
        match self {
            Self::Trained(report) => Some(report),
            Self::Skipped { .. } | Self::Disabled => None,
        }
    }
}

/// One entry of the "most likely HIGH risk" ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub reg_key: String,
    pub province: String,
    pub city: String,
    pub occupancy: String,
    pub status: ComplianceStatus,
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    pub probability: f64,
}

/// Everything a run produces. `buildings` keeps the registered snapshot order.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRun {
    pub buildings: Vec<AssessedBuilding>,
    pub orphans: Vec<CertificateRecord>,
    pub metrics: KeyMetrics,
    pub status_distribution: Vec<StatusCount>,
    pub category_distribution: Vec<CategoryCount>,
    pub province_summary: Option<ComplianceSummary>,
    pub occupancy_summary: Option<ComplianceSummary>,
    pub ownership_summary: Option<ComplianceSummary>,
    pub entity_summary: Option<ComplianceSummary>,
    pub smart_meter_rate_pct: f64,
    pub high_risk_count: usize,
    pub recommendations: Vec<String>,
    pub hotspots: Vec<ProvinceHotspot>,
    pub issues: Vec<DataIssue>,
    pub model: ModelOutcome,
    pub top_predictions: Vec<RankedPrediction>,
}

impl ComplianceRun {
    pub fn summary(&self, dimension: Dimension) -> Option<&ComplianceSummary> {
        match dimension {
            Dimension::Province => self.province_summary.as_ref(),
            Dimension::Occupancy => self.occupancy_summary.as_ref(),
            Dimension::Ownership => self.ownership_summary.as_ref(),
            Dimension::EntityType => self.entity_summary.as_ref(),
        }
    }

    /// Buildings by rule score, highest first.
    pub fn ranked(&self) -> Vec<&AssessedBuilding> {
        by_risk_descending(&self.buildings)
    }

    pub fn filtered(&self, filter: &BuildingFilter) -> Vec<&AssessedBuilding> {
        filter.apply(&self.buildings)
    }
}

/// Reads both snapshots and runs every stage.
pub fn run(inputs: PipelineInputs, config: &EngineConfig) -> Result<ComplianceRun, PipelineError> {
    let registered = inputs.registered.ok_or(PipelineError::InputAbsent {
        dataset: DatasetKind::Registered,
    })?;
    let certified = inputs.certified.ok_or(PipelineError::InputAbsent {
        dataset: DatasetKind::Certified,
    })?;

    let reader = SnapshotReader::new(config.identifier_policy);
    let registered = match registered {
        SnapshotSource::Path(path) => reader.registered_from_path(path)?,
        SnapshotSource::Bytes(bytes) => reader.registered_from_reader(bytes.as_slice())?,
    };
    let certified = match certified {
        SnapshotSource::Path(path) => reader.certified_from_path(path)?,
        SnapshotSource::Bytes(bytes) => reader.certified_from_reader(bytes.as_slice())?,
    };

    Ok(run_snapshots(registered, certified, config))
}

/// Runs every stage on snapshots that are already loaded.
pub fn run_snapshots(
    registered: RegisteredSnapshot,
    certified: CertifiedSnapshot,
    config: &EngineConfig,
) -> ComplianceRun {
    info!(
        registered = registered.len(),
        certified = certified.len(),
        "snapshots loaded"
    );

    let Snapshot {
        records: registered_records,
        present_columns,
        issues: mut all_issues,
    } = registered;
    all_issues.extend(certified.issues);

    let matched = match_registries(registered_records, certified.records);
    info!(
        compliant = matched.compliant(),
        non_compliant = matched.non_compliant(),
        orphans = matched.orphans.len(),
        "registries matched"
    );

    let scorer = RiskScorer::new(config.risk_bins);
    let mut buildings: Vec<AssessedBuilding> = matched
        .registered
        .into_iter()
        .map(|(record, status)| {
            let risk_score = scorer.score(&record, status);
            AssessedBuilding {
                risk_category: scorer.categorize(risk_score),
                risk_score,
                record,
                status,
                prediction: None,
            }
        })
        .collect();

    let high_risk_count = buildings
        .iter()
        .filter(|building| building.risk_category == RiskCategory::High)
        .count();
    info!(high_risk = high_risk_count, "buildings scored");

    let [province_summary, occupancy_summary, ownership_summary, entity_summary] =
        Dimension::ordered().map(|dimension| summarize(&buildings, dimension, &present_columns));

    let smart_meter_rate_pct = smart_meter_rate_pct(&buildings);
    let recommendations = generate_recommendations(
        province_summary.as_ref(),
        occupancy_summary.as_ref(),
        smart_meter_rate_pct,
        high_risk_count,
    );

    let model = if config.train_model {
        match evaluate_high_risk_model(&buildings, &config.forest) {
            Ok(report) => {
                for (building, prediction) in buildings.iter_mut().zip(&report.predictions) {
                    building.prediction = Some(*prediction);
                }
                ModelOutcome::Trained(report)
            }
            Err(err) => {
                warn!(error = %err, "risk model skipped");
                ModelOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        }
    } else {
        ModelOutcome::Disabled
    };

    let top_predictions = rank_predictions(&buildings, config.top_predictions);

    ComplianceRun {
        metrics: key_metrics(&buildings),
        status_distribution: status_distribution(&buildings),
        category_distribution: category_distribution(&buildings),
        hotspots: province_hotspots(&buildings, &config.provinces),
        orphans: matched.orphans,
        province_summary,
        occupancy_summary,
        ownership_summary,
        entity_summary,
        smart_meter_rate_pct,
        high_risk_count,
        recommendations,
        issues: all_issues,
        model,
        top_predictions,
        buildings,
    }
}

/// Share of smart-metered buildings as a percentage; 0 with no buildings.
pub fn smart_meter_rate_pct(buildings: &[AssessedBuilding]) -> f64 {
    if buildings.is_empty() {
        return 0.0;
    }
    let metered = buildings
        .iter()
        .filter(|building| building.record.smart_metered)
        .count();
    metered as f64 / buildings.len() as f64 * 100.0
}

fn rank_predictions(buildings: &[AssessedBuilding], limit: usize) -> Vec<RankedPrediction> {
    let mut ranked: Vec<RankedPrediction> = buildings
        .iter()
        .filter_map(|building| {
            let prediction = building.prediction?;
            Some(RankedPrediction {
                reg_key: building.record.reg_key.clone(),
                province: building.record.province.clone(),
                city: building.record.city.clone(),
                occupancy: building.record.occupancy.clone(),
                status: building.status,
                risk_score: building.risk_score,
                risk_category: building.risk_category,
                probability: prediction.probability,
            })
        })
        .collect();
    ranked.sort_by(|left, right| right.probability.total_cmp(&left.probability));
    ranked.truncate(limit);
    ranked
}
