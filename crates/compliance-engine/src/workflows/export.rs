//! Writes a finished run to disk: one CSV per report section, a manifest, and
//! the flat building table.

use crate::workflows::compliance::domain::{AssessedBuilding, CertificateRecord, Dimension};
use crate::workflows::compliance::report::ComplianceSummary;
use crate::workflows::pipeline::{ComplianceRun, ModelOutcome};
use crate::workflows::snapshot::columns::{
    BILLING_TYPE, CITY, ENERGY_COLUMNS, ENTITY_TYPE, METERING_TYPE, OCCUPANCY, OWNERSHIP_TYPE,
    PROVINCE, REGISTRATION_NUMBER, SIZE,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUILDINGS_SECTION: &str = "Compliance_Buildings";
pub const RECOMMENDATIONS_SECTION: &str = "Recommendations";
pub const ORPHANS_SECTION: &str = "EPC_Only_Not_Registered";
pub const FLAT_BUILDINGS_FILE: &str = "Compliance_Buildings_Output.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode section {section}: {source}")]
    Csv {
        section: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("failed to encode manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// One written section, in workbook order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub name: &'static str,
    pub file: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub buildings: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub orphans: usize,
    pub model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_accuracy: Option<f64>,
    pub sections: Vec<SectionEntry>,
    pub flat_table: String,
}

/// Writes report directories stamped with a fixed generation time.
#[derive(Debug, Clone, Copy)]
pub struct ReportExporter {
    generated_at: DateTime<Utc>,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ReportExporter {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }

    /// Creates `dir` if needed and writes every available section. Buildings
    /// are written by rule score, highest first, in both the section and the
    /// flat table.
    ///
    /// Summary sections whose dimension was absent from the registered
    /// snapshot are left out and do not appear in the manifest.
    pub fn write(&self, run: &ComplianceRun, dir: &Path) -> Result<ExportManifest, ExportError> {
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let include_model = matches!(run.model, ModelOutcome::Trained(_));
        let mut sections = Vec::new();

        let ranked = run.ranked();
        sections.push(write_section(dir, BUILDINGS_SECTION, |writer| {
            write_buildings(writer, &ranked, include_model)
        })?);

        for dimension in Dimension::ordered() {
            if let Some(summary) = run.summary(dimension) {
                sections.push(write_section(dir, dimension.section(), |writer| {
                    write_summary(writer, summary)
                })?);
            }
        }

        sections.push(write_section(dir, RECOMMENDATIONS_SECTION, |writer| {
            writer.write_record(["Policy Recommendations"])?;
            for recommendation in &run.recommendations {
                writer.write_record([recommendation])?;
            }
            Ok(run.recommendations.len())
        })?);

        sections.push(write_section(dir, ORPHANS_SECTION, |writer| {
            write_orphans(writer, &run.orphans)
        })?);

        let flat_path = dir.join(FLAT_BUILDINGS_FILE);
        let flat_file = create(&flat_path)?;
        write_flat_buildings(run, flat_file).map_err(|source| ExportError::Csv {
            section: BUILDINGS_SECTION,
            source,
        })?;

        let manifest = ExportManifest {
            generated_at: self.generated_at,
            buildings: run.metrics.total,
            compliant: run.metrics.compliant,
            non_compliant: run.metrics.non_compliant,
            orphans: run.orphans.len(),
            model: match run.model {
                ModelOutcome::Trained(_) => "trained",
                ModelOutcome::Skipped { .. } => "skipped",
                ModelOutcome::Disabled => "disabled",
            },
            model_accuracy: run.model.report().map(|report| report.accuracy),
            sections,
            flat_table: FLAT_BUILDINGS_FILE.to_string(),
        };

        let manifest_path = dir.join(MANIFEST_FILE);
        let mut manifest_file = create(&manifest_path)?;
        serde_json::to_writer_pretty(&mut manifest_file, &manifest)?;
        manifest_file
            .write_all(b"\n")
            .map_err(|source| ExportError::Io {
                path: manifest_path,
                source,
            })?;

        info!(
            dir = %dir.display(),
            sections = manifest.sections.len(),
            "report exported"
        );

        Ok(manifest)
    }
}

/// Writes the augmented building table sorted by rule score, highest first.
pub fn write_flat_buildings<W: Write>(run: &ComplianceRun, writer: W) -> Result<(), csv::Error> {
    let include_model = matches!(run.model, ModelOutcome::Trained(_));
    let mut writer = csv::Writer::from_writer(writer);
    write_buildings(&mut writer, &run.ranked(), include_model)?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_section<F>(dir: &Path, name: &'static str, fill: F) -> Result<SectionEntry, ExportError>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<usize, csv::Error>,
{
    let file_name = format!("{name}.csv");
    let mut writer = csv::Writer::from_writer(create(&dir.join(&file_name))?);
    let rows = fill(&mut writer).map_err(|source| ExportError::Csv {
        section: name,
        source,
    })?;
    writer.flush().map_err(|source| ExportError::Io {
        path: dir.join(&file_name),
        source,
    })?;

    Ok(SectionEntry {
        name,
        file: file_name,
        rows,
    })
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn write_buildings<W: Write>(
    writer: &mut csv::Writer<W>,
    buildings: &[&AssessedBuilding],
    include_model: bool,
) -> Result<usize, csv::Error> {
    let mut header: Vec<&str> = vec![
        REGISTRATION_NUMBER,
        ENTITY_TYPE,
        OWNERSHIP_TYPE,
        OCCUPANCY,
        BILLING_TYPE,
        METERING_TYPE,
        PROVINCE,
        CITY,
        SIZE,
        "floors_num",
    ];
    header.extend(ENERGY_COLUMNS);
    header.extend([
        "smart_metered_flag",
        "has_epc",
        "compliance_status",
        "risk_score_rule",
        "risk_category_rule",
    ]);
    if include_model {
        header.extend(["ml_high_risk_pred", "ml_high_risk_prob"]);
    }
    writer.write_record(&header)?;

    for building in buildings {
        let record = &building.record;
        let mut row = vec![
            record.reg_key.clone(),
            record.entity_type.clone(),
            record.ownership_type.clone(),
            record.occupancy.clone(),
            record.billing_type.clone(),
            record.metering_type.clone(),
            record.province.clone(),
            record.city.clone(),
            record.size.clone().unwrap_or_default(),
            optional_number(record.floors),
        ];
        row.extend(record.energy.ordered().map(optional_number));
        row.extend([
            u8::from(record.smart_metered).to_string(),
            building.has_epc().to_string(),
            building.status.label().to_string(),
            building.risk_score.to_string(),
            building.risk_category.label().to_string(),
        ]);
        if include_model {
            match building.prediction {
                Some(prediction) => row.extend([
                    u8::from(prediction.high_risk).to_string(),
                    format!("{:.4}", prediction.probability),
                ]),
                None => row.extend([String::new(), String::new()]),
            }
        }
        writer.write_record(&row)?;
    }

    Ok(buildings.len())
}

fn write_summary<W: Write>(
    writer: &mut csv::Writer<W>,
    summary: &ComplianceSummary,
) -> Result<usize, csv::Error> {
    writer.write_record([
        summary.dimension.column(),
        "total_buildings",
        "compliant_buildings",
        "non_compliant_buildings",
        "compliance_rate_%",
    ])?;
    for group in &summary.groups {
        writer.write_record([
            group.value.clone(),
            group.total_buildings.to_string(),
            group.compliant_buildings.to_string(),
            group.non_compliant_buildings.to_string(),
            format!("{:.2}", group.compliance_rate_pct),
        ])?;
    }
    Ok(summary.groups.len())
}

fn write_orphans<W: Write>(
    writer: &mut csv::Writer<W>,
    orphans: &[CertificateRecord],
) -> Result<usize, csv::Error> {
    writer.write_record([
        REGISTRATION_NUMBER,
        ENTITY_TYPE,
        OWNERSHIP_TYPE,
        OCCUPANCY,
        PROVINCE,
        CITY,
    ])?;
    for orphan in orphans {
        writer.write_record([
            &orphan.reg_key,
            &orphan.entity_type,
            &orphan.ownership_type,
            &orphan.occupancy,
            &orphan.province,
            &orphan.city,
        ])?;
    }
    Ok(orphans.len())
}
