//! Reads the registered-building and certificate snapshots into typed records.
//!
//! Absent columns and unusable cells never fail a read: they resolve to the
//! documented default and are reported as [`DataIssue`]s alongside the records.

pub(crate) mod columns;
mod normalizer;
mod parser;

use crate::config::IdentifierPolicy;
use crate::workflows::compliance::domain::{BuildingRecord, CertificateRecord, EnergyUsage};
use normalizer::{clean_text, normalize_key, parse_number, smart_meter_flag, NumericCell};
use parser::{cell, RawTable};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub(crate) use columns::REGISTRATION_NUMBER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Registered,
    Certified,
}

impl DatasetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registered => "registered buildings",
            Self::Certified => "EPC certificates",
        }
    }
}

/// Value substituted for an absent column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    EmptyText,
    EmptyKey,
    Missing,
    Zero,
    False,
}

/// A recoverable data problem found while reading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIssue {
    MissingColumn {
        dataset: DatasetKind,
        column: &'static str,
        default: ColumnDefault,
    },
    UnparseableValue {
        dataset: DatasetKind,
        /// 1-based data row, not counting the header.
        row: usize,
        column: &'static str,
        raw: String,
    },
    EmptyKey {
        dataset: DatasetKind,
        count: usize,
    },
    /// Bytes that were not valid UTF-8 were replaced with U+FFFD.
    InvalidEncoding {
        dataset: DatasetKind,
        row: usize,
        column: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV in {dataset:?} snapshot: {source}")]
    Csv {
        dataset: DatasetKind,
        #[source]
        source: csv::Error,
    },
    #[error("{} snapshot has no '{}' column", .dataset.label(), REGISTRATION_NUMBER)]
    MissingIdentifier { dataset: DatasetKind },
}

/// Typed records from one snapshot plus what was learned while reading it.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    pub present_columns: BTreeSet<&'static str>,
    pub issues: Vec<DataIssue>,
}

impl<T> Snapshot<T> {
    pub fn has_column(&self, column: &str) -> bool {
        self.present_columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub type RegisteredSnapshot = Snapshot<BuildingRecord>;
pub type CertifiedSnapshot = Snapshot<CertificateRecord>;

/// Normalizes raw CSV snapshots into [`BuildingRecord`]s and [`CertificateRecord`]s.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotReader {
    identifier_policy: IdentifierPolicy,
}

impl SnapshotReader {
    pub fn new(identifier_policy: IdentifierPolicy) -> Self {
        Self { identifier_policy }
    }

    pub fn registered_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<RegisteredSnapshot, SnapshotError> {
        self.registered_from_reader(open(path.as_ref())?)
    }

    pub fn certified_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<CertifiedSnapshot, SnapshotError> {
        self.certified_from_reader(open(path.as_ref())?)
    }

    pub fn registered_from_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<RegisteredSnapshot, SnapshotError> {
        let dataset = DatasetKind::Registered;
        let table = load(reader, dataset)?;
        let mut issues = IssueLog::new(dataset, &table);

        let key = self.key_column(&table, &mut issues)?;
        let text = text_columns(&table, &columns::REGISTERED_TEXT_COLUMNS, &mut issues);
        let size = table.column(columns::SIZE);
        if size.is_none() {
            issues.missing(columns::SIZE, ColumnDefault::Missing);
        }
        let floors = table.column(columns::FLOORS);
        if floors.is_none() {
            issues.missing(columns::FLOORS, ColumnDefault::Missing);
        }
        let energy: Vec<(&'static str, Option<usize>)> = columns::ENERGY_COLUMNS
            .into_iter()
            .map(|name| {
                let position = table.column(name);
                if position.is_none() {
                    issues.missing(name, ColumnDefault::Zero);
                }
                (name, position)
            })
            .collect();
        let smart = table.column(columns::SMART_METERED);
        if smart.is_none() {
            issues.missing(columns::SMART_METERED, ColumnDefault::False);
        }

        let mut records = Vec::with_capacity(table.len());
        for (index, row) in table.rows().iter().enumerate() {
            let row_number = index + 1;
            let text_value = |name: &str| clean_text(cell(row, text[name]));

            let mut usage = [Some(0.0); 6];
            for (slot, (name, position)) in usage.iter_mut().zip(&energy) {
                if position.is_some() {
                    *slot = issues.numeric(row_number, *name, cell(row, *position));
                }
            }
            let [grid, gas, liquid_fuel, solid_fuel, renewable, other] = usage;

            records.push(BuildingRecord {
                reg_key: normalize_key(cell(row, key)),
                entity_type: text_value(columns::ENTITY_TYPE),
                ownership_type: text_value(columns::OWNERSHIP_TYPE),
                occupancy: text_value(columns::OCCUPANCY),
                billing_type: text_value(columns::BILLING_TYPE),
                metering_type: text_value(columns::METERING_TYPE),
                province: text_value(columns::PROVINCE),
                city: text_value(columns::CITY),
                size: cell(row, size)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string),
                floors: match floors {
                    Some(_) => issues.numeric(row_number, columns::FLOORS, cell(row, floors)),
                    None => None,
                },
                energy: EnergyUsage {
                    grid,
                    gas,
                    liquid_fuel,
                    solid_fuel,
                    renewable,
                    other,
                },
                smart_metered: smart_meter_flag(cell(row, smart)),
            });
        }

        let empty_keys = records.iter().filter(|record| record.reg_key.is_empty()).count();
        issues.empty_keys(empty_keys);

        Ok(issues.finish(records, &table))
    }

    pub fn certified_from_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<CertifiedSnapshot, SnapshotError> {
        let dataset = DatasetKind::Certified;
        let table = load(reader, dataset)?;
        let mut issues = IssueLog::new(dataset, &table);

        let key = self.key_column(&table, &mut issues)?;
        let text = text_columns(&table, &columns::CERTIFIED_TEXT_COLUMNS, &mut issues);

        let records: Vec<CertificateRecord> = table
            .rows()
            .iter()
            .map(|row| {
                let text_value = |name: &str| clean_text(cell(row, text[name]));
                CertificateRecord {
                    reg_key: normalize_key(cell(row, key)),
                    entity_type: text_value(columns::ENTITY_TYPE),
                    ownership_type: text_value(columns::OWNERSHIP_TYPE),
                    occupancy: text_value(columns::OCCUPANCY),
                    province: text_value(columns::PROVINCE),
                    city: text_value(columns::CITY),
                }
            })
            .collect();

        let empty_keys = records.iter().filter(|record| record.reg_key.is_empty()).count();
        issues.empty_keys(empty_keys);

        Ok(issues.finish(records, &table))
    }

    fn key_column(
        &self,
        table: &RawTable,
        issues: &mut IssueLog,
    ) -> Result<Option<usize>, SnapshotError> {
        match table.column(REGISTRATION_NUMBER) {
            Some(position) => Ok(Some(position)),
            None => match self.identifier_policy {
                IdentifierPolicy::Require => Err(SnapshotError::MissingIdentifier {
                    dataset: issues.dataset,
                }),
                IdentifierPolicy::AllowEmptyKey => {
                    issues.missing(REGISTRATION_NUMBER, ColumnDefault::EmptyKey);
                    Ok(None)
                }
            },
        }
    }
}

impl Default for SnapshotReader {
    fn default() -> Self {
        Self::new(IdentifierPolicy::Require)
    }
}

fn open(path: &Path) -> Result<std::fs::File, SnapshotError> {
    std::fs::File::open(path).map_err(|source| SnapshotError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn load<R: Read>(reader: R, dataset: DatasetKind) -> Result<RawTable, SnapshotError> {
    let table =
        parser::read_table(reader).map_err(|source| SnapshotError::Csv { dataset, source })?;
    debug!(dataset = dataset.label(), rows = table.len(), "snapshot parsed");
    Ok(table)
}

fn text_columns(
    table: &RawTable,
    names: &[&'static str],
    issues: &mut IssueLog,
) -> BTreeMap<&'static str, Option<usize>> {
    names
        .iter()
        .copied()
        .map(|name| {
            let position = table.column(name);
            if position.is_none() {
                issues.missing(name, ColumnDefault::EmptyText);
            }
            (name, position)
        })
        .collect()
}

struct IssueLog {
    dataset: DatasetKind,
    issues: Vec<DataIssue>,
    unparseable: BTreeMap<&'static str, usize>,
}

impl IssueLog {
    fn new(dataset: DatasetKind, table: &RawTable) -> Self {
        let mut log = Self {
            dataset,
            issues: Vec::new(),
            unparseable: BTreeMap::new(),
        };
        for lossy in table.lossy_cells() {
            log.issues.push(DataIssue::InvalidEncoding {
                dataset,
                row: lossy.row,
                column: table.header(lossy.column).to_string(),
            });
        }
        if !table.lossy_cells().is_empty() {
            warn!(
                dataset = dataset.label(),
                cells = table.lossy_cells().len(),
                "invalid UTF-8 replaced in cells"
            );
        }
        log
    }

    fn missing(&mut self, column: &'static str, default: ColumnDefault) {
        warn!(
            dataset = self.dataset.label(),
            column,
            ?default,
            "column absent, substituting default"
        );
        self.issues.push(DataIssue::MissingColumn {
            dataset: self.dataset,
            column,
            default,
        });
    }

    fn numeric(&mut self, row: usize, column: &'static str, raw: Option<&str>) -> Option<f64> {
        let parsed = parse_number(raw);
        if parsed == NumericCell::Unparseable {
            *self.unparseable.entry(column).or_default() += 1;
            self.issues.push(DataIssue::UnparseableValue {
                dataset: self.dataset,
                row,
                column,
                raw: raw.unwrap_or_default().to_string(),
            });
        }
        parsed.value()
    }

    fn empty_keys(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        warn!(
            dataset = self.dataset.label(),
            count, "records share the empty registration key"
        );
        self.issues.push(DataIssue::EmptyKey {
            dataset: self.dataset,
            count,
        });
    }

    fn finish<T>(self, records: Vec<T>, table: &RawTable) -> Snapshot<T> {
        for (column, count) in &self.unparseable {
            warn!(
                dataset = self.dataset.label(),
                column, count, "non-numeric values treated as missing"
            );
        }

        let present_columns = known_columns()
            .filter(|name| table.column(name).is_some())
            .collect();

        Snapshot {
            records,
            present_columns,
            issues: self.issues,
        }
    }
}

fn known_columns() -> impl Iterator<Item = &'static str> {
    [
        REGISTRATION_NUMBER,
        columns::SIZE,
        columns::FLOORS,
        columns::SMART_METERED,
    ]
    .into_iter()
    .chain(columns::REGISTERED_TEXT_COLUMNS)
    .chain(columns::ENERGY_COLUMNS)
}
