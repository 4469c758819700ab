use serde::{Deserialize, Serialize};

/// Energy consumption columns reported per building. `None` means the cell was
/// blank or not numeric; an absent column is read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyUsage {
    pub grid: Option<f64>,
    pub gas: Option<f64>,
    pub liquid_fuel: Option<f64>,
    pub solid_fuel: Option<f64>,
    pub renewable: Option<f64>,
    pub other: Option<f64>,
}

impl EnergyUsage {
    pub fn zeroed() -> Self {
        Self {
            grid: Some(0.0),
            gas: Some(0.0),
            liquid_fuel: Some(0.0),
            solid_fuel: Some(0.0),
            renewable: Some(0.0),
            other: Some(0.0),
        }
    }

    /// Values in reporting order: grid, gas, liquid fuel, solid fuel, renewable, other.
    pub fn ordered(&self) -> [Option<f64>; 6] {
        [
            self.grid,
            self.gas,
            self.liquid_fuel,
            self.solid_fuel,
            self.renewable,
            self.other,
        ]
    }

    pub fn fuel_sources(&self) -> [Option<f64>; 3] {
        [self.gas, self.liquid_fuel, self.solid_fuel]
    }
}

/// A building registered for energy performance reporting.
///
/// Text attributes are trimmed and lowercased, or empty when the column is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub reg_key: String,
    pub entity_type: String,
    pub ownership_type: String,
    pub occupancy: String,
    pub billing_type: String,
    pub metering_type: String,
    pub province: String,
    pub city: String,
    /// Raw size band, trimmed but not case-folded.
    pub size: Option<String>,
    pub floors: Option<f64>,
    pub energy: EnergyUsage,
    pub smart_metered: bool,
}

impl BuildingRecord {
    /// Record with every attribute at its documented default.
    pub fn blank(reg_key: impl Into<String>) -> Self {
        Self {
            reg_key: reg_key.into(),
            entity_type: String::new(),
            ownership_type: String::new(),
            occupancy: String::new(),
            billing_type: String::new(),
            metering_type: String::new(),
            province: String::new(),
            city: String::new(),
            size: None,
            floors: None,
            energy: EnergyUsage::zeroed(),
            smart_metered: false,
        }
    }
}

/// A building that was issued an energy performance certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub reg_key: String,
    pub entity_type: String,
    pub ownership_type: String,
    pub occupancy: String,
    pub province: String,
    pub city: String,
}

impl CertificateRecord {
    pub fn blank(reg_key: impl Into<String>) -> Self {
        Self {
            reg_key: reg_key.into(),
            entity_type: String::new(),
            ownership_type: String::new(),
            occupancy: String::new(),
            province: String::new(),
            city: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
}

impl ComplianceStatus {
    pub const fn ordered() -> [Self; 2] {
        [Self::Compliant, Self::NonCompliant]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT (EPC ISSUED)",
            Self::NonCompliant => "NON-COMPLIANT (NO EPC)",
        }
    }

    pub const fn has_epc(self) -> bool {
        matches!(self, Self::Compliant)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered().into_iter().find(|status| {
            status.label().eq_ignore_ascii_case(value)
                || status.short_label().eq_ignore_ascii_case(value)
        })
    }

    const fn short_label(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value))
    }
}

/// Categorical columns the engine summarizes compliance over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Province,
    Occupancy,
    Ownership,
    EntityType,
}

impl Dimension {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Province,
            Self::Occupancy,
            Self::Ownership,
            Self::EntityType,
        ]
    }

    /// Source column header in the registered snapshot.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::Occupancy => "Occupancy Classification",
            Self::Ownership => "Ownership Type",
            Self::EntityType => "Entity Type",
        }
    }

    /// Name of the exported report section.
    pub const fn section(self) -> &'static str {
        match self {
            Self::Province => "Province_Summary",
            Self::Occupancy => "Occupancy_Summary",
            Self::Ownership => "Ownership_Summary",
            Self::EntityType => "Entity_Summary",
        }
    }

    pub fn value(self, record: &BuildingRecord) -> &str {
        match self {
            Self::Province => &record.province,
            Self::Occupancy => &record.occupancy,
            Self::Ownership => &record.ownership_type,
            Self::EntityType => &record.entity_type,
        }
    }
}

/// Classifier output attached to a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub high_risk: bool,
    pub probability: f64,
}

/// A registered building after matching and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedBuilding {
    pub record: BuildingRecord,
    pub status: ComplianceStatus,
    pub risk_score: u8,
    pub risk_category: RiskCategory,
    pub prediction: Option<RiskPrediction>,
}

impl AssessedBuilding {
    pub fn has_epc(&self) -> bool {
        self.status.has_epc()
    }
}
