use crate::workflows::compliance::domain::BuildingRecord;
use std::collections::BTreeMap;

pub const CATEGORICAL_FEATURES: [&str; 8] = [
    "Entity Type",
    "Ownership Type",
    "Size",
    "Occupancy Classification",
    "Billing Type",
    "Metering Type",
    "Province",
    "City",
];

pub const NUMERIC_FEATURES: [&str; 8] = [
    "floors_num",
    "Grid Usage",
    "Gas Usage",
    "Liquid Fuel Usage",
    "Solid Fuel Usage",
    "Renewable Usage",
    "Other Usage",
    "smart_metered_flag",
];

pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Model inputs for one building before encoding: categorical values with
/// missing mapped to `"unknown"`, numeric values with missing mapped to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeatures {
    pub categorical: [String; 8],
    pub numeric: [f64; 8],
}

impl RawFeatures {
    pub fn from_record(record: &BuildingRecord) -> Self {
        let categorical = [
            record.entity_type.clone(),
            record.ownership_type.clone(),
            record
                .size
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            record.occupancy.clone(),
            record.billing_type.clone(),
            record.metering_type.clone(),
            record.province.clone(),
            record.city.clone(),
        ];

        let [grid, gas, liquid_fuel, solid_fuel, renewable, other] = record.energy.ordered();
        let numeric = [
            record.floors,
            grid,
            gas,
            liquid_fuel,
            solid_fuel,
            renewable,
            other,
            Some(if record.smart_metered { 1.0 } else { 0.0 }),
        ]
        .map(|value| value.unwrap_or(0.0));

        Self {
            categorical,
            numeric,
        }
    }
}

/// One-hot encoder with a vocabulary fixed at fit time.
///
/// Each categorical feature owns a block of indicator columns, followed by the
/// numeric features passed through unchanged. A value not seen during fitting
/// leaves its block all zero; the vocabulary never grows after `fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    vocabularies: Vec<BTreeMap<String, usize>>,
    offsets: Vec<usize>,
    width: usize,
}

impl FeatureEncoder {
    pub fn fit(rows: &[RawFeatures]) -> Self {
        let mut vocabularies: Vec<BTreeMap<String, usize>> =
            vec![BTreeMap::new(); CATEGORICAL_FEATURES.len()];
        for row in rows {
            for (vocabulary, value) in vocabularies.iter_mut().zip(&row.categorical) {
                if !vocabulary.contains_key(value) {
                    vocabulary.insert(value.clone(), 0);
                }
            }
        }

        // Sorted category order, as the map iterates.
        for vocabulary in &mut vocabularies {
            for (position, slot) in vocabulary.values_mut().enumerate() {
                *slot = position;
            }
        }

        let mut offsets = Vec::with_capacity(vocabularies.len());
        let mut width = 0;
        for vocabulary in &vocabularies {
            offsets.push(width);
            width += vocabulary.len();
        }
        width += NUMERIC_FEATURES.len();

        Self {
            vocabularies,
            offsets,
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn categorical_width(&self) -> usize {
        self.width - NUMERIC_FEATURES.len()
    }

    pub fn transform(&self, row: &RawFeatures) -> Vec<f64> {
        let mut encoded = vec![0.0; self.width];
        for ((vocabulary, offset), value) in self
            .vocabularies
            .iter()
            .zip(&self.offsets)
            .zip(&row.categorical)
        {
            if let Some(position) = vocabulary.get(value) {
                encoded[offset + position] = 1.0;
            }
        }

        let numeric_start = self.categorical_width();
        encoded[numeric_start..].copy_from_slice(&row.numeric);
        encoded
    }

    pub fn transform_all(&self, rows: &[RawFeatures]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// Column names in encoded order: `<feature>=<value>` then numeric names.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width);
        for (feature, vocabulary) in CATEGORICAL_FEATURES.iter().zip(&self.vocabularies) {
            for value in vocabulary.keys() {
                names.push(format!("{feature}={value}"));
            }
        }
        names.extend(NUMERIC_FEATURES.iter().map(|name| name.to_string()));
        names
    }
}
