//! Supervised reproduction of the rule-based HIGH risk label.
//!
//! The target is derived from the rule scorer, so the model approximates the
//! deterministic rules from raw building attributes; it is not ground truth.

mod features;
mod forest;
mod split;
mod tree;

#[cfg(test)]
mod tests;

pub use features::{
    FeatureEncoder, RawFeatures, CATEGORICAL_FEATURES, NUMERIC_FEATURES, UNKNOWN_CATEGORY,
};
pub use forest::RandomForest;
pub use split::{stratified_split, TrainTestSplit};

use crate::config::ForestConfig;
use crate::workflows::compliance::domain::{AssessedBuilding, RiskCategory, RiskPrediction};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("insufficient class diversity: target has {classes} distinct class(es), need 2")]
    DegenerateTarget { classes: usize },
    #[error(
        "insufficient class diversity: {} class has {count} member(s), need at least 2",
        if *.high_risk { "HIGH risk" } else { "non-HIGH risk" }
    )]
    SparseClass { high_risk: bool, count: usize },
    #[error("feature rows ({rows}) and labels ({labels}) differ in length")]
    LengthMismatch { rows: usize, labels: usize },
}

/// Fitted encoder plus forest: the trained HIGH-risk model.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    encoder: FeatureEncoder,
    forest: RandomForest,
}

impl RiskClassifier {
    /// Fits the encoder vocabulary and the forest on the given rows.
    pub fn train<R: Rng + ?Sized>(
        rows: &[RawFeatures],
        labels: &[bool],
        config: &ForestConfig,
        rng: &mut R,
    ) -> Result<Self, ClassifierError> {
        if rows.len() != labels.len() {
            return Err(ClassifierError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        split::ensure_two_classes(labels)?;

        let encoder = FeatureEncoder::fit(rows);
        let encoded = encoder.transform_all(rows);
        let forest = RandomForest::fit(&encoded, labels, config, rng);

        Ok(Self { encoder, forest })
    }

    pub fn predict(&self, rows: &[RawFeatures]) -> Vec<bool> {
        rows.iter()
            .map(|row| self.forest.predict(&self.encoder.transform(row)))
            .collect()
    }

    /// Probability of HIGH risk per row.
    pub fn predict_proba(&self, rows: &[RawFeatures]) -> Vec<f64> {
        rows.iter()
            .map(|row| self.forest.predict_proba(&self.encoder.transform(row)))
            .collect()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Held-out confusion counts, positive = HIGH risk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[bool], predicted: &[bool]) -> Self {
        let mut matrix = Self::default();
        for (actual, predicted) in actual.iter().zip(predicted) {
            match (actual, predicted) {
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (true, true) => matrix.true_positive += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_negative + self.true_positive) as f64 / total as f64
    }
}

/// Outcome of training on the assessed population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    /// Accuracy on the held-out rows only.
    pub accuracy: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub confusion: ConfusionMatrix,
    pub feature_count: usize,
    pub n_trees: usize,
    pub high_risk_prevalence: f64,
    /// One prediction per input building, in input order.
    pub predictions: Vec<RiskPrediction>,
}

/// HIGH-risk target: 1 iff the rule category is HIGH.
pub fn high_risk_labels(buildings: &[AssessedBuilding]) -> Vec<bool> {
    buildings
        .iter()
        .map(|building| building.risk_category == RiskCategory::High)
        .collect()
}

/// Splits, trains and scores the forest, then predicts for every building.
///
/// A single generator seeded from `config.seed` drives the split and then
/// the forest, so equal inputs and config give equal reports.
pub fn evaluate_high_risk_model(
    buildings: &[AssessedBuilding],
    config: &ForestConfig,
) -> Result<ModelReport, ClassifierError> {
    let labels = high_risk_labels(buildings);
    let rows: Vec<RawFeatures> = buildings
        .iter()
        .map(|building| RawFeatures::from_record(&building.record))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let split = stratified_split(&labels, config.test_fraction, &mut rng)?;

    let pick_rows = |indices: &[usize]| -> Vec<RawFeatures> {
        indices.iter().map(|index| rows[*index].clone()).collect()
    };
    let pick_labels =
        |indices: &[usize]| -> Vec<bool> { indices.iter().map(|index| labels[*index]).collect() };

    let train_labels = pick_labels(&split.train);
    let classifier =
        RiskClassifier::train(&pick_rows(&split.train), &train_labels, config, &mut rng)?;

    let test_labels = pick_labels(&split.test);
    let test_predictions = classifier.predict(&pick_rows(&split.test));
    let confusion = ConfusionMatrix::from_predictions(&test_labels, &test_predictions);

    let probabilities = classifier.predict_proba(&rows);
    let predictions = probabilities
        .into_iter()
        .map(|probability| RiskPrediction {
            high_risk: probability > 0.5,
            probability,
        })
        .collect();

    let positives = labels.iter().filter(|label| **label).count();
    let report = ModelReport {
        accuracy: confusion.accuracy(),
        train_size: split.train.len(),
        test_size: split.test.len(),
        confusion,
        feature_count: classifier.encoder().width(),
        n_trees: classifier.forest().n_trees(),
        high_risk_prevalence: positives as f64 / labels.len() as f64,
        predictions,
    };

    info!(
        accuracy = report.accuracy,
        train = report.train_size,
        test = report.test_size,
        features = report.feature_count,
        "risk model trained"
    );

    Ok(report)
}
