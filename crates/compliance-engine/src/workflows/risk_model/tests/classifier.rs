use super::common::*;
use crate::workflows::risk_model::{
    high_risk_labels, ClassifierError, RawFeatures, RiskClassifier,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn training_rows(size: usize) -> (Vec<RawFeatures>, Vec<bool>) {
    let buildings = population(size);
    let rows = buildings
        .iter()
        .map(|building| RawFeatures::from_record(&building.record))
        .collect();
    (rows, high_risk_labels(&buildings))
}

#[test]
fn classifier_separates_heavy_from_light_buildings() {
    let (rows, labels) = training_rows(40);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let classifier =
        RiskClassifier::train(&rows, &labels, &small_forest(), &mut rng).expect("trained");

    assert_eq!(classifier.forest().n_trees(), 25);
    assert_eq!(classifier.predict(&rows), labels);
    for (probability, label) in classifier.predict_proba(&rows).iter().zip(&labels) {
        assert!((0.0..=1.0).contains(probability));
        assert_eq!(*probability > 0.5, *label);
    }
}

#[test]
fn classifier_scores_buildings_from_unseen_provinces() {
    let (rows, labels) = training_rows(40);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let classifier =
        RiskClassifier::train(&rows, &labels, &small_forest(), &mut rng).expect("trained");
    let width = classifier.encoder().width();

    let mut record = heavy_building("NEW-1", 0);
    record.province = "northern cape".to_string();
    record.city = "kimberley".to_string();
    let unseen = RawFeatures::from_record(&record);

    assert_eq!(classifier.encoder().transform(&unseen).len(), width);
    assert_eq!(classifier.predict(&[unseen]), vec![true]);
    assert_eq!(classifier.encoder().width(), width);
}

#[test]
fn classifier_rejects_single_class_targets() {
    let (rows, _) = training_rows(12);
    let labels = vec![false; rows.len()];
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    match RiskClassifier::train(&rows, &labels, &small_forest(), &mut rng) {
        Err(ClassifierError::DegenerateTarget { classes: 1 }) => {}
        other => panic!("expected degenerate target, got {other:?}"),
    }
}

#[test]
fn classifier_rejects_mismatched_lengths() {
    let (rows, mut labels) = training_rows(12);
    labels.pop();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    match RiskClassifier::train(&rows, &labels, &small_forest(), &mut rng) {
        Err(ClassifierError::LengthMismatch { rows: 12, labels: 11 }) => {}
        other => panic!("expected length mismatch, got {other:?}"),
    }
}
