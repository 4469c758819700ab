use super::ClassifierError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Row indices for the training and held-out partitions, each ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits rows so both partitions keep the label prevalence.
///
/// Each class sends `round(count * test_fraction)` rows to the test side,
/// never fewer than one and never all of them.
pub fn stratified_split<R: Rng + ?Sized>(
    labels: &[bool],
    test_fraction: f64,
    rng: &mut R,
) -> Result<TrainTestSplit, ClassifierError> {
    ensure_two_classes(labels)?;

    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(index, _)| index)
            .collect();

        if members.len() < 2 {
            return Err(ClassifierError::SparseClass {
                high_risk: class,
                count: members.len(),
            });
        }

        members.shuffle(rng);
        let wanted = (members.len() as f64 * test_fraction).round() as usize;
        let test_count = wanted.clamp(1, members.len() - 1);
        test.extend_from_slice(&members[..test_count]);
        train.extend_from_slice(&members[test_count..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

pub(crate) fn ensure_two_classes(labels: &[bool]) -> Result<(), ClassifierError> {
    let positives = labels.iter().filter(|label| **label).count();
    let classes = usize::from(positives > 0) + usize::from(positives < labels.len());
    if classes < 2 {
        return Err(ClassifierError::DegenerateTarget { classes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn labels(positives: usize, negatives: usize) -> Vec<bool> {
        let mut labels = vec![true; positives];
        labels.extend(vec![false; negatives]);
        labels
    }

    #[test]
    fn split_preserves_prevalence() {
        let labels = labels(20, 80);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = stratified_split(&labels, 0.2, &mut rng).expect("split");

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.iter().filter(|i| labels[**i]).count(), 4);
        assert_eq!(split.train.iter().filter(|i| labels[**i]).count(), 16);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let labels = labels(13, 41);
        let first = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(7))
            .expect("split");
        let second = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(7))
            .expect("split");
        assert_eq!(first, second);
    }

    #[test]
    fn tiny_classes_keep_a_member_on_each_side() {
        let labels = labels(2, 3);
        let split = stratified_split(&labels, 0.2, &mut ChaCha8Rng::seed_from_u64(1))
            .expect("split");
        assert_eq!(split.test.iter().filter(|i| labels[**i]).count(), 1);
        assert_eq!(split.train.iter().filter(|i| labels[**i]).count(), 1);
    }

    #[test]
    fn single_class_is_degenerate() {
        let error = stratified_split(&labels(0, 10), 0.2, &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("degenerate");
        assert!(matches!(
            error,
            ClassifierError::DegenerateTarget { classes: 1 }
        ));

        let error = stratified_split(&[], 0.2, &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("degenerate");
        assert!(matches!(
            error,
            ClassifierError::DegenerateTarget { classes: 0 }
        ));
    }

    #[test]
    fn lone_minority_member_is_rejected() {
        let error = stratified_split(&labels(1, 10), 0.2, &mut ChaCha8Rng::seed_from_u64(1))
            .expect_err("sparse");
        assert!(matches!(
            error,
            ClassifierError::SparseClass {
                high_risk: true,
                count: 1
            }
        ));
    }
}
