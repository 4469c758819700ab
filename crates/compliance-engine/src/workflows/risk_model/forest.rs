use super::tree::{DecisionTree, TreeParams};
use crate::config::{ClassWeighting, ForestConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Bagged ensemble of Gini trees predicting the positive (HIGH risk) class.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits `config.n_trees` trees, each on a bootstrap sample of `rows`.
    ///
    /// Every tree draws from its own generator seeded from `rng`, so the
    /// result depends only on the generator state on entry.
    pub fn fit<R: Rng + ?Sized>(
        rows: &[Vec<f64>],
        labels: &[bool],
        config: &ForestConfig,
        rng: &mut R,
    ) -> Self {
        let n = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let class_weight = class_weights(labels, config.class_weighting);
        let params = TreeParams {
            max_features: ((width as f64).sqrt() as usize).max(1),
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
        };

        let mut trees = Vec::with_capacity(config.n_trees);
        for _ in 0..config.n_trees {
            let mut tree_rng = ChaCha8Rng::seed_from_u64(rng.next_u64());

            let mut draws = vec![0u32; n];
            for _ in 0..n {
                draws[tree_rng.gen_range(0..n)] += 1;
            }

            let weights: Vec<f64> = draws
                .iter()
                .zip(labels)
                .map(|(count, label)| f64::from(*count) * class_weight[usize::from(*label)])
                .collect();
            let samples: Vec<usize> = (0..n).filter(|index| draws[*index] > 0).collect();

            trees.push(DecisionTree::grow(
                rows,
                labels,
                &weights,
                samples,
                params,
                &mut tree_rng,
            ));
        }

        debug!(
            trees = trees.len(),
            rows = n,
            features = width,
            max_features = params.max_features,
            "random forest fitted"
        );

        Self { trees }
    }

    /// Mean of the per-tree positive-class probabilities.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_positive(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Positive iff the mean probability exceeds one half.
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) > 0.5
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::node_count).sum()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }
}

/// Per-class weight indexed by `usize::from(label)`.
pub(crate) fn class_weights(labels: &[bool], weighting: ClassWeighting) -> [f64; 2] {
    match weighting {
        ClassWeighting::Uniform => [1.0, 1.0],
        ClassWeighting::Balanced => {
            let n = labels.len() as f64;
            let positives = labels.iter().filter(|label| **label).count() as f64;
            let negatives = n - positives;
            let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 0.0 };
            [weight(negatives), weight(positives)]
        }
    }
}
