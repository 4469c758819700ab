use rand::seq::SliceRandom;
use rand::Rng;

/// Node of a binary classification tree stored in a flat arena.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Weighted share of the positive class among the training rows that reached the leaf.
    Leaf { positive: f64 },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub(crate) max_features: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
}

/// Gini-impurity classification tree over dense feature rows.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecisionTree {
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grows a tree on the rows listed in `samples`; `weights[i]` scales row `i`.
    pub(crate) fn grow<R: Rng + ?Sized>(
        rows: &[Vec<f64>],
        labels: &[bool],
        weights: &[f64],
        samples: Vec<usize>,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut features: Vec<usize> = (0..width).collect();
        let mut nodes = vec![Node::Leaf { positive: 0.0 }];
        let mut pending = vec![(0usize, samples, 0usize)];

        while let Some((slot, samples, depth)) = pending.pop() {
            let (negative, positive) = class_weights(&samples, labels, weights);
            let total = negative + positive;
            let share = if total > 0.0 { positive / total } else { 0.0 };

            let depth_exhausted = params.max_depth.map(|max| depth >= max).unwrap_or(false);
            if negative == 0.0
                || positive == 0.0
                || samples.len() < params.min_samples_split
                || depth_exhausted
            {
                nodes[slot] = Node::Leaf { positive: share };
                continue;
            }

            features.shuffle(rng);
            let best = best_split(rows, labels, weights, &samples, &features, params.max_features);

            let Some(best) = best else {
                nodes[slot] = Node::Leaf { positive: share };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .copied()
                .partition(|index| rows[*index][best.feature] <= best.threshold);
            if left_samples.is_empty() || right_samples.is_empty() {
                nodes[slot] = Node::Leaf { positive: share };
                continue;
            }

            let left = nodes.len();
            nodes.push(Node::Leaf { positive: 0.0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { positive: 0.0 });
            nodes[slot] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            pending.push((right, right_samples, depth + 1));
            pending.push((left, left_samples, depth + 1));
        }

        Self { nodes }
    }

    /// Probability of the positive class for one encoded row.
    pub(crate) fn predict_positive(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { positive } => return *positive,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(0usize, 0usize)];
        while let Some((index, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[index] {
                pending.push((*left, depth + 1));
                pending.push((*right, depth + 1));
            }
        }
        deepest
    }
}

fn class_weights(samples: &[usize], labels: &[bool], weights: &[f64]) -> (f64, f64) {
    samples
        .iter()
        .fold((0.0, 0.0), |(negative, positive), index| {
            if labels[*index] {
                (negative, positive + weights[*index])
            } else {
                (negative + weights[*index], positive)
            }
        })
}

/// Weighted Gini impurity scaled by the node weight.
fn weighted_gini(negative: f64, positive: f64) -> f64 {
    let total = negative + positive;
    if total <= 0.0 {
        return 0.0;
    }
    let p_neg = negative / total;
    let p_pos = positive / total;
    total * (1.0 - p_neg * p_neg - p_pos * p_pos)
}

/// Threshold between two distinct sorted values. Halving each side first keeps
/// the sum finite for large magnitudes; infinities fall back to the lower value
/// so `value <= threshold < next` always holds.
fn midpoint(value: f64, next: f64) -> f64 {
    let threshold = value / 2.0 + next / 2.0;
    if threshold.is_finite() && threshold >= value && threshold < next {
        threshold
    } else {
        value
    }
}

/// Scans features in the given order until `max_features` non-constant ones
/// have been evaluated, or all features are exhausted.
fn best_split(
    rows: &[Vec<f64>],
    labels: &[bool],
    weights: &[f64],
    samples: &[usize],
    features: &[usize],
    max_features: usize,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut evaluated = 0;
    let (total_negative, total_positive) = class_weights(samples, labels, weights);
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(samples.len());

    for &feature in features {
        if evaluated >= max_features {
            break;
        }

        column.clear();
        column.extend(samples.iter().map(|index| (rows[*index][feature], *index)));
        let Some(&(first, _)) = column.first() else {
            continue;
        };
        if column.iter().all(|(value, _)| *value == first) {
            continue;
        }
        evaluated += 1;
        column.sort_by(|left, right| left.0.total_cmp(&right.0));

        let mut left_negative = 0.0;
        let mut left_positive = 0.0;
        for position in 0..column.len() - 1 {
            let (value, index) = column[position];
            if labels[index] {
                left_positive += weights[index];
            } else {
                left_negative += weights[index];
            }

            let next = column[position + 1].0;
            if value == next {
                continue;
            }

            let impurity = weighted_gini(left_negative, left_positive)
                + weighted_gini(total_negative - left_negative, total_positive - left_positive);

            if best
                .as_ref()
                .map(|candidate| impurity < candidate.impurity)
                .unwrap_or(true)
            {
                best = Some(Candidate {
                    feature,
                    threshold: midpoint(value, next),
                    impurity,
                });
            }
        }
    }

    best
}
