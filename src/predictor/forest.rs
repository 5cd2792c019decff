// Habitat - Regression forest
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Bagged regression trees.
//!
//! Trees split on the feature/threshold pair with the largest reduction in
//! squared error, considering every feature at every node. Each tree is
//! trained on a bootstrap resample of the training rows and the forest
//! predicts the mean of its trees.

use super::regressor::{check_training_shape, FeatureRow, Regressor, FEATURE_COUNT};
use crate::config::ForestConfig;
use crate::error::{HabitatError, Result};
use rand::{Rng, RngCore};

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &FeatureRow) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Number of sorted samples going left.
    left_count: usize,
    cost: f64,
}

/// A single CART regression tree.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    root: Option<Node>,
}

impl RegressionTree {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            root: None,
        }
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(Node::depth)
    }

    /// Fit on the rows selected by `indices` (duplicates allowed).
    pub fn fit_indices(&mut self, features: &[FeatureRow], targets: &[f64], indices: &[usize]) {
        let mut indices = indices.to_vec();
        self.root = Some(self.build(features, targets, &mut indices, 0));
    }

    pub fn fit(&mut self, features: &[FeatureRow], targets: &[f64]) -> Result<()> {
        check_training_shape(features, targets)?;
        let indices: Vec<usize> = (0..features.len()).collect();
        self.fit_indices(features, targets, &indices);
        Ok(())
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64> {
        self.root
            .as_ref()
            .map(|root| root.predict(row))
            .ok_or_else(|| HabitatError::Model("regression tree is not fitted".to_string()))
    }

    fn build(
        &self,
        features: &[FeatureRow],
        targets: &[f64],
        indices: &mut [usize],
        depth: usize,
    ) -> Node {
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let mean = sum / n;

        let depth_reached = self.max_depth.map_or(false, |max| depth >= max);
        if depth_reached || indices.len() < self.min_samples_split {
            return Node::Leaf(mean);
        }

        let sum_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
        let node_cost = sum_sq - sum * sum / n;
        if node_cost <= f64::EPSILON * sum_sq.max(1.0) {
            return Node::Leaf(mean);
        }

        let best = match find_best_split(features, targets, indices) {
            Some(best) if best.cost < node_cost => best,
            _ => return Node::Leaf(mean),
        };

        indices.sort_by(|&a, &b| features[a][best.feature].total_cmp(&features[b][best.feature]));
        let (left, right) = indices.split_at_mut(best.left_count);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(features, targets, left, depth + 1)),
            right: Box::new(self.build(features, targets, right, depth + 1)),
        }
    }
}

/// Scan every feature for the split minimising left + right squared error.
fn find_best_split(
    features: &[FeatureRow],
    targets: &[f64],
    indices: &mut [usize],
) -> Option<BestSplit> {
    let n = indices.len();
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let mut best: Option<BestSplit> = None;

    for feature in 0..FEATURE_COUNT {
        indices.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let prev = indices[k - 1];
            left_sum += targets[prev];
            left_sq += targets[prev] * targets[prev];

            let lo = features[prev][feature];
            let hi = features[indices[k]][feature];
            if hi <= lo {
                continue;
            }

            let left_n = k as f64;
            let right_n = (n - k) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let cost = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |b| cost < b.cost) {
                // Adjacent floats can round the midpoint up to `hi`
                let mid = lo + (hi - lo) / 2.0;
                best = Some(BestSplit {
                    feature,
                    threshold: if mid < hi { mid } else { lo },
                    left_count: k,
                    cost,
                });
            }
        }
    }

    best
}

/// Random-forest style ensemble of bootstrap-trained regression trees.
#[derive(Debug, Clone, Default)]
pub struct ForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Fitted trees (empty before `fit`).
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl Regressor for ForestRegressor {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(
        &mut self,
        features: &[FeatureRow],
        targets: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        check_training_shape(features, targets)?;
        self.config.validate()?;

        let n = features.len();
        self.trees = (0..self.config.n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree =
                    RegressionTree::new(self.config.max_depth, self.config.min_samples_split);
                tree.fit_indices(features, targets, &sample);
                tree
            })
            .collect();

        Ok(())
    }

    fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(HabitatError::Model("forest is not fitted".to_string()));
        }

        features
            .iter()
            .map(|row| -> Result<f64> {
                let mut sum = 0.0;
                for tree in &self.trees {
                    sum += tree.predict_row(row)?;
                }
                Ok(sum / self.trees.len() as f64)
            })
            .collect()
    }
}
