use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::features::SparseVector;

use super::metrics::softmax;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iterations: usize,
    pub learning_rate: f64,
    pub tolerance: f64,
}

impl FitParams {
    pub fn from_config(c: f64, config: &TrainingConfig) -> Self {
        Self {
            c,
            max_iterations: config.max_iterations,
            learning_rate: config.learning_rate,
            tolerance: config.tolerance,
        }
    }
}

/// Multinomial logistic regression with an L2 penalty on the weights.
///
/// Minimizes `mean cross-entropy + ||W||² / (2·C·n)` by full-batch gradient
/// descent. The bias is not penalized. Probabilities are
/// `softmax(scores / temperature)`, with the temperature fitted on
/// held-out scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    n_classes: usize,
    n_features: usize,
    /// Row-major `n_classes × n_features`.
    weights: Vec<f64>,
    bias: Vec<f64>,
    temperature: f64,
}

impl LinearClassifier {
    pub fn fit(
        x: &[SparseVector],
        y: &[usize],
        n_classes: usize,
        n_features: usize,
        params: &FitParams,
    ) -> Self {
        debug_assert_eq!(x.len(), y.len());
        let mut model = LinearClassifier {
            n_classes,
            n_features,
            weights: vec![0.0; n_classes * n_features],
            bias: vec![0.0; n_classes],
            temperature: 1.0,
        };
        let n = x.len();
        if n == 0 || n_classes == 0 {
            return model;
        }

        let lambda = 1.0 / (params.c * n as f64);
        let step = params.learning_rate / (1.0 + lambda);
        let inv_n = 1.0 / n as f64;
        let mut grad_w = vec![0.0; model.weights.len()];
        let mut grad_b = vec![0.0; n_classes];

        for _ in 0..params.max_iterations {
            for (g, w) in grad_w.iter_mut().zip(&model.weights) {
                *g = lambda * w;
            }
            grad_b.iter_mut().for_each(|g| *g = 0.0);

            for (xi, &yi) in x.iter().zip(y) {
                let probs = softmax(&model.scores(xi));
                for (k, p) in probs.iter().enumerate() {
                    let target = if k == yi { 1.0 } else { 0.0 };
                    let g = (p - target) * inv_n;
                    grad_b[k] += g;
                    let row = k * n_features;
                    for &(i, v) in &xi.entries {
                        grad_w[row + i] += g * v;
                    }
                }
            }

            let largest = grad_w
                .iter()
                .chain(&grad_b)
                .fold(0.0f64, |acc, g| acc.max(g.abs()));
            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }
            for (b, g) in model.bias.iter_mut().zip(&grad_b) {
                *b -= step * g;
            }
            if largest < params.tolerance {
                break;
            }
        }
        model
    }

    /// Uncalibrated per-class scores.
    pub fn scores(&self, x: &SparseVector) -> Vec<f64> {
        (0..self.n_classes)
            .map(|k| {
                let row = &self.weights[k * self.n_features..(k + 1) * self.n_features];
                x.dot(row) + self.bias[k]
            })
            .collect()
    }

    /// Calibrated class probabilities; they sum to one.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let scaled: Vec<f64> = self
            .scores(x)
            .into_iter()
            .map(|s| s / self.temperature)
            .collect();
        softmax(&scaled)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Feature indices with the largest positive weight for `class`.
    pub fn top_features(&self, class: usize, n: usize) -> Vec<(usize, f64)> {
        if class >= self.n_classes {
            return Vec::new();
        }
        let row = &self.weights[class * self.n_features..(class + 1) * self.n_features];
        let mut ranked: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}
