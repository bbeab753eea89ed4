//! Binary logistic regression trained by full-batch gradient descent.

use serde::{Deserialize, Serialize};

/// Hyper-parameters for one logistic unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty applied to the weights, not the bias.
    pub l2_penalty: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 1.0,
            l2_penalty: 1e-3,
        }
    }
}

/// One category's decision function: `sigmoid(w . x + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticUnit {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticUnit {
    /// Fit on dense feature rows against 0/1 targets.
    ///
    /// Starts from zero weights and visits rows in order, so the result is a
    /// pure function of its inputs.
    pub fn fit(features: &[Vec<f64>], targets: &[bool], params: &TrainingParams) -> Self {
        let dims = features.first().map_or(0, Vec::len);
        let mut unit = Self {
            weights: vec![0.0; dims],
            bias: 0.0,
        };
        if features.is_empty() {
            return unit;
        }

        let n = features.len() as f64;
        let mut grad_w = vec![0.0f64; dims];
        for _ in 0..params.epochs {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for (row, &target) in features.iter().zip(targets) {
                let error = unit.probability(row) - if target { 1.0 } else { 0.0 };
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
                grad_b += error;
            }

            for (w, g) in unit.weights.iter_mut().zip(&grad_w) {
                *w -= params.learning_rate * (g / n + params.l2_penalty * *w);
            }
            unit.bias -= params.learning_rate * grad_b / n;
        }
        unit
    }

    /// Positive-class probability for one feature row.
    pub fn probability(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
