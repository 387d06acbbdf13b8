//! Multinomial Naive Bayes over TF-IDF rows, with additive smoothing.

use crate::HamspamError;
use crate::dataset::Label;
use crate::vectorizer::SparseVector;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALPHA: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    n_features: usize,
    /// Training documents per class, indexed by `Label::index()`.
    class_count: [usize; 2],
    class_log_prior: [f64; 2],
    feature_log_prob: [Vec<f64>; 2],
}

fn validate_alpha(alpha: f64) -> Result<(), HamspamError> {
    if !alpha.is_finite() || alpha <= 0.0 {
        return Err(HamspamError::Config(format!(
            "alpha must be a positive finite number, got {alpha}"
        )));
    }
    Ok(())
}

/// Softmax over log probabilities, shifted by the max for stability.
fn softmax(log_probs: [f64; 2]) -> [f64; 2] {
    let max = log_probs[0].max(log_probs[1]);
    let e0 = (log_probs[0] - max).exp();
    let e1 = (log_probs[1] - max).exp();
    let sum = e0 + e1;
    [e0 / sum, e1 / sum]
}

impl MultinomialNb {
    pub fn fit(rows: &[SparseVector], labels: &[Label], alpha: f64) -> Result<Self, HamspamError> {
        validate_alpha(alpha)?;
        if rows.len() != labels.len() {
            return Err(HamspamError::Data(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let Some(first) = rows.first() else {
            return Err(HamspamError::Data("cannot fit classifier on zero rows".into()));
        };
        let n_features = first.dim();

        let mut class_count = [0usize; 2];
        let mut feature_count = [vec![0.0f64; n_features], vec![0.0f64; n_features]];
        for (row, label) in rows.iter().zip(labels) {
            if row.dim() != n_features {
                return Err(HamspamError::Data(format!(
                    "row dimension {} differs from {n_features}",
                    row.dim()
                )));
            }
            let c = label.index();
            class_count[c] += 1;
            for (j, w) in row.iter() {
                feature_count[c][j] += w;
            }
        }

        for label in Label::ALL {
            if class_count[label.index()] == 0 {
                return Err(HamspamError::Data(format!(
                    "training data contains no {} examples",
                    label.name()
                )));
            }
        }

        let total = rows.len() as f64;
        let class_log_prior = class_count.map(|n| (n as f64 / total).ln());
        let feature_log_prob = feature_count.map(|counts| {
            let denom = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
            counts.iter().map(|c| (c + alpha).ln() - denom).collect::<Vec<f64>>()
        });

        Ok(Self {
            alpha,
            n_features,
            class_count,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Per-class log prior plus the feature log-likelihoods of `x`.
    pub fn joint_log_likelihood(&self, x: &SparseVector) -> [f64; 2] {
        debug_assert_eq!(x.dim(), self.n_features);
        let mut jll = self.class_log_prior;
        for (c, score) in jll.iter_mut().enumerate() {
            let flp = &self.feature_log_prob[c];
            for (j, w) in x.iter() {
                *score += w * flp[j];
            }
        }
        jll
    }

    /// Most likely class. Ties go to the lower class index.
    pub fn predict(&self, x: &SparseVector) -> Label {
        let jll = self.joint_log_likelihood(x);
        if jll[Label::Spam.index()] > jll[Label::Ham.index()] {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    /// Posterior probabilities `[P(ham), P(spam)]`.
    pub fn predict_proba(&self, x: &SparseVector) -> [f64; 2] {
        softmax(self.joint_log_likelihood(x))
    }

    /// Mean accuracy over `rows`.
    pub fn score(&self, rows: &[SparseVector], labels: &[Label]) -> f64 {
        let predicted: Vec<Label> = rows.iter().map(|x| self.predict(x)).collect();
        crate::report::accuracy(labels, &predicted)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn class_count(&self, label: Label) -> usize {
        self.class_count[label.index()]
    }

    /// Check a deserialized classifier for internal consistency.
    pub(crate) fn validate(&self) -> Result<(), HamspamError> {
        validate_alpha(self.alpha).map_err(|e| HamspamError::Model(format!("classifier: {e}")))?;
        for label in Label::ALL {
            let row = &self.feature_log_prob[label.index()];
            if row.len() != self.n_features {
                return Err(HamspamError::Model(format!(
                    "classifier: {} row has {} features, expected {}",
                    label.name(),
                    row.len(),
                    self.n_features
                )));
            }
            if !self.class_log_prior[label.index()].is_finite()
                || row.iter().any(|v| !v.is_finite())
            {
                return Err(HamspamError::Model(format!(
                    "classifier: non-finite {} parameters",
                    label.name()
                )));
            }
        }
        Ok(())
    }
}
