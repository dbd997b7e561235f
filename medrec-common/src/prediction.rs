//! Insurance premium classifier
//!
//! The model file is plain JSON: one entry per premium category with an
//! intercept and a weight per feature. Numeric features are used as-is,
//! categorical ones are one-hot keys of the form `name=value` (see
//! [`ModelInput::categorical`]). Unknown keys simply carry no weight.
//!
//! ```json
//! {
//!   "model_name": "insurance-premium",
//!   "version": "1.0.0",
//!   "classes": [
//!     {"label": "Low", "intercept": 0.4, "weights": {"income_lpa": 0.02, "lifestyle_risk=low": 0.8}},
//!     {"label": "High", "intercept": -0.6, "weights": {"bmi": 0.05, "lifestyle_risk=high": 1.1}}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::models::ModelInput;
use crate::{Error, Result};

/// Anything that can turn model features into a premium category
pub trait PremiumClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn predict(&self, input: &ModelInput) -> Result<PremiumPrediction>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumPrediction {
    pub predicted_category: String,
    /// Probability of the predicted category
    pub confidence: f64,
    pub class_probabilities: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassWeights {
    pub label: String,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

/// Multinomial linear model with softmax output
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPremiumModel {
    pub model_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub classes: Vec<ClassWeights>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl LinearPremiumModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!(
                    "Insurance premium model file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let model: Self =
            serde_json::from_str(text).map_err(|e| Error::Model(format!("invalid model file: {}", e)))?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::Model("model defines no classes".to_string()));
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.label.as_str()) {
                return Err(Error::Model(format!("duplicate class label '{}'", class.label)));
            }
            let finite = class.intercept.is_finite() && class.weights.values().all(|w| w.is_finite());
            if !finite {
                return Err(Error::Model(format!(
                    "class '{}' has non-finite weights",
                    class.label
                )));
            }
        }
        Ok(())
    }

    fn score(class: &ClassWeights, input: &ModelInput) -> f64 {
        let numeric: f64 = input
            .numeric()
            .iter()
            .map(|(name, x)| class.weights.get(*name).copied().unwrap_or(0.0) * x)
            .sum();
        let categorical: f64 = input
            .categorical()
            .iter()
            .filter_map(|key| class.weights.get(key))
            .sum();
        class.intercept + numeric + categorical
    }
}

impl PremiumClassifier for LinearPremiumModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, input: &ModelInput) -> Result<PremiumPrediction> {
        let scores: Vec<f64> = self.classes.iter().map(|c| Self::score(c, input)).collect();

        // Shift by the max score so exp() cannot overflow
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::Model(format!(
                "degenerate scores for input with bmi {}",
                input.bmi
            )));
        }

        let mut best = 0;
        for (i, e) in exps.iter().enumerate() {
            if *e > exps[best] {
                best = i;
            }
        }

        let class_probabilities = self
            .classes
            .iter()
            .zip(&exps)
            .map(|(c, e)| (c.label.clone(), round4(e / total)))
            .collect();

        Ok(PremiumPrediction {
            predicted_category: self.classes[best].label.clone(),
            confidence: round4(exps[best] / total),
            class_probabilities,
        })
    }
}
