//! The model boundary.
//!
//! The pipeline treats the classifier as an opaque `predict(matrix) -> ids`
//! function over a matrix already in feature-schema order and already scaled.
//! [`LinearModel`] is the file-backed implementation the command line loads.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use flowml_model::{FeatureMatrix, FlowError, Result};

/// An opaque trained model.
pub trait Classifier {
    type Error: std::fmt::Display;

    /// One class id per matrix row, in row order.
    fn predict(&self, features: &FeatureMatrix) -> std::result::Result<Vec<usize>, Self::Error>;

    /// Feature width the model was trained on, when it knows it.
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Number of class ids the model can emit, when it knows it.
    fn n_classes(&self) -> Option<usize> {
        None
    }
}

pub const LINEAR_MODEL_FORMAT: &str = "flowml-linear-model";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinearModelError {
    #[error("matrix has {actual} features but the model expects {expected}")]
    FeatureWidth { expected: usize, actual: usize },
}

#[derive(Serialize, Deserialize)]
struct LinearModelFile {
    format: String,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// A linear classifier: one coefficient row and intercept per class, scored
/// by argmax. Ties go to the lowest class id.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(FlowError::schema("linear model has no classes"));
        }
        if coefficients.len() != intercepts.len() {
            return Err(FlowError::schema(format!(
                "linear model has {} coefficient rows but {} intercepts",
                coefficients.len(),
                intercepts.len()
            )));
        }
        let width = coefficients[0].len();
        if width == 0 {
            return Err(FlowError::schema("linear model has no features"));
        }
        if let Some(class) = coefficients.iter().position(|row| row.len() != width) {
            return Err(FlowError::schema(format!(
                "coefficient row {class} has {} values, expected {width}",
                coefficients[class].len()
            )));
        }
        let all_finite = coefficients
            .iter()
            .flatten()
            .chain(&intercepts)
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(FlowError::schema("linear model has non-finite weights"));
        }
        Ok(Self {
            coefficients,
            intercepts,
        })
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    fn width(&self) -> usize {
        self.coefficients[0].len()
    }

    fn argmax(&self, row: &[f64]) -> usize {
        let mut best = 0usize;
        let mut best_score = f64::NEG_INFINITY;
        for (class, (weights, intercept)) in self.coefficients.iter().zip(&self.intercepts).enumerate() {
            let score = weights
                .iter()
                .zip(row)
                .fold(*intercept, |acc, (w, x)| acc + w * x);
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        best
    }

    /// Loads a model file. Any read, parse, or shape failure is `MissingArtifact`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).map_err(|e| FlowError::missing_artifact(path, e.to_string()))?;
        let file: LinearModelFile = serde_json::from_slice(&bytes)
            .map_err(|e| FlowError::missing_artifact(path, format!("malformed model: {e}")))?;
        if file.format != LINEAR_MODEL_FORMAT {
            return Err(FlowError::missing_artifact(
                path,
                format!("unexpected model format '{}'", file.format),
            ));
        }
        let model = Self::new(file.coefficients, file.intercepts)
            .map_err(|e| FlowError::missing_artifact(path, e.to_string()))?;
        info!(
            path = %path.display(),
            features = model.width(),
            classes = model.intercepts.len(),
            "linear model loaded"
        );
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = LinearModelFile {
            format: LINEAR_MODEL_FORMAT.to_string(),
            coefficients: self.coefficients.clone(),
            intercepts: self.intercepts.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| FlowError::schema(format!("failed to serialize model: {e}")))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
        }
        fs::write(path, bytes).map_err(|e| FlowError::io(path, e))
    }
}

impl Classifier for LinearModel {
    type Error = LinearModelError;

    fn predict(&self, features: &FeatureMatrix) -> std::result::Result<Vec<usize>, Self::Error> {
        if features.n_features() != self.width() {
            return Err(LinearModelError::FeatureWidth {
                expected: self.width(),
                actual: features.n_features(),
            });
        }
        Ok(features.rows().map(|row| self.argmax(row)).collect())
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.width())
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.intercepts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearModel {
        // class 0 prefers negative x0, class 1 prefers positive x0.
        LinearModel::new(vec![vec![-1.0, 0.0], vec![1.0, 0.0]], vec![0.0, 0.0]).unwrap()
    }

    #[test]
    fn predicts_argmax_per_row() {
        let matrix = FeatureMatrix::from_rows(2, &[vec![-2.0, 5.0], vec![3.0, -1.0]]).unwrap();
        assert_eq!(model().predict(&matrix).unwrap(), vec![0, 1]);
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let matrix = FeatureMatrix::from_rows(2, &[vec![0.0, 0.0]]).unwrap();
        assert_eq!(model().predict(&matrix).unwrap(), vec![0]);
    }

    #[test]
    fn width_mismatch_is_reported() {
        let matrix = FeatureMatrix::from_rows(1, &[vec![1.0]]).unwrap();
        assert_eq!(
            model().predict(&matrix).unwrap_err(),
            LinearModelError::FeatureWidth {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_malformed_weights() {
        assert!(LinearModel::new(vec![], vec![]).is_err());
        assert!(LinearModel::new(vec![vec![1.0]], vec![0.0, 1.0]).is_err());
        assert!(LinearModel::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0.0, 1.0]).is_err());
        assert!(LinearModel::new(vec![vec![f64::NAN]], vec![0.0]).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let original = model();
        original.save(&path).unwrap();
        assert_eq!(LinearModel::load(&path).unwrap(), original);
    }

    #[test]
    fn load_failures_are_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            LinearModel::load(&missing),
            Err(FlowError::MissingArtifact { .. })
        ));

        let wrong = dir.path().join("wrong.json");
        fs::write(
            &wrong,
            r#"{"format":"other","coefficients":[[1.0]],"intercepts":[0.0]}"#,
        )
        .unwrap();
        assert!(matches!(
            LinearModel::load(&wrong),
            Err(FlowError::MissingArtifact { .. })
        ));

        let ragged = dir.path().join("ragged.json");
        fs::write(
            &ragged,
            r#"{"format":"flowml-linear-model","coefficients":[[1.0],[1.0,2.0]],"intercepts":[0.0,0.0]}"#,
        )
        .unwrap();
        assert!(matches!(
            LinearModel::load(&ragged),
            Err(FlowError::MissingArtifact { .. })
        ));
    }
}
