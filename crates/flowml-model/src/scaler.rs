//! Per-feature standardisation fitted once and replayed everywhere.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::matrix::FeatureMatrix;

/// Scales below this are treated as zero variance and recorded as 1.0.
const ZERO_SCALE_THRESHOLD: f64 = 10.0 * f64::EPSILON;

/// Position-aligned `(x - mean) / scale` transform.
///
/// `mean.len() == scale.len()` always holds and every scale is finite and
/// strictly positive, so replay never divides by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerParams", into = "ScalerParams")]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Serialized form of [`StandardScaler`]; validated on the way in.
#[derive(Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits mean and population standard deviation per column.
    ///
    /// Constant columns get scale 1.0.
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        let n = matrix.num_rows();
        if n == 0 {
            return Err(FlowError::empty_dataset("scaler input"));
        }
        let width = matrix.n_features();
        let mut mean = vec![0.0; width];
        for row in matrix.rows() {
            for (acc, value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        for acc in &mut mean {
            *acc /= n as f64;
        }
        let mut variance = vec![0.0; width];
        for row in matrix.rows() {
            for ((acc, value), m) in variance.iter_mut().zip(row).zip(&mean) {
                let delta = value - m;
                *acc += delta * delta;
            }
        }
        let scale = variance
            .into_iter()
            .map(|acc| {
                let std = (acc / n as f64).sqrt();
                if std < ZERO_SCALE_THRESHOLD { 1.0 } else { std }
            })
            .collect();
        Self::from_parts(mean, scale)
    }

    /// Rebuilds a scaler from stored parameters, checking their shape.
    pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(FlowError::schema(format!(
                "scaler has {} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(idx) = mean.iter().position(|m| !m.is_finite()) {
            return Err(FlowError::schema(format!("scaler mean {idx} is not finite")));
        }
        if let Some(idx) = scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(FlowError::schema(format!(
                "scaler scale {idx} must be finite and positive"
            )));
        }
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Transforms one row already ordered by the feature schema.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(FlowError::schema(format!(
                "row has {} values, scaler expects {}",
                row.len(),
                self.n_features()
            )));
        }
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((x, m), s)| (x - m) / s)
            .collect())
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        let mut out = FeatureMatrix::with_capacity(self.n_features(), matrix.num_rows());
        if matrix.n_features() != self.n_features() {
            return Err(FlowError::schema(format!(
                "matrix has {} columns, scaler expects {}",
                matrix.n_features(),
                self.n_features()
            )));
        }
        for row in matrix.rows() {
            out.push_row(&self.transform_row(row)?)?;
        }
        Ok(out)
    }
}

impl TryFrom<ScalerParams> for StandardScaler {
    type Error = FlowError;

    fn try_from(params: ScalerParams) -> Result<Self> {
        Self::from_parts(params.mean, params.scale)
    }
}

impl From<StandardScaler> for ScalerParams {
    fn from(scaler: StandardScaler) -> Self {
        Self {
            mean: scaler.mean,
            scale: scaler.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn matrix(rows: &[Vec<f64>]) -> FeatureMatrix {
        FeatureMatrix::from_rows(rows[0].len(), rows).unwrap()
    }

    #[test]
    fn fits_population_statistics() {
        let scaler = StandardScaler::fit(&matrix(&[vec![1.0, 10.0], vec![3.0, 30.0]])).unwrap();
        assert_eq!(scaler.mean(), &[2.0, 20.0]);
        assert_eq!(scaler.scale(), &[1.0, 10.0]);
        assert_eq!(scaler.transform_row(&[3.0, 10.0]).unwrap(), vec![1.0, -1.0]);
    }

    #[test]
    fn constant_column_gets_unit_scale() {
        let scaler = StandardScaler::fit(&matrix(&[vec![5.0, 1.0], vec![5.0, 2.0]])).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        let out = scaler.transform_row(&[7.0, 1.5]).unwrap();
        assert_eq!(out[0], 2.0);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_misaligned_rows_and_bad_params() {
        let scaler = StandardScaler::from_parts(vec![0.0], vec![1.0]).unwrap();
        assert!(scaler.transform_row(&[1.0, 2.0]).is_err());
        assert!(StandardScaler::from_parts(vec![0.0], vec![0.0]).is_err());
        assert!(StandardScaler::from_parts(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(StandardScaler::from_parts(vec![f64::NAN], vec![1.0]).is_err());
    }

    #[test]
    fn empty_input_cannot_be_fitted() {
        let err = StandardScaler::fit(&FeatureMatrix::new(2)).unwrap_err();
        assert!(matches!(err, FlowError::EmptyDataset { .. }));
    }

    proptest! {
        #[test]
        fn transform_is_bit_identical_on_replay(
            rows in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 3), 1..30),
            probe in prop::collection::vec(-1e6f64..1e6, 3),
        ) {
            let scaler = StandardScaler::fit(&matrix(&rows)).unwrap();
            let first = scaler.transform_row(&probe).unwrap();
            let second = scaler.transform_row(&probe).unwrap();
            let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
            let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
            prop_assert_eq!(first_bits, second_bits);
            prop_assert!(first.iter().all(|v| v.is_finite()));
        }
    }
}
