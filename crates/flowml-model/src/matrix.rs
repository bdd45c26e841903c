//! Dense row-major numeric matrix handed to the scaler and the model.

use crate::error::{FlowError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_features: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            values: Vec::new(),
        }
    }

    pub fn with_capacity(n_features: usize, rows: usize) -> Self {
        Self {
            n_features,
            values: Vec::with_capacity(n_features * rows),
        }
    }

    pub fn from_rows(n_features: usize, rows: &[Vec<f64>]) -> Result<Self> {
        let mut matrix = Self::with_capacity(n_features, rows.len());
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_features {
            return Err(FlowError::schema(format!(
                "row has {} values, expected {}",
                row.len(),
                self.n_features
            )));
        }
        self.values.extend_from_slice(row);
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn num_rows(&self) -> usize {
        if self.n_features == 0 {
            0
        } else {
            self.values.len() / self.n_features
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_features;
        &self.values[start..start + self.n_features]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.num_rows()).map(move |idx| self.row(idx))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_row_major() {
        let m = FeatureMatrix::from_rows(2, &[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let mut m = FeatureMatrix::new(3);
        assert!(m.push_row(&[1.0]).is_err());
        assert!(m.is_empty());
    }
}
