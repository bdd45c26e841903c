//! Required-column checks and schema-ordered feature extraction.

use std::collections::HashSet;

use tracing::{debug, warn};

use flowml_model::{CellValue, FeatureMatrix, FeatureSchema, FlowError, RecordBatch, Result};

/// A batch holding exactly the schema columns, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    batch: RecordBatch,
}

impl ValidatedBatch {
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn into_inner(self) -> RecordBatch {
        self.batch
    }
}

/// Schema columns absent from `batch`, in schema order.
pub fn missing_columns(batch: &RecordBatch, schema: &FeatureSchema) -> Vec<String> {
    let present: HashSet<&str> = batch.columns().iter().map(String::as_str).collect();
    schema
        .iter()
        .filter(|name| !present.contains(name))
        .map(str::to_string)
        .collect()
}

/// Checks that every schema column is present and reorders to schema order.
///
/// Extra columns (a label column, identifiers) are dropped; column order in
/// the input is irrelevant.
pub fn validate(batch: &RecordBatch, schema: &FeatureSchema) -> Result<ValidatedBatch> {
    let missing = missing_columns(batch, schema);
    if !missing.is_empty() {
        warn!(missing = missing.len(), "batch is missing required feature columns");
        return Err(FlowError::MissingColumns { missing });
    }
    let ignored = batch.num_columns().saturating_sub(schema.len());
    debug!(
        rows = batch.num_rows(),
        features = schema.len(),
        ignored_columns = ignored,
        "batch validated against feature schema"
    );
    let batch = batch.select_columns(schema.names())?;
    Ok(ValidatedBatch { batch })
}

/// Extracts the dense numeric matrix from a validated batch.
///
/// A missing, non-numeric, or non-finite cell aborts the whole batch.
pub fn feature_matrix(validated: &ValidatedBatch) -> Result<FeatureMatrix> {
    let batch = validated.batch();
    let mut matrix = FeatureMatrix::with_capacity(batch.num_columns(), batch.num_rows());
    let mut values = Vec::with_capacity(batch.num_columns());
    for (row_idx, row) in batch.rows().iter().enumerate() {
        values.clear();
        for (cell, column) in row.iter().zip(batch.columns()) {
            match cell.as_f64().filter(|value| value.is_finite()) {
                Some(value) => values.push(value),
                None => {
                    return Err(FlowError::InvalidFeatureValue {
                        row: row_idx,
                        column: column.clone(),
                        value: describe(cell),
                    });
                }
            }
        }
        matrix.push_row(&values)?;
    }
    Ok(matrix)
}

fn describe(cell: &CellValue) -> String {
    match cell {
        CellValue::Missing => "<missing>".to_string(),
        other => other.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(columns: &[&str], rows: &[&[&str]]) -> RecordBatch {
        RecordBatch::with_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::from_raw(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn reorders_to_schema_and_drops_extras() {
        let schema = FeatureSchema::new(["b", "a"]).unwrap();
        let input = batch(&["Label", "a", "b"], &[&["SYN", "1", "2"]]);
        let validated = validate(&input, &schema).unwrap();
        assert_eq!(validated.batch().columns(), &["b", "a"]);
        let matrix = feature_matrix(&validated).unwrap();
        assert_eq!(matrix.row(0), &[2.0, 1.0]);
    }

    #[test]
    fn reports_every_missing_column() {
        let schema = FeatureSchema::new(["a", "b", "c"]).unwrap();
        let err = validate(&batch(&["b"], &[&["1"]]), &schema).unwrap_err();
        match err {
            FlowError::MissingColumns { missing } => assert_eq!(missing, vec!["a", "c"]),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn each_single_missing_column_is_rejected() {
        let schema = FeatureSchema::new(["a", "b", "c"]).unwrap();
        for dropped in ["a", "b", "c"] {
            let columns: Vec<&str> = ["c", "a", "b", "extra"]
                .into_iter()
                .filter(|c| *c != dropped)
                .collect();
            let row: Vec<&str> = columns.iter().map(|_| "1").collect();
            let err = validate(&batch(&columns, &[&row]), &schema).unwrap_err();
            assert!(matches!(err, FlowError::MissingColumns { ref missing } if missing == &[dropped]));
        }
    }

    #[test]
    fn bad_cells_abort_with_location() {
        let schema = FeatureSchema::new(["a", "b"]).unwrap();
        for (value, expected) in [("x", "x"), ("", "<missing>"), ("inf", "inf")] {
            let validated = validate(&batch(&["a", "b"], &[&["1", "2"], &["3", value]]), &schema)
                .unwrap();
            match feature_matrix(&validated).unwrap_err() {
                FlowError::InvalidFeatureValue { row, column, value } => {
                    assert_eq!((row, column.as_str(), value.as_str()), (1, "b", expected));
                }
                other => panic!("unexpected: {other}"),
            }
        }
    }

    #[test]
    fn empty_batch_yields_empty_matrix() {
        let schema = FeatureSchema::new(["a"]).unwrap();
        let validated = validate(&batch(&["a"], &[]), &schema).unwrap();
        assert!(feature_matrix(&validated).unwrap().is_empty());
    }
}
