//! Deriving the preprocessing artifact from a labeled dataset.

use std::collections::HashSet;

use tracing::{debug, info, info_span, warn};

use flowml_model::{
    CellValue, FeatureMatrix, FeatureSchema, FlowError, LabelCodec, PreprocessingArtifact,
    RecordBatch, Result, StandardScaler,
};

use crate::options::FitOptions;

/// A fitted artifact plus what was discarded to get it.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub artifact: PreprocessingArtifact,
    pub rows_used: usize,
    /// Rows with a missing label or a missing/non-finite feature value.
    pub rows_dropped: usize,
    /// Non-label columns left out of the schema: non-numeric columns and
    /// repeated headers after their first occurrence.
    pub excluded_columns: Vec<String>,
}

/// True when the column has at least one value and every value is numeric.
fn is_numeric_column(batch: &RecordBatch, idx: usize) -> bool {
    let mut seen = false;
    for row in batch.rows() {
        match &row[idx] {
            CellValue::Missing => {}
            cell if cell.as_f64().is_some() => seen = true,
            _ => return false,
        }
    }
    seen
}

/// Fits the feature schema, scaler, and label codec over `batch`.
///
/// Features are the numeric non-label columns in batch order. A header that
/// repeats an earlier one (some CIC exports carry `Fwd Header Length` twice)
/// is excluded; lookups by name resolve to its first occurrence. Rows with any
/// missing feature value or a missing label are dropped first, so the scaler
/// and codec see the same rows.
pub fn fit_artifact(batch: &RecordBatch, options: &FitOptions) -> Result<FitOutcome> {
    let span = info_span!(
        "fit_artifact",
        rows = batch.num_rows(),
        columns = batch.num_columns()
    );
    let _guard = span.enter();

    let label_idx = batch.column_index(&options.label_column).ok_or_else(|| {
        FlowError::schema(format!(
            "label column '{}' not found in dataset",
            options.label_column
        ))
    })?;

    let mut feature_idx = Vec::new();
    let mut excluded_columns = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([options.label_column.trim()]);
    for (idx, column) in batch.columns().iter().enumerate() {
        if idx == label_idx {
            continue;
        }
        if !seen.insert(column.trim()) {
            warn!(column = %column, position = idx, "excluding duplicate column header");
            excluded_columns.push(column.clone());
            continue;
        }
        if is_numeric_column(batch, idx) {
            feature_idx.push(idx);
        } else {
            debug!(column = %column, "excluding non-numeric column");
            excluded_columns.push(column.clone());
        }
    }
    if feature_idx.is_empty() {
        return Err(FlowError::schema("dataset has no numeric feature columns"));
    }
    let schema = FeatureSchema::new(feature_idx.iter().map(|&idx| &batch.columns()[idx]))?;

    let mut matrix = FeatureMatrix::with_capacity(schema.len(), batch.num_rows());
    let mut labels: Vec<String> = Vec::with_capacity(batch.num_rows());
    let mut values = Vec::with_capacity(schema.len());
    let mut rows_dropped = 0usize;
    'rows: for row in batch.rows() {
        let label = match &row[label_idx] {
            CellValue::Missing => {
                rows_dropped += 1;
                continue;
            }
            cell => cell.render(),
        };
        values.clear();
        for &idx in &feature_idx {
            match row[idx].as_f64().filter(|value| value.is_finite()) {
                Some(value) => values.push(value),
                None => {
                    rows_dropped += 1;
                    continue 'rows;
                }
            }
        }
        matrix.push_row(&values)?;
        labels.push(label);
    }
    if rows_dropped > 0 {
        warn!(
            dropped = rows_dropped,
            kept = matrix.num_rows(),
            "dropped rows with missing values before fitting"
        );
    }
    if matrix.is_empty() {
        return Err(FlowError::empty_dataset(
            "fitting dataset after dropping incomplete rows",
        ));
    }

    let scaler = StandardScaler::fit(&matrix)?;
    let codec = LabelCodec::fit(&labels)?;
    let artifact = PreprocessingArtifact::new(schema, scaler, codec)?;
    info!(
        features = artifact.features().len(),
        classes = artifact.codec().len(),
        rows = matrix.num_rows(),
        "preprocessing artifact fitted"
    );
    Ok(FitOutcome {
        artifact,
        rows_used: matrix.num_rows(),
        rows_dropped,
        excluded_columns,
    })
}
