//! Loading labeled flow datasets for fitting and sampling.
//!
//! A dataset is a single `.csv`/`.parquet` file or a directory tree of them.
//! Parquet goes through Polars; CSV goes through [`crate::csv_table`], the
//! same reader inference uses.

use std::fs::File;
use std::path::Path;

use polars::prelude::{AnyValue, DataFrame, ParquetReader, SerReader};
use tracing::{debug, info, info_span};

use flowml_model::{CellValue, RecordBatch};

use crate::csv_table::{normalize_header, read_csv_batch};
use crate::discovery::{DatasetFileKind, list_dataset_files};
use crate::error::{IngestError, Result};
use crate::polars_utils::any_to_cell;

/// Converts a Polars frame into a record batch, trimming column names.
pub fn dataframe_to_batch(df: &DataFrame, origin: &Path) -> Result<RecordBatch> {
    let columns: Vec<String> = df
        .get_columns()
        .iter()
        .map(|column| normalize_header(column.name().as_str()))
        .collect();
    let mut batch = RecordBatch::new(columns);
    for idx in 0..df.height() {
        let row: Vec<CellValue> = df
            .get_columns()
            .iter()
            .map(|column| any_to_cell(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        batch.push_row(row).map_err(|source| IngestError::Row {
            path: origin.to_path_buf(),
            source,
        })?;
    }
    Ok(batch)
}

pub fn read_parquet_batch(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).map_err(|source| IngestError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| IngestError::ParquetRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    dataframe_to_batch(&df, path)
}

/// Reads one dataset file, dispatching on its extension.
pub fn read_dataset_file(path: &Path) -> Result<RecordBatch> {
    match DatasetFileKind::from_path(path) {
        Some(DatasetFileKind::Csv) => read_csv_batch(path),
        Some(DatasetFileKind::Parquet) => read_parquet_batch(path),
        None => Err(IngestError::UnsupportedFile {
            path: path.to_path_buf(),
        }),
    }
}

/// Loads a dataset file or every dataset file under a directory.
///
/// Files are concatenated in path order over the union of their columns.
pub fn load_dataset(path: &Path) -> Result<RecordBatch> {
    let span = info_span!("load_dataset", path = %path.display());
    let _guard = span.enter();
    if path.is_file() {
        return read_dataset_file(path);
    }
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let files = list_dataset_files(path)?;
    let mut batches = Vec::with_capacity(files.len());
    for file in &files {
        let batch = read_dataset_file(file)?;
        debug!(file = %file.display(), rows = batch.num_rows(), "loaded dataset file");
        batches.push(batch);
    }
    let merged = RecordBatch::concat(batches);
    info!(
        files = files.len(),
        rows = merged.num_rows(),
        columns = merged.num_columns(),
        "dataset loaded"
    );
    Ok(merged)
}
