//! CSV reading and writing for record batches.
//!
//! Both the fitting step and every inference entry point read CSV through this
//! module, so header cleanup and cell parsing are identical on both sides.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, warn};

use flowml_model::{CellValue, RecordBatch};

use crate::error::{IngestError, Result};

/// Strips surrounding whitespace and a leading byte-order mark from a header.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

pub fn read_csv_batch(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).map_err(|source| IngestError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_batch_from_reader(file, path)
}

/// Reads CSV text with a header row. `origin` only labels errors.
///
/// Blank lines are skipped, short rows are padded with `Missing`, and extra
/// trailing cells beyond the header are dropped with a warning when any of
/// them holds a value.
pub fn read_csv_batch_from_reader<R: Read>(reader: R, origin: &Path) -> Result<RecordBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::CsvParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader {
            path: origin.to_path_buf(),
        });
    }
    let mut batch = RecordBatch::new(headers);
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let width = batch.num_columns();
        if record.iter().skip(width).any(|value| !value.trim().is_empty()) {
            warn!(
                path = %origin.display(),
                line = record.position().map_or(0, csv::Position::line),
                extra = record.len() - width,
                "dropping cells beyond the header width"
            );
        }
        let row: Vec<CellValue> = (0..width)
            .map(|idx| CellValue::from_raw(record.get(idx).unwrap_or("")))
            .collect();
        batch.push_row(row).map_err(|source| IngestError::Row {
            path: origin.to_path_buf(),
            source,
        })?;
    }
    debug!(
        path = %origin.display(),
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "read csv batch"
    );
    Ok(batch)
}

pub fn write_csv_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::FileAccess {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| IngestError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv_batch_to_writer(file, batch, path)
}

/// Writes the header and every row; `Missing` cells become empty fields.
pub fn write_csv_batch_to_writer<W: Write>(
    writer: W,
    batch: &RecordBatch,
    origin: &Path,
) -> Result<()> {
    let to_error = |e: csv::Error| IngestError::CsvWrite {
        path: origin.to_path_buf(),
        message: e.to_string(),
    };
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(batch.columns()).map_err(to_error)?;
    for row in batch.rows() {
        writer
            .write_record(row.iter().map(CellValue::render))
            .map_err(to_error)?;
    }
    writer.flush().map_err(|source| IngestError::FileAccess {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(())
}
