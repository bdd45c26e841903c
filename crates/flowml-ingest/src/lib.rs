//! Tabular ingest for the flow classification pipeline.
//!
//! - **csv_table**: CSV text <-> [`RecordBatch`](flowml_model::RecordBatch)
//! - **discovery**: finding dataset files under a directory
//! - **dataset**: loading a labeled dataset (CSV or Parquet) for fitting
//! - **polars_utils**: Polars value conversions

pub mod csv_table;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod polars_utils;

pub use csv_table::{
    normalize_header, read_csv_batch, read_csv_batch_from_reader, write_csv_batch,
    write_csv_batch_to_writer,
};
pub use dataset::{dataframe_to_batch, load_dataset, read_dataset_file, read_parquet_batch};
pub use discovery::{DatasetFileKind, list_dataset_files};
pub use error::{IngestError, Result};
pub use polars_utils::{any_to_cell, any_to_f64};
