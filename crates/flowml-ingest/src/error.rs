//! Error types for tabular ingestion.

use std::path::PathBuf;

use flowml_model::FlowError;
use thiserror::Error;

/// Errors that can occur while reading or writing tabular data.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Dataset path does not exist.
    #[error("dataset not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or write a file.
    #[error("failed to access file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Malformed CSV text.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to write CSV output.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    /// CSV input has no header row.
    #[error("CSV file has no header row: {path}")]
    MissingHeader { path: PathBuf },

    /// Failed to read a Parquet file with Polars.
    #[error("failed to read Parquet {path}: {message}")]
    ParquetRead { path: PathBuf, message: String },

    /// File extension is neither CSV nor Parquet.
    #[error("unsupported dataset file type: {path}")]
    UnsupportedFile { path: PathBuf },

    /// Directory holds no dataset files.
    #[error("no .parquet or .csv files found under {path}")]
    NoDatasetFiles { path: PathBuf },

    /// A row could not be added to the batch.
    #[error("invalid row in {path}: {source}")]
    Row {
        path: PathBuf,
        #[source]
        source: FlowError,
    },
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;

impl From<IngestError> for FlowError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::FileAccess { path, source } | IngestError::DirectoryRead { path, source } => {
                FlowError::Io { path, source }
            }
            IngestError::Row { source, .. } => source,
            IngestError::CsvParse { path, message } | IngestError::CsvWrite { path, message } => {
                FlowError::Csv { path, message }
            }
            IngestError::NoDatasetFiles { path } => {
                FlowError::empty_dataset(format!("dataset directory {}", path.display()))
            }
            other => FlowError::Io {
                path: other.path().to_path_buf(),
                source: std::io::Error::other(other.to_string()),
            },
        }
    }
}

impl IngestError {
    /// The file or directory the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::DirectoryNotFound { path }
            | Self::FileNotFound { path }
            | Self::DirectoryRead { path, .. }
            | Self::FileAccess { path, .. }
            | Self::CsvParse { path, .. }
            | Self::CsvWrite { path, .. }
            | Self::MissingHeader { path }
            | Self::ParquetRead { path, .. }
            | Self::UnsupportedFile { path }
            | Self::NoDatasetFiles { path }
            | Self::Row { path, .. } => path,
        }
    }
}
