//! Error taxonomy shared by every stage of the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fitting, loading, validating, or running the pipeline.
///
/// Every variant is surfaced to the caller as-is. Nothing here is retried and
/// nothing is replaced by a default label.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Artifact or model blob is absent, unreadable, or fails shape checks.
    #[error("incompatible or missing artifact {path}: {reason}")]
    MissingArtifact { path: PathBuf, reason: String },

    /// Label column absent at fit time, empty feature list, or misaligned rows.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Incoming batch lacks required feature columns (listed in schema order).
    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// No usable rows remain after cleaning.
    #[error("no usable rows in {context}")]
    EmptyDataset { context: String },

    /// The model failed inside its predict step.
    #[error("prediction failed: {message}")]
    Prediction { message: String },

    /// A class id outside the codec's training-time range.
    #[error("class id {id} is outside the fitted label range 0..{num_classes}")]
    UnknownClassId { id: usize, num_classes: usize },

    /// A class name the codec never saw at fit time.
    #[error("label '{label}' was not seen when the label codec was fitted")]
    UnknownLabel { label: String },

    /// A feature cell that cannot be fed to the scaler.
    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidFeatureValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },
}

impl FlowError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn missing_artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MissingArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn empty_dataset(context: impl Into<String>) -> Self {
        Self::EmptyDataset {
            context: context.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
