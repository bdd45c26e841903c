//! Data model for the flow classification pipeline.
//!
//! Everything a consumer needs to honour the train/serve contract lives here:
//! the [`FeatureSchema`], the [`StandardScaler`], the [`LabelCodec`], the
//! [`PreprocessingArtifact`] that binds them, and the [`RecordBatch`] they are
//! applied to.

pub mod artifact;
pub mod batch;
pub mod codec;
pub mod error;
pub mod matrix;
pub mod scaler;
pub mod schema;

pub use artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION, PreprocessingArtifact};
pub use batch::{CellValue, RecordBatch, parse_f64};
pub use codec::LabelCodec;
pub use error::{FlowError, Result};
pub use matrix::FeatureMatrix;
pub use scaler::StandardScaler;
pub use schema::FeatureSchema;

/// Column holding the true class name in labeled data.
pub const LABEL_COLUMN: &str = "Label";

/// Column appended to inference output.
pub const PREDICTION_COLUMN: &str = "Prediction";

/// The one class name counted as normal traffic. Matching is exact and
/// case-sensitive; every other decoded label is an attack.
pub const BENIGN_LABEL: &str = "Benign";

/// True when `label` is the benign sentinel.
pub fn is_benign(label: &str) -> bool {
    label == BENIGN_LABEL
}
