//! Pipeline operations built on the preprocessing contract.
//!
//! - [`fit`]: derive a [`PreprocessingArtifact`](flowml_model::PreprocessingArtifact) from labeled data
//! - [`classifier`]: the opaque model boundary and the linear model file
//! - [`pipeline`]: validate, scale, predict, and decode one batch
//! - [`sample`]: balanced evaluation samples and synthetic plumbing rows

pub mod classifier;
pub mod fit;
pub mod options;
pub mod pipeline;
pub mod sample;

pub use classifier::{Classifier, LINEAR_MODEL_FORMAT, LinearModel, LinearModelError};
pub use fit::{FitOutcome, fit_artifact};
pub use options::{
    DEFAULT_ARTIFACT_PATH, DEFAULT_MODEL_PATH, FitOptions, SampleOptions, SynthOptions,
};
pub use pipeline::{InferencePipeline, PredictionOutcome};
pub use sample::{BalancedSample, balanced_sample, synthetic_rows};
