//! Schema validation for incoming record batches.
//!
//! Validation is the explicit name-to-position stage of the pipeline: it
//! checks that every schema column is present, then reorders the batch into
//! schema order. Only a [`ValidatedBatch`] can be turned into a
//! [`FeatureMatrix`](flowml_model::FeatureMatrix) for the position-aligned
//! scaler.

pub mod validator;

pub use validator::{ValidatedBatch, feature_matrix, missing_columns, validate};
