//! The preprocessing artifact and its on-disk envelope.
//!
//! The artifact binds the feature schema, the fitted scaler, and the label
//! codec. It is written once by the fitting step and loaded read-only by every
//! consumer. The file is a JSON envelope:
//!
//! ```json
//! {
//!   "format": "flowml-preprocessor",
//!   "version": 1,
//!   "created_at": "2025-01-01T00:00:00+00:00",
//!   "checksum": "<sha256 of the artifact payload>",
//!   "artifact": {
//!     "features": ["..."],
//!     "scaler": { "mean": [..], "scale": [..] },
//!     "label_encoder": ["..."],
//!     "label_classes": ["..."]
//!   }
//! }
//! ```
//!
//! Loading verifies format, version, checksum, and shape before returning, so a
//! consumer either gets an artifact that behaves exactly like the one that was
//! saved or a [`FlowError::MissingArtifact`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::Digest;
use tracing::{debug, info};

use crate::codec::LabelCodec;
use crate::error::{FlowError, Result};
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;

pub const ARTIFACT_FORMAT: &str = "flowml-preprocessor";
pub const ARTIFACT_VERSION: u32 = 1;

/// Immutable bundle of schema, scaler, and codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingArtifact {
    features: FeatureSchema,
    scaler: StandardScaler,
    label_encoder: LabelCodec,
    /// Class names present at fit time, in codec order.
    label_classes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    format: String,
    version: u32,
    created_at: String,
    checksum: String,
    artifact: PreprocessingArtifact,
}

impl PreprocessingArtifact {
    /// Binds the three fitted parts, checking that they line up.
    pub fn new(features: FeatureSchema, scaler: StandardScaler, codec: LabelCodec) -> Result<Self> {
        let label_classes = codec.classes().to_vec();
        let artifact = Self {
            features,
            scaler,
            label_encoder: codec,
            label_classes,
        };
        artifact.check_shape()?;
        Ok(artifact)
    }

    fn check_shape(&self) -> Result<()> {
        if self.scaler.n_features() != self.features.len() {
            return Err(FlowError::schema(format!(
                "scaler has {} columns but schema lists {} features",
                self.scaler.n_features(),
                self.features.len()
            )));
        }
        for class in &self.label_classes {
            if self.label_encoder.encode(class).is_err() {
                return Err(FlowError::schema(format!(
                    "present class '{class}' is not in the label codec"
                )));
            }
        }
        Ok(())
    }

    pub fn features(&self) -> &FeatureSchema {
        &self.features
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn codec(&self) -> &LabelCodec {
        &self.label_encoder
    }

    pub fn label_classes(&self) -> &[String] {
        &self.label_classes
    }

    /// SHA-256 (hex) over the canonical JSON payload.
    pub fn checksum(&self) -> Result<String> {
        let payload = serde_json::to_vec(self)
            .map_err(|e| FlowError::schema(format!("artifact is not serializable: {e}")))?;
        Ok(hex::encode(sha2::Sha256::digest(&payload)))
    }

    /// Encodes the artifact as its on-disk envelope.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let file = ArtifactFile {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            checksum: self.checksum()?,
            artifact: self.clone(),
        };
        serde_json::to_vec_pretty(&file)
            .map_err(|e| FlowError::schema(format!("artifact is not serializable: {e}")))
    }

    /// Decodes an envelope. `origin` only labels errors.
    pub fn from_json_slice(bytes: &[u8], origin: &Path) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_slice(bytes)
            .map_err(|e| FlowError::missing_artifact(origin, format!("unreadable blob: {e}")))?;
        if file.format != ARTIFACT_FORMAT {
            return Err(FlowError::missing_artifact(
                origin,
                format!("format '{}' is not '{ARTIFACT_FORMAT}'", file.format),
            ));
        }
        if file.version != ARTIFACT_VERSION {
            return Err(FlowError::missing_artifact(
                origin,
                format!(
                    "version {} is not supported (expected {ARTIFACT_VERSION})",
                    file.version
                ),
            ));
        }
        let artifact = file.artifact;
        artifact
            .check_shape()
            .map_err(|e| FlowError::missing_artifact(origin, e.to_string()))?;
        let actual = artifact
            .checksum()
            .map_err(|e| FlowError::missing_artifact(origin, e.to_string()))?;
        if actual != file.checksum {
            return Err(FlowError::missing_artifact(
                origin,
                format!(
                    "checksum mismatch (expected {}, got {actual})",
                    file.checksum
                ),
            ));
        }
        debug!(created_at = %file.created_at, "artifact envelope verified");
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_json_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
        }
        fs::write(path, bytes).map_err(|e| FlowError::io(path, e))?;
        info!(
            path = %path.display(),
            features = self.features.len(),
            classes = self.label_encoder.len(),
            "saved preprocessing artifact"
        );
        Ok(())
    }

    /// Loads and verifies an artifact; any failure is `MissingArtifact`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .map_err(|e| FlowError::missing_artifact(path, format!("cannot read: {e}")))?;
        let artifact = Self::from_json_slice(&bytes, path)?;
        info!(
            path = %path.display(),
            features = artifact.features.len(),
            classes = artifact.label_encoder.len(),
            "loaded preprocessing artifact"
        );
        Ok(artifact)
    }
}
