//! Feature schema: the canonical, ordered list of model input columns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::{FlowError, Result};

/// Ordered, unique feature column names fixed at fit time.
///
/// The order is the column order the scaler and the model were fitted on and
/// never changes after fitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Builds a schema from column names, trimming surrounding whitespace.
    ///
    /// Rejects an empty list, blank names, and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();
        if names.is_empty() {
            return Err(FlowError::schema("feature list is empty"));
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(FlowError::schema("feature list contains a blank name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(FlowError::schema(format!("duplicate feature '{name}'")));
            }
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// SHA-256 over the ordered names; changes whenever order or membership does.
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha2::Sha256::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = FlowError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}
