//! Options for fitting and sample building.

use serde::{Deserialize, Serialize};

use flowml_model::LABEL_COLUMN;

/// Where `fit` writes the artifact and every consumer reads it by default.
pub const DEFAULT_ARTIFACT_PATH: &str = "preprocessor.json";

pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Options for deriving a preprocessing artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Column holding the class name. Every other numeric column is a feature.
    pub label_column: String,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            label_column: LABEL_COLUMN.to_string(),
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }
}

/// Options for the balanced sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleOptions {
    /// Upper bound on benign rows; fewer are drawn when the pool has fewer.
    pub num_benign: usize,
    /// Upper bound on attack rows.
    pub num_attack: usize,
    pub seed: u64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            num_benign: 10,
            num_attack: 10,
            seed: 42,
        }
    }
}

impl SampleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_num_benign(mut self, count: usize) -> Self {
        self.num_benign = count;
        self
    }

    #[must_use]
    pub fn with_num_attack(mut self, count: usize) -> Self {
        self.num_attack = count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Options for synthetic rows. Values are integers in `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthOptions {
    pub rows: usize,
    pub low: i64,
    pub high: i64,
    /// `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            rows: 10,
            low: 1,
            high: 1000,
            seed: None,
        }
    }
}

impl SynthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    #[must_use]
    pub fn with_range(mut self, low: i64, high: i64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}
