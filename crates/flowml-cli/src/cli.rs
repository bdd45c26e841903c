//! CLI argument definitions for the flow classifier.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use flowml_core::{DEFAULT_ARTIFACT_PATH, DEFAULT_MODEL_PATH};
use flowml_model::LABEL_COLUMN;

#[derive(Parser)]
#[command(
    name = "flowml",
    version,
    about = "Network-flow classification with a shared preprocessing contract",
    long_about = "Fit, inspect, and apply the preprocessing artifact that binds the feature\n\
                  list, the fitted scaler, and the label encoding for a flow classifier.\n\n\
                  Every subcommand reads the same artifact, so training, evaluation, and\n\
                  inference order, scale, and decode features identically."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow row-level values in trace logs (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit and save the preprocessing artifact from a labeled dataset.
    Fit(FitArgs),

    /// List the feature columns an input file must contain.
    Features(ArtifactArgs),

    /// Classify every row of a CSV file.
    Predict(PredictArgs),

    /// Report accuracy and per-class metrics for a labeled CSV file.
    Evaluate(EvaluateArgs),

    /// Draw a seeded, balanced benign/attack sample from a labeled dataset.
    Sample(SampleArgs),

    /// Write rows of random feature values for smoke-testing the pipeline.
    ///
    /// The values are uniform random integers and follow no real traffic
    /// distribution. Use them to check plumbing, never to judge a model.
    Synth(SynthArgs),
}

#[derive(Parser)]
pub struct ArtifactArgs {
    /// Preprocessing artifact written by `fit`.
    #[arg(long = "artifact", value_name = "PATH", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,
}

#[derive(Parser)]
pub struct ModelArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Linear model file scored against the scaled features.
    #[arg(long = "model", value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

#[derive(Parser)]
pub struct FitArgs {
    /// Dataset file (.csv/.parquet) or a directory of them.
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Column holding the class name.
    #[arg(long = "label-column", default_value = LABEL_COLUMN)]
    pub label_column: String,

    /// Where to write the artifact.
    #[arg(long = "output", value_name = "PATH", default_value = DEFAULT_ARTIFACT_PATH)]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct PredictArgs {
    /// CSV file with at least the artifact's feature columns.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Write the input rows plus a `Prediction` column to this CSV.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct EvaluateArgs {
    /// CSV file with the feature columns and a `Label` column.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Parser)]
pub struct SampleArgs {
    /// Labeled dataset file or directory to draw from.
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Maximum benign rows.
    #[arg(long = "benign", default_value_t = 10)]
    pub benign: usize,

    /// Maximum attack rows.
    #[arg(long = "attack", default_value_t = 10)]
    pub attack: usize,

    /// Seed for the draw and the final shuffle.
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Sample with every column, including `Label`.
    #[arg(long = "labeled-output", value_name = "PATH", default_value = "real_test_labeled.csv")]
    pub labeled_output: PathBuf,

    /// Same rows with only the feature columns.
    #[arg(long = "features-output", value_name = "PATH", default_value = "real_test_data.csv")]
    pub features_output: PathBuf,
}

#[derive(Parser)]
pub struct SynthArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Number of rows.
    #[arg(long = "rows", default_value_t = 10)]
    pub rows: usize,

    /// Seed for reproducible rows (random when omitted).
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Output CSV.
    #[arg(long = "output", value_name = "PATH", default_value = "dummy_test_data.csv")]
    pub output: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
