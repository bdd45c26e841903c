//! Subcommand implementations.
//!
//! Each command loads what it needs, runs one core operation, and returns a
//! result for `main` to print. Nothing here changes how features are ordered,
//! scaled, or decoded.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{Level, enabled, info_span, trace};

use flowml_core::{
    BalancedSample, FitOptions, FitOutcome, InferencePipeline, LinearModel, PredictionOutcome,
    SampleOptions, SynthOptions, balanced_sample, fit_artifact, synthetic_rows,
};
use flowml_ingest::{load_dataset, read_csv_batch, write_csv_batch};
use flowml_model::{CellValue, FeatureSchema, PreprocessingArtifact, RecordBatch};
use flowml_report::ClassificationReport;

use crate::cli::{EvaluateArgs, FitArgs, ModelArgs, PredictArgs, SampleArgs, SynthArgs};
use crate::logging::redact_value;

fn load_artifact(path: &Path) -> Result<PreprocessingArtifact> {
    PreprocessingArtifact::load(path)
        .with_context(|| format!("load preprocessing artifact {}", path.display()))
}

fn load_model_pair(args: &ModelArgs) -> Result<(PreprocessingArtifact, LinearModel)> {
    let artifact = load_artifact(&args.artifact.artifact)?;
    let model = LinearModel::load(&args.model)
        .with_context(|| format!("load model {}", args.model.display()))?;
    Ok((artifact, model))
}

fn read_input(path: &Path) -> Result<RecordBatch> {
    read_csv_batch(path).with_context(|| format!("read input {}", path.display()))
}

pub fn run_fit(args: &FitArgs) -> Result<FitOutcome> {
    let span = info_span!("fit", dataset = %args.dataset.display());
    let _guard = span.enter();
    let dataset = load_dataset(&args.dataset)
        .with_context(|| format!("load dataset {}", args.dataset.display()))?;
    let options = FitOptions::new().with_label_column(args.label_column.clone());
    let outcome = fit_artifact(&dataset, &options).context("fit preprocessing artifact")?;
    outcome
        .artifact
        .save(&args.output)
        .with_context(|| format!("save artifact {}", args.output.display()))?;
    Ok(outcome)
}

pub fn run_features(artifact: &Path) -> Result<FeatureSchema> {
    Ok(load_artifact(artifact)?.features().clone())
}

pub fn run_predict(args: &PredictArgs) -> Result<PredictionOutcome> {
    let span = info_span!("predict", input = %args.input.display());
    let _guard = span.enter();
    let (artifact, model) = load_model_pair(&args.model)?;
    let pipeline = InferencePipeline::new(&artifact, &model).context("pair artifact and model")?;
    let batch = read_input(&args.input)?;
    let (annotated, outcome) = pipeline
        .annotate(&batch)
        .with_context(|| format!("classify {}", args.input.display()))?;
    if enabled!(Level::TRACE) {
        for (idx, (row, label)) in batch.rows().iter().zip(&outcome.labels).enumerate() {
            let values: Vec<String> = row.iter().map(CellValue::render).collect();
            trace!(
                row = idx,
                prediction = %label,
                values = %redact_value(&values.join(",")),
                "row classified"
            );
        }
    }
    if let Some(output) = &args.output {
        write_csv_batch(output, &annotated)
            .with_context(|| format!("write predictions {}", output.display()))?;
    }
    Ok(outcome)
}

pub fn run_evaluate(args: &EvaluateArgs) -> Result<ClassificationReport> {
    let span = info_span!("evaluate", input = %args.input.display());
    let _guard = span.enter();
    let (artifact, model) = load_model_pair(&args.model)?;
    let pipeline = InferencePipeline::new(&artifact, &model).context("pair artifact and model")?;
    let batch = read_input(&args.input)?;
    pipeline
        .evaluate(&batch)
        .with_context(|| format!("evaluate {}", args.input.display()))
}

pub fn run_sample(args: &SampleArgs) -> Result<BalancedSample> {
    let span = info_span!("sample", dataset = %args.dataset.display());
    let _guard = span.enter();
    let artifact = load_artifact(&args.artifact.artifact)?;
    let pool = load_dataset(&args.dataset)
        .with_context(|| format!("load dataset {}", args.dataset.display()))?;
    let options = SampleOptions::new()
        .with_num_benign(args.benign)
        .with_num_attack(args.attack)
        .with_seed(args.seed);
    let sample =
        balanced_sample(&pool, artifact.features(), &options).context("draw balanced sample")?;
    write_csv_batch(&args.labeled_output, &sample.labeled)
        .with_context(|| format!("write {}", args.labeled_output.display()))?;
    write_csv_batch(&args.features_output, &sample.features)
        .with_context(|| format!("write {}", args.features_output.display()))?;
    Ok(sample)
}

pub fn run_synth(args: &SynthArgs) -> Result<RecordBatch> {
    let artifact = load_artifact(&args.artifact.artifact)?;
    let options = SynthOptions::new()
        .with_rows(args.rows)
        .with_seed(args.seed);
    let batch = synthetic_rows(artifact.features(), &options).context("generate synthetic rows")?;
    write_csv_batch(&args.output, &batch)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(batch)
}
