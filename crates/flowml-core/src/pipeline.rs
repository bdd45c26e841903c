//! Validate, scale, predict, decode.

use tracing::{debug, info, info_span};

use flowml_model::{
    CellValue, FlowError, LABEL_COLUMN, PREDICTION_COLUMN, PreprocessingArtifact, RecordBatch,
    Result,
};
use flowml_report::{ClassificationReport, PredictionSummary, classification_report};
use flowml_validate::{feature_matrix, validate};

use crate::classifier::Classifier;

/// Decoded labels for one batch plus their aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub labels: Vec<String>,
    pub summary: PredictionSummary,
}

/// Runs batches through a loaded artifact and model.
///
/// Both are borrowed read-only, so one pipeline (or many) can serve any
/// number of batches without reloading either.
#[derive(Debug)]
pub struct InferencePipeline<'a, M> {
    artifact: &'a PreprocessingArtifact,
    model: &'a M,
}

impl<'a, M: Classifier> InferencePipeline<'a, M> {
    /// Pairs an artifact with a model, rejecting a model whose width or class
    /// count cannot match the artifact.
    pub fn new(artifact: &'a PreprocessingArtifact, model: &'a M) -> Result<Self> {
        let features = artifact.features().len();
        if let Some(width) = model.n_features()
            && width != features
        {
            return Err(FlowError::missing_artifact(
                "model",
                format!("model expects {width} features but the artifact lists {features}"),
            ));
        }
        let classes = artifact.codec().len();
        if let Some(count) = model.n_classes()
            && count > classes
        {
            return Err(FlowError::missing_artifact(
                "model",
                format!("model emits {count} classes but the label codec has {classes}"),
            ));
        }
        Ok(Self { artifact, model })
    }

    pub fn artifact(&self) -> &PreprocessingArtifact {
        self.artifact
    }

    pub fn model(&self) -> &M {
        self.model
    }

    /// Raw class ids for every row, in row order.
    pub fn predict_ids(&self, batch: &RecordBatch) -> Result<Vec<usize>> {
        let validated = validate(batch, self.artifact.features())?;
        let matrix = feature_matrix(&validated)?;
        let scaled = self.artifact.scaler().transform(&matrix)?;
        let ids = self
            .model
            .predict(&scaled)
            .map_err(|e| FlowError::Prediction {
                message: e.to_string(),
            })?;
        if ids.len() != batch.num_rows() {
            return Err(FlowError::Prediction {
                message: format!(
                    "model returned {} predictions for {} rows",
                    ids.len(),
                    batch.num_rows()
                ),
            });
        }
        Ok(ids)
    }

    /// One decoded label per input row; `infer(batch)[i]` belongs to row `i`.
    pub fn infer(&self, batch: &RecordBatch) -> Result<Vec<String>> {
        let span = info_span!("infer", rows = batch.num_rows());
        let _guard = span.enter();
        let ids = self.predict_ids(batch)?;
        let labels = self.artifact.codec().decode_all(&ids)?;
        debug!(rows = labels.len(), "batch decoded");
        Ok(labels)
    }

    /// Inference plus the normal/attack aggregate.
    pub fn run(&self, batch: &RecordBatch) -> Result<PredictionOutcome> {
        let labels = self.infer(batch)?;
        let summary = PredictionSummary::from_labels(&labels);
        info!(
            total = summary.total,
            normal = summary.normal,
            attack = summary.attack,
            "batch classified"
        );
        Ok(PredictionOutcome { labels, summary })
    }

    /// The input rows with a `Prediction` column appended (replacing any
    /// existing one).
    pub fn annotate(&self, batch: &RecordBatch) -> Result<(RecordBatch, PredictionOutcome)> {
        let outcome = self.run(batch)?;
        let mut annotated = batch.clone();
        while let Some(idx) = annotated.column_index(PREDICTION_COLUMN) {
            annotated.drop_column(idx);
        }
        let values = outcome
            .labels
            .iter()
            .map(|label| CellValue::Text(label.clone()))
            .collect();
        annotated.append_column(PREDICTION_COLUMN, values)?;
        Ok((annotated, outcome))
    }

    /// Accuracy and per-class metrics against the batch's `Label` column.
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ClassificationReport> {
        let span = info_span!("evaluate", rows = batch.num_rows());
        let _guard = span.enter();
        let truth = true_labels(batch)?;
        let y_true = self.artifact.codec().encode_all(&truth)?;
        let y_pred = self.predict_ids(batch)?;
        let report = classification_report(&y_true, &y_pred, self.artifact.codec())?;
        info!(
            accuracy = report.accuracy,
            classes = report.classes.len(),
            "batch evaluated"
        );
        Ok(report)
    }
}

fn true_labels(batch: &RecordBatch) -> Result<Vec<String>> {
    let values = batch.column_values(LABEL_COLUMN).ok_or_else(|| {
        FlowError::schema(format!(
            "evaluation requires a '{LABEL_COLUMN}' column with true labels"
        ))
    })?;
    values
        .enumerate()
        .map(|(row, cell)| match cell {
            CellValue::Missing => Err(FlowError::schema(format!("row {row} has no label"))),
            other => Ok(other.render()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use flowml_model::{FeatureMatrix, FeatureSchema, LabelCodec, StandardScaler};

    use super::*;

    /// Class 1 when the first scaled feature is positive.
    struct SignModel;

    impl Classifier for SignModel {
        type Error = String;

        fn predict(&self, features: &FeatureMatrix) -> std::result::Result<Vec<usize>, String> {
            Ok(features
                .rows()
                .map(|row| usize::from(row[0] > 0.0))
                .collect())
        }
    }

    /// Reports whatever it is told to.
    struct FixedModel(std::result::Result<Vec<usize>, String>);

    impl Classifier for FixedModel {
        type Error = String;

        fn predict(&self, _: &FeatureMatrix) -> std::result::Result<Vec<usize>, String> {
            self.0.clone()
        }
    }

    struct WideModel;

    impl Classifier for WideModel {
        type Error = String;

        fn predict(&self, _: &FeatureMatrix) -> std::result::Result<Vec<usize>, String> {
            Ok(Vec::new())
        }

        fn n_features(&self) -> Option<usize> {
            Some(5)
        }
    }

    fn artifact() -> PreprocessingArtifact {
        PreprocessingArtifact::new(
            FeatureSchema::new(["x", "y"]).unwrap(),
            StandardScaler::from_parts(vec![10.0, 0.0], vec![2.0, 1.0]).unwrap(),
            LabelCodec::fit(["Benign", "SYN"]).unwrap(),
        )
        .unwrap()
    }

    fn batch(columns: &[&str], rows: &[&[&str]]) -> RecordBatch {
        RecordBatch::with_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::from_raw(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn infers_in_row_order_regardless_of_column_order() {
        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();
        let input = batch(&["y", "extra", "x"], &[&["0", "a", "12"], &["0", "b", "8"]]);
        assert_eq!(pipeline.infer(&input).unwrap(), vec!["SYN", "Benign"]);
    }

    #[test]
    fn run_aggregates() {
        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();
        let input = batch(&["x", "y"], &[&["12", "0"], &["8", "0"], &["11", "0"]]);
        let outcome = pipeline.run(&input).unwrap();
        assert_eq!(outcome.summary.normal, 1);
        assert_eq!(outcome.summary.attack, 2);
        assert_eq!(outcome.summary.count_for("SYN"), 2);
    }

    #[test]
    fn model_failure_is_prediction_error() {
        let artifact = artifact();
        let model = FixedModel(Err("boom".into()));
        let pipeline = InferencePipeline::new(&artifact, &model).unwrap();
        let err = pipeline.infer(&batch(&["x", "y"], &[&["1", "2"]])).unwrap_err();
        assert!(matches!(err, FlowError::Prediction { ref message } if message == "boom"));
    }

    #[test]
    fn wrong_prediction_count_is_prediction_error() {
        let artifact = artifact();
        let model = FixedModel(Ok(vec![0, 1]));
        let pipeline = InferencePipeline::new(&artifact, &model).unwrap();
        let err = pipeline.infer(&batch(&["x", "y"], &[&["1", "2"]])).unwrap_err();
        assert!(matches!(err, FlowError::Prediction { .. }));
    }

    #[test]
    fn out_of_range_id_is_unknown_class() {
        let artifact = artifact();
        let model = FixedModel(Ok(vec![7]));
        let pipeline = InferencePipeline::new(&artifact, &model).unwrap();
        let err = pipeline.infer(&batch(&["x", "y"], &[&["1", "2"]])).unwrap_err();
        assert!(matches!(err, FlowError::UnknownClassId { id: 7, num_classes: 2 }));
    }

    #[test]
    fn evaluate_rejects_out_of_range_id() {
        let artifact = artifact();
        let model = FixedModel(Ok(vec![7]));
        let pipeline = InferencePipeline::new(&artifact, &model).unwrap();
        let input = batch(&["x", "y", "Label"], &[&["1", "2", "SYN"]]);
        let err = pipeline.evaluate(&input).unwrap_err();
        assert!(matches!(err, FlowError::UnknownClassId { id: 7, num_classes: 2 }));
    }

    #[test]
    fn missing_column_aborts_before_predict() {
        let artifact = artifact();
        let model = FixedModel(Err("must not be called".into()));
        let pipeline = InferencePipeline::new(&artifact, &model).unwrap();
        let err = pipeline.infer(&batch(&["x"], &[&["1"]])).unwrap_err();
        assert!(matches!(err, FlowError::MissingColumns { ref missing } if missing == &["y"]));
    }

    #[test]
    fn incompatible_model_is_rejected() {
        let artifact = artifact();
        assert!(matches!(
            InferencePipeline::new(&artifact, &WideModel),
            Err(FlowError::MissingArtifact { .. })
        ));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shared_across_threads() {
        assert_send_sync::<PreprocessingArtifact>();
        assert_send_sync::<crate::LinearModel>();
        assert_send_sync::<InferencePipeline<'static, crate::LinearModel>>();

        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();
        let input = batch(&["x", "y"], &[&["12", "0"], &["8", "0"]]);
        let labels = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| scope.spawn(|| pipeline.infer(&input).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert_eq!(labels[0], vec!["SYN", "Benign"]);
        assert_eq!(labels[0], labels[1]);
    }

    #[test]
    fn annotate_appends_prediction_column() {
        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();
        let input = batch(
            &["x", "Prediction", "y"],
            &[&["12", "stale", "0"], &["8", "stale", "0"]],
        );
        let (annotated, outcome) = pipeline.annotate(&input).unwrap();
        assert_eq!(annotated.columns(), &["x", "y", "Prediction"]);
        assert_eq!(
            annotated.value(0, PREDICTION_COLUMN),
            Some(&CellValue::Text("SYN".into()))
        );
        assert_eq!(outcome.labels, vec!["SYN", "Benign"]);
    }

    #[test]
    fn annotate_keeps_duplicate_named_columns() {
        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();
        let input = batch(
            &["x", "y", "dup", "dup", "Prediction"],
            &[&["1", "2", "first", "second", "old"]],
        );
        let (annotated, _) = pipeline.annotate(&input).unwrap();
        assert_eq!(annotated.columns(), &["x", "y", "dup", "dup", "Prediction"]);
        assert_eq!(
            annotated.rows()[0],
            vec![
                CellValue::Text("1".into()),
                CellValue::Text("2".into()),
                CellValue::Text("first".into()),
                CellValue::Text("second".into()),
                CellValue::Text("Benign".into()),
            ]
        );
    }

    #[test]
    fn evaluate_needs_known_labels() {
        let artifact = artifact();
        let pipeline = InferencePipeline::new(&artifact, &SignModel).unwrap();

        let no_label = batch(&["x", "y"], &[&["12", "0"]]);
        assert!(matches!(
            pipeline.evaluate(&no_label),
            Err(FlowError::Schema { .. })
        ));

        let unseen = batch(&["x", "y", "Label"], &[&["12", "0", "UDP"]]);
        assert!(matches!(
            pipeline.evaluate(&unseen),
            Err(FlowError::UnknownLabel { .. })
        ));

        let labeled = batch(
            &["x", "y", "Label"],
            &[&["12", "0", "SYN"], &["8", "0", "SYN"], &["9", "0", "Benign"]],
        );
        let report = pipeline.evaluate(&labeled).unwrap();
        assert_eq!(report.correct, 2);
        assert_eq!(report.classes.len(), 2);
    }
}
