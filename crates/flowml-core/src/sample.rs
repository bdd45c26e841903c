//! Evaluation and demo datasets that honour the feature schema.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, info_span};

use flowml_model::{
    CellValue, FeatureSchema, FlowError, LABEL_COLUMN, RecordBatch, Result, is_benign,
};
use flowml_validate::missing_columns;

use crate::options::{SampleOptions, SynthOptions};

/// The same selected rows twice: with every column, and with only the schema
/// features in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedSample {
    pub labeled: RecordBatch,
    pub features: RecordBatch,
    pub benign_count: usize,
    pub attack_count: usize,
}

impl BalancedSample {
    /// Rows per label in the labeled copy, most frequent first; ties keep
    /// first-occurrence order.
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let Some(labels) = self.labeled.column_values(LABEL_COLUMN) else {
            return counts;
        };
        for cell in labels {
            let label = cell.render();
            match counts.iter_mut().find(|(name, _)| *name == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Draws up to `num_benign` benign and `num_attack` attack rows from `pool`,
/// then shuffles them together. The draw is fully determined by the seed.
///
/// Rows without a label belong to neither class and are never drawn.
pub fn balanced_sample(
    pool: &RecordBatch,
    schema: &FeatureSchema,
    options: &SampleOptions,
) -> Result<BalancedSample> {
    let span = info_span!("balanced_sample", pool_rows = pool.num_rows());
    let _guard = span.enter();

    let label_idx = pool.column_index(LABEL_COLUMN).ok_or_else(|| {
        FlowError::schema(format!("sample pool has no '{LABEL_COLUMN}' column"))
    })?;
    let missing = missing_columns(pool, schema);
    if !missing.is_empty() {
        return Err(FlowError::MissingColumns { missing });
    }

    let mut benign = Vec::new();
    let mut attack = Vec::new();
    for (idx, row) in pool.rows().iter().enumerate() {
        match &row[label_idx] {
            CellValue::Missing => {}
            cell if is_benign(&cell.render()) => benign.push(idx),
            _ => attack.push(idx),
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    benign.shuffle(&mut rng);
    benign.truncate(options.num_benign);
    attack.shuffle(&mut rng);
    attack.truncate(options.num_attack);
    let benign_count = benign.len();
    let attack_count = attack.len();

    let mut selected = benign;
    selected.extend(attack);
    selected.shuffle(&mut rng);

    let labeled = pool.select_rows(&selected);
    let features = labeled.select_columns(schema.names())?;
    info!(
        benign = benign_count,
        attack = attack_count,
        seed = options.seed,
        "balanced sample drawn"
    );
    Ok(BalancedSample {
        labeled,
        features,
        benign_count,
        attack_count,
    })
}

/// Rows of uniform random integers, one column per schema feature.
///
/// This only exercises the plumbing: the values follow no real traffic
/// distribution, so predictions on them say nothing about model quality.
pub fn synthetic_rows(schema: &FeatureSchema, options: &SynthOptions) -> Result<RecordBatch> {
    if options.low >= options.high {
        return Err(FlowError::schema(format!(
            "synthetic value range [{}, {}) is empty",
            options.low, options.high
        )));
    }
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut batch = RecordBatch::new(schema.names().to_vec());
    for _ in 0..options.rows {
        let row = (0..schema.len())
            .map(|_| CellValue::Number(rng.gen_range(options.low..options.high) as f64))
            .collect();
        batch.push_row(row)?;
    }
    info!(rows = options.rows, features = schema.len(), "synthetic rows generated");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(benign: usize, attack: usize) -> RecordBatch {
        let mut batch = RecordBatch::new(vec!["id".into(), "Label".into(), "b".into(), "a".into()]);
        for i in 0..benign + attack {
            let label = if i < benign { "Benign" } else { "SYN" };
            batch
                .push_row(vec![
                    CellValue::Number(i as f64),
                    CellValue::from_raw(label),
                    CellValue::Number(1.0),
                    CellValue::Number(2.0),
                ])
                .unwrap();
        }
        batch
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["a", "b"]).unwrap()
    }

    #[test]
    fn caps_each_class_at_availability() {
        let sample = balanced_sample(&pool(3, 50), &schema(), &SampleOptions::default()).unwrap();
        assert_eq!(sample.benign_count, 3);
        assert_eq!(sample.attack_count, 10);
        assert_eq!(sample.labeled.num_rows(), 13);
        assert_eq!(sample.features.columns(), &["a", "b"]);
    }

    #[test]
    fn label_counts_follow_the_labeled_copy() {
        let sample = balanced_sample(&pool(3, 50), &schema(), &SampleOptions::default()).unwrap();
        assert_eq!(
            sample.label_counts(),
            vec![("SYN".to_string(), 10), ("Benign".to_string(), 3)]
        );
    }

    #[test]
    fn same_seed_same_draw() {
        let pool = pool(20, 20);
        let first = balanced_sample(&pool, &schema(), &SampleOptions::default()).unwrap();
        let second = balanced_sample(&pool, &schema(), &SampleOptions::default()).unwrap();
        assert_eq!(first, second);
        let other = balanced_sample(&pool, &schema(), &SampleOptions::new().with_seed(7)).unwrap();
        assert_ne!(first.labeled, other.labeled);
    }

    #[test]
    fn unlabeled_rows_are_never_drawn() {
        let mut batch = pool(1, 1);
        batch
            .push_row(vec![
                CellValue::Number(99.0),
                CellValue::Missing,
                CellValue::Number(1.0),
                CellValue::Number(2.0),
            ])
            .unwrap();
        let sample = balanced_sample(&batch, &schema(), &SampleOptions::default()).unwrap();
        assert_eq!(sample.labeled.num_rows(), 2);
    }

    #[test]
    fn requires_label_and_feature_columns() {
        let no_label = pool(2, 2).select_columns(&["id", "a", "b"]).unwrap();
        assert!(matches!(
            balanced_sample(&no_label, &schema(), &SampleOptions::default()),
            Err(FlowError::Schema { .. })
        ));
        let no_feature = pool(2, 2).select_columns(&["Label", "a"]).unwrap();
        assert!(matches!(
            balanced_sample(&no_feature, &schema(), &SampleOptions::default()),
            Err(FlowError::MissingColumns { ref missing }) if missing == &["b"]
        ));
    }

    #[test]
    fn synthetic_rows_cover_schema_within_range() {
        let options = SynthOptions::new().with_rows(25).with_seed(Some(1));
        let batch = synthetic_rows(&schema(), &options).unwrap();
        assert_eq!(batch.num_rows(), 25);
        assert_eq!(batch.columns(), &["a", "b"]);
        for row in batch.rows() {
            for cell in row {
                let value = cell.as_f64().unwrap();
                assert!((1.0..1000.0).contains(&value));
                assert_eq!(value.fract(), 0.0);
            }
        }
        assert_eq!(batch, synthetic_rows(&schema(), &options).unwrap());
    }

    #[test]
    fn empty_range_is_rejected() {
        let options = SynthOptions::new().with_range(5, 5);
        assert!(synthetic_rows(&schema(), &options).is_err());
    }
}
