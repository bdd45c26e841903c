//! Accuracy and per-class metrics for labeled evaluation batches.
//!
//! The per-class rows cover only the classes present in the true labels, but
//! class ids and names always come from the full training-time codec.

use serde::Serialize;

use flowml_model::{FlowError, LabelCodec, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class_id: usize,
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Builds the report from encoded true and predicted ids.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    codec: &LabelCodec,
) -> Result<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        return Err(FlowError::schema(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(FlowError::empty_dataset("evaluation batch"));
    }
    // Predicted ids must decode like they do for inference.
    for &id in y_pred {
        codec.decode(id)?;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

    let mut classes = Vec::new();
    for (class_id, label) in codec.present_classes(y_true)? {
        let support = y_true.iter().filter(|&&t| t == class_id).count();
        let predicted = y_pred.iter().filter(|&&p| p == class_id).count();
        let true_positive = y_true
            .iter()
            .zip(y_pred)
            .filter(|&(&t, &p)| t == class_id && p == class_id)
            .count();
        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        classes.push(ClassMetrics {
            class_id,
            label: label.to_string(),
            precision,
            recall,
            f1: f1(precision, recall),
            support,
        });
    }

    let total_support: usize = classes.iter().map(|c| c.support).sum();
    let n = classes.len() as f64;
    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
        support: total_support,
    };
    let weight = |metric: fn(&ClassMetrics) -> f64| -> f64 {
        classes
            .iter()
            .map(|c| metric(c) * c.support as f64)
            .sum::<f64>()
            / total_support as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total_support,
    };

    Ok(ClassificationReport {
        total: y_true.len(),
        correct,
        accuracy: ratio(correct, y_true.len()),
        classes,
        macro_avg,
        weighted_avg,
    })
}
