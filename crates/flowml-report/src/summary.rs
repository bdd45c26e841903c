//! Normal/attack aggregation of decoded labels.

use std::collections::HashMap;

use serde::Serialize;

use flowml_model::is_benign;

/// Occurrences of one attack type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate view of one batch of predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionSummary {
    pub total: usize,
    pub normal: usize,
    pub attack: usize,
    /// Attack types by descending count; ties keep first-occurrence order.
    pub attack_types: Vec<AttackCount>,
}

impl PredictionSummary {
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut normal = 0usize;
        let mut attack_types: Vec<AttackCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for label in labels {
            let label = label.as_ref();
            if is_benign(label) {
                normal += 1;
                continue;
            }
            match index.get(label) {
                Some(&pos) => attack_types[pos].count += 1,
                None => {
                    index.insert(label, attack_types.len());
                    attack_types.push(AttackCount {
                        label: label.to_string(),
                        count: 1,
                    });
                }
            }
        }
        // Stable sort: equal counts stay in first-occurrence order.
        attack_types.sort_by(|a, b| b.count.cmp(&a.count));
        Self {
            total: labels.len(),
            normal,
            attack: labels.len() - normal,
            attack_types,
        }
    }

    pub fn has_attacks(&self) -> bool {
        self.attack > 0
    }

    pub fn count_for(&self, label: &str) -> usize {
        if is_benign(label) {
            return self.normal;
        }
        self.attack_types
            .iter()
            .find(|entry| entry.label == label)
            .map_or(0, |entry| entry.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_normal_attack_and_breakdown() {
        let summary =
            PredictionSummary::from_labels(&["Benign", "Benign", "SYN", "SYN", "SYN", "UDP"]);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.normal, 2);
        assert_eq!(summary.attack, 4);
        assert_eq!(
            summary.attack_types,
            vec![
                AttackCount {
                    label: "SYN".into(),
                    count: 3
                },
                AttackCount {
                    label: "UDP".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        let summary = PredictionSummary::from_labels(&["UDP", "LDAP", "SYN", "LDAP", "UDP", "SYN"]);
        let order: Vec<&str> = summary.attack_types.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(order, vec!["UDP", "LDAP", "SYN"]);
    }

    #[test]
    fn benign_match_is_case_sensitive() {
        let summary = PredictionSummary::from_labels(&["BENIGN", "Benign"]);
        assert_eq!(summary.normal, 1);
        assert_eq!(summary.count_for("BENIGN"), 1);
        assert!(summary.has_attacks());
    }

    #[test]
    fn empty_input() {
        let summary = PredictionSummary::from_labels::<&str>(&[]);
        assert_eq!(summary, PredictionSummary::default());
        assert!(!summary.has_attacks());
    }
}
