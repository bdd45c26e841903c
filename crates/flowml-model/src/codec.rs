//! Label codec: class name <-> class id, fixed at fit time.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Bijection between class names and ids. The id of a class is its position.
///
/// Fitting sorts the distinct labels lexicographically, so the same dataset
/// always yields the same assignment. Decoding is always keyed on this
/// training-time order, never on whatever subset a later batch contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelCodec {
    classes: Vec<String>,
}

impl LabelCodec {
    /// Fits the codec over the distinct labels observed.
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        if distinct.is_empty() {
            return Err(FlowError::empty_dataset("label column"));
        }
        Ok(Self {
            classes: distinct.into_iter().collect(),
        })
    }

    /// Rebuilds a codec from a stored class list, keeping its order.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(FlowError::schema("label codec has no classes"));
        }
        let mut seen = HashSet::with_capacity(classes.len());
        for class in &classes {
            if !seen.insert(class.as_str()) {
                return Err(FlowError::schema(format!("duplicate class '{class}'")));
            }
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|class| class == label)
            .ok_or_else(|| FlowError::UnknownLabel {
                label: label.to_string(),
            })
    }

    pub fn decode(&self, id: usize) -> Result<&str> {
        self.classes
            .get(id)
            .map(String::as_str)
            .ok_or(FlowError::UnknownClassId {
                id,
                num_classes: self.classes.len(),
            })
    }

    /// Decodes a whole prediction vector; the first bad id aborts.
    pub fn decode_all(&self, ids: &[usize]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| self.decode(id).map(str::to_string))
            .collect()
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| self.encode(label.as_ref()))
            .collect()
    }

    /// The classes that occur in `ids`, sorted by id, each once.
    ///
    /// Metrics restricted to the classes of one batch use this subset while
    /// model outputs keep decoding against the full list.
    pub fn present_classes(&self, ids: &[usize]) -> Result<Vec<(usize, &str)>> {
        let unique: BTreeSet<usize> = ids.iter().copied().collect();
        unique
            .into_iter()
            .map(|id| self.decode(id).map(|name| (id, name)))
            .collect()
    }
}

impl TryFrom<Vec<String>> for LabelCodec {
    type Error = FlowError;

    fn try_from(classes: Vec<String>) -> Result<Self> {
        Self::from_classes(classes)
    }
}

impl From<LabelCodec> for Vec<String> {
    fn from(codec: LabelCodec) -> Self {
        codec.classes
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fit_sorts_distinct_labels() {
        let codec = LabelCodec::fit(["UDP", "Benign", "SYN", "Benign"]).unwrap();
        assert_eq!(codec.classes(), &["Benign", "SYN", "UDP"]);
        assert_eq!(codec.encode("SYN").unwrap(), 1);
        assert_eq!(codec.decode(2).unwrap(), "UDP");
    }

    #[test]
    fn same_labels_in_any_order_give_same_ids() {
        let a = LabelCodec::fit(["b", "a", "c"]).unwrap();
        let b = LabelCodec::fit(["c", "b", "a", "a"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn decode_out_of_range_is_an_error() {
        let codec = LabelCodec::fit(["Benign", "SYN"]).unwrap();
        match codec.decode(2) {
            Err(FlowError::UnknownClassId { id, num_classes }) => {
                assert_eq!((id, num_classes), (2, 2));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            codec.encode("benign"),
            Err(FlowError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn present_classes_filters_to_subset() {
        let codec = LabelCodec::fit(["Benign", "LDAP", "SYN", "UDP"]).unwrap();
        let present = codec.present_classes(&[3, 0, 3, 0]).unwrap();
        assert_eq!(present, vec![(0, "Benign"), (3, "UDP")]);
    }

    #[test]
    fn stored_order_is_preserved_and_duplicates_rejected() {
        let codec = LabelCodec::from_classes(vec!["z".into(), "a".into()]).unwrap();
        assert_eq!(codec.encode("z").unwrap(), 0);
        assert!(LabelCodec::from_classes(vec!["a".into(), "a".into()]).is_err());
        assert!(LabelCodec::from_classes(Vec::new()).is_err());
    }

    proptest! {
        #[test]
        fn encode_decode_round_trip(labels in prop::collection::vec("[A-Za-z]{1,8}", 1..20)) {
            let codec = LabelCodec::fit(&labels).unwrap();
            for id in 0..codec.len() {
                let name = codec.decode(id).unwrap();
                prop_assert_eq!(codec.encode(name).unwrap(), id);
            }
        }
    }
}
