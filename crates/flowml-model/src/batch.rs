//! Tabular record batches.
//!
//! A [`RecordBatch`] keeps an ordered header plus positional rows. Columns may
//! arrive in any order; consumers look them up by name and never assume a
//! position until the schema validator has reordered them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// A single cell of a record batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Builds a cell from raw text. Empty (after trimming) becomes `Missing`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('\u{feff}');
        if trimmed.is_empty() {
            Self::Missing
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the cell. Text is parsed; non-numeric text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_f64(text),
            Self::Missing => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Renders the cell the way it is written back to CSV.
    pub fn render(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
            Self::Missing => String::new(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Ordered rows sharing one header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RecordBatch {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a batch, rejecting rows whose width differs from the header.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut batch = Self::new(columns);
        for row in rows {
            batch.push_row(row)?;
        }
        Ok(batch)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FlowError::schema(format!(
                "row {} has {} cells, header has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(idx))
    }

    /// Iterates one column top to bottom.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Copies the given rows, in the given order, keeping every column.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&idx| self.rows.get(idx).cloned())
                .collect(),
        }
    }

    /// Projects the batch onto `names`, in that order.
    ///
    /// Fails with [`FlowError::MissingColumns`] listing every absent name.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut positions = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name.as_ref()) {
                Some(idx) => positions.push(idx),
                None => missing.push(name.as_ref().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(FlowError::MissingColumns { missing });
        }
        let rows = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Ok(Self {
            columns: names.iter().map(|name| name.as_ref().to_string()).collect(),
            rows,
        })
    }

    /// Removes the column at `idx`, leaving same-named columns elsewhere intact.
    /// Out-of-range positions are ignored.
    pub fn drop_column(&mut self, idx: usize) {
        if idx >= self.columns.len() {
            return;
        }
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
    }

    /// Appends a column; `values` must have one cell per row.
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(FlowError::schema(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Stacks batches vertically over the union of their columns.
    ///
    /// Column order is first-seen order; cells for columns a batch lacks are
    /// `Missing`.
    pub fn concat(batches: Vec<RecordBatch>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for batch in &batches {
            for column in &batch.columns {
                if !index.contains_key(column) {
                    index.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }
        let mut rows = Vec::new();
        for batch in batches {
            let positions: Vec<usize> = batch.columns.iter().map(|c| index[c]).collect();
            for row in batch.rows {
                let mut out = vec![CellValue::Missing; columns.len()];
                for (cell, &pos) in row.into_iter().zip(&positions) {
                    out[pos] = cell;
                }
                rows.push(out);
            }
        }
        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> RecordBatch {
        RecordBatch::with_rows(
            vec!["b".into(), "a".into()],
            vec![
                vec![CellValue::from_raw("2"), CellValue::from_raw("1")],
                vec![CellValue::from_raw("4"), CellValue::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_raw_trims_and_detects_missing() {
        assert_eq!(CellValue::from_raw("  7 "), CellValue::Text("7".into()));
        assert_eq!(CellValue::from_raw("   "), CellValue::Missing);
        assert_eq!(CellValue::from_raw("\u{feff}x"), CellValue::Text("x".into()));
    }

    #[test]
    fn numeric_view_parses_text() {
        assert_eq!(CellValue::from_raw("1.5").as_f64(), Some(1.5));
        assert_eq!(CellValue::from_raw("abc").as_f64(), None);
        assert_eq!(CellValue::Missing.as_f64(), None);
        assert_eq!(CellValue::Number(100.0).render(), "100");
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = RecordBatch::with_rows(vec!["a".into()], vec![vec![]]).unwrap_err();
        assert!(matches!(err, FlowError::Schema { .. }));
    }

    #[test]
    fn select_columns_reorders_and_reports_all_missing() {
        let projected = batch().select_columns(&["a", "b"]).unwrap();
        assert_eq!(projected.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(projected.rows()[0][0], CellValue::Text("1".into()));

        let err = batch().select_columns(&["a", "x", "y"]).unwrap_err();
        match err {
            FlowError::MissingColumns { missing } => assert_eq!(missing, vec!["x", "y"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn concat_unions_columns() {
        let left = batch();
        let right =
            RecordBatch::with_rows(vec!["c".into()], vec![vec![CellValue::Number(9.0)]]).unwrap();
        let merged = RecordBatch::concat(vec![left, right]);
        assert_eq!(merged.columns(), &["b", "a", "c"]);
        assert_eq!(merged.num_rows(), 3);
        assert_eq!(merged.rows()[0][2], CellValue::Missing);
        assert_eq!(merged.rows()[2][0], CellValue::Missing);
        assert_eq!(merged.rows()[2][2], CellValue::Number(9.0));
    }

    #[test]
    fn drop_column_is_positional() {
        let mut b = RecordBatch::with_rows(
            vec!["d".into(), "d".into(), "p".into()],
            vec![vec!["1".into(), "2".into(), "3".into()]],
        )
        .unwrap();
        b.drop_column(0);
        assert_eq!(b.columns(), &["d", "p"]);
        assert_eq!(b.rows()[0], vec![CellValue::from("2"), CellValue::from("3")]);
        b.drop_column(5);
        assert_eq!(b.num_columns(), 2);
    }

    #[test]
    fn append_column_checks_length() {
        let mut b = batch();
        assert!(b.append_column("p", vec![CellValue::Missing]).is_err());
        b.append_column("p", vec!["x".into(), "y".into()]).unwrap();
        assert_eq!(b.value(1, "p"), Some(&CellValue::Text("y".into())));
    }
}
