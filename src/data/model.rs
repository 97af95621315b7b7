use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// Textual form of [`CellValue::Missing`], also the ARFF missing marker.
pub const MISSING_TOKEN: &str = "?";

/// A dynamically-typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent / unknown value. Distinct from zero and from empty text.
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => write!(f, "{MISSING_TOKEN}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Keep a trailing ".0" so float columns never read like integers.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Parse a raw field, mapping the `?` marker to [`CellValue::Missing`].
    pub fn from_raw(raw: &str) -> Self {
        if raw == MISSING_TOKEN {
            CellValue::Missing
        } else {
            CellValue::Text(raw.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("column '{name}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// One named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of uniquely named, equal-length columns.
///
/// A `Table` is never modified after construction: every transformation
/// (normalization, truncation, splitting) builds a new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(TableError::RaggedColumns {
                    name: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Table { columns })
    }

    /// Build a table from row-major records. Every row must have
    /// `names.len()` cells.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|n| Column::new(n, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            for (col, cell) in columns.iter_mut().zip(row) {
                col.values.push(cell);
            }
        }
        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column ignoring ASCII case; returns the stored name.
    pub fn column_ci(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.name.as_str())
    }

    /// Cells of row `i`, in column order.
    pub fn row(&self, i: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[i]).collect()
    }

    /// A new table holding the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.n_rows());
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[..n].to_vec()))
                .collect(),
        }
    }

    /// A new table holding the given rows in the given order, re-indexed
    /// from zero. Indices must be in range.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| {
                    let values = indices.iter().map(|&i| c.values[i].clone()).collect();
                    Column::new(c.name.clone(), values)
                })
                .collect(),
        }
    }

    /// Replace the column list, keeping names and row count.
    pub(crate) fn with_columns(columns: Vec<Column>) -> Table {
        Table { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::new("a", vec![text("1")]),
            Column::new("a", vec![text("2")]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![text("1"), text("2")]),
            Column::new("b", vec![text("3")]),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::RaggedColumns { actual: 1, .. }));
    }

    #[test]
    fn take_reorders_and_reindexes() {
        let t = Table::from_rows(
            vec!["x".into()],
            vec![vec![text("a")], vec![text("b")], vec![text("c")]],
        )
        .unwrap();
        let picked = t.take(&[2, 0]);
        assert_eq!(picked.n_rows(), 2);
        assert_eq!(picked.row(0), vec![&text("c")]);
        assert_eq!(picked.row(1), vec![&text("a")]);
    }

    #[test]
    fn head_caps_at_row_count() {
        let t = Table::from_rows(vec!["x".into()], vec![vec![text("a")]]).unwrap();
        assert_eq!(t.head(1000).n_rows(), 1);
        assert_eq!(t.head(0).n_rows(), 0);
        assert_eq!(t.head(0).n_cols(), 1);
    }

    #[test]
    fn display_keeps_float_decimal() {
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::Float(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Integer(7).to_string(), "7");
        assert_eq!(CellValue::Missing.to_string(), "?");
    }

    #[test]
    fn case_insensitive_lookup_returns_stored_name() {
        let t = Table::new(vec![Column::new("Protocol_Type", vec![])]).unwrap();
        assert_eq!(t.column_ci("protocol_type"), Some("Protocol_Type"));
        assert_eq!(t.column_ci("service"), None);
    }
}
