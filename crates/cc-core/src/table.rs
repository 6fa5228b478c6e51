//! Column-oriented observation table.
//!
//! A [`Table`] is an ordered list of named, equal-length [`Column`]s. Each
//! column is either numeric or text; a `None` cell is a missing value. Row
//! identity is positional only.
//!
//! Operations that reshape the table (row filtering, column removal) return
//! new values or take `&mut self` explicitly, so every pipeline stage states
//! what it changes.

use std::fmt;

use crate::{Error, Result};

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `f64` cells.
    Numeric,
    /// UTF-8 string cells.
    Text,
}

/// A single named column's cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric cells (`None` = missing).
    Numeric(Vec<Option<f64>>),
    /// Text cells (`None` = missing).
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// `true` if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    /// `true` if cell `i` is missing.
    pub fn is_missing(&self, i: usize) -> bool {
        match self {
            Column::Numeric(v) => v[i].is_none_or(|x| x.is_nan()),
            Column::Text(v) => v[i].is_none(),
        }
    }

    /// Number of missing cells.
    pub fn n_missing(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Numeric cells, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Text cells, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Keep only cells where `keep[i]` is true.
    pub fn filter(&self, keep: &[bool]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(
                v.iter().zip(keep).filter(|(_, k)| **k).map(|(x, _)| *x).collect(),
            ),
            Column::Text(v) => Column::Text(
                v.iter().zip(keep).filter(|(_, k)| **k).map(|(x, _)| x.clone()).collect(),
            ),
        }
    }

    fn take_head(&self, n: usize) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(v.iter().take(n).copied().collect()),
            Column::Text(v) => Column::Text(v.iter().take(n).cloned().collect()),
        }
    }

    /// Render cell `i` for display (`NaN` for missing).
    pub fn format_cell(&self, i: usize) -> String {
        match self {
            Column::Numeric(v) => match v[i] {
                Some(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => {
                    format!("{}", x as i64)
                }
                Some(x) => format!("{x}"),
                None => "NaN".to_string(),
            },
            Column::Text(v) => v[i].clone().unwrap_or_else(|| "NaN".to_string()),
        }
    }
}

/// Ordered collection of named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, column)` pairs.
    ///
    /// Fails if names repeat or column lengths differ.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, col) in columns {
            table.push_column(name, col)?;
        }
        Ok(table)
    }

    /// Number of rows (0 for a table without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Iterate `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// `true` if a column called `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Look up a column by name, failing with a schema error if absent.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| Error::Schema(format!("missing column '{name}'")))
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(Error::Schema(format!("duplicate column '{name}'")));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(Error::Schema(format!(
                "column '{}' has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replace an existing column in place (same position, same length).
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| Error::Schema(format!("missing column '{name}'")))?;
        if column.len() != self.n_rows() {
            return Err(Error::Schema(format!(
                "replacement for '{}' has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Remove a column and return it.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let idx = self
            .position(name)
            .ok_or_else(|| Error::Schema(format!("missing column '{name}'")))?;
        self.names.remove(idx);
        Ok(self.columns.remove(idx))
    }

    /// `true` if any cell in row `i` is missing.
    pub fn row_has_missing(&self, i: usize) -> bool {
        self.columns.iter().any(|c| c.is_missing(i))
    }

    /// New table with only the rows where `keep[i]` is true.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Table> {
        if keep.len() != self.n_rows() {
            return Err(Error::Validation(format!(
                "row mask has length {}, table has {} rows",
                keep.len(),
                self.n_rows()
            )));
        }
        Ok(Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.filter(keep)).collect(),
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take_head(n)).collect(),
        }
    }

    /// Fully observed numeric values of a column.
    ///
    /// Fails with a schema error if the column is absent or textual, and with
    /// a validation error if any cell is missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let cells = self.require(name)?.as_numeric().ok_or_else(|| {
            Error::Schema(format!("column '{name}' is not numeric (encode it first)"))
        })?;
        cells
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Some(x) if !x.is_nan() => Ok(*x),
                _ => Err(Error::Validation(format!("column '{name}' has a missing value at row {i}"))),
            })
            .collect()
    }

    /// Names of numeric columns, in order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.iter().filter(|(_, c)| c.kind() == ColumnKind::Numeric).map(|(n, _)| n).collect()
    }
}

impl fmt::Display for Table {
    /// Right-aligned grid with a leading row index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n_rows();
        let index_w = n.saturating_sub(1).to_string().len();
        let mut widths = Vec::with_capacity(self.n_cols());
        for (name, col) in self.iter() {
            let w = (0..n).map(|i| col.format_cell(i).chars().count()).max().unwrap_or(0);
            widths.push(w.max(name.chars().count()));
        }

        write!(f, "{:index_w$}", "")?;
        for (name, w) in self.names.iter().zip(&widths) {
            write!(f, "  {name:>w$}")?;
        }
        writeln!(f)?;

        for i in 0..n {
            write!(f, "{i:<index_w$}")?;
            for (col, w) in self.columns.iter().zip(&widths) {
                write!(f, "  {:>w$}", col.format_cell(i))?;
            }
            writeln!(f)?;
        }
        write!(f, "\n[{} rows x {} columns]", n, self.n_cols())
    }
}
