//! Cleaning and encoding of the raw churn table.
//!
//! The cleaning sequence is fixed:
//!
//! 1. coerce the configured monetary columns to numeric (unparsable → missing);
//! 2. drop every row that has a missing cell;
//! 3. map the target label to {0, 1} and drop rows whose label is not in the mapping;
//! 4. drop the identifier column;
//! 5. label-encode every remaining text column to integer codes.
//!
//! Each step is a standalone function so stages can be tested and reused; the
//! whole sequence is [`clean_table`].

use std::collections::HashMap;

use cc_core::{Column, ColumnKind, Error, Result, Table};
use serde::{Deserialize, Serialize};

/// How integer codes are assigned to category strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingOrder {
    /// Codes follow the order in which values first appear in the column.
    #[default]
    FirstSeen,
    /// Codes follow the lexicographic order of the values.
    Sorted,
}

/// Text → {0, 1} mapping of the binary target label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetMapping {
    /// Label mapped to 1.
    pub positive: String,
    /// Label mapped to 0.
    pub negative: String,
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self { positive: "Yes".into(), negative: "No".into() }
    }
}

/// Column roles used by [`clean_table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Identifier column removed after cleaning.
    pub id_column: String,
    /// Binary target label column.
    pub target_column: String,
    /// Columns stored as text that must be coerced to numbers.
    pub numeric_columns: Vec<String>,
    /// Label mapping for the target.
    pub target_mapping: TargetMapping,
    /// Code assignment order for categorical columns.
    pub encoding_order: EncodingOrder,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            id_column: "customerID".into(),
            target_column: "Churn".into(),
            numeric_columns: vec!["TotalCharges".into()],
            target_mapping: TargetMapping::default(),
            encoding_order: EncodingOrder::FirstSeen,
        }
    }
}

/// Integer codes assigned to one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoding {
    /// Encoded column name.
    pub column: String,
    /// Original category strings; the index is the code.
    pub classes: Vec<String>,
}

impl LabelEncoding {
    /// Code assigned to `value`, if it was seen.
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }

    /// Original label for `code`.
    pub fn label_of(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Number of distinct categories.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// What cleaning did, for logging and the run summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    /// Rows in the raw table.
    pub rows_in: usize,
    /// Cells turned into missing values by numeric coercion.
    pub coerced_to_missing: usize,
    /// Rows dropped because of a missing cell.
    pub dropped_missing: usize,
    /// Rows dropped because the target label was outside the mapping.
    pub dropped_unmapped_target: usize,
    /// Rows in the cleaned table.
    pub rows_out: usize,
    /// Columns removed.
    pub dropped_columns: Vec<String>,
    /// Encodings of every label-encoded column.
    pub encodings: Vec<LabelEncoding>,
}

/// Cleaned table plus the cleaning report.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    /// Fully numeric table, no missing values.
    pub table: Table,
    /// Cleaning statistics and encodings.
    pub report: CleaningReport,
}

impl CleanedTable {
    /// Encoding for `column`, if it was label-encoded.
    pub fn encoding(&self, column: &str) -> Option<&LabelEncoding> {
        self.report.encodings.iter().find(|e| e.column == column)
    }
}

/// Coerce a column to numeric.
///
/// Text cells are trimmed and parsed as `f64`; anything unparsable becomes
/// missing. Returns the new column and how many present cells were lost.
pub fn coerce_numeric(column: &Column) -> (Column, usize) {
    match column {
        Column::Numeric(_) => (column.clone(), 0),
        Column::Text(cells) => {
            let mut lost = 0usize;
            let out = cells
                .iter()
                .map(|cell| {
                    let parsed = cell.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
                    if cell.is_some() && parsed.is_none() {
                        lost += 1;
                    }
                    parsed
                })
                .collect();
            (Column::Numeric(out), lost)
        }
    }
}

/// Drop every row with at least one missing cell. Returns the table and the number of dropped rows.
pub fn drop_missing_rows(table: &Table) -> Result<(Table, usize)> {
    let keep: Vec<bool> = (0..table.n_rows()).map(|i| !table.row_has_missing(i)).collect();
    let dropped = keep.iter().filter(|k| !**k).count();
    Ok((table.filter_rows(&keep)?, dropped))
}

/// Map a binary label column to {0, 1}.
///
/// Text labels outside the mapping become missing. A numeric column is
/// accepted only if it already holds 0/1 values.
pub fn map_binary_target(name: &str, column: &Column, mapping: &TargetMapping) -> Result<Column> {
    match column {
        Column::Text(cells) => Ok(Column::Numeric(
            cells
                .iter()
                .map(|cell| match cell.as_deref() {
                    Some(v) if v == mapping.positive => Some(1.0),
                    Some(v) if v == mapping.negative => Some(0.0),
                    _ => None,
                })
                .collect(),
        )),
        Column::Numeric(cells) => {
            if let Some(bad) = cells.iter().flatten().find(|v| **v != 0.0 && **v != 1.0) {
                return Err(Error::Schema(format!(
                    "target column '{name}' is numeric but contains {bad} (expected 0/1)"
                )));
            }
            Ok(column.clone())
        }
    }
}

/// Label-encode a text column.
///
/// Returns `None` for numeric columns. Missing cells stay missing.
pub fn label_encode(column: &Column, order: EncodingOrder) -> Option<(Column, Vec<String>)> {
    let cells = column.as_text()?;

    let mut classes: Vec<String> = Vec::new();
    for v in cells.iter().flatten() {
        if !classes.contains(v) {
            classes.push(v.clone());
        }
    }
    if order == EncodingOrder::Sorted {
        classes.sort();
    }

    let codes: HashMap<&str, usize> =
        classes.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
    let encoded = cells
        .iter()
        .map(|cell| cell.as_deref().and_then(|v| codes.get(v)).map(|&c| c as f64))
        .collect();
    Some((Column::Numeric(encoded), classes))
}

/// Label-encode every text column of `table`.
pub fn encode_categoricals(
    mut table: Table,
    order: EncodingOrder,
) -> Result<(Table, Vec<LabelEncoding>)> {
    let text_columns: Vec<String> = table
        .iter()
        .filter(|(_, c)| c.kind() == ColumnKind::Text)
        .map(|(n, _)| n.to_string())
        .collect();

    let mut encodings = Vec::with_capacity(text_columns.len());
    for name in text_columns {
        let (encoded, classes) = match label_encode(table.require(&name)?, order) {
            Some(pair) => pair,
            None => continue,
        };
        tracing::debug!(column = %name, classes = classes.len(), "label-encoded column");
        table.replace_column(&name, encoded)?;
        encodings.push(LabelEncoding { column: name, classes });
    }
    Ok((table, encodings))
}

/// Run the full cleaning sequence on a raw table.
///
/// Fails with a schema error when the identifier, target or a configured
/// numeric column is missing, and with a validation error when nothing
/// survives cleaning.
pub fn clean_table(raw: Table, config: &CleaningConfig) -> Result<CleanedTable> {
    raw.require(&config.id_column)?;
    raw.require(&config.target_column)?;
    for name in &config.numeric_columns {
        raw.require(name)?;
    }

    let mut report = CleaningReport { rows_in: raw.n_rows(), ..Default::default() };
    let mut table = raw;

    for name in &config.numeric_columns {
        let (coerced, lost) = coerce_numeric(table.require(name)?);
        if lost > 0 {
            tracing::info!(column = %name, cells = lost, "non-numeric values coerced to missing");
        }
        report.coerced_to_missing += lost;
        table.replace_column(name, coerced)?;
    }

    let (mut table, dropped) = drop_missing_rows(&table)?;
    report.dropped_missing = dropped;
    tracing::info!(dropped, remaining = table.n_rows(), "dropped rows with missing values");

    let mapped = map_binary_target(
        &config.target_column,
        table.require(&config.target_column)?,
        &config.target_mapping,
    )?;
    table.replace_column(&config.target_column, mapped)?;
    let (mut table, unmapped) = drop_missing_rows(&table)?;
    if unmapped > 0 {
        tracing::warn!(
            column = %config.target_column,
            rows = unmapped,
            "target labels outside the mapping; rows dropped"
        );
    }
    report.dropped_unmapped_target = unmapped;

    table.remove_column(&config.id_column)?;
    report.dropped_columns.push(config.id_column.clone());

    let (table, encodings) = encode_categoricals(table, config.encoding_order)?;
    report.encodings = encodings;
    report.rows_out = table.n_rows();

    if table.n_rows() == 0 {
        return Err(Error::Validation("cleaning removed every row".into()));
    }
    tracing::info!(rows = report.rows_out, columns = table.n_cols(), "table cleaned");

    Ok(CleanedTable { table, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Column {
        Column::Text(
            values.iter().map(|v| if v.is_empty() { None } else { Some(v.to_string()) }).collect(),
        )
    }

    fn num(values: &[f64]) -> Column {
        Column::Numeric(values.iter().map(|&v| Some(v)).collect())
    }

    /// Ten customers, two with a blank `TotalCharges`.
    fn raw_ten() -> Table {
        Table::from_columns(vec![
            ("customerID", text(&["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"])),
            (
                "Contract",
                text(&[
                    "Month-to-month",
                    "One year",
                    "Month-to-month",
                    "Two year",
                    "One year",
                    "Month-to-month",
                    "Two year",
                    "Month-to-month",
                    "One year",
                    "Month-to-month",
                ]),
            ),
            ("tenure", num(&[1.0, 34.0, 2.0, 45.0, 0.0, 8.0, 22.0, 10.0, 0.0, 62.0])),
            (
                "TotalCharges",
                text(&[
                    "29.85", "1889.5", "108.15", "1840.75", " ", "820.5", "1949.4", "301.9", " ",
                    "3487.95",
                ]),
            ),
            ("Churn", text(&["Yes", "No", "Yes", "No", "No", "Yes", "No", "No", "No", "Yes"])),
        ])
        .unwrap()
    }

    #[test]
    fn ten_rows_two_missing_yields_eight() {
        let cleaned = clean_table(raw_ten(), &CleaningConfig::default()).unwrap();
        assert_eq!(cleaned.table.n_rows(), 8);
        assert_eq!(cleaned.report.rows_in, 10);
        assert_eq!(cleaned.report.coerced_to_missing, 2);
        assert_eq!(cleaned.report.dropped_missing, 2);
        assert_eq!(cleaned.report.rows_out, 8);
    }

    #[test]
    fn churn_labels_map_to_binary() {
        let cleaned = clean_table(raw_ten(), &CleaningConfig::default()).unwrap();
        let churn = cleaned.table.numeric_values("Churn").unwrap();
        // Rows 4 and 8 were dropped.
        assert_eq!(churn, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn cleaned_table_invariants() {
        let cleaned = clean_table(raw_ten(), &CleaningConfig::default()).unwrap();
        let t = &cleaned.table;
        assert!(!t.has_column("customerID"));
        assert_eq!(t.require("TotalCharges").unwrap().kind(), ColumnKind::Numeric);
        for (_, col) in t.iter() {
            assert_eq!(col.kind(), ColumnKind::Numeric);
            assert_eq!(col.n_missing(), 0);
        }
        for v in t.numeric_values("Churn").unwrap() {
            assert!(v == 0.0 || v == 1.0);
        }
    }

    #[test]
    fn first_seen_encoding_is_stable() {
        let cleaned = clean_table(raw_ten(), &CleaningConfig::default()).unwrap();
        let enc = cleaned.encoding("Contract").unwrap();
        assert_eq!(enc.classes, vec!["Month-to-month", "One year", "Two year"]);
        let codes = cleaned.table.numeric_values("Contract").unwrap();
        // Same category → same code everywhere.
        assert_eq!(codes, vec![0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 0.0, 0.0]);
        assert_eq!(enc.code_of("Two year"), Some(2));
        assert_eq!(enc.code_of("Weekly"), None);
        assert_eq!(enc.label_of(1), Some("One year"));
    }

    #[test]
    fn sorted_encoding_orders_lexicographically() {
        let col = text(&["b", "a", "c", "a"]);
        let (encoded, classes) = label_encode(&col, EncodingOrder::Sorted).unwrap();
        assert_eq!(classes, vec!["a", "b", "c"]);
        assert_eq!(encoded, num(&[1.0, 0.0, 2.0, 0.0]));

        let (encoded, classes) = label_encode(&col, EncodingOrder::FirstSeen).unwrap();
        assert_eq!(classes, vec!["b", "a", "c"]);
        assert_eq!(encoded, num(&[0.0, 1.0, 2.0, 1.0]));
    }

    #[test]
    fn unmapped_target_rows_are_dropped() {
        let raw = Table::from_columns(vec![
            ("customerID", text(&["a", "b", "c"])),
            ("Churn", text(&["Yes", "Maybe", "No"])),
        ])
        .unwrap();
        let cleaned = clean_table(raw, &CleaningConfig { numeric_columns: vec![], ..Default::default() })
            .unwrap();
        assert_eq!(cleaned.table.numeric_values("Churn").unwrap(), vec![1.0, 0.0]);
        assert_eq!(cleaned.report.dropped_unmapped_target, 1);
    }

    #[test]
    fn missing_schema_columns_fail() {
        let raw = Table::from_columns(vec![("Churn", text(&["Yes"]))]).unwrap();
        let err = clean_table(raw, &CleaningConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)), "{err}");

        let raw = Table::from_columns(vec![("customerID", text(&["a"]))]).unwrap();
        assert!(matches!(clean_table(raw, &CleaningConfig::default()), Err(Error::Schema(_))));
    }

    #[test]
    fn all_rows_removed_is_an_error() {
        let raw = Table::from_columns(vec![
            ("customerID", text(&["a", "b"])),
            ("TotalCharges", text(&[" ", "n/a"])),
            ("Churn", text(&["Yes", "No"])),
        ])
        .unwrap();
        assert!(matches!(
            clean_table(raw, &CleaningConfig::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn numeric_target_must_be_binary() {
        assert!(map_binary_target("Churn", &num(&[0.0, 1.0]), &TargetMapping::default()).is_ok());
        assert!(matches!(
            map_binary_target("Churn", &num(&[0.0, 2.0]), &TargetMapping::default()),
            Err(Error::Schema(_))
        ));
    }
}
