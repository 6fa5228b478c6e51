//! Delimited-file ingestion into a [`Table`].
//!
//! A column becomes numeric when every present cell parses as `f64` after
//! trimming; otherwise it stays text. Zero-length cells and the usual NA
//! tokens (`NA`, `N/A`, `NULL`, `NaN`, ...) are missing. Tokens match exactly,
//! so a lone space keeps a column textual and is left for cleaning to coerce.

use std::fs::File;
use std::path::Path;

use cc_core::{Column, Error, Result, Table};

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

/// Read a header-first CSV (or `.tsv`) file.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(Error::Schema(format!("{}: missing header row", path.display())));
    }
    if let Some(pos) = headers.iter().position(String::is_empty) {
        return Err(Error::Schema(format!("{}: header {} is empty", path.display(), pos + 1)));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(Error::Schema(format!(
                "{}: row {} has {} fields, header has {}",
                path.display(),
                i + 2,
                record.len(),
                headers.len()
            )));
        }
        for (col, field) in cells.iter_mut().zip(record.iter()) {
            col.push(field.to_string());
        }
    }
    let n_rows = cells.first().map_or(0, Vec::len);
    if n_rows == 0 {
        return Err(Error::Schema(format!("{}: no data rows", path.display())));
    }

    let columns: Vec<(String, Column)> =
        headers.into_iter().zip(cells).map(|(name, raw)| (name, infer_column(raw))).collect();
    let table = Table::from_columns(columns)?;
    tracing::info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_cols(),
        "table loaded"
    );
    Ok(table)
}

/// Cell values read as missing, matched without trimming.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

fn infer_column(raw: Vec<String>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|s| if is_na(s) { Some(None) } else { s.trim().parse::<f64>().ok().map(Some) })
        .collect();
    match parsed {
        Some(values) if values.iter().any(Option::is_some) => Column::Numeric(values),
        _ => Column::Text(raw.into_iter().map(|s| if is_na(&s) { None } else { Some(s) }).collect()),
    }
}

/// Write a table as CSV with a header row; missing cells are left empty.
pub fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    for i in 0..table.n_rows() {
        let row: Vec<String> = table
            .iter()
            .map(|(_, col)| if col.is_missing(i) { String::new() } else { col.format_cell(i) })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = table.n_rows(), "table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::ColumnKind;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_path(filename: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let mut p = std::env::temp_dir();
        p.push(format!("churncause_ingest_{}_{}_{}", std::process::id(), nanos, filename));
        p
    }

    #[test]
    fn blank_space_keeps_column_textual() {
        let path = tmp_path("raw.csv");
        std::fs::write(
            &path,
            "customerID,tenure,TotalCharges,Churn\nA,1,29.85,No\nB,0, ,Yes\nC,34,,No\n",
        )
        .unwrap();
        let t = read_csv_table(&path).unwrap();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.require("tenure").unwrap().kind(), ColumnKind::Numeric);
        let total = t.require("TotalCharges").unwrap();
        assert_eq!(total.kind(), ColumnKind::Text);
        assert_eq!(total.as_text().unwrap()[1].as_deref(), Some(" "));
        assert_eq!(total.as_text().unwrap()[2], None);
        assert_eq!(t.require("Churn").unwrap().kind(), ColumnKind::Text);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn na_tokens_are_missing_and_their_rows_dropped() {
        let path = tmp_path("na.csv");
        std::fs::write(
            &path,
            "customerID,tenure,MonthlyCharges,TotalCharges,Contract,InternetService,Churn\n\
             A,1,29.85,29.85,Month-to-month,DSL,No\n\
             B,NA,56.95,1889.5,One year,DSL,No\n\
             C,34,53.85,108.15,Two year,N/A,Yes\n\
             D,2,42.3,null,Month-to-month,DSL,Yes\n",
        )
        .unwrap();
        let t = read_csv_table(&path).unwrap();
        let tenure = t.require("tenure").unwrap();
        assert_eq!(tenure.kind(), ColumnKind::Numeric);
        assert_eq!(tenure.as_numeric().unwrap(), &[Some(1.0), None, Some(34.0), Some(2.0)]);
        assert_eq!(t.require("TotalCharges").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(t.require("InternetService").unwrap().as_text().unwrap()[2], None);

        let cleaned =
            cc_inference::clean_table(t, &cc_inference::CleaningConfig::default()).unwrap();
        assert_eq!(cleaned.table.n_rows(), 1);
        assert_eq!(cleaned.report.dropped_missing, 3);
        assert_eq!(cleaned.table.numeric_values("tenure").unwrap(), vec![1.0]);
        assert!(cleaned.encoding("tenure").is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_cells_in_numeric_column_are_missing() {
        let path = tmp_path("num.tsv");
        std::fs::write(&path, "a\tb\n1\t2.5\n\t3\n").unwrap();
        let t = read_csv_table(&path).unwrap();
        assert_eq!(t.require("a").unwrap().as_numeric().unwrap(), &[Some(1.0), None]);
        assert_eq!(t.require("b").unwrap().as_numeric().unwrap(), &[Some(2.5), Some(3.0)]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn ragged_and_empty_files_are_schema_errors() {
        let ragged = tmp_path("ragged.csv");
        std::fs::write(&ragged, "a,b\n1,2\n3\n").unwrap();
        assert!(matches!(read_csv_table(&ragged), Err(Error::Schema(_))));
        std::fs::remove_file(&ragged).ok();

        let header_only = tmp_path("header.csv");
        std::fs::write(&header_only, "a,b\n").unwrap();
        assert!(matches!(read_csv_table(&header_only), Err(Error::Schema(_))));
        std::fs::remove_file(&header_only).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(read_csv_table(&tmp_path("absent.csv")), Err(Error::Io(_))));
    }

    #[test]
    fn written_table_reads_back() {
        let t = Table::from_columns(vec![
            ("x", Column::Numeric(vec![Some(1.0), Some(2.5)])),
            ("label", Column::Text(vec![Some("a".into()), None])),
        ])
        .unwrap();
        let path = tmp_path("out.csv");
        write_csv_table(&t, &path).unwrap();
        let back = read_csv_table(&path).unwrap();
        assert_eq!(back, t);
        std::fs::remove_file(&path).ok();
    }
}
