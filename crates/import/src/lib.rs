pub mod csv;
pub mod xlsx;

pub use crate::csv::{read_csv, CsvOptions};
pub use crate::xlsx::{load_workbook, sheet_names};

use procura_core::Table;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Unsupported file format: {0} (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFormat(String),
    #[error("Workbook has no sheets")]
    NoSheets,
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    Excel(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Loads the first sheet of a workbook, or a whole CSV file read with `csv_options`,
/// by extension.
pub fn load_table(path: &Path, csv_options: &CsvOptions) -> Result<Table, LoadError> {
    load(path, None, csv_options)
}

/// Reads `sheet` from a workbook, or the first sheet when `None`. CSV files
/// ignore it and use default options.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    load(path, sheet, &CsvOptions::default())
}

fn load(path: &Path, sheet: Option<&str>, csv_options: &CsvOptions) -> Result<Table, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    tracing::info!("Loading file: {}", path.display());
    let table = match ext.as_str() {
        "csv" => crate::csv::load_csv(path, csv_options)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet)?,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };
    tracing::debug!(
        rows = table.len(),
        columns = table.width(),
        "Loaded {}",
        path.display()
    );
    Ok(table)
}

/// Column name for a header cell; blank headers become `Unnamed: <idx>`.
pub(crate) fn header_name(idx: usize, raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name.to_string()
    }
}
