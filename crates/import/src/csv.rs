use procura_core::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{header_name, LoadError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub has_header: bool,
    pub delimiter: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: ",".to_string(),
        }
    }
}

/// Reads CSV into a table. Every non-empty field becomes `Cell::Text`.
///
/// Without a header row, columns are named by position (`"0"`, `"1"`, ...).
pub fn read_csv<R: Read>(data: R, options: &CsvOptions) -> Result<Table, LoadError> {
    let delimiter = options.delimiter.as_bytes().first().copied().unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let mut columns: Vec<String> = if options.has_header {
        reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| header_name(idx, h))
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row: Vec<Cell> = record
            .iter()
            .map(|f| if f.is_empty() { Cell::Empty } else { Cell::from(f) })
            .collect();
        if !options.has_header {
            while columns.len() < row.len() {
                columns.push(columns.len().to_string());
            }
        }
        rows.push(row);
    }

    Ok(Table::with_rows(columns, rows))
}

pub fn load_csv(path: &Path, options: &CsvOptions) -> Result<Table, LoadError> {
    let file = File::open(path)?;
    read_csv(file, options)
}
