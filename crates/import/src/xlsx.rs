use calamine::{open_workbook_auto, Data, Range, Reader};
use procura_core::date::{from_excel_serial, parse_datetime};
use procura_core::{Cell, DateOrder, Table};
use std::path::Path;

use crate::{header_name, LoadError};

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, LoadError> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

/// Reads one sheet, or the first sheet when `sheet` is `None`.
pub fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound(wanted.to_string()))?,
        None => names.first().cloned().ok_or(LoadError::NoSheets)?,
    };

    let range = workbook.worksheet_range(&name)?;
    Ok(range_to_table(&range))
}

/// First row is the header; fully blank data rows are dropped.
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(idx, &cell.to_string()))
        .collect();

    let mut table = Table::new(columns);
    for data_row in rows {
        let row: Vec<Cell> = data_row.iter().map(to_cell).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(row);
    }
    table
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .or_else(|| from_excel_serial(dt.as_f64()))
            .map_or(Cell::Number(dt.as_f64()), Cell::DateTime),
        Data::DateTimeIso(s) => {
            parse_datetime(s, DateOrder::MonthFirst).map_or_else(|| Cell::Text(s.clone()), Cell::DateTime)
        }
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
