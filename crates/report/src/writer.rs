use chrono::Datelike;
use procura_core::columns::{PO_APPROVAL_DATE, USED_APPROVED_DATE};
use procura_core::{Cell, Source, Table};
use rust_xlsxwriter::utility::column_number_to_name;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::assemble::ReportBundle;
use crate::bucket::Bucket;

/// Header of the derived approval lead-time column.
pub const LEAD_TIME_COLUMN: &str = "PR-PO";

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const LEAD_TIME_FORMAT: &str = "0.00";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Workbook error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Sheet {sheet} has too many {what} for a workbook")]
    TooLarge { sheet: String, what: &'static str },
}

/// Renders a bundle to `.xlsx` bytes, one worksheet per sheet in bundle order.
///
/// Nothing touches the filesystem, so a bundle that cannot be rendered leaves
/// no file behind.
pub fn render_bundle(bundle: &ReportBundle) -> Result<Vec<u8>, WriteError> {
    let mut workbook = Workbook::new();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let lead_time_format = Format::new().set_num_format(LEAD_TIME_FORMAT);

    for sheet in bundle.sheets() {
        let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;
        write_table(worksheet, &sheet.name, &sheet.table, &datetime_format)?;

        if bundle.source == Source::Po && sheet.name.starts_with(Bucket::PoApproved.name()) {
            write_lead_time(worksheet, &sheet.name, &sheet.table, &lead_time_format)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(
    worksheet: &mut Worksheet,
    sheet: &str,
    table: &Table,
    datetime_format: &Format,
) -> Result<(), WriteError> {
    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col_num(sheet, col)?, name)?;
    }

    for (idx, cells) in table.rows().iter().enumerate() {
        let row = row_num(sheet, idx + 1)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = col_num(sheet, col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(n) if n.is_finite() => {
                    worksheet.write_number(row, col, *n)?;
                }
                Cell::Number(_) => {}
                Cell::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Cell::DateTime(dt) if (1900..=9999).contains(&dt.year()) => {
                    worksheet.write_datetime_with_format(row, col, dt, datetime_format)?;
                }
                // Outside the workbook date system.
                Cell::DateTime(dt) => {
                    worksheet.write_string(row, col, dt.to_string())?;
                }
            }
        }
    }
    Ok(())
}

/// Appends `PR-PO`: days from the used approval date to the PO approval date.
fn write_lead_time(
    worksheet: &mut Worksheet,
    sheet: &str,
    table: &Table,
    format: &Format,
) -> Result<(), WriteError> {
    let (Some(po_idx), Some(used_idx)) = (
        table.column_index(PO_APPROVAL_DATE),
        table.column_index(USED_APPROVED_DATE),
    ) else {
        tracing::warn!("Skipping {LEAD_TIME_COLUMN} for sheet {sheet}: required date column not found");
        return Ok(());
    };

    let po = column_number_to_name(col_num(sheet, po_idx)?);
    let used = column_number_to_name(col_num(sheet, used_idx)?);
    let col = col_num(sheet, table.width())?;

    worksheet.write_string(0, col, LEAD_TIME_COLUMN)?;
    for idx in 1..=table.len() {
        let row = row_num(sheet, idx)?;
        // Formula rows are 1-based.
        let formula = format!("={po}{excel_row}-{used}{excel_row}", excel_row = idx + 1);
        worksheet.write_formula_with_format(row, col, formula.as_str(), format)?;
    }
    Ok(())
}

fn col_num(sheet: &str, idx: usize) -> Result<u16, WriteError> {
    u16::try_from(idx).map_err(|_| WriteError::TooLarge {
        sheet: sheet.to_string(),
        what: "columns",
    })
}

fn row_num(sheet: &str, idx: usize) -> Result<u32, WriteError> {
    u32::try_from(idx).map_err(|_| WriteError::TooLarge {
        sheet: sheet.to_string(),
        what: "rows",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_bundle() {
        let mut bundle = ReportBundle::new(Source::Rfm);
        bundle.push(
            "Sheet".into(),
            Table::with_rows(
                vec!["a".into(), "b".into()],
                vec![vec![Cell::from("x"), Cell::Number(f64::NAN)], vec![Cell::Bool(true)]],
            ),
        );
        let bytes = render_bundle(&bundle).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn invalid_sheet_name_is_an_error() {
        let mut bundle = ReportBundle::new(Source::Po);
        bundle.push("bad[name]".into(), Table::default());
        assert!(matches!(render_bundle(&bundle), Err(WriteError::Xlsx(_))));
    }

    #[test]
    fn index_limits() {
        assert_eq!(col_num("s", 3).unwrap(), 3);
        assert!(matches!(col_num("s", 70_000), Err(WriteError::TooLarge { what: "columns", .. })));
        assert_eq!(row_num("s", 10).unwrap(), 10);
    }
}
