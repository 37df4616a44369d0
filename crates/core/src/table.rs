use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// A single spreadsheet value. `Empty` is the null of the reporting pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_datetime().map(|dt| dt.date())
    }

    /// Renders the cell as a join key.
    ///
    /// Integral numbers drop their fractional part so that `12345.0` read from a
    /// workbook matches `"12345"` read from a CSV export.
    pub fn key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) if n.is_finite() => Some(n.to_string()),
            Cell::Number(_) => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::DateTime(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Empty, Into::into)
    }
}

/// An in-memory sheet: ordered column names and rows of equal width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table { columns, rows: Vec::new() }
    }

    /// Builds a table, padding or cutting each row to the header width.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn row(&self, idx: usize) -> Option<RowRef<'_>> {
        self.rows.get(idx).map(|cells| RowRef { table: self, cells })
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef { table: self, cells })
    }

    /// Values of one column in row order, or `None` when the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Replaces the column in place when it exists, otherwise appends it.
    ///
    /// `values` shorter than the table are padded with `Empty`.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Cell::Empty);
                }
                self.columns.len() - 1
            }
        };
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[idx] = values.next().unwrap_or_default();
        }
    }

    /// Rewrites every value of an existing column. Returns `false` if it is absent.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&Cell) -> Cell) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// Copy of the table without `name`; an absent column is a no-op.
    pub fn drop_column(&self, name: &str) -> Table {
        let Some(idx) = self.column_index(name) else {
            return self.clone();
        };
        let mut columns = self.columns.clone();
        columns.remove(idx);
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut r = r.clone();
                r.remove(idx);
                r
            })
            .collect();
        Table { columns, rows }
    }

    /// Rows satisfying `pred`, in input order.
    pub fn filter(&self, mut pred: impl FnMut(&RowRef<'_>) -> bool) -> Table {
        let rows = self
            .iter()
            .filter(|row| pred(row))
            .map(|row| row.cells.to_vec())
            .collect();
        Table { columns: self.columns.clone(), rows }
    }
}

/// Borrowed view of one row with by-name access.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.column_index(column).map(|idx| &self.cells[idx])
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Cell::as_text)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).and_then(Cell::as_date)
    }

    pub fn datetime(&self, column: &str) -> Option<NaiveDateTime> {
        self.get(column).and_then(Cell::as_datetime)
    }
}
