pub mod columns;
pub mod date;
pub mod period;
pub mod table;

pub use columns::Source;
pub use date::DateOrder;
pub use period::{DateRange, PeriodError};
pub use table::{Cell, RowRef, Table};
