use procura_core::columns::{
    BACKGROUND_UPDATE, PO_APPROVAL_DATE, REQUISITION_APPROVED_DATE, REQUISITION_NUMBER,
    REQUISITION_REQUIRED_DATE, UPDATED_APPROVED_DATE, UPDATED_REQUIRED_DATE, USED_APPROVED_DATE,
    USED_REQUIRED_DATE,
};
use procura_core::date::coerce;
use procura_core::{Cell, DateOrder, Source, Table};
use std::collections::HashMap;
use std::fmt;

/// Curated corrections for one requisition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverrideRecord {
    pub approved_date: Cell,
    pub required_date: Cell,
    pub background: Cell,
}

/// Normalization rows keyed by `Requisition Number`. The first row of a
/// duplicated key wins; rows with an empty key are ignored.
#[derive(Debug, Clone, Default)]
pub struct NormalizationIndex {
    records: HashMap<String, OverrideRecord>,
    duplicates: usize,
}

impl NormalizationIndex {
    pub fn get(&self, key: &str) -> Option<&OverrideRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped because their key was already indexed.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    fn build(table: &Table) -> Self {
        for column in [UPDATED_APPROVED_DATE, UPDATED_REQUIRED_DATE, BACKGROUND_UPDATE] {
            if !table.has_column(column) {
                tracing::warn!("Normalization data has no '{column}' column; treating it as empty");
            }
        }

        let mut index = NormalizationIndex::default();
        for row in table.iter() {
            let Some(key) = row.get(REQUISITION_NUMBER).and_then(Cell::key) else {
                continue;
            };
            if index.records.contains_key(&key) {
                index.duplicates += 1;
                continue;
            }
            let field = |name: &str| row.get(name).cloned().unwrap_or_default();
            index.records.insert(
                key,
                OverrideRecord {
                    approved_date: field(UPDATED_APPROVED_DATE),
                    required_date: field(UPDATED_REQUIRED_DATE),
                    background: field(BACKGROUND_UPDATE),
                },
            );
        }
        index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotProvided,
    MissingKeyColumn,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotProvided => write!(f, "normalization data not provided"),
            SkipReason::MissingKeyColumn => {
                write!(f, "normalization data has no '{REQUISITION_NUMBER}' column")
            }
        }
    }
}

/// Outcome of checking whether normalization data can be used.
#[derive(Debug, Clone)]
pub enum Enrichment {
    Enriched(NormalizationIndex),
    Skipped(SkipReason),
}

impl Enrichment {
    pub fn prepare(normalization: Option<&Table>) -> Self {
        let Some(table) = normalization else {
            tracing::warn!("{}. Skipping data enrichment.", SkipReason::NotProvided);
            return Enrichment::Skipped(SkipReason::NotProvided);
        };
        if !table.has_column(REQUISITION_NUMBER) {
            tracing::warn!("{}. Skipping data enrichment.", SkipReason::MissingKeyColumn);
            return Enrichment::Skipped(SkipReason::MissingKeyColumn);
        }

        let index = NormalizationIndex::build(table);
        tracing::info!("Normalization index: {} requisitions", index.len());
        if index.duplicates() > 0 {
            tracing::debug!(
                "Dropped {} duplicate normalization rows (first occurrence kept)",
                index.duplicates()
            );
        }
        Enrichment::Enriched(index)
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    /// Copy of `table` with override and `used_*` columns added, and date columns coerced.
    ///
    /// `used_approved_date` takes the raw override when it is non-empty, else the
    /// original approved date; the choice is made before parsing, so an override
    /// that cannot be parsed still wins and yields an empty date.
    pub fn apply(&self, table: &Table, source: Source) -> Table {
        let mut out = table.clone();
        let original_approved = column_or_empty(table, REQUISITION_APPROVED_DATE);

        match self {
            Enrichment::Enriched(index) => {
                let records: Vec<Option<&OverrideRecord>> = table
                    .iter()
                    .map(|row| {
                        row.get(REQUISITION_NUMBER)
                            .and_then(Cell::key)
                            .and_then(|key| index.get(&key))
                    })
                    .collect();
                let pick = |f: fn(&OverrideRecord) -> &Cell| -> Vec<Cell> {
                    records.iter().map(|r| r.map(f).cloned().unwrap_or_default()).collect()
                };

                let updated_approved = pick(|r| &r.approved_date);
                let used_approved = updated_approved
                    .iter()
                    .zip(original_approved)
                    .map(|(updated, original)| {
                        if updated.is_empty() {
                            original
                        } else {
                            updated.clone()
                        }
                    })
                    .collect();

                out.set_column(UPDATED_APPROVED_DATE, updated_approved);
                out.set_column(UPDATED_REQUIRED_DATE, pick(|r| &r.required_date));
                out.set_column(BACKGROUND_UPDATE, pick(|r| &r.background));
                out.set_column(USED_APPROVED_DATE, used_approved);
            }
            Enrichment::Skipped(_) => {
                out.set_column(USED_APPROVED_DATE, original_approved);
                out.set_column(USED_REQUIRED_DATE, column_or_empty(table, REQUISITION_REQUIRED_DATE));
                out.set_column(UPDATED_APPROVED_DATE, Vec::new());
                out.set_column(UPDATED_REQUIRED_DATE, Vec::new());
                out.set_column(BACKGROUND_UPDATE, Vec::new());
            }
        }

        if source == Source::Po {
            out.map_column(PO_APPROVAL_DATE, |c| coerce(c, DateOrder::MonthFirst));
        }
        out.map_column(USED_APPROVED_DATE, |c| coerce(c, DateOrder::MonthFirst));
        out.map_column(UPDATED_APPROVED_DATE, |c| coerce(c, DateOrder::DayFirst));
        out.map_column(UPDATED_REQUIRED_DATE, |c| coerce(c, DateOrder::DayFirst));
        out
    }
}

fn column_or_empty(table: &Table, name: &str) -> Vec<Cell> {
    match table.column(name) {
        Some(values) => values.into_iter().cloned().collect(),
        None => vec![Cell::Empty; table.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    fn po_table() -> Table {
        Table::with_rows(
            vec![
                REQUISITION_NUMBER.into(),
                REQUISITION_APPROVED_DATE.into(),
                REQUISITION_REQUIRED_DATE.into(),
                PO_APPROVAL_DATE.into(),
            ],
            vec![
                vec![
                    Cell::from("RQ-1"),
                    Cell::DateTime(dt(2024, 3, 1)),
                    Cell::DateTime(dt(2024, 4, 1)),
                    Cell::from("2024-03-20"),
                ],
                vec![
                    Cell::from("RQ-2"),
                    Cell::DateTime(dt(2024, 3, 2)),
                    Cell::Empty,
                    Cell::from("not yet"),
                ],
                vec![Cell::Number(3.0), Cell::DateTime(dt(2024, 3, 3)), Cell::Empty, Cell::Empty],
            ],
        )
    }

    fn normalization(rows: Vec<Vec<Cell>>) -> Table {
        Table::with_rows(
            vec![
                REQUISITION_NUMBER.into(),
                UPDATED_APPROVED_DATE.into(),
                UPDATED_REQUIRED_DATE.into(),
                BACKGROUND_UPDATE.into(),
            ],
            rows,
        )
    }

    fn used(table: &Table) -> Vec<Cell> {
        table.column(USED_APPROVED_DATE).unwrap().into_iter().cloned().collect()
    }

    #[test]
    fn override_present_absent_and_null() {
        let norm = normalization(vec![
            vec![Cell::from("RQ-1"), Cell::from("10/03/2024"), Cell::from("15/04/2024"), Cell::from("vendor late")],
            vec![Cell::from("RQ-2"), Cell::Empty, Cell::Empty, Cell::from("checked")],
        ]);
        let enrichment = Enrichment::prepare(Some(&norm));
        assert!(enrichment.is_enriched());

        let out = enrichment.apply(&po_table(), Source::Po);
        // present: override wins. Day-first for the override column, default order for used_*.
        assert_eq!(out.rows()[0][out.column_index(UPDATED_APPROVED_DATE).unwrap()], Cell::DateTime(dt(2024, 3, 10)));
        assert_eq!(out.rows()[0][out.column_index(UPDATED_REQUIRED_DATE).unwrap()], Cell::DateTime(dt(2024, 4, 15)));
        assert_eq!(out.rows()[0][out.column_index(BACKGROUND_UPDATE).unwrap()], Cell::from("vendor late"));
        let used = used(&out);
        assert_eq!(used[0], Cell::DateTime(dt(2024, 10, 3)));
        // null override: original
        assert_eq!(used[1], Cell::DateTime(dt(2024, 3, 2)));
        // absent key: original, overrides null
        assert_eq!(used[2], Cell::DateTime(dt(2024, 3, 3)));
        assert!(out.rows()[2][out.column_index(BACKGROUND_UPDATE).unwrap()].is_empty());
        assert!(!out.has_column(USED_REQUIRED_DATE));
    }

    #[test]
    fn unparseable_override_still_takes_precedence() {
        let norm = normalization(vec![vec![Cell::from("RQ-1"), Cell::from("TBD"), Cell::Empty, Cell::Empty]]);
        let out = Enrichment::prepare(Some(&norm)).apply(&po_table(), Source::Po);
        assert_eq!(used(&out)[0], Cell::Empty);
    }

    #[test]
    fn first_duplicate_wins() {
        let norm = normalization(vec![
            vec![Cell::from("RQ-1"), Cell::from("2024-03-05"), Cell::Empty, Cell::from("first")],
            vec![Cell::from("RQ-1"), Cell::from("2024-03-06"), Cell::Empty, Cell::from("second")],
        ]);
        let enrichment = Enrichment::prepare(Some(&norm));
        let Enrichment::Enriched(index) = &enrichment else {
            panic!("expected enrichment");
        };
        assert_eq!(index.len(), 1);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.get("RQ-1").unwrap().background, Cell::from("first"));
    }

    #[test]
    fn numeric_and_text_keys_match() {
        let norm = normalization(vec![vec![Cell::from("3"), Cell::from("2024-03-09"), Cell::Empty, Cell::Empty]]);
        let out = Enrichment::prepare(Some(&norm)).apply(&po_table(), Source::Po);
        assert_eq!(used(&out)[2], Cell::DateTime(dt(2024, 3, 9)));
    }

    #[test]
    fn enriched_column_order() {
        let norm = normalization(vec![]);
        let out = Enrichment::prepare(Some(&norm)).apply(&po_table(), Source::Po);
        assert_eq!(
            &out.columns()[4..],
            &[
                UPDATED_APPROVED_DATE.to_string(),
                UPDATED_REQUIRED_DATE.to_string(),
                BACKGROUND_UPDATE.to_string(),
                USED_APPROVED_DATE.to_string(),
            ]
        );
    }

    #[test]
    fn absent_normalization_uses_originals() {
        let enrichment = Enrichment::prepare(None);
        assert!(matches!(enrichment, Enrichment::Skipped(SkipReason::NotProvided)));

        let input = po_table();
        let out = enrichment.apply(&input, Source::Po);
        assert_eq!(
            &out.columns()[4..],
            &[
                USED_APPROVED_DATE.to_string(),
                USED_REQUIRED_DATE.to_string(),
                UPDATED_APPROVED_DATE.to_string(),
                UPDATED_REQUIRED_DATE.to_string(),
                BACKGROUND_UPDATE.to_string(),
            ]
        );
        assert_eq!(
            used(&out),
            vec![
                Cell::DateTime(dt(2024, 3, 1)),
                Cell::DateTime(dt(2024, 3, 2)),
                Cell::DateTime(dt(2024, 3, 3)),
            ]
        );
        let required = out.column_index(USED_REQUIRED_DATE).unwrap();
        assert_eq!(out.rows()[0][required], Cell::DateTime(dt(2024, 4, 1)));
        for column in [UPDATED_APPROVED_DATE, UPDATED_REQUIRED_DATE, BACKGROUND_UPDATE] {
            assert!(out.column(column).unwrap().iter().all(|c| c.is_empty()));
        }
        // input untouched
        assert_eq!(input, po_table());
    }

    #[test]
    fn missing_key_column_skips() {
        let norm = Table::with_rows(vec!["Req No".into()], vec![vec![Cell::from("RQ-1")]]);
        let enrichment = Enrichment::prepare(Some(&norm));
        assert!(matches!(enrichment, Enrichment::Skipped(SkipReason::MissingKeyColumn)));
        let out = enrichment.apply(&po_table(), Source::Rfm);
        assert!(out.has_column(USED_REQUIRED_DATE));
    }

    #[test]
    fn missing_override_column_is_empty() {
        let norm = Table::with_rows(
            vec![REQUISITION_NUMBER.into(), BACKGROUND_UPDATE.into()],
            vec![vec![Cell::from("RQ-1"), Cell::from("note")]],
        );
        let out = Enrichment::prepare(Some(&norm)).apply(&po_table(), Source::Po);
        assert_eq!(used(&out)[0], Cell::DateTime(dt(2024, 3, 1)));
        assert_eq!(out.rows()[0][out.column_index(BACKGROUND_UPDATE).unwrap()], Cell::from("note"));
    }

    #[test]
    fn po_approval_date_is_coerced_for_po_only() {
        let po = Enrichment::Skipped(SkipReason::NotProvided).apply(&po_table(), Source::Po);
        let col = po.column_index(PO_APPROVAL_DATE).unwrap();
        assert_eq!(po.rows()[0][col], Cell::DateTime(dt(2024, 3, 20)));
        assert_eq!(po.rows()[1][col], Cell::Empty);

        let rfm = Enrichment::Skipped(SkipReason::NotProvided).apply(&po_table(), Source::Rfm);
        assert_eq!(rfm.rows()[0][col], Cell::from("2024-03-20"));
    }
}
