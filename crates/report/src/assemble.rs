use procura_core::columns::DEPARTMENT_ASSIGNED;
use procura_core::{Source, Table};

use crate::bucket::Bucket;
use crate::department::DepartmentClassifier;

/// Longest sheet name a workbook accepts.
pub const SHEET_NAME_MAX: usize = 31;

const SHEET_NAME_ILLEGAL: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// `base` or `base_SUFFIX`, made valid as a worksheet name.
///
/// Characters a workbook rejects become `_`, the result is cut to
/// [`SHEET_NAME_MAX`] characters and may not start or end with `'`.
pub fn sheet_name(base: &str, suffix: Option<&str>) -> String {
    let full = match suffix {
        Some(suffix) => format!("{base}_{suffix}"),
        None => base.to_string(),
    };
    let cleaned: String = full
        .chars()
        .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
        .collect();
    let cut: String = cleaned.trim().chars().take(SHEET_NAME_MAX).collect();
    let name = cut.trim_matches('\'').trim();
    if name.is_empty() {
        "Sheet".to_string()
    } else {
        name.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

/// Ordered sheets destined for one output workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub source: Source,
    sheets: Vec<NamedTable>,
}

impl ReportBundle {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            sheets: Vec::new(),
        }
    }

    /// Adds a sheet. A name already taken, ignoring case, keeps its first table.
    pub fn push(&mut self, name: String, table: Table) -> bool {
        if self.sheets.iter().any(|s| s.name.to_lowercase() == name.to_lowercase()) {
            tracing::warn!("Sheet name '{name}' already used in {} report; keeping the first", self.source);
            return false;
        }
        self.sheets.push(NamedTable { name, table });
        true
    }

    pub fn sheets(&self) -> &[NamedTable] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.table)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Turns classified buckets into the sheets of one workbook.
pub struct ReportAssembler<'a> {
    classifier: &'a DepartmentClassifier,
    raw_sheet_name: &'a str,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(classifier: &'a DepartmentClassifier, raw_sheet_name: &'a str) -> Self {
        Self {
            classifier,
            raw_sheet_name,
        }
    }

    /// Raw input first, then per bucket its base sheet followed by its
    /// non-empty department splits.
    ///
    /// `classified` tables must carry `Department_Assigned`; it is dropped from
    /// every output sheet.
    pub fn assemble(&self, source: Source, raw: &Table, classified: &[(Bucket, Table)]) -> ReportBundle {
        let mut bundle = ReportBundle::new(source);
        bundle.push(sheet_name(self.raw_sheet_name, None), raw.clone());

        for (bucket, table) in classified {
            bundle.push(sheet_name(bucket.name(), None), table.drop_column(DEPARTMENT_ASSIGNED));
            for (code, part) in self.classifier.split(table) {
                bundle.push(sheet_name(bucket.name(), Some(&code)), part);
            }
        }
        bundle
    }
}
