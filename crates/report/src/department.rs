use procura_core::columns::{DEPARTMENT_ASSIGNED, PROCUREMENT_NAME};
use procura_core::{Cell, Table};
use serde::{Deserialize, Serialize};

/// One department code and the procurement names that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAliases {
    pub code: String,
    pub aliases: Vec<String>,
}

impl DepartmentAliases {
    pub fn new(code: &str, aliases: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// OBI, LAR, HO in that priority order. Entries with `/` are the composite
    /// names used by the RFM export.
    pub fn defaults() -> Vec<DepartmentAliases> {
        vec![
            DepartmentAliases::new(
                "OBI",
                &[
                    "Rona / Joko",
                    "Joko",
                    "Victo",
                    "Rakan",
                    "Rona Justhafist",
                    "Rona / Victo / Rakan / Joko",
                ],
            ),
            DepartmentAliases::new(
                "LAR",
                &["Fairus / Irwan", "Fairus Mubakri", "Irwan", "Ady", "Fairus / Ady"],
            ),
            DepartmentAliases::new(
                "HO",
                &[
                    "Linda / Puji / Syifa R / Stheven",
                    "Syifa Ramadhani",
                    "Syifa Alifia",
                    "Rizal Agus Fianto",
                    "Auriel",
                    "Puji Astuti",
                    "Linda Permata Sari",
                ],
            ),
        ]
    }
}

/// Maps a procurement name to a department code by case-sensitive substring match.
///
/// Departments are tried in order and the first one with any alias contained in
/// the name wins, so a composite name such as `Rona / Joko / Fairus` resolves to
/// the earlier department.
pub struct DepartmentClassifier {
    departments: Vec<DepartmentAliases>,
}

impl Default for DepartmentClassifier {
    fn default() -> Self {
        Self::new(DepartmentAliases::defaults())
    }
}

impl DepartmentClassifier {
    pub fn new(departments: Vec<DepartmentAliases>) -> Self {
        let departments = departments
            .into_iter()
            .map(|mut d| {
                let before = d.aliases.len();
                d.aliases.retain(|a| !a.is_empty());
                if d.aliases.len() != before {
                    tracing::warn!("Ignoring empty alias for department {}", d.code);
                }
                d
            })
            .collect();
        Self { departments }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.departments.iter().map(|d| d.code.as_str())
    }

    pub fn classify(&self, name: &str) -> Option<&str> {
        self.departments
            .iter()
            .find(|d| d.aliases.iter().any(|alias| name.contains(alias.as_str())))
            .map(|d| d.code.as_str())
    }

    pub fn classify_cell(&self, cell: &Cell) -> Option<&str> {
        match cell {
            Cell::Empty => None,
            Cell::Text(s) => self.classify(s),
            other => self.classify(&other.to_string()),
        }
    }

    /// Copy of `table` with a freshly computed `Department_Assigned` column.
    ///
    /// Any existing `Department_Assigned` value is overwritten, never reused.
    pub fn assign(&self, table: &Table) -> Table {
        let values = match table.column(PROCUREMENT_NAME) {
            Some(names) => names
                .into_iter()
                .map(|name| Cell::from(self.classify_cell(name)))
                .collect(),
            None => Vec::new(),
        };
        let mut out = table.clone();
        out.set_column(DEPARTMENT_ASSIGNED, values);
        out
    }

    /// Partitions an assigned table by department, in priority order.
    ///
    /// Rows without a department are left out, as are departments with no rows.
    /// The `Department_Assigned` column is dropped from every part.
    pub fn split(&self, assigned: &Table) -> Vec<(String, Table)> {
        if !assigned.has_column(DEPARTMENT_ASSIGNED) {
            return Vec::new();
        }
        self.codes()
            .filter_map(|code| {
                let part = assigned
                    .filter(|row| row.text(DEPARTMENT_ASSIGNED) == Some(code))
                    .drop_column(DEPARTMENT_ASSIGNED);
                (!part.is_empty()).then(|| (code.to_string(), part))
            })
            .collect()
    }
}
