use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::department::DepartmentAliases;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rows dropped from every bucket before any date predicate runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Exact `Item Category` values.
    pub item_categories: Vec<String>,
    /// Exact `Requisition Type` values.
    pub requisition_types: Vec<String>,
    /// Department/Project values, compared case-insensitively.
    pub departments: Vec<String>,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            item_categories: vec![
                "Jasa Logistik".to_string(),
                "Jasa/Service".to_string(),
                "Kontrak".to_string(),
                "Solar".to_string(),
            ],
            requisition_types: vec!["Consignment".to_string()],
            departments: vec!["test".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub exclusions: Exclusions,
    /// `Requisition Status` an RFM row needs to enter either RFM bucket.
    pub approved_status: String,
    /// Name of the sheet holding the untouched input.
    pub raw_sheet_name: String,
    /// Department codes in priority order.
    pub departments: Vec<DepartmentAliases>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            exclusions: Exclusions::default(),
            approved_status: "Approve".to_string(),
            raw_sheet_name: "Sheet".to_string(),
            departments: DepartmentAliases::defaults(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
