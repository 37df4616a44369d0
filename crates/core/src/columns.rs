//! Column names of the procurement exports and the columns the pipeline derives.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROCUREMENT_NAME: &str = "Procurement Name";
pub const ITEM_CATEGORY: &str = "Item Category";
pub const REQUISITION_TYPE: &str = "Requisition Type";
pub const REQUISITION_STATUS: &str = "Requisition Status";
pub const REQUISITION_NUMBER: &str = "Requisition Number";
pub const REQUISITION_APPROVED_DATE: &str = "Requisition Approved Date";
pub const REQUISITION_REQUIRED_DATE: &str = "Requisition Required Date";
pub const PO_APPROVAL_DATE: &str = "PO Approval Date";
/// Department field of the PO export.
pub const DEPARTMENT: &str = "Department";
/// Department field of the RFM export.
pub const PROJECT: &str = "Project";

pub const UPDATED_APPROVED_DATE: &str = "Updated Requisition Approved Date";
pub const UPDATED_REQUIRED_DATE: &str = "Updated Requisition Required Date";
pub const BACKGROUND_UPDATE: &str = "Background Update";
pub const USED_APPROVED_DATE: &str = "used_approved_date";
pub const USED_REQUIRED_DATE: &str = "used_required_date";
pub const DEPARTMENT_ASSIGNED: &str = "Department_Assigned";

/// Which export a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Po,
    Rfm,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Po => write!(f, "PO"),
            Source::Rfm => write!(f, "RFM"),
        }
    }
}

impl Source {
    /// Free-text department field checked against the department exclusions.
    pub fn department_column(self) -> &'static str {
        match self {
            Source::Po => DEPARTMENT,
            Source::Rfm => PROJECT,
        }
    }

    /// Columns the pipeline reads unconditionally.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Source::Po => &[
                PROCUREMENT_NAME,
                ITEM_CATEGORY,
                REQUISITION_TYPE,
                DEPARTMENT,
                REQUISITION_NUMBER,
                REQUISITION_APPROVED_DATE,
                PO_APPROVAL_DATE,
            ],
            Source::Rfm => &[
                PROCUREMENT_NAME,
                ITEM_CATEGORY,
                REQUISITION_TYPE,
                PROJECT,
                REQUISITION_STATUS,
                REQUISITION_NUMBER,
                REQUISITION_APPROVED_DATE,
            ],
        }
    }

    pub fn output_file_name(self) -> &'static str {
        match self {
            Source::Po => "data_PO_Weekly.xlsx",
            Source::Rfm => "data_RFM_Weekly.xlsx",
        }
    }
}
