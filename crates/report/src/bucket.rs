use procura_core::columns::{
    ITEM_CATEGORY, PO_APPROVAL_DATE, REQUISITION_STATUS, REQUISITION_TYPE, USED_APPROVED_DATE,
};
use procura_core::{DateRange, RowRef, Source, Table};
use std::fmt;

use crate::config::Exclusions;

/// One weekly reporting category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// PO approved inside the period.
    PoApproved,
    /// Requisition (behind a PO) approved inside the period.
    NewRfmFromPo,
    /// PO not approved yet, or approved after the period.
    InprocessPo,
    /// Approved requisition, approved inside the period.
    NewRfmFromRfm,
    /// Approved requisition, approved on or before the period end.
    InprocessRfm,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Bucket {
    pub const PO: [Bucket; 3] = [Bucket::PoApproved, Bucket::NewRfmFromPo, Bucket::InprocessPo];
    pub const RFM: [Bucket; 2] = [Bucket::NewRfmFromRfm, Bucket::InprocessRfm];

    pub fn for_source(source: Source) -> &'static [Bucket] {
        match source {
            Source::Po => &Self::PO,
            Source::Rfm => &Self::RFM,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Bucket::PoApproved => "PO_Approved",
            Bucket::NewRfmFromPo => "New_RFMfromPO",
            Bucket::InprocessPo => "Inprocess_PO",
            Bucket::NewRfmFromRfm => "New_RFMfromRFM",
            Bucket::InprocessRfm => "Inprocess_RFM",
        }
    }

    pub fn source(self) -> Source {
        match self {
            Bucket::PoApproved | Bucket::NewRfmFromPo | Bucket::InprocessPo => Source::Po,
            Bucket::NewRfmFromRfm | Bucket::InprocessRfm => Source::Rfm,
        }
    }
}

/// Splits enriched tables into buckets for one reporting period.
///
/// Date columns must already be coerced; a missing date never satisfies a range
/// test, but a missing `PO Approval Date` counts as in process. Timestamps keep
/// their time of day, so 17:30 on the end day is after the period.
pub struct BucketFilter<'a> {
    exclusions: &'a Exclusions,
    period: DateRange,
    approved_status: &'a str,
}

impl<'a> BucketFilter<'a> {
    pub fn new(exclusions: &'a Exclusions, period: DateRange, approved_status: &'a str) -> Self {
        Self {
            exclusions,
            period,
            approved_status,
        }
    }

    pub fn is_excluded(&self, row: &RowRef<'_>, source: Source) -> bool {
        let in_list = |column: &str, list: &[String]| {
            row.text(column).is_some_and(|v| list.iter().any(|x| x == v))
        };
        let department_excluded = row.text(source.department_column()).is_some_and(|v| {
            let v = v.to_lowercase();
            self.exclusions.departments.iter().any(|x| x.to_lowercase() == v)
        });

        in_list(ITEM_CATEGORY, &self.exclusions.item_categories)
            || in_list(REQUISITION_TYPE, &self.exclusions.requisition_types)
            || department_excluded
    }

    pub fn admits(&self, row: &RowRef<'_>, bucket: Bucket) -> bool {
        if self.is_excluded(row, bucket.source()) {
            return false;
        }
        let period = self.period;
        let used_approved = row.datetime(USED_APPROVED_DATE);

        match bucket {
            Bucket::PoApproved => row
                .datetime(PO_APPROVAL_DATE)
                .is_some_and(|at| period.contains(at)),
            Bucket::NewRfmFromPo => used_approved.is_some_and(|at| period.contains(at)),
            Bucket::InprocessPo => row
                .datetime(PO_APPROVAL_DATE)
                .map_or(true, |at| period.is_after_end(at)),
            Bucket::NewRfmFromRfm => {
                self.is_approved(row) && used_approved.is_some_and(|at| period.contains(at))
            }
            // No lower bound: earlier approvals stay in process.
            Bucket::InprocessRfm => {
                self.is_approved(row) && used_approved.is_some_and(|at| !period.is_after_end(at))
            }
        }
    }

    fn is_approved(&self, row: &RowRef<'_>) -> bool {
        row.text(REQUISITION_STATUS) == Some(self.approved_status)
    }

    pub fn apply(&self, table: &Table, bucket: Bucket) -> Table {
        table.filter(|row| self.admits(row, bucket))
    }

    /// Every bucket of `source`, in report order.
    pub fn apply_all(&self, table: &Table, source: Source) -> Vec<(Bucket, Table)> {
        Bucket::for_source(source)
            .iter()
            .map(|&bucket| {
                let rows = self.apply(table, bucket);
                tracing::info!("{}: {} rows", bucket, rows.len());
                (bucket, rows)
            })
            .collect()
    }
}
