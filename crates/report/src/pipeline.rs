use procura_core::{DateRange, PeriodError, Source, Table};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assemble::{ReportAssembler, ReportBundle};
use crate::bucket::BucketFilter;
use crate::config::ReportConfig;
use crate::department::DepartmentClassifier;
use crate::enrich::Enrichment;
use crate::writer::{render_bundle, WriteError};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: Source, column: String },
    #[error("Failed to create output directory {path}: {error}")]
    OutputDir {
        path: String,
        #[source]
        error: std::io::Error,
    },
    #[error("Failed to save {path}: {error}")]
    Save {
        path: String,
        #[source]
        error: std::io::Error,
    },
    #[error("Failed to render {table} report: {error}")]
    Render {
        table: Source,
        #[source]
        error: WriteError,
    },
}

/// Both workbooks of one reporting period, fully built and not yet written.
#[derive(Debug, Clone)]
pub struct WeeklyReport {
    pub period: DateRange,
    pub po: ReportBundle,
    pub rfm: ReportBundle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub po: PathBuf,
    pub rfm: PathBuf,
}

/// Runs enrichment, bucketing, classification and assembly over both exports.
///
/// Fails before producing anything when the period cannot be parsed or an
/// input lacks a required column. Missing normalization data only disables
/// enrichment.
pub fn build_report(
    config: &ReportConfig,
    po: &Table,
    rfm: &Table,
    normalization: Option<&Table>,
    start: &str,
    end: &str,
) -> Result<WeeklyReport, ReportError> {
    let period = DateRange::parse(start, end)?;
    if period.is_inverted() {
        tracing::warn!("Reporting period {period} ends before it starts; date buckets will be empty");
    }
    require_columns(po, Source::Po)?;
    require_columns(rfm, Source::Rfm)?;

    let classifier = DepartmentClassifier::new(config.departments.clone());
    let enrichment = Enrichment::prepare(normalization);
    let filter = BucketFilter::new(&config.exclusions, period, &config.approved_status);
    let assembler = ReportAssembler::new(&classifier, &config.raw_sheet_name);

    tracing::info!("Building weekly report for {period}");
    let build = |raw: &Table, source: Source| {
        let enriched = enrichment.apply(raw, source);
        let classified: Vec<_> = filter
            .apply_all(&enriched, source)
            .into_iter()
            .map(|(bucket, rows)| (bucket, classifier.assign(&rows)))
            .collect();
        assembler.assemble(source, raw, &classified)
    };

    Ok(WeeklyReport {
        period,
        po: build(po, Source::Po),
        rfm: build(rfm, Source::Rfm),
    })
}

fn require_columns(table: &Table, source: Source) -> Result<(), ReportError> {
    match source.required_columns().iter().find(|c| !table.has_column(c)) {
        Some(column) => Err(ReportError::MissingColumn {
            table: source,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

impl WeeklyReport {
    /// Writes `data_PO_Weekly.xlsx` and `data_RFM_Weekly.xlsx` into `output_dir`,
    /// creating it if needed.
    ///
    /// Both workbooks are rendered before either file is created.
    pub fn write(&self, output_dir: &Path) -> Result<ReportPaths, ReportError> {
        let render = |bundle: &ReportBundle| {
            render_bundle(bundle).map_err(|error| ReportError::Render {
                table: bundle.source,
                error,
            })
        };
        let po_bytes = render(&self.po)?;
        let rfm_bytes = render(&self.rfm)?;

        std::fs::create_dir_all(output_dir).map_err(|error| ReportError::OutputDir {
            path: output_dir.display().to_string(),
            error,
        })?;

        let paths = ReportPaths {
            po: output_dir.join(Source::Po.output_file_name()),
            rfm: output_dir.join(Source::Rfm.output_file_name()),
        };
        save(Source::Po, &paths.po, &po_bytes)?;
        save(Source::Rfm, &paths.rfm, &rfm_bytes)?;
        Ok(paths)
    }
}

fn save(source: Source, path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    tracing::info!("Saving {source} report to: {}", path.display());
    std::fs::write(path, bytes).map_err(|error| ReportError::Save {
        path: path.display().to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::DepartmentAliases;
    use procura_core::columns::*;
    use procura_core::Cell;

    fn po() -> Table {
        Table::with_rows(
            vec![
                REQUISITION_NUMBER.into(),
                PROCUREMENT_NAME.into(),
                ITEM_CATEGORY.into(),
                REQUISITION_TYPE.into(),
                DEPARTMENT.into(),
                REQUISITION_APPROVED_DATE.into(),
                PO_APPROVAL_DATE.into(),
            ],
            vec![
                vec!["RQ-1".into(), "Joko".into(), "Sparepart".into(), "Purchase".into(), "Mining".into(), "2024-03-02".into(), "2024-03-15".into()],
                vec!["RQ-2".into(), "Irwan".into(), "Solar".into(), "Purchase".into(), "Mining".into(), "2024-03-02".into(), Cell::Empty],
                vec!["RQ-3".into(), "Auriel".into(), "Sparepart".into(), "Purchase".into(), "Mining".into(), "2024-02-20".into(), Cell::Empty],
            ],
        )
    }

    fn rfm() -> Table {
        Table::with_rows(
            vec![
                REQUISITION_NUMBER.into(),
                PROCUREMENT_NAME.into(),
                ITEM_CATEGORY.into(),
                REQUISITION_TYPE.into(),
                PROJECT.into(),
                REQUISITION_STATUS.into(),
                REQUISITION_APPROVED_DATE.into(),
            ],
            vec![
                vec!["RQ-4".into(), "Victo".into(), "Sparepart".into(), "Purchase".into(), "Site".into(), "Approve".into(), "2024-03-05".into()],
                vec!["RQ-5".into(), "Victo".into(), "Sparepart".into(), "Purchase".into(), "Site".into(), "Pending".into(), "2024-03-05".into()],
            ],
        )
    }

    #[test]
    fn invalid_period_is_fatal() {
        let err = build_report(&ReportConfig::default(), &po(), &rfm(), None, "2024-03-01", "31-03-2024")
            .unwrap_err();
        assert!(matches!(err, ReportError::Period(_)));
        assert!(err.to_string().contains("DD-MM-YYYY"));
    }

    #[test]
    fn missing_column_is_fatal() {
        let rfm = rfm().drop_column(REQUISITION_STATUS);
        let err = build_report(&ReportConfig::default(), &po(), &rfm, None, "01-03-2024", "31-03-2024")
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingColumn { table: Source::Rfm, ref column } if column == REQUISITION_STATUS
        ));
    }

    #[test]
    fn builds_both_bundles() {
        let report = build_report(&ReportConfig::default(), &po(), &rfm(), None, "01-03-2024", "31-03-2024")
            .unwrap();

        assert_eq!(
            report.po.sheet_names(),
            vec![
                "Sheet",
                "PO_Approved",
                "PO_Approved_OBI",
                "New_RFMfromPO",
                "New_RFMfromPO_OBI",
                "Inprocess_PO",
                "Inprocess_PO_HO",
            ]
        );
        assert_eq!(
            report.rfm.sheet_names(),
            vec!["Sheet", "New_RFMfromRFM", "New_RFMfromRFM_OBI", "Inprocess_RFM", "Inprocess_RFM_OBI"]
        );
        assert_eq!(report.po.sheet("Sheet").unwrap(), &po());
        assert_eq!(report.rfm.sheet("Inprocess_RFM").unwrap().len(), 1);
    }

    #[test]
    fn write_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("weekly");
        let report = build_report(&ReportConfig::default(), &po(), &rfm(), None, "01-03-2024", "31-03-2024")
            .unwrap();
        let paths = report.write(&out).unwrap();
        assert!(paths.po.ends_with("data_PO_Weekly.xlsx"));
        assert!(paths.po.exists());
        assert!(paths.rfm.exists());
    }

    #[test]
    fn render_failure_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("weekly");
        let mut report = build_report(&ReportConfig::default(), &po(), &rfm(), None, "01-03-2024", "31-03-2024")
            .unwrap();
        report.rfm.push("bad[name]".into(), Table::default());

        let err = report.write(&out).unwrap_err();
        assert!(matches!(err, ReportError::Render { table: Source::Rfm, .. }));
        assert!(!out.exists());
    }

    #[test]
    fn department_code_with_slash_only_in_rfm() {
        let config = ReportConfig {
            departments: vec![DepartmentAliases::new("A/B", &["Victo"])],
            ..ReportConfig::default()
        };
        let report = build_report(&config, &po(), &rfm(), None, "01-03-2024", "31-03-2024").unwrap();
        assert!(report.rfm.sheet("New_RFMfromRFM_A_B").is_some());

        let dir = tempfile::tempdir().unwrap();
        let paths = report.write(dir.path()).unwrap();
        assert!(paths.po.exists());
        assert!(paths.rfm.exists());
    }
}
