use anyhow::{Context, Result};
use procura_import::{load_table, CsvOptions};
use procura_report::{build_report, ReportConfig, ReportPaths};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of a TOML job file. Any field may instead come from the command line.
///
/// Relative paths are resolved against the directory of the job file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFile {
    pub po_file: Option<PathBuf>,
    pub rfm_file: Option<PathBuf>,
    pub normalization_file: Option<PathBuf>,
    /// `DD-MM-YYYY`
    pub start_date: Option<String>,
    /// `DD-MM-YYYY`
    pub end_date: Option<String>,
    /// Defaults to the directory of `po_file`.
    pub output_dir: Option<PathBuf>,
    /// Separate report settings; replaces `[report]` when set.
    pub report_config: Option<PathBuf>,
    #[serde(default)]
    pub report: ReportConfig,
    /// How CSV inputs are read.
    #[serde(default)]
    pub csv: CsvOptions,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        let mut file: JobFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse job file {}", path.display()))?;

        if let Some(base) = path.parent() {
            file.resolve_paths(base);
        }
        Ok(file)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.po_file,
            &mut self.rfm_file,
            &mut self.normalization_file,
            &mut self.output_dir,
            &mut self.report_config,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Checks that every input is present and loads the report settings.
    pub fn into_job(self) -> Result<JobConfig> {
        let report = match &self.report_config {
            Some(path) => ReportConfig::load(path)
                .with_context(|| format!("Failed to load report config {}", path.display()))?,
            None => self.report,
        };

        Ok(JobConfig {
            po_file: required(self.po_file, "po_file")?,
            rfm_file: required(self.rfm_file, "rfm_file")?,
            normalization_file: self.normalization_file,
            start_date: required(self.start_date, "start_date")?,
            end_date: required(self.end_date, "end_date")?,
            output_dir: self.output_dir,
            report,
            csv: self.csv,
        })
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.with_context(|| {
        format!(
            "Missing {key}: set it in the job file or pass --{}",
            key.replace('_', "-")
        )
    })
}

/// One weekly run with every input known.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub po_file: PathBuf,
    pub rfm_file: PathBuf,
    pub normalization_file: Option<PathBuf>,
    pub start_date: String,
    pub end_date: String,
    pub output_dir: Option<PathBuf>,
    pub report: ReportConfig,
    pub csv: CsvOptions,
}

impl JobConfig {
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .po_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Loads the inputs, builds both workbooks and writes them.
    ///
    /// PO and RFM exports must load; the normalization table is optional and a
    /// failure to read it only disables enrichment.
    pub fn run(&self) -> Result<ReportPaths> {
        let po = load_table(&self.po_file, &self.csv)
            .with_context(|| format!("Failed to load PO data from {}", self.po_file.display()))?;
        let rfm = load_table(&self.rfm_file, &self.csv)
            .with_context(|| format!("Failed to load RFM data from {}", self.rfm_file.display()))?;

        let normalization = self.normalization_file.as_deref().and_then(|path| {
            match load_table(path, &self.csv) {
                Ok(table) => Some(table),
                Err(e) => {
                    tracing::warn!("Could not load normalization data from {}: {e}", path.display());
                    None
                }
            }
        });

        let report = build_report(
            &self.report,
            &po,
            &rfm,
            normalization.as_ref(),
            &self.start_date,
            &self.end_date,
        )?;

        let output_dir = self.output_dir();
        let paths = report
            .write(&output_dir)
            .with_context(|| format!("Failed to write reports to {}", output_dir.display()))?;
        tracing::info!(
            "Reports saved: {} and {}",
            paths.po.display(),
            paths.rfm.display()
        );
        Ok(paths)
    }
}
