use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

use crate::job::JobFile;

pub const DEFAULT_JOB_FILE: &str = "procura.toml";

/// Command-line values take precedence over the job file.
#[derive(Debug, Parser)]
#[command(about = "Build the weekly PO and RFM procurement workbooks.")]
pub struct Args {
    /// TOML job file. The default may be absent when flags supply every input.
    #[arg(value_name = "JOB", default_value = DEFAULT_JOB_FILE)]
    pub job: PathBuf,

    /// PO export (CSV or workbook).
    #[arg(long, value_name = "PATH")]
    pub po_file: Option<PathBuf>,

    /// RFM export (CSV or workbook).
    #[arg(long, value_name = "PATH")]
    pub rfm_file: Option<PathBuf>,

    /// First day of the reporting period.
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub start_date: Option<String>,

    /// Last day of the reporting period.
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub end_date: Option<String>,

    /// Date override table keyed by requisition number.
    #[arg(long, value_name = "PATH")]
    pub normalization_file: Option<PathBuf>,

    /// Where the two workbooks are written.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report settings TOML, replacing the job file's `[report]` table.
    #[arg(long, value_name = "PATH")]
    pub report_config: Option<PathBuf>,
}

impl Args {
    /// Loads the job file, if any, and layers the flags on top.
    pub fn job_file(&self) -> Result<JobFile> {
        let mut file = if self.job.exists() {
            tracing::info!("Reading job file {}", self.job.display());
            JobFile::load(&self.job)?
        } else if self.job == Path::new(DEFAULT_JOB_FILE) {
            JobFile::default()
        } else {
            bail!("Job file not found: {}", self.job.display());
        };

        overlay(&mut file.po_file, &self.po_file);
        overlay(&mut file.rfm_file, &self.rfm_file);
        overlay(&mut file.start_date, &self.start_date);
        overlay(&mut file.end_date, &self.end_date);
        overlay(&mut file.normalization_file, &self.normalization_file);
        overlay(&mut file.output_dir, &self.output_dir);
        overlay(&mut file.report_config, &self.report_config);
        Ok(file)
    }
}

fn overlay<T: Clone>(slot: &mut Option<T>, flag: &Option<T>) {
    if flag.is_some() {
        slot.clone_from(flag);
    }
}
