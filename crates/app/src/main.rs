use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod job;

use cli::Args;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let job = args.job_file()?.into_job()?;
    tracing::info!("Running weekly report for {} to {}", job.start_date, job.end_date);
    job.run()?;
    Ok(())
}
