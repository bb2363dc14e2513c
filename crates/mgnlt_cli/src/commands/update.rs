//! Update command - Deploy edited launch templates.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::AwsArgs;

#[derive(Args)]
pub struct UpdateArgs {
    /// AWS region to deploy launch templates to
    pub region: String,
}

pub async fn execute(args: UpdateArgs, aws: &AwsArgs) -> Result<()> {
    println!("Updating launch templates...");
    run(&args.region, aws).await
}

/// Ensure the staging folders exist, then publish every edit.
pub async fn run(region: &str, aws: &AwsArgs) -> Result<()> {
    let workflow = aws.workflow(region);
    workflow
        .staging()
        .ensure()
        .context("Failed to create staging folders")?;

    let report = workflow
        .deploy_all()
        .await
        .context("Failed to deploy launch templates")?;

    info!(
        "{} launch templates updated, {} without edits",
        report.updated.len(),
        report.skipped.len()
    );
    Ok(())
}
