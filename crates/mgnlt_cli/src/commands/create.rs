//! Create command - Snapshot launch templates into Original/.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::AwsArgs;

#[derive(Args)]
pub struct CreateArgs {
    /// AWS region to read launch templates from
    pub region: String,

    /// Snapshot only this launch template
    #[arg(long)]
    pub template_id: Option<String>,
}

pub async fn execute(args: CreateArgs, aws: &AwsArgs) -> Result<()> {
    println!("Creating original files...");
    run(&args.region, args.template_id.as_deref(), aws).await
}

/// Ensure the staging folders exist, then write snapshots.
pub async fn run(region: &str, template_id: Option<&str>, aws: &AwsArgs) -> Result<()> {
    let workflow = aws.workflow(region);
    workflow
        .staging()
        .ensure()
        .context("Failed to create staging folders")?;

    match template_id {
        Some(id) => {
            info!("Snapshotting {} in {}", id, region);
            let path = workflow
                .snapshot_template(id)
                .await
                .with_context(|| format!("Failed to snapshot launch template {}", id))?;
            info!("Snapshot written to {:?}", path);
        }
        None => {
            let written = workflow
                .create_snapshots()
                .await
                .context("Failed to snapshot launch templates")?;
            info!("{} snapshots written", written.len());
        }
    }

    Ok(())
}
