//! CLI command definitions.
//!
//! This module defines the command structure for the mgnlt CLI and the pieces
//! shared between commands: provider options and workflow construction.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::info;

use mgnlt_core::{StagingArea, TemplateDirectory, VersionSelection, Workflow, WorkflowEvent};
use mgnlt_ec2::{AwsCliClient, AwsCliOptions};

pub mod cleanup;
pub mod create;
pub mod update;

/// mgnlt - Application Migration Service launch template manager
#[derive(Parser)]
#[command(name = "mgnlt")]
#[command(version, about = "Snapshot, edit and redeploy MGN launch templates")]
#[command(long_about = r#"
This tool makes it easy to manage MGN launch templates.
It snapshots the launch templates into the Original folder, deploys edited
copies placed in the Modified folder as new default versions, or cleans up
the Original and Modified folders and files.

WORKFLOWS:
  create <region>   → Snapshot managed launch templates into Original/
  update <region>   → Deploy edits from Modified/ as new default versions
  cleanup           → Remove the Original/ and Modified/ folders
  --region <region> → Run create, then update

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Provider error
  4 - Staging error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// AWS region for the default action (create, then update)
    #[arg(long)]
    pub region: Option<String>,

    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot managed launch templates into Original/
    Create(create::CreateArgs),

    /// Deploy edited templates from Modified/ as new default versions
    Update(update::UpdateArgs),

    /// Remove the Original/ and Modified/ folders and their files
    Cleanup,
}

/// Version written when snapshotting a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnapshotVersion {
    /// First version the provider lists
    First,
    /// Version flagged as default
    Default,
    /// Highest version number
    Latest,
}

impl From<SnapshotVersion> for VersionSelection {
    fn from(version: SnapshotVersion) -> Self {
        match version {
            SnapshotVersion::First => VersionSelection::First,
            SnapshotVersion::Default => VersionSelection::Default,
            SnapshotVersion::Latest => VersionSelection::Latest,
        }
    }
}

/// Provider and staging options shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct AwsArgs {
    /// AWS credentials profile
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS CLI executable
    #[arg(long, global = true, env = "MGNLT_AWS_BIN", default_value = "aws")]
    pub aws_bin: PathBuf,

    /// Custom EC2 endpoint URL
    #[arg(long, global = true, env = "MGNLT_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Directory holding the Original/ and Modified/ folders
    #[arg(long, global = true, env = "MGNLT_STAGING_ROOT", default_value = ".")]
    pub staging_root: PathBuf,

    /// Only read the first page of the launch template listing
    #[arg(long, global = true)]
    pub single_page: bool,

    /// Which version of each template to snapshot
    #[arg(long, global = true, value_enum, default_value_t = SnapshotVersion::Latest)]
    pub snapshot_version: SnapshotVersion,
}

impl AwsArgs {
    pub fn staging(&self) -> StagingArea {
        StagingArea::new(self.staging_root.clone())
    }

    pub fn cli_options(&self, region: &str) -> AwsCliOptions {
        let mut options = AwsCliOptions::new(region).binary(self.aws_bin.clone());
        if let Some(profile) = &self.profile {
            options = options.profile(profile.clone());
        }
        if let Some(url) = &self.endpoint_url {
            options = options.endpoint_url(url.clone());
        }
        if self.single_page {
            options = options.single_page();
        }
        options
    }

    /// Build a workflow for `region` that prints progress lines to stdout.
    pub fn workflow(&self, region: &str) -> Workflow {
        let client = AwsCliClient::new(self.cli_options(region));
        let directory = TemplateDirectory::new(Arc::new(client))
            .with_selection(self.snapshot_version.into());

        Workflow::new(directory, self.staging())
            .with_progress_handler(Arc::new(|event: &WorkflowEvent| {
                if let Some(line) = progress_line(event) {
                    println!("{}", line);
                }
            }))
    }
}

/// The stdout line for a workflow event. Per-file snapshot writes only go to the log.
fn progress_line(event: &WorkflowEvent) -> Option<String> {
    match event {
        WorkflowEvent::SnapshotWritten { .. } => {
            info!("{}", event);
            None
        }
        _ => Some(event.to_string()),
    }
}

/// Run create then update, or explain that a region is needed.
pub async fn run_default(region: Option<String>, aws: &AwsArgs) -> Result<()> {
    println!("No command provided. Running default action (create and update)...");

    let Some(region) = region else {
        println!("\nNOTICE!!!!\nNo region provided for the default action.\nNOTICE!!!!\n\n");
        Cli::command().print_help()?;
        return Ok(());
    };

    info!("Running create and update in {}", region);
    create::run(&region, None, aws).await?;
    update::run(&region, aws).await
}
