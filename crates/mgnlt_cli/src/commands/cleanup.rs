//! Cleanup command - Remove the staging folders.

use anyhow::{Context, Result};

use super::AwsArgs;

pub fn execute(aws: &AwsArgs) -> Result<()> {
    println!("Cleaning up Original and Modified folders and files...");
    aws.staging()
        .cleanup()
        .context("Failed to remove staging folders")
}
