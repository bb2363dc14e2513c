//! # mgnlt_core
//!
//! Snapshot and deploy workflows for Application Migration Service launch templates.
//!
//! # Architecture
//!
//! - **Directory**: lists managed templates, reads versions, publishes new defaults
//! - **Staging**: the `Original/` and `Modified/` editing buffer on disk
//! - **Snapshots / Edits**: JSON files written from, and read back into, the workflow
//! - **Workflow**: runs create and deploy end to end
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mgnlt_core::{StagingArea, TemplateDirectory, Workflow};
//! use mgnlt_ec2::{AwsCliClient, AwsCliOptions};
//!
//! # async fn run() -> mgnlt_core::CoreResult<()> {
//! let client = AwsCliClient::new(AwsCliOptions::new("us-east-2"));
//! let staging = StagingArea::new(".");
//! staging.ensure()?;
//!
//! let workflow = Workflow::new(TemplateDirectory::new(Arc::new(client)), staging);
//! workflow.create_snapshots().await?;
//! let report = workflow.deploy_all().await?;
//! println!("{} updated, {} skipped", report.updated.len(), report.skipped.len());
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod edits;
pub mod error;
pub mod merge;
pub mod snapshot;
pub mod staging;
pub mod workflow;

pub use directory::{
    is_managed, PublishOutcome, TemplateDirectory, VersionSelection, MANAGED_NAME_PREFIX,
    MANAGED_TAG_KEY,
};
pub use edits::{EditLoader, EditRecord};
pub use error::{CoreError, CoreResult};
pub use merge::merge_fields;
pub use snapshot::SnapshotWriter;
pub use staging::StagingArea;
pub use workflow::{
    DeployReport, DeployedTemplate, ProgressHandler, Workflow, WorkflowEvent, EDIT_HINT,
};
