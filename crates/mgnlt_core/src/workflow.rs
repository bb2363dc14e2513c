//! Snapshot and deploy workflows.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::directory::{PublishOutcome, TemplateDirectory};
use crate::edits::EditLoader;
use crate::error::{CoreError, CoreResult};
use crate::snapshot::SnapshotWriter;
use crate::staging::StagingArea;

/// Line printed after snapshots were written.
pub const EDIT_HINT: &str =
    "To update the templates copy the Original file into the Modified folder and make the necessary changes.";

/// Progress reported while a workflow runs.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// A snapshot file was written.
    SnapshotWritten { name: String, path: PathBuf },
    /// All snapshots were written.
    SnapshotsComplete { count: usize },
    /// A managed template had no edit file.
    Skipped { template_id: String },
    /// A template got a new default version.
    Updated { name: String, outcome: PublishOutcome },
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowEvent::SnapshotWritten { name, path } => {
                write!(f, "Saved {} to {}", name, path.display())
            }
            WorkflowEvent::SnapshotsComplete { .. } => write!(f, "{}", EDIT_HINT),
            WorkflowEvent::Skipped { template_id } => {
                write!(f, "No modified data for {}", template_id)
            }
            WorkflowEvent::Updated { name, outcome } => write!(
                f,
                "Updating {}...TemplateID: {}, DefaultVersion: {}, LatestVersion: {}, HTTPStatusCode: {}",
                name,
                outcome.template_id,
                outcome.default_version_number,
                outcome.latest_version_number,
                outcome.http_status_code
            ),
        }
    }
}

/// Progress handler callback type.
pub type ProgressHandler = Arc<dyn Fn(&WorkflowEvent) + Send + Sync>;

/// A template that received a new default version.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployedTemplate {
    pub name: String,
    pub outcome: PublishOutcome,
}

/// Result of a deploy run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployReport {
    pub updated: Vec<DeployedTemplate>,
    pub skipped: Vec<String>,
}

/// Runs the create and update workflows against one region and one staging area.
pub struct Workflow {
    directory: TemplateDirectory,
    staging: StagingArea,
    progress: Option<ProgressHandler>,
}

impl Workflow {
    pub fn new(directory: TemplateDirectory, staging: StagingArea) -> Self {
        Self {
            directory,
            staging,
            progress: None,
        }
    }

    /// Set a handler receiving progress events as they happen.
    pub fn with_progress_handler(mut self, handler: ProgressHandler) -> Self {
        self.progress = Some(handler);
        self
    }

    pub fn directory(&self) -> &TemplateDirectory {
        &self.directory
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(handler) = &self.progress {
            handler(&event);
        }
    }

    /// Snapshot every managed template into the `Original/` directory.
    pub async fn create_snapshots(&self) -> CoreResult<Vec<PathBuf>> {
        let ids = self.directory.list_managed_template_ids().await?;
        info!(
            "Snapshotting {} launch templates from {}",
            ids.len(),
            self.directory.region()
        );

        let mut written = Vec::with_capacity(ids.len());
        for id in &ids {
            written.push(self.snapshot_template(id).await?);
        }

        self.emit(WorkflowEvent::SnapshotsComplete {
            count: written.len(),
        });
        Ok(written)
    }

    /// Snapshot a single template into the `Original/` directory.
    pub async fn snapshot_template(&self, template_id: &str) -> CoreResult<PathBuf> {
        let record = self.directory.fetch_template(template_id).await?;
        let path = SnapshotWriter::write_snapshot(&record, &self.staging.original_dir())?;

        self.emit(WorkflowEvent::SnapshotWritten {
            name: SnapshotWriter::snapshot_name(&record)?.to_string(),
            path: path.clone(),
        });
        Ok(path)
    }

    /// Publish every edit in `Modified/` whose template is still managed.
    ///
    /// Templates are processed in listing order. The first error stops the run;
    /// versions published before it stay in place.
    pub async fn deploy_all(&self) -> CoreResult<DeployReport> {
        let ids = self.directory.list_managed_template_ids().await?;
        let edits = EditLoader::load_edits(&self.staging.modified_dir())?;
        info!(
            "Deploying {} edits against {} managed templates in {}",
            edits.len(),
            ids.len(),
            self.directory.region()
        );

        let mut report = DeployReport::default();
        for id in ids {
            let Some(edit) = edits.get(&id) else {
                self.emit(WorkflowEvent::Skipped {
                    template_id: id.clone(),
                });
                report.skipped.push(id);
                continue;
            };

            let name = edit
                .name_tag()
                .ok_or_else(|| CoreError::MissingNameTag {
                    template_id: id.clone(),
                })?
                .to_string();

            debug!("Publishing edit for {} ({})", name, id);
            let outcome = self
                .directory
                .publish_new_version(&id, &edit.launch_template_data)
                .await?;

            self.emit(WorkflowEvent::Updated {
                name: name.clone(),
                outcome: outcome.clone(),
            });
            report.updated.push(DeployedTemplate { name, outcome });
        }

        Ok(report)
    }
}
