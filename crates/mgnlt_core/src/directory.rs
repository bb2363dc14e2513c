//! Template directory client.
//!
//! Sits on top of an [`Ec2Api`] and knows which templates belong to the Application
//! Migration Service, which version to read, and how a new default version is made.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use mgnlt_ec2::{Ec2Api, LaunchTemplate, ModifyResponse, TemplateRecord};

use crate::error::{CoreError, CoreResult};
use crate::merge::merge_fields;

/// Tag key the migration service puts on templates it manages.
pub const MANAGED_TAG_KEY: &str = "AWSApplicationMigrationServiceManaged";

/// Name prefix of per-server templates generated by the migration service.
///
/// The service's own default starter template does not carry it.
pub const MANAGED_NAME_PREFIX: &str = "created-and-used-by-application-migration-service-s";

/// Which version of a template's history to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSelection {
    /// Whatever the provider lists first.
    First,
    /// The version flagged as default.
    Default,
    /// The highest version number.
    #[default]
    Latest,
}

impl VersionSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSelection::First => "first",
            VersionSelection::Default => "default",
            VersionSelection::Latest => "latest",
        }
    }

    /// Pick a version from a history in provider order.
    pub fn select<'a>(&self, versions: &'a [TemplateRecord]) -> Option<&'a TemplateRecord> {
        match self {
            VersionSelection::First => versions.first(),
            VersionSelection::Default => versions.iter().find(|v| v.is_default()),
            VersionSelection::Latest => versions
                .iter()
                .filter(|v| v.version_number().is_some())
                .max_by_key(|v| v.version_number()),
        }
    }
}

impl fmt::Display for VersionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifiers reported after a new version was made default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub template_id: String,
    pub default_version_number: i64,
    pub latest_version_number: i64,
    /// Status of the promotion call. The AWS CLI drops response metadata and fails on
    /// error statuses, so with that transport this is a synthesized `200`.
    pub http_status_code: u16,
}

impl PublishOutcome {
    fn from_response(template_id: &str, response: ModifyResponse) -> CoreResult<Self> {
        let template = response.launch_template;
        let default_version_number = template
            .default_version_number
            .ok_or_else(|| CoreError::malformed(template_id, "missing DefaultVersionNumber"))?;
        let latest_version_number = template
            .latest_version_number
            .ok_or_else(|| CoreError::malformed(template_id, "missing LatestVersionNumber"))?;

        Ok(Self {
            template_id: template.launch_template_id,
            default_version_number,
            latest_version_number,
            http_status_code: response.http_status_code,
        })
    }
}

/// Check whether a template is a per-server template managed by the migration service.
pub fn is_managed(template: &LaunchTemplate) -> bool {
    template.has_tag(MANAGED_TAG_KEY) && template.launch_template_name.starts_with(MANAGED_NAME_PREFIX)
}

/// Client for the migration service's launch templates in one region.
pub struct TemplateDirectory {
    api: Arc<dyn Ec2Api>,
    selection: VersionSelection,
}

impl TemplateDirectory {
    pub fn new(api: Arc<dyn Ec2Api>) -> Self {
        Self {
            api,
            selection: VersionSelection::default(),
        }
    }

    /// Set the version [`fetch_template`](Self::fetch_template) reads.
    pub fn with_selection(mut self, selection: VersionSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn region(&self) -> &str {
        self.api.region()
    }

    pub fn selection(&self) -> VersionSelection {
        self.selection
    }

    /// Ids of managed templates, in listing order.
    pub async fn list_managed_template_ids(&self) -> CoreResult<Vec<String>> {
        info!("Listing launch templates in {}", self.api.region());
        let templates = self.api.describe_launch_templates().await?;
        let total = templates.len();

        let ids: Vec<String> = templates
            .into_iter()
            .filter(is_managed)
            .map(|t| t.launch_template_id)
            .collect();

        debug!("{} of {} launch templates are managed", ids.len(), total);
        Ok(ids)
    }

    /// Read one version of a template, chosen by the configured selection.
    pub async fn fetch_template(&self, template_id: &str) -> CoreResult<TemplateRecord> {
        let versions = self.api.describe_launch_template_versions(template_id).await?;
        if versions.is_empty() {
            return Err(CoreError::NoVersions(template_id.to_string()));
        }

        let record = self.selection.select(&versions).ok_or_else(|| match self.selection {
            VersionSelection::Default => CoreError::NoDefaultVersion(template_id.to_string()),
            _ => CoreError::malformed(template_id, "no version carries a VersionNumber"),
        })?;

        debug!(
            "Fetched {} version {:?} of {}",
            self.selection,
            record.version_number(),
            template_id
        );
        Ok(record.clone())
    }

    /// Create a new version from the current default plus `overrides`, and make it default.
    pub async fn publish_new_version(
        &self,
        template_id: &str,
        overrides: &Map<String, Value>,
    ) -> CoreResult<PublishOutcome> {
        let versions = self.api.describe_launch_template_versions(template_id).await?;
        let current = VersionSelection::Default
            .select(&versions)
            .ok_or_else(|| CoreError::NoDefaultVersion(template_id.to_string()))?;

        let source_version = current
            .version_number()
            .ok_or_else(|| CoreError::malformed(template_id, "default version has no VersionNumber"))?;
        let empty = Map::new();
        let original = current.launch_template_data().unwrap_or(&empty);
        let merged = merge_fields(original, overrides);

        info!(
            "Creating version of {} from default version {}",
            template_id, source_version
        );
        let created = self
            .api
            .create_launch_template_version(template_id, source_version, &merged)
            .await?;
        let new_version = created
            .version_number()
            .ok_or_else(|| CoreError::malformed(template_id, "created version has no VersionNumber"))?;

        info!("Setting version {} of {} as default", new_version, template_id);
        let response = self
            .api
            .modify_launch_template(template_id, new_version)
            .await?;

        PublishOutcome::from_response(template_id, response)
    }
}
