//! EC2 launch template API trait.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Ec2Result;
use crate::models::{LaunchTemplate, ModifyResponse, TemplateRecord};

/// The four launch template operations this tool consumes from EC2.
#[async_trait]
pub trait Ec2Api: Send + Sync {
    /// Region every call is made against.
    fn region(&self) -> &str;

    /// List launch templates.
    async fn describe_launch_templates(&self) -> Ec2Result<Vec<LaunchTemplate>>;

    /// List the versions of one launch template, in provider order.
    async fn describe_launch_template_versions(
        &self,
        template_id: &str,
    ) -> Ec2Result<Vec<TemplateRecord>>;

    /// Create a new version from `data`, based on `source_version`.
    async fn create_launch_template_version(
        &self,
        template_id: &str,
        source_version: i64,
        data: &Map<String, Value>,
    ) -> Ec2Result<TemplateRecord>;

    /// Make `version` the template's default version.
    async fn modify_launch_template(
        &self,
        template_id: &str,
        default_version: i64,
    ) -> Ec2Result<ModifyResponse>;
}
