//! In-memory EC2 client for testing.
//!
//! Holds launch templates and their version histories, applies version creation and
//! default promotion to that state, and records every call so tests can assert on
//! which provider mutations happened.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::api::Ec2Api;
use crate::error::{Ec2Error, Ec2Result};
use crate::models::{LaunchTemplate, ModifyResponse, TemplateRecord};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedCall {
    pub method: String,
    pub template_id: Option<String>,
    pub version: Option<i64>,
    pub data: Option<Map<String, Value>>,
}

impl CapturedCall {
    fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            template_id: None,
            version: None,
            data: None,
        }
    }

    fn template(mut self, template_id: &str) -> Self {
        self.template_id = Some(template_id.to_string());
        self
    }

    fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }
}

/// Mock EC2 client.
#[derive(Clone)]
pub struct MockEc2 {
    region: String,
    /// Templates in listing order.
    templates: Arc<RwLock<Vec<LaunchTemplate>>>,
    /// Version histories, newest first as EC2 returns them.
    versions: Arc<RwLock<HashMap<String, Vec<TemplateRecord>>>>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Method name that should fail, with its message.
    simulate_failure: Arc<RwLock<Option<(String, String)>>>,
}

impl Default for MockEc2 {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEc2 {
    pub fn new() -> Self {
        Self {
            region: "us-east-2".to_string(),
            templates: Arc::new(RwLock::new(Vec::new())),
            versions: Arc::new(RwLock::new(HashMap::new())),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Add a template together with its version history (in provider order).
    pub fn add_template(self, template: LaunchTemplate, versions: Vec<TemplateRecord>) -> Self {
        self.versions
            .write()
            .insert(template.launch_template_id.clone(), versions);
        self.templates.write().push(template);
        self
    }

    /// Make every call to `method` fail with `message`.
    pub fn simulate_failure(self, method: impl Into<String>, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some((method.into(), message.into()));
        self
    }

    /// Current state of a template.
    pub fn template(&self, template_id: &str) -> Option<LaunchTemplate> {
        self.templates
            .read()
            .iter()
            .find(|t| t.launch_template_id == template_id)
            .cloned()
    }

    /// Current version history of a template.
    pub fn versions(&self, template_id: &str) -> Vec<TemplateRecord> {
        self.versions
            .read()
            .get(template_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls.read().iter().any(|c| c.method == method)
    }

    /// Check whether any mutating call targeted `template_id`.
    pub fn was_mutated(&self, template_id: &str) -> bool {
        self.captured_calls.read().iter().any(|c| {
            (c.method == "create_launch_template_version" || c.method == "modify_launch_template")
                && c.template_id.as_deref() == Some(template_id)
        })
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    fn check_failure(&self, method: &str) -> Ec2Result<()> {
        match self.simulate_failure.read().as_ref() {
            Some((failing, message)) if failing == method => Err(Ec2Error::Api(message.clone())),
            _ => Ok(()),
        }
    }

    fn not_found(template_id: &str) -> Ec2Error {
        Ec2Error::Api(format!(
            "InvalidLaunchTemplateId.NotFound: {} does not exist",
            template_id
        ))
    }
}

#[async_trait]
impl Ec2Api for MockEc2 {
    fn region(&self) -> &str {
        &self.region
    }

    async fn describe_launch_templates(&self) -> Ec2Result<Vec<LaunchTemplate>> {
        self.record_call(CapturedCall::new("describe_launch_templates"));
        self.check_failure("describe_launch_templates")?;
        Ok(self.templates.read().clone())
    }

    async fn describe_launch_template_versions(
        &self,
        template_id: &str,
    ) -> Ec2Result<Vec<TemplateRecord>> {
        self.record_call(CapturedCall::new("describe_launch_template_versions").template(template_id));
        self.check_failure("describe_launch_template_versions")?;
        self.versions
            .read()
            .get(template_id)
            .cloned()
            .ok_or_else(|| Self::not_found(template_id))
    }

    async fn create_launch_template_version(
        &self,
        template_id: &str,
        source_version: i64,
        data: &Map<String, Value>,
    ) -> Ec2Result<TemplateRecord> {
        let mut call = CapturedCall::new("create_launch_template_version")
            .template(template_id)
            .version(source_version);
        call.data = Some(data.clone());
        self.record_call(call);
        self.check_failure("create_launch_template_version")?;

        let mut versions = self.versions.write();
        let history = versions
            .get_mut(template_id)
            .ok_or_else(|| Self::not_found(template_id))?;

        let source = history
            .iter()
            .find(|v| v.version_number() == Some(source_version))
            .cloned()
            .ok_or_else(|| {
                Ec2Error::Api(format!(
                    "InvalidLaunchTemplateVersion: version {} of {} does not exist",
                    source_version, template_id
                ))
            })?;
        let next_version = history
            .iter()
            .filter_map(TemplateRecord::version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let mut created = source;
        created.set_field("VersionNumber", Value::from(next_version));
        created.set_field("DefaultVersion", Value::Bool(false));
        created.set_field("LaunchTemplateData", Value::Object(data.clone()));
        history.insert(0, created.clone());

        if let Some(template) = self
            .templates
            .write()
            .iter_mut()
            .find(|t| t.launch_template_id == template_id)
        {
            template.latest_version_number = Some(next_version);
        }

        Ok(created)
    }

    async fn modify_launch_template(
        &self,
        template_id: &str,
        default_version: i64,
    ) -> Ec2Result<ModifyResponse> {
        self.record_call(
            CapturedCall::new("modify_launch_template")
                .template(template_id)
                .version(default_version),
        );
        self.check_failure("modify_launch_template")?;

        let mut versions = self.versions.write();
        let history = versions
            .get_mut(template_id)
            .ok_or_else(|| Self::not_found(template_id))?;
        if !history
            .iter()
            .any(|v| v.version_number() == Some(default_version))
        {
            return Err(Ec2Error::Api(format!(
                "InvalidLaunchTemplateVersion: version {} of {} does not exist",
                default_version, template_id
            )));
        }
        for version in history.iter_mut() {
            let is_default = version.version_number() == Some(default_version);
            version.set_field("DefaultVersion", Value::Bool(is_default));
        }

        let mut templates = self.templates.write();
        let template = templates
            .iter_mut()
            .find(|t| t.launch_template_id == template_id)
            .ok_or_else(|| Self::not_found(template_id))?;
        template.default_version_number = Some(default_version);

        Ok(ModifyResponse {
            launch_template: template.clone(),
            http_status_code: 200,
        })
    }
}
