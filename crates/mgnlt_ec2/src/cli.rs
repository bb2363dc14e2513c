//! AWS CLI backed EC2 client.
//!
//! Each operation shells out to `aws ec2 <operation> ... --output json` and decodes the
//! JSON document the CLI prints. The CLI keeps the provider's PascalCase field names and
//! renders timestamps as ISO-8601 strings, so version records can be written to disk as-is.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, info};

use crate::api::Ec2Api;
use crate::config::AwsCliOptions;
use crate::error::{Ec2Error, Ec2Result};
use crate::models::{LaunchTemplate, ModifyResponse, TemplateRecord};

const DESCRIBE_TEMPLATES: &str = "describe-launch-templates";
const DESCRIBE_VERSIONS: &str = "describe-launch-template-versions";
const CREATE_VERSION: &str = "create-launch-template-version";
const MODIFY_TEMPLATE: &str = "modify-launch-template";

/// Status reported for a call the CLI completed successfully.
///
/// The CLI drops response metadata and exits non-zero for any error status, so a
/// decoded response body always came from a 200.
const CLI_SUCCESS_STATUS: u16 = 200;

/// EC2 client driving the AWS CLI.
pub struct AwsCliClient {
    options: AwsCliOptions,
}

impl AwsCliClient {
    pub fn new(options: AwsCliOptions) -> Self {
        info!("Using AWS CLI {:?} in region {}", options.binary, options.region);
        Self { options }
    }

    pub fn options(&self) -> &AwsCliOptions {
        &self.options
    }

    /// Check that the CLI executable can be started.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.options.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Full argument list for an EC2 operation.
    fn build_args(&self, operation: &str, operation_args: Vec<String>) -> Vec<String> {
        let mut args = vec!["ec2".to_string(), operation.to_string()];
        args.extend(operation_args);
        args.extend(self.options.common_args());
        args
    }

    /// Format command for logging.
    fn format_command(&self, args: &[String]) -> String {
        let mut cmd = self.options.binary.to_string_lossy().to_string();
        for arg in args {
            if arg.contains(' ') || arg.contains('{') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    async fn invoke(&self, operation: &str, operation_args: Vec<String>) -> Ec2Result<Value> {
        let args = self.build_args(operation, operation_args);
        debug!("Executing: {}", self.format_command(&args));

        let output = Command::new(&self.options.binary)
            .args(&args)
            .env("AWS_PAGER", "")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Ec2Error::CliNotAvailable(format!(
                    "{} not found: {}",
                    self.options.binary.display(),
                    e
                )),
                _ => Ec2Error::Io(e),
            })?;

        if !output.status.success() {
            return Err(Ec2Error::CommandFailed {
                operation: operation.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl Ec2Api for AwsCliClient {
    fn region(&self) -> &str {
        &self.options.region
    }

    async fn describe_launch_templates(&self) -> Ec2Result<Vec<LaunchTemplate>> {
        let mut args = Vec::new();
        if !self.options.paginate {
            args.push("--no-paginate".to_string());
        }
        let response = self.invoke(DESCRIBE_TEMPLATES, args).await?;
        parse_launch_templates(response)
    }

    async fn describe_launch_template_versions(
        &self,
        template_id: &str,
    ) -> Ec2Result<Vec<TemplateRecord>> {
        let args = vec!["--launch-template-id".to_string(), template_id.to_string()];
        let response = self.invoke(DESCRIBE_VERSIONS, args).await?;
        parse_template_versions(response)
    }

    async fn create_launch_template_version(
        &self,
        template_id: &str,
        source_version: i64,
        data: &Map<String, Value>,
    ) -> Ec2Result<TemplateRecord> {
        let args = vec![
            "--launch-template-id".to_string(),
            template_id.to_string(),
            "--source-version".to_string(),
            source_version.to_string(),
            "--launch-template-data".to_string(),
            serde_json::to_string(data)?,
        ];
        let response = self.invoke(CREATE_VERSION, args).await?;
        parse_created_version(response)
    }

    async fn modify_launch_template(
        &self,
        template_id: &str,
        default_version: i64,
    ) -> Ec2Result<ModifyResponse> {
        let args = vec![
            "--launch-template-id".to_string(),
            template_id.to_string(),
            "--default-version".to_string(),
            default_version.to_string(),
        ];
        let response = self.invoke(MODIFY_TEMPLATE, args).await?;
        parse_modify_response(response)
    }
}

fn take_field(mut response: Value, operation: &str, field: &str) -> Ec2Result<Value> {
    response
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| Ec2Error::malformed(operation, format!("missing {}", field)))
}

fn parse_launch_templates(response: Value) -> Ec2Result<Vec<LaunchTemplate>> {
    let templates = take_field(response, DESCRIBE_TEMPLATES, "LaunchTemplates")?;
    Ok(serde_json::from_value(templates)?)
}

fn parse_template_versions(response: Value) -> Ec2Result<Vec<TemplateRecord>> {
    let versions = take_field(response, DESCRIBE_VERSIONS, "LaunchTemplateVersions")?;
    Ok(serde_json::from_value(versions)?)
}

fn parse_created_version(response: Value) -> Ec2Result<TemplateRecord> {
    let version = take_field(response, CREATE_VERSION, "LaunchTemplateVersion")?;
    TemplateRecord::from_value(version)
        .ok_or_else(|| Ec2Error::malformed(CREATE_VERSION, "LaunchTemplateVersion is not an object"))
}

fn parse_modify_response(response: Value) -> Ec2Result<ModifyResponse> {
    let http_status_code = response
        .pointer("/ResponseMetadata/HTTPStatusCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(CLI_SUCCESS_STATUS);
    let template = take_field(response, MODIFY_TEMPLATE, "LaunchTemplate")?;

    Ok(ModifyResponse {
        launch_template: serde_json::from_value(template)?,
        http_status_code,
    })
}
