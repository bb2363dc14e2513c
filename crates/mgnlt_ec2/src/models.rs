//! Launch template models in the EC2 wire format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag key holding a template's human-readable name.
pub const NAME_TAG_KEY: &str = "Name";

/// A key/value tag attached to a provider resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Summary entry returned by `describe-launch-templates` and `modify-launch-template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplate {
    pub launch_template_id: String,
    #[serde(default)]
    pub launch_template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version_number: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl LaunchTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            launch_template_id: id.into(),
            launch_template_name: name.into(),
            default_version_number: None,
            latest_version_number: None,
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn with_versions(mut self, default_version: i64, latest_version: i64) -> Self {
        self.default_version_number = Some(default_version);
        self.latest_version_number = Some(latest_version);
        self
    }

    /// Check whether a tag with the given key is present.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }
}

/// One launch template version, kept verbatim as the provider described it.
///
/// The field set of `LaunchTemplateData` is open-ended, so the record stays a JSON
/// object and only the handful of fields this tool reads get typed accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateRecord(Map<String, Value>);

impl TemplateRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn launch_template_id(&self) -> Option<&str> {
        self.0.get("LaunchTemplateId").and_then(Value::as_str)
    }

    pub fn version_number(&self) -> Option<i64> {
        self.0.get("VersionNumber").and_then(Value::as_i64)
    }

    pub fn is_default(&self) -> bool {
        self.0
            .get("DefaultVersion")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn launch_template_data(&self) -> Option<&Map<String, Value>> {
        self.0.get("LaunchTemplateData").and_then(Value::as_object)
    }

    /// The `Name` tag of the first tag specification in the template data.
    pub fn name_tag(&self) -> Option<&str> {
        self.launch_template_data().and_then(name_tag)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Look up the `Name` tag in the first `TagSpecifications` block of launch template data.
///
/// When the block repeats the key, the last occurrence wins.
pub fn name_tag(data: &Map<String, Value>) -> Option<&str> {
    data.get("TagSpecifications")?
        .as_array()?
        .first()?
        .get("Tags")?
        .as_array()?
        .iter()
        .filter(|tag| tag.get("Key").and_then(Value::as_str) == Some(NAME_TAG_KEY))
        .filter_map(|tag| tag.get("Value").and_then(Value::as_str))
        .last()
}

/// Result of promoting a version to default.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyResponse {
    pub launch_template: LaunchTemplate,
    pub http_status_code: u16,
}
