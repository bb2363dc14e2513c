//! Integration tests for the snapshot and deploy workflows.

use std::fs;
use std::sync::Arc;

use support::EventLog;
use serde_json::{json, Value};
use tempfile::tempdir;

use mgnlt_core::{
    CoreError, StagingArea, TemplateDirectory, VersionSelection, Workflow, WorkflowEvent,
    MANAGED_NAME_PREFIX, MANAGED_TAG_KEY,
};
use mgnlt_ec2::{LaunchTemplate, MockEc2, TemplateRecord};

mod support {
    use std::sync::{Arc, Mutex};

    use mgnlt_core::{ProgressHandler, WorkflowEvent};

    /// Collects workflow events for assertions.
    #[derive(Clone, Default)]
    pub struct EventLog(Arc<Mutex<Vec<WorkflowEvent>>>);

    impl EventLog {
        pub fn handler(&self) -> ProgressHandler {
            let events = self.0.clone();
            Arc::new(move |event: &WorkflowEvent| events.lock().unwrap().push(event.clone()))
        }

        pub fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|e| e.to_string()).collect()
        }

        pub fn events(&self) -> Vec<WorkflowEvent> {
            self.0.lock().unwrap().clone()
        }
    }
}

fn managed(id: &str) -> LaunchTemplate {
    LaunchTemplate::new(id, format!("{}-{}", MANAGED_NAME_PREFIX, id))
        .with_tag(MANAGED_TAG_KEY, "mgn.amazonaws.com")
        .with_versions(1, 2)
}

fn version(id: &str, number: i64, is_default: bool, name: &str, instance_type: &str) -> TemplateRecord {
    TemplateRecord::from_value(json!({
        "LaunchTemplateId": id,
        "LaunchTemplateName": format!("{}-{}", MANAGED_NAME_PREFIX, id),
        "VersionNumber": number,
        "CreateTime": "2023-05-01T10:00:00+00:00",
        "CreatedBy": "arn:aws:sts::123456789012:assumed-role/mgn",
        "DefaultVersion": is_default,
        "LaunchTemplateData": {
            "InstanceType": instance_type,
            "Monitoring": {"Enabled": false},
            "TagSpecifications": [
                {"ResourceType": "instance", "Tags": [{"Key": "Name", "Value": name}]}
            ]
        }
    }))
    .unwrap()
}

/// Two managed templates (A, B), one untagged lookalike and the service's starter template.
fn provider() -> MockEc2 {
    MockEc2::new()
        .add_template(
            managed("lt-a"),
            vec![
                version("lt-a", 2, false, "server-a", "t3.large"),
                version("lt-a", 1, true, "server-a", "t3.micro"),
            ],
        )
        .add_template(
            managed("lt-b"),
            vec![
                version("lt-b", 2, false, "server-b", "t3.large"),
                version("lt-b", 1, true, "server-b", "t3.micro"),
            ],
        )
        .add_template(
            LaunchTemplate::new("lt-x", format!("{}-lt-x", MANAGED_NAME_PREFIX)),
            vec![version("lt-x", 1, true, "unmanaged", "t3.micro")],
        )
        .add_template(
            LaunchTemplate::new("lt-starter", "created-and-used-by-application-migration-service")
                .with_tag(MANAGED_TAG_KEY, "mgn.amazonaws.com"),
            vec![version("lt-starter", 1, true, "starter", "t3.micro")],
        )
}

fn workflow(ec2: &MockEc2, staging: StagingArea, log: &EventLog) -> Workflow {
    let directory = TemplateDirectory::new(Arc::new(ec2.clone()));
    Workflow::new(directory, staging).with_progress_handler(log.handler())
}

fn write_edit(staging: &StagingArea, file: &str, value: Value) {
    fs::write(staging.modified_dir().join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

#[tokio::test]
async fn test_list_filters_managed_templates() {
    let ec2 = provider();
    let directory = TemplateDirectory::new(Arc::new(ec2));

    let ids = directory.list_managed_template_ids().await.unwrap();
    assert_eq!(ids, vec!["lt-a", "lt-b"]);
}

#[tokio::test]
async fn test_create_snapshots_round_trip() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider();
    let log = EventLog::default();

    let written = workflow(&ec2, staging.clone(), &log)
        .create_snapshots()
        .await
        .unwrap();

    assert_eq!(
        written,
        vec![
            staging.original_dir().join("server-a.json"),
            staging.original_dir().join("server-b.json"),
        ]
    );

    // Latest version is the default selection.
    let text = fs::read_to_string(&written[0]).unwrap();
    assert!(text.starts_with("{\n    \"LaunchTemplateId\": \"lt-a\""));
    let read_back: Value = serde_json::from_str(&text).unwrap();
    let expected = version("lt-a", 2, false, "server-a", "t3.large");
    assert_eq!(read_back, Value::Object(expected.into_map()));

    let lines = log.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], mgnlt_core::EDIT_HINT);
    assert!(!ec2.was_mutated("lt-a"));
}

#[tokio::test]
async fn test_snapshot_with_first_selection() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = MockEc2::new().add_template(
        managed("lt-a"),
        vec![
            version("lt-a", 1, true, "server-a", "t3.micro"),
            version("lt-a", 2, false, "server-a", "t3.large"),
        ],
    );

    let directory = TemplateDirectory::new(Arc::new(ec2)).with_selection(VersionSelection::First);
    let path = Workflow::new(directory, staging)
        .snapshot_template("lt-a")
        .await
        .unwrap();

    let snapshot: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(snapshot["VersionNumber"], json!(1));
}

#[tokio::test]
async fn test_snapshot_without_name_tag_fails() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let unnamed = TemplateRecord::from_value(json!({
        "LaunchTemplateId": "lt-a",
        "VersionNumber": 1,
        "DefaultVersion": true,
        "LaunchTemplateData": {"InstanceType": "t3.micro"}
    }))
    .unwrap();
    let ec2 = MockEc2::new().add_template(managed("lt-a"), vec![unnamed]);
    let log = EventLog::default();

    let err = workflow(&ec2, staging.clone(), &log)
        .create_snapshots()
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::MissingNameTag { ref template_id } if template_id == "lt-a"));
    assert_eq!(fs::read_dir(staging.original_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_deploy_skips_templates_without_edits() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider();
    let log = EventLog::default();

    write_edit(
        &staging,
        "server-a.json",
        json!({
            "LaunchTemplateId": "lt-a",
            "LaunchTemplateData": {
                "InstanceType": "m5.xlarge",
                "TagSpecifications": [
                    {"ResourceType": "instance", "Tags": [{"Key": "Name", "Value": "server-a"}]}
                ]
            }
        }),
    );
    // Not a managed template: never considered.
    write_edit(
        &staging,
        "unmanaged.json",
        json!({"LaunchTemplateId": "lt-x", "LaunchTemplateData": {"InstanceType": "m5.xlarge"}}),
    );
    fs::write(staging.modified_dir().join("notes.txt"), "not json").unwrap();

    let report = workflow(&ec2, staging, &log).deploy_all().await.unwrap();

    assert_eq!(report.skipped, vec!["lt-b"]);
    assert_eq!(report.updated.len(), 1);
    let deployed = &report.updated[0];
    assert_eq!(deployed.name, "server-a");
    assert_eq!(deployed.outcome.template_id, "lt-a");
    assert_eq!(deployed.outcome.default_version_number, 3);
    assert_eq!(deployed.outcome.latest_version_number, 3);
    assert_eq!(deployed.outcome.http_status_code, 200);

    assert_eq!(
        log.lines(),
        vec![
            "Updating server-a...TemplateID: lt-a, DefaultVersion: 3, LatestVersion: 3, HTTPStatusCode: 200",
            "No modified data for lt-b",
        ]
    );
    assert!(matches!(log.events()[1], WorkflowEvent::Skipped { .. }));

    assert!(ec2.was_mutated("lt-a"));
    assert!(!ec2.was_mutated("lt-b"));
    assert!(!ec2.was_mutated("lt-x"));
}

#[tokio::test]
async fn test_deploy_merges_over_default_version() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider();
    let log = EventLog::default();

    write_edit(
        &staging,
        "server-b.json",
        json!({
            "LaunchTemplateId": "lt-b",
            "VersionNumber": 1,
            "LaunchTemplateData": {
                "Monitoring": {"Enabled": true},
                "KeyName": "ops",
                "TagSpecifications": [
                    {"ResourceType": "instance", "Tags": [{"Key": "Name", "Value": "server-b"}]}
                ]
            }
        }),
    );

    workflow(&ec2, staging, &log).deploy_all().await.unwrap();

    let created = ec2.get_method_calls("create_launch_template_version");
    assert_eq!(created.len(), 1);
    // Sourced from the default (v1), not the newer v2.
    assert_eq!(created[0].version, Some(1));
    let data = Value::Object(created[0].data.clone().unwrap());
    assert_eq!(data["InstanceType"], json!("t3.micro"));
    assert_eq!(data["Monitoring"], json!({"Enabled": true}));
    assert_eq!(data["KeyName"], json!("ops"));

    let promoted = ec2.get_method_calls("modify_launch_template");
    assert_eq!(promoted[0].version, Some(3));
    assert_eq!(ec2.template("lt-b").unwrap().default_version_number, Some(3));
}

#[tokio::test]
async fn test_deploy_edit_without_name_tag_aborts() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider();
    let log = EventLog::default();

    write_edit(
        &staging,
        "server-a.json",
        json!({"LaunchTemplateId": "lt-a", "LaunchTemplateData": {"InstanceType": "m5.large"}}),
    );

    let err = workflow(&ec2, staging, &log).deploy_all().await.unwrap_err();
    assert!(matches!(err, CoreError::MissingNameTag { .. }));
    assert!(!ec2.was_mutated("lt-a"));
    assert!(log.lines().is_empty());
}

#[tokio::test]
async fn test_deploy_stops_at_first_provider_error() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider().simulate_failure("modify_launch_template", "UnauthorizedOperation");
    let log = EventLog::default();

    for (file, id, name) in [("a.json", "lt-a", "server-a"), ("b.json", "lt-b", "server-b")] {
        write_edit(
            &staging,
            file,
            json!({
                "LaunchTemplateId": id,
                "LaunchTemplateData": {
                    "TagSpecifications": [{"Tags": [{"Key": "Name", "Value": name}]}]
                }
            }),
        );
    }

    let err = workflow(&ec2, staging, &log).deploy_all().await.unwrap_err();
    assert!(matches!(err, CoreError::Provider(_)));
    assert!(ec2.was_mutated("lt-a"));
    assert!(!ec2.was_mutated("lt-b"));
}

#[tokio::test]
async fn test_deploy_invalid_edit_file_aborts_before_publishing() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();
    let ec2 = provider();
    let log = EventLog::default();

    fs::write(staging.modified_dir().join("broken.json"), "{ not json").unwrap();

    let err = workflow(&ec2, staging, &log).deploy_all().await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidEdit { .. }));
    assert!(!ec2.was_called("create_launch_template_version"));
}

#[tokio::test]
async fn test_publish_requires_default_version() {
    let ec2 = MockEc2::new().add_template(
        managed("lt-a"),
        vec![version("lt-a", 1, false, "server-a", "t3.micro")],
    );
    let directory = TemplateDirectory::new(Arc::new(ec2.clone()));

    let err = directory
        .publish_new_version("lt-a", &serde_json::Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoDefaultVersion(_)));
    assert!(!ec2.was_mutated("lt-a"));
}

#[tokio::test]
async fn test_fetch_empty_history() {
    let ec2 = MockEc2::new().add_template(managed("lt-a"), Vec::new());
    let directory = TemplateDirectory::new(Arc::new(ec2));

    let err = directory.fetch_template("lt-a").await.unwrap_err();
    assert!(matches!(err, CoreError::NoVersions(_)));
}

#[tokio::test]
async fn test_duplicate_edits_last_file_wins() {
    let temp = tempdir().unwrap();
    let staging = StagingArea::new(temp.path());
    staging.ensure().unwrap();

    write_edit(
        &staging,
        "1-first.json",
        json!({"LaunchTemplateId": "lt-a", "LaunchTemplateData": {"InstanceType": "m5.large"}}),
    );
    write_edit(
        &staging,
        "2-second.json",
        json!({"LaunchTemplateId": "lt-a", "LaunchTemplateData": {"InstanceType": "c5.large"}}),
    );

    let edits = mgnlt_core::EditLoader::load_edits(&staging.modified_dir()).unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits["lt-a"].launch_template_data["InstanceType"], json!("c5.large"));
}
