//! Snapshot writing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use mgnlt_ec2::TemplateRecord;

use crate::error::{CoreError, CoreResult};

/// Writes template version records as `<Name>.json` files.
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Indentation used for snapshot files.
    pub const INDENT: &'static [u8] = b"    ";

    /// Write `record` into `destination_dir`, replacing any file of the same name.
    pub fn write_snapshot(record: &TemplateRecord, destination_dir: &Path) -> CoreResult<PathBuf> {
        let name = Self::snapshot_name(record)?;
        let path = destination_dir.join(format!("{}.json", name));
        debug!("Writing snapshot to {:?}", path);

        fs::write(&path, Self::render(record)?)?;
        Ok(path)
    }

    /// Name a record is stored under: its `Name` tag.
    pub fn snapshot_name(record: &TemplateRecord) -> CoreResult<&str> {
        let name = record.name_tag().ok_or_else(|| CoreError::MissingNameTag {
            template_id: record.launch_template_id().unwrap_or("<unknown>").to_string(),
        })?;

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(CoreError::InvalidSnapshotName(name.to_string()));
        }
        Ok(name)
    }

    /// Pretty-print with four-space indentation.
    pub fn render(record: &TemplateRecord) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(Self::INDENT));
        record.serialize(&mut serializer)?;
        Ok(buf)
    }
}
