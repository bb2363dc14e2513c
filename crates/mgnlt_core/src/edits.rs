//! Loading of hand-edited template files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use walkdir::WalkDir;

use mgnlt_ec2::name_tag;

use crate::error::{CoreError, CoreResult};

/// An edited template file.
///
/// Only the id and the template data are used; everything else copied over from the
/// snapshot is kept in `extra` and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditRecord {
    pub launch_template_id: String,
    pub launch_template_data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EditRecord {
    /// The `Name` tag of the edited template data.
    pub fn name_tag(&self) -> Option<&str> {
        name_tag(&self.launch_template_data)
    }
}

/// Reads `*.json` files from a directory into edits keyed by template id.
pub struct EditLoader;

impl EditLoader {
    /// Load every edit file directly inside `source_dir`.
    ///
    /// Files are read in name order; when two declare the same id, the later one wins.
    /// Any unreadable or malformed file fails the whole load.
    pub fn load_edits(source_dir: &Path) -> CoreResult<HashMap<String, EditRecord>> {
        let mut edits = HashMap::new();

        if !source_dir.exists() {
            warn!("Edit directory does not exist: {:?}", source_dir);
            return Ok(edits);
        }

        for entry in WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| CoreError::InvalidEdit {
                path: e.path().unwrap_or(source_dir).to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();

            let is_json = path
                .file_name()
                .map_or(false, |name| name.to_string_lossy().ends_with(".json"));
            if !path.is_file() || !is_json {
                continue;
            }

            let edit = Self::load_edit_file(path)?;
            debug!("Loaded edit for {} from {:?}", edit.launch_template_id, path);
            if let Some(previous) = edits.insert(edit.launch_template_id.clone(), edit) {
                warn!(
                    "{:?} replaces an earlier edit for {}",
                    path, previous.launch_template_id
                );
            }
        }

        Ok(edits)
    }

    /// Parse a single edit file.
    pub fn load_edit_file(path: &Path) -> CoreResult<EditRecord> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CoreError::InvalidEdit {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
