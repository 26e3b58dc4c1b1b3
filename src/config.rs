use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::types::SequenceId;

/// Where sequences live on disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Root holding the `training/` and `testing/` folders
    pub base_path: PathBuf,
    /// Image folder name inside each sequence directory
    pub image_folder: String,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data"),
            image_folder: "images".to_string(),
        }
    }
}

impl SequenceConfig {
    pub fn new(base_path: impl Into<PathBuf>, image_folder: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            image_folder: image_folder.into(),
        }
    }

    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SequenceError::NotFound {
                path: path.to_path_buf(),
            },
            _ => SequenceError::Io(e),
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SequenceError::malformed(path, e.to_string()))
    }

    /// `{base_path}/{split}/sequence_{id}`
    pub fn sequence_dir(&self, id: &SequenceId) -> PathBuf {
        self.base_path.join(id.split.as_str()).join(id.dir_name())
    }
}
