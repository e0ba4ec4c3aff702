/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Local storage of hardware records

use crate::domain::{HardwareRecord, PublishError};
use crate::ports::FileRepository;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Prefix of the dump files left behind for bug reports
pub const DUMP_FILE_PREFIX: &str = "iommudb_";

/// File system repository for storing hardware records
pub struct FileSystemRepository {
    /// Where dump files go; the system temp directory when `None`
    dump_dir: Option<PathBuf>,
}

impl FileSystemRepository {
    /// Create a repository dumping into the system temp directory
    pub fn new() -> Self {
        Self { dump_dir: None }
    }

    /// Create a repository dumping into `dir`
    pub fn with_dump_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dump_dir: Some(dir.into()),
        }
    }
}

impl Default for FileSystemRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json(record: &HardwareRecord) -> Result<String, PublishError> {
    serde_json::to_string_pretty(record)
        .map_err(|e| PublishError::SerializationFailed(format!("JSON serialization failed: {e}")))
}

#[async_trait]
impl FileRepository for FileSystemRepository {
    async fn save_dump(&self, record: &HardwareRecord) -> Result<PathBuf, PublishError> {
        let json_string = to_json(record)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(DUMP_FILE_PREFIX).suffix(".json");
        let mut file = match &self.dump_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| PublishError::Io(format!("Failed to create dump file: {e}")))?;

        file.write_all(json_string.as_bytes())
            .map_err(|e| PublishError::Io(format!("Failed to write dump file: {e}")))?;

        // Keep the file after exit so it can be attached to an issue
        let (_, path) = file
            .keep()
            .map_err(|e| PublishError::Io(format!("Failed to keep dump file: {e}")))?;

        log::debug!("Record written to {}", path.display());
        Ok(path)
    }

    async fn load_json(&self, path: &Path) -> Result<HardwareRecord, PublishError> {
        let json_string = fs::read_to_string(path)
            .await
            .map_err(|e| PublishError::Io(format!("Failed to read {}: {e}", path.display())))?;

        serde_json::from_str(&json_string).map_err(|e| {
            PublishError::SerializationFailed(format!("JSON deserialization failed: {e}"))
        })
    }
}
