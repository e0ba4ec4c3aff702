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

use crate::domain::{HardwareRecord, PublishConfig, PublishError, SubmissionReceipt};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Secondary port - Data publishing abstraction
///
/// This interface abstracts how hardware records reach the community
/// database, allowing stub implementations in tests.
#[async_trait]
pub trait DataPublisher: Send + Sync {
    /// Submit a hardware record once, without retrying
    ///
    /// # Arguments
    /// * `record` - The record to submit
    /// * `config` - Publishing configuration
    ///
    /// # Returns
    /// * `Ok(SubmissionReceipt)` - What the server echoed back
    /// * `Err(PublishError)` - Error occurred during submission
    async fn submit(
        &self,
        record: &HardwareRecord,
        config: &PublishConfig,
    ) -> Result<SubmissionReceipt, PublishError>;
}

/// Secondary port - File repository abstraction
///
/// This interface abstracts local storage of hardware records
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Write the record to a new, persistent temporary file for bug reports
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the dump file
    /// * `Err(PublishError)` - Error occurred during save
    async fn save_dump(&self, record: &HardwareRecord) -> Result<PathBuf, PublishError>;

    /// Load a hardware record from a JSON file
    ///
    /// # Returns
    /// * `Ok(HardwareRecord)` - Loaded record
    /// * `Err(PublishError)` - Error occurred during load
    async fn load_json(&self, path: &Path) -> Result<HardwareRecord, PublishError>;
}
