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

use crate::domain::{DomainError, PublishConfig, ReportConfig};
use async_trait::async_trait;

/// Secondary port - Configuration provider abstraction
///
/// This interface abstracts how configuration is loaded and managed,
/// allowing for different sources (CLI args, files, environment, etc.)
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    /// Get record assembly configuration
    ///
    /// # Returns
    /// * `Ok(ReportConfig)` - Report configuration
    /// * `Err(DomainError)` - Error loading configuration
    async fn get_report_config(&self) -> Result<ReportConfig, DomainError>;

    /// Get publishing configuration
    ///
    /// # Returns
    /// * `Ok(PublishConfig)` - API location and dry-run flag
    /// * `Err(DomainError)` - Error loading configuration
    async fn get_publish_config(&self) -> Result<PublishConfig, DomainError>;
}
