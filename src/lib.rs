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

//! IOMMU Report Library
//!
//! Collects mainboard and firmware identity from the Linux DMI tables, the
//! IOMMU grouping of every PCI device from `lspci -nnvmm`, and submits the
//! result to the iommu.info community database.
//!
//! # Architecture
//!
//! - **Domain**: Record entities, pure parsers and the submission service
//! - **Ports**: Interfaces for external interactions
//! - **Adapters**: sysfs, lspci, HTTP and file system implementations
//!
//! # Usage
//!
//! ```rust,no_run
//! use iommu_report::{create_service, RunRequest};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = create_service().await?;
//!
//!     let request = RunRequest {
//!         dry_run: true,
//!         ..RunRequest::default()
//!     };
//!     let outcome = service.run(request).await?;
//!
//!     println!("{} IOMMU groups", outcome.record.groups.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod container;
pub mod domain;
pub mod ports;

pub use adapters::{
    CapturedLspciSource, ConfigOverrides, FileSystemRepository, HttpDataPublisher,
    HttpVendorCatalog, LspciCommandSource, SysfsHardwareProvider, TomlConfigurationProvider,
    UnixCommandExecutor,
};
pub use container::{ContainerConfig, ContainerConfigBuilder, ServiceContainer};
pub use domain::{
    ErrorReport, HardwareRecord, PublishConfig, PublishError, ReportConfig, ReportError,
    RunOutcome, RunRequest,
};
pub use ports::{
    CommandExecutor, ConfigurationProvider, DataPublisher, FileRepository, HardwareInfoProvider,
    HardwareSubmissionService, PciTopologySource, VendorCatalog,
};

use std::error::Error;
use std::sync::Arc;

/// Create a submission service for the running system with default settings
///
/// # Returns
/// * `Ok(Arc<dyn HardwareSubmissionService>)` - Configured service ready to use
/// * `Err(Box<dyn Error>)` - Error occurred during service creation
pub async fn create_service() -> Result<Arc<dyn HardwareSubmissionService>, Box<dyn Error>> {
    create_service_with_config(ContainerConfig::default()).await
}

/// Create a submission service with custom container configuration
pub async fn create_service_with_config(
    container_config: ContainerConfig,
) -> Result<Arc<dyn HardwareSubmissionService>, Box<dyn Error>> {
    let container = ServiceContainer::new(container_config);
    container.create_submission_service()
}
