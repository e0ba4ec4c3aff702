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

use crate::domain::{
    ErrorReport, HardwareRecord, PublishConfig, PublishError, ReportError, RunOutcome, RunRequest,
    SubmissionReceipt,
};
use async_trait::async_trait;

/// Primary port - Main interface offered by the submission domain
///
/// This is what external systems (CLI, library consumers) use to collect a
/// hardware record and send it to the community database.
#[async_trait]
pub trait HardwareSubmissionService: Send + Sync {
    /// Build the board/BIOS part of the record
    ///
    /// Uses the `--data` document when the request names one, otherwise the
    /// DMI tables.
    ///
    /// # Returns
    /// * `Ok(HardwareRecord)` - Record without vendor IDs resolved
    /// * `Err(ReportError)` - Malformed DMI date or unusable data file
    async fn collect_hardware(&self, request: &RunRequest) -> Result<HardwareRecord, ReportError>;

    /// Fill board and BIOS vendor IDs from the vendor catalog
    ///
    /// Misses and lookup failures are recorded in `report` and leave the
    /// vendor ID empty.
    async fn resolve_vendors(&self, record: &mut HardwareRecord, report: &mut ErrorReport);

    /// Merge the PCI IOMMU topology into the record
    ///
    /// # Returns
    /// * `Ok(())` - Groups merged
    /// * `Err(ReportError)` - The lspci listing could not be produced
    async fn attach_topology(&self, record: &mut HardwareRecord) -> Result<(), ReportError>;

    /// Submit a record to the community database
    ///
    /// # Returns
    /// * `Ok(SubmissionReceipt)` - Server echo of the accepted record
    /// * `Err(PublishError)` - Error occurred during submission
    async fn submit_record(
        &self,
        record: &HardwareRecord,
        config: &PublishConfig,
    ) -> Result<SubmissionReceipt, PublishError>;

    /// Run the whole pipeline once
    ///
    /// # Returns
    /// * `Ok(RunOutcome)` - Final record, recorded problems, dump path, receipt
    /// * `Err(ReportError)` - A fatal error stopped the run
    async fn run(&self, request: RunRequest) -> Result<RunOutcome, ReportError>;
}
