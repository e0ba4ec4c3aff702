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
    parse_dmi_snapshot, parse_lspci_output, DomainError, ErrorReport, HardwareRecord,
    PublishConfig, PublishError, ReportError, RunOutcome, RunRequest, SubmissionReceipt,
    VendorRef,
};
use crate::ports::{
    ConfigurationProvider, DataPublisher, FileRepository, HardwareInfoProvider,
    HardwareSubmissionService, PciTopologySource, VendorCatalog,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Domain service that assembles a hardware record and submits it
///
/// Steps run strictly in order: hardware identity, vendor lookups, PCI
/// topology, diagnostic dump, submission.
pub struct SubmissionService {
    /// DMI source (sysfs on Linux)
    hardware_provider: Arc<dyn HardwareInfoProvider>,
    /// lspci listing source
    topology_source: Arc<dyn PciTopologySource>,
    /// Vendor name to vendor ID lookups
    vendor_catalog: Arc<dyn VendorCatalog>,
    /// Publisher for the community database
    data_publisher: Arc<dyn DataPublisher>,
    /// Local storage for `--data` documents and the dump file
    file_repository: Arc<dyn FileRepository>,
    /// Configuration provider
    config_provider: Arc<dyn ConfigurationProvider>,
}

impl SubmissionService {
    /// Create a new submission service
    ///
    /// # Arguments
    /// * `hardware_provider` - Source of DMI values
    /// * `topology_source` - Source of `lspci -nnvmm` text
    /// * `vendor_catalog` - Vendor ID lookups
    /// * `data_publisher` - Publisher for submitting records
    /// * `file_repository` - Local record storage
    /// * `config_provider` - Configuration provider
    pub fn new(
        hardware_provider: Arc<dyn HardwareInfoProvider>,
        topology_source: Arc<dyn PciTopologySource>,
        vendor_catalog: Arc<dyn VendorCatalog>,
        data_publisher: Arc<dyn DataPublisher>,
        file_repository: Arc<dyn FileRepository>,
        config_provider: Arc<dyn ConfigurationProvider>,
    ) -> Self {
        Self {
            hardware_provider,
            topology_source,
            vendor_catalog,
            data_publisher,
            file_repository,
            config_provider,
        }
    }

    /// Look up one vendor, degrading to an empty vendor ID on any failure
    async fn resolve_vendor(
        &self,
        vendor: &VendorRef,
        tag: &str,
        report: &mut ErrorReport,
    ) -> VendorRef {
        match self.vendor_catalog.find_vendor(&vendor.name).await {
            Ok(Some(found)) => {
                log::info!("Resolved {tag} vendor '{}' to {}", vendor.name, found.vendorid);
                found
            }
            Ok(None) => {
                let file = format!("{tag}_vendor");
                let path = self.hardware_provider.dmi_file_path(&file);
                let contents = self.hardware_provider.read_dmi_file(&file).await;
                report.record_with_file(
                    format!("failed to retrieve {tag} vendorid for: {}", vendor.name),
                    &path,
                    contents.as_deref(),
                );
                VendorRef::new(vendor.name.clone(), "")
            }
            Err(e) => {
                report.record(
                    format!("Failed to retrieve {tag}_vendor ({}): {e}", vendor.name),
                    None,
                );
                VendorRef::new(vendor.name.clone(), "")
            }
        }
    }

    /// Write the dump file; failures only cost the user the attachment
    async fn write_dump(&self, record: &HardwareRecord) -> Option<std::path::PathBuf> {
        match self.file_repository.save_dump(record).await {
            Ok(path) => {
                log::info!("Wrote record to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not write diagnostic copy of the record: {e}");
                None
            }
        }
    }
}

/// Record a failed submission in the report
fn record_publish_error(report: &mut ErrorReport, error: PublishError) {
    match error {
        PublishError::Rejected { reason, body, .. } => {
            report.record(format!("API request error: {reason}"), Some(body));
        }
        other => report.record(format!("API request error: {other}"), None),
    }
}

#[async_trait]
impl HardwareSubmissionService for SubmissionService {
    async fn collect_hardware(&self, request: &RunRequest) -> Result<HardwareRecord, ReportError> {
        if let Some(path) = &request.data_file {
            log::info!("Loading hardware data from {}", path.display());
            return self
                .file_repository
                .load_json(path)
                .await
                .map_err(|e| ReportError::DataLoadFailed(format!("{}: {e}", path.display())));
        }

        let snapshot = self
            .hardware_provider
            .read_dmi_snapshot()
            .await
            .map_err(DomainError::from)?;
        Ok(parse_dmi_snapshot(&snapshot)?)
    }

    async fn resolve_vendors(&self, record: &mut HardwareRecord, report: &mut ErrorReport) {
        record.board.vendor = self
            .resolve_vendor(&record.board.vendor, "board", report)
            .await;
        record.bios.vendor = self.resolve_vendor(&record.bios.vendor, "bios", report).await;
    }

    async fn attach_topology(&self, record: &mut HardwareRecord) -> Result<(), ReportError> {
        let config = self.config_provider.get_report_config().await?;

        log::info!("Reading PCI topology from {}", self.topology_source.describe());
        let output = self.topology_source.lspci_output().await.map_err(|e| {
            ReportError::GenerationFailed(format!("PCI topology collection failed: {e}"))
        })?;

        parse_lspci_output(&output, record, config.id_split);
        log::debug!("Record now holds {} IOMMU groups", record.groups.len());
        Ok(())
    }

    async fn submit_record(
        &self,
        record: &HardwareRecord,
        config: &PublishConfig,
    ) -> Result<SubmissionReceipt, PublishError> {
        self.data_publisher.submit(record, config).await
    }

    async fn run(&self, request: RunRequest) -> Result<RunOutcome, ReportError> {
        let mut publish_config = self.config_provider.get_publish_config().await?;
        publish_config.dry_run |= request.dry_run;

        let mut report = ErrorReport::new();

        let mut record = self.collect_hardware(&request).await?;
        // Unknown vendors are kept out of the database by resolving them first
        self.resolve_vendors(&mut record, &mut report).await;
        self.attach_topology(&mut record).await?;

        let dump_path = self.write_dump(&record).await;

        let receipt = if publish_config.dry_run {
            log::info!("Dry run, not submitting");
            None
        } else {
            match self.submit_record(&record, &publish_config).await {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    record_publish_error(&mut report, e);
                    None
                }
            }
        };

        Ok(RunOutcome {
            record,
            report,
            dump_path,
            receipt,
            dry_run: publish_config.dry_run,
        })
    }
}
