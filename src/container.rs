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

//! Dependency injection container for the submission service

use crate::adapters::{
    CapturedLspciSource, FileSystemRepository, HttpDataPublisher, HttpVendorCatalog,
    LspciCommandSource, SysfsHardwareProvider, UnixCommandExecutor,
};
use crate::domain::{
    DomainError, IdSplitRule, PublishConfig, ReportConfig, SubmissionService, DEFAULT_API_URL,
    DEFAULT_DMI_PATH, DEFAULT_LSPCI_PROGRAM,
};
use crate::ports::{
    CommandExecutor, ConfigurationProvider, DataPublisher, FileRepository, HardwareInfoProvider,
    HardwareSubmissionService, PciTopologySource, VendorCatalog,
};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the dependency injection container
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Command execution timeout
    pub command_timeout: Duration,
    /// HTTP timeout for vendor lookups and submission
    pub http_timeout: Duration,
    /// Directory holding the DMI files
    pub dmi_path: PathBuf,
    /// PCI enumeration program
    pub lspci_program: String,
    /// Captured `lspci -nnvmm` output used instead of running the program
    pub lspci_file: Option<PathBuf>,
    /// API base URL
    pub api_url: String,
    pub id_split: IdSplitRule,
    pub dry_run: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
            dmi_path: PathBuf::from(DEFAULT_DMI_PATH),
            lspci_program: DEFAULT_LSPCI_PROGRAM.to_string(),
            lspci_file: None,
            api_url: DEFAULT_API_URL.to_string(),
            id_split: IdSplitRule::default(),
            dry_run: false,
        }
    }
}

impl ContainerConfig {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            dmi_path: self.dmi_path.clone(),
            lspci_program: self.lspci_program.clone(),
            id_split: self.id_split,
        }
    }

    pub fn publish_config(&self) -> PublishConfig {
        PublishConfig {
            api_url: self.api_url.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Simple configuration provider implementation
pub struct SimpleConfigurationProvider {
    report: ReportConfig,
    publish: PublishConfig,
}

impl SimpleConfigurationProvider {
    pub fn new(report: ReportConfig, publish: PublishConfig) -> Self {
        Self { report, publish }
    }
}

#[async_trait::async_trait]
impl ConfigurationProvider for SimpleConfigurationProvider {
    async fn get_report_config(&self) -> Result<ReportConfig, DomainError> {
        Ok(self.report.clone())
    }

    async fn get_publish_config(&self) -> Result<PublishConfig, DomainError> {
        Ok(self.publish.clone())
    }
}

/// Dependency injection container
pub struct ServiceContainer {
    config: ContainerConfig,
}

impl ServiceContainer {
    /// Create a new service container with configuration
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Create the command executor
    pub fn create_command_executor(&self) -> Arc<dyn CommandExecutor> {
        Arc::new(UnixCommandExecutor::new(self.config.command_timeout))
    }

    /// Create the sysfs DMI reader
    pub fn create_hardware_provider(&self) -> Arc<dyn HardwareInfoProvider> {
        Arc::new(SysfsHardwareProvider::new(&self.config.dmi_path))
    }

    /// Create the PCI topology source: a captured listing when one was given,
    /// the lspci program otherwise
    pub fn create_topology_source(&self) -> Arc<dyn PciTopologySource> {
        match &self.config.lspci_file {
            Some(path) => Arc::new(CapturedLspciSource::new(path)),
            None => Arc::new(LspciCommandSource::new(
                self.create_command_executor(),
                &self.config.lspci_program,
            )),
        }
    }

    /// Create the vendor catalog client
    pub fn create_vendor_catalog(&self) -> Result<Arc<dyn VendorCatalog>, Box<dyn Error>> {
        let catalog = HttpVendorCatalog::new(&self.config.api_url, self.config.http_timeout)?;
        Ok(Arc::new(catalog))
    }

    /// Create the data publisher
    pub fn create_data_publisher(&self) -> Result<Arc<dyn DataPublisher>, Box<dyn Error>> {
        let http_publisher = HttpDataPublisher::new(self.config.http_timeout)?;
        Ok(Arc::new(http_publisher))
    }

    pub fn create_file_repository(&self) -> Arc<dyn FileRepository> {
        Arc::new(FileSystemRepository::new())
    }

    /// Create the configuration provider
    pub fn create_configuration_provider(&self) -> Arc<dyn ConfigurationProvider> {
        Arc::new(SimpleConfigurationProvider::new(
            self.config.report_config(),
            self.config.publish_config(),
        ))
    }

    /// Create the complete submission service
    pub fn create_submission_service(
        &self,
    ) -> Result<Arc<dyn HardwareSubmissionService>, Box<dyn Error>> {
        let service = SubmissionService::new(
            self.create_hardware_provider(),
            self.create_topology_source(),
            self.create_vendor_catalog()?,
            self.create_data_publisher()?,
            self.create_file_repository(),
            self.create_configuration_provider(),
        );

        Ok(Arc::new(service))
    }
}

/// Builder pattern for container configuration
pub struct ContainerConfigBuilder {
    config: ContainerConfig,
}

impl ContainerConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
        }
    }

    /// Take report and publish settings from a configuration provider
    pub async fn from_provider(
        mut self,
        provider: &dyn ConfigurationProvider,
    ) -> Result<Self, DomainError> {
        let report = provider.get_report_config().await?;
        let publish = provider.get_publish_config().await?;

        self.config.dmi_path = report.dmi_path;
        self.config.lspci_program = report.lspci_program;
        self.config.id_split = report.id_split;
        self.config.api_url = publish.api_url;
        self.config.dry_run = publish.dry_run;
        Ok(self)
    }

    /// Set command timeout
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    /// Set HTTP timeout
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn dmi_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dmi_path = path.into();
        self
    }

    pub fn lspci_program(mut self, program: &str) -> Self {
        self.config.lspci_program = program.to_string();
        self
    }

    /// Read PCI topology from a captured listing
    pub fn lspci_file(mut self, path: Option<PathBuf>) -> Self {
        self.config.lspci_file = path;
        self
    }

    pub fn api_url(mut self, url: &str) -> Self {
        self.config.api_url = url.to_string();
        self
    }

    pub fn id_split(mut self, rule: IdSplitRule) -> Self {
        self.config.id_split = rule;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ContainerConfig {
        self.config
    }
}

impl Default for ContainerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ConfigOverrides, TomlConfigurationProvider};

    #[test]
    fn test_config_builder() {
        let config = ContainerConfigBuilder::new()
            .command_timeout(Duration::from_secs(60))
            .dmi_path("/tmp/dmi")
            .api_url("http://localhost:8000/api")
            .id_split(IdSplitRule::AnyKey)
            .dry_run(true)
            .build();

        assert_eq!(config.command_timeout, Duration::from_secs(60));
        assert_eq!(config.report_config().dmi_path, PathBuf::from("/tmp/dmi"));
        assert_eq!(config.report_config().id_split, IdSplitRule::AnyKey);
        assert_eq!(
            config.publish_config(),
            PublishConfig {
                api_url: "http://localhost:8000/api".to_string(),
                dry_run: true,
            }
        );
    }

    #[tokio::test]
    async fn test_builder_from_provider() {
        let provider = TomlConfigurationProvider::from_toml_str(
            "[report]\nlspci_program = \"/usr/sbin/lspci\"\n",
            ConfigOverrides {
                dry_run: true,
                ..ConfigOverrides::default()
            },
        )
        .unwrap();

        let config = ContainerConfigBuilder::new()
            .from_provider(&provider)
            .await
            .unwrap()
            .build();

        assert_eq!(config.lspci_program, "/usr/sbin/lspci");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.dry_run);
    }

    #[tokio::test]
    async fn test_configuration_provider_mirrors_config() {
        let container = ServiceContainer::new(ContainerConfigBuilder::new().dry_run(true).build());
        let provider = container.create_configuration_provider();

        assert!(provider.get_publish_config().await.unwrap().dry_run);
        assert_eq!(
            provider.get_report_config().await.unwrap(),
            ReportConfig::default()
        );
    }

    #[test]
    fn test_topology_source_selection() {
        let container = ServiceContainer::new(ContainerConfig::default());
        assert_eq!(container.create_topology_source().describe(), "lspci -nnvmm");

        let container = ServiceContainer::new(
            ContainerConfigBuilder::new()
                .lspci_file(Some(PathBuf::from("/tmp/lspci.txt")))
                .build(),
        );
        assert_eq!(container.create_topology_source().describe(), "/tmp/lspci.txt");
    }

    #[test]
    fn test_complete_service_creation() {
        let container = ServiceContainer::new(ContainerConfig::default());
        assert!(container.create_vendor_catalog().is_ok());
        assert!(container.create_data_publisher().is_ok());
        assert!(container.create_submission_service().is_ok());
    }
}
