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

//! Configuration loaded from an optional TOML file
//!
//! ```toml
//! [report]
//! dmi_path = "/sys/devices/virtual/dmi/id"
//! lspci_program = "/usr/bin/lspci"
//! split_all_ids = false
//!
//! [publish]
//! api_url = "https://iommu.info/api"
//! ```
//!
//! Command line values win over file values.

use crate::domain::{DomainError, IdSplitRule, PublishConfig, ReportConfig};
use crate::ports::ConfigurationProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    report: ReportSection,
    #[serde(default)]
    publish: PublishSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportSection {
    dmi_path: Option<PathBuf>,
    lspci_program: Option<String>,
    /// Split bracketed IDs on every lspci key, not just vendor keys
    split_all_ids: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublishSection {
    api_url: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dmi_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub dry_run: bool,
}

/// Configuration provider merging a TOML file with command line overrides
#[derive(Debug, Clone)]
pub struct TomlConfigurationProvider {
    report: ReportConfig,
    publish: PublishConfig,
}

impl TomlConfigurationProvider {
    /// Parse configuration text and apply overrides
    pub fn from_toml_str(contents: &str, overrides: ConfigOverrides) -> Result<Self, DomainError> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?;
        Ok(Self::merge(file, overrides))
    }

    /// Load `path` when given, otherwise use defaults, then apply overrides
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, DomainError> {
        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    DomainError::InvalidConfiguration(format!("{}: {e}", path.display()))
                })?;
                Self::from_toml_str(&contents, overrides)
            }
            None => Ok(Self::merge(ConfigFile::default(), overrides)),
        }
    }

    fn merge(file: ConfigFile, overrides: ConfigOverrides) -> Self {
        let mut report = ReportConfig::default();
        if let Some(dmi_path) = overrides.dmi_path.or(file.report.dmi_path) {
            report.dmi_path = dmi_path;
        }
        if let Some(program) = file.report.lspci_program {
            report.lspci_program = program;
        }
        if file.report.split_all_ids == Some(true) {
            report.id_split = IdSplitRule::AnyKey;
        }

        let mut publish = PublishConfig {
            dry_run: overrides.dry_run,
            ..PublishConfig::default()
        };
        if let Some(api_url) = overrides.api_url.or(file.publish.api_url) {
            publish.api_url = api_url;
        }

        Self { report, publish }
    }
}

#[async_trait]
impl ConfigurationProvider for TomlConfigurationProvider {
    async fn get_report_config(&self) -> Result<ReportConfig, DomainError> {
        Ok(self.report.clone())
    }

    async fn get_publish_config(&self) -> Result<PublishConfig, DomainError> {
        Ok(self.publish.clone())
    }
}
