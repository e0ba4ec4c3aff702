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

use crate::domain::{DmiSnapshot, SystemError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Secondary port - Hardware identity provider
///
/// This interface abstracts where board/BIOS identification tables come from
/// (sysfs on Linux, fixture directories in tests).
#[async_trait]
pub trait HardwareInfoProvider: Send + Sync {
    /// Read every declared DMI file
    ///
    /// # Returns
    /// * `Ok(DmiSnapshot)` - Values of the files that exist and are non-empty
    /// * `Err(SystemError)` - The DMI source itself is unusable
    async fn read_dmi_snapshot(&self) -> Result<DmiSnapshot, SystemError>;

    /// Location of a DMI file, used in diagnostic suggestions
    fn dmi_file_path(&self, file: &str) -> PathBuf;

    /// Raw contents of one DMI file
    ///
    /// # Returns
    /// * `Some(String)` - The file exists and is readable
    /// * `None` - Missing or unreadable
    async fn read_dmi_file(&self, file: &str) -> Option<String>;
}

/// Secondary port - PCI topology source
///
/// Produces raw `lspci -nnvmm` text, either by running the utility or by
/// reading previously captured output.
#[async_trait]
pub trait PciTopologySource: Send + Sync {
    /// Get the raw listing
    ///
    /// # Returns
    /// * `Ok(String)` - `lspci -nnvmm` formatted text
    /// * `Err(SystemError)` - Listing could not be produced
    async fn lspci_output(&self) -> Result<String, SystemError>;

    /// Human readable description of where the listing comes from
    fn describe(&self) -> String;
}
