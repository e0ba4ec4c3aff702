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

//! Linux DMI provider reading `/sys/devices/virtual/dmi/id`

use crate::domain::{dmi_file_names, DmiSnapshot, SystemError, DEFAULT_DMI_PATH};
use crate::ports::HardwareInfoProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Linux hardware identity provider backed by the sysfs DMI tables
pub struct SysfsHardwareProvider {
    dmi_path: PathBuf,
}

impl SysfsHardwareProvider {
    /// Create a provider reading DMI files from `dmi_path`
    pub fn new(dmi_path: impl Into<PathBuf>) -> Self {
        Self {
            dmi_path: dmi_path.into(),
        }
    }

    /// Create a provider for the running system
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_DMI_PATH)
    }

    pub fn dmi_path(&self) -> &Path {
        &self.dmi_path
    }
}

#[async_trait]
impl HardwareInfoProvider for SysfsHardwareProvider {
    async fn read_dmi_snapshot(&self) -> Result<DmiSnapshot, SystemError> {
        if !self.dmi_path.is_dir() {
            log::warn!(
                "DMI directory {} not found, using placeholder values",
                self.dmi_path.display()
            );
        }

        let mut snapshot = DmiSnapshot::new();
        for file in dmi_file_names() {
            let path = self.dmi_path.join(&file);
            match fs::read_to_string(&path).await {
                Ok(contents) => snapshot.insert(&file, &contents),
                // Missing or unreadable files fall back to placeholders
                Err(e) => log::debug!("Skipping {}: {e}", path.display()),
            }
        }
        Ok(snapshot)
    }

    fn dmi_file_path(&self, file: &str) -> PathBuf {
        self.dmi_path.join(file)
    }

    async fn read_dmi_file(&self, file: &str) -> Option<String> {
        fs::read_to_string(self.dmi_file_path(file)).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_declared_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("board_name"), "B550 Steel Legend\n").unwrap();
        std::fs::write(dir.path().join("board_vendor"), "ASRock\n").unwrap();
        std::fs::write(dir.path().join("bios_date"), "07/12/2022\n").unwrap();
        std::fs::write(dir.path().join("product_name"), "\n").unwrap();
        std::fs::write(dir.path().join("product_serial"), "secret\n").unwrap();

        let provider = SysfsHardwareProvider::new(dir.path());
        let snapshot = provider.read_dmi_snapshot().await.unwrap();

        assert_eq!(snapshot.get("board_name"), Some("B550 Steel Legend"));
        assert_eq!(snapshot.get("board_vendor"), Some("ASRock"));
        assert_eq!(snapshot.get("bios_date"), Some("07/12/2022"));
        assert_eq!(snapshot.get("product_name"), None);
        assert_eq!(snapshot.get("product_serial"), None);
        assert_eq!(snapshot.get("bios_version"), None);
    }

    #[tokio::test]
    async fn test_missing_directory_gives_empty_snapshot() {
        let dir = tempdir().unwrap();
        let provider = SysfsHardwareProvider::new(dir.path().join("does-not-exist"));

        let snapshot = provider.read_dmi_snapshot().await.unwrap();
        assert_eq!(snapshot, DmiSnapshot::new());
    }

    #[tokio::test]
    async fn test_read_single_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("board_vendor"), "Micro-Star International Co., Ltd.\n")
            .unwrap();
        let provider = SysfsHardwareProvider::new(dir.path());

        assert_eq!(
            provider.read_dmi_file("board_vendor").await.as_deref(),
            Some("Micro-Star International Co., Ltd.\n")
        );
        assert_eq!(provider.read_dmi_file("bios_vendor").await, None);
    }

    #[test]
    fn test_dmi_file_path() {
        let provider = SysfsHardwareProvider::with_defaults();
        assert_eq!(
            provider.dmi_file_path("bios_vendor"),
            PathBuf::from("/sys/devices/virtual/dmi/id/bios_vendor")
        );
        assert_eq!(provider.dmi_path(), Path::new(DEFAULT_DMI_PATH));
    }
}
