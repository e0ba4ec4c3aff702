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

use crate::domain::ErrorReport;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Placeholder for text fields whose DMI file is missing or empty
pub const UNKNOWN_VALUE: &str = "__unknown__";
/// Placeholder for vendor names whose DMI file is missing or empty
pub const NO_VENDOR: &str = "_none_";

/// Default location of the DMI identification tables
pub const DEFAULT_DMI_PATH: &str = "/sys/devices/virtual/dmi/id";
/// Default iommu.info API base URL
pub const DEFAULT_API_URL: &str = "https://iommu.info/api";
/// Default PCI enumeration utility
pub const DEFAULT_LSPCI_PROGRAM: &str = "lspci";

/// The record submitted to iommu.info (root aggregate)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HardwareRecord {
    /// Mainboard identity
    pub board: BoardInfo,
    /// Firmware identity
    pub bios: BiosInfo,
    /// Chassis form factor, dropped for portable machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassis: Option<ChassisInfo>,
    /// Product identity, dropped for portable machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductInfo>,
    /// IOMMU groups in the order lspci first reported them
    #[serde(default)]
    pub groups: Vec<DeviceGroup>,
}

/// Mainboard information
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BoardInfo {
    pub name: String,
    pub version: String,
    #[serde(rename = "board_vendor")]
    pub vendor: VendorRef,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self {
            name: UNKNOWN_VALUE.to_string(),
            version: UNKNOWN_VALUE.to_string(),
            vendor: VendorRef::default(),
        }
    }
}

/// BIOS information
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BiosInfo {
    /// Release date, `YYYY-MM-DD`
    pub date: String,
    pub release: String,
    pub version: String,
    #[serde(rename = "bios_vendor")]
    pub vendor: VendorRef,
}

impl Default for BiosInfo {
    fn default() -> Self {
        Self {
            date: String::new(),
            release: String::new(),
            version: UNKNOWN_VALUE.to_string(),
            vendor: VendorRef::default(),
        }
    }
}

/// Chassis information
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ChassisInfo {
    /// SMBIOS chassis type code as text (e.g. "3" desktop, "10" notebook)
    #[serde(rename = "type")]
    pub type_: String,
}

/// Product information
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ProductInfo {
    pub family: String,
    pub name: String,
}

/// A vendor display name and its catalog ID
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VendorRef {
    pub name: String,
    #[serde(default)]
    pub vendorid: String,
}

impl VendorRef {
    pub fn new(name: impl Into<String>, vendorid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendorid: vendorid.into(),
        }
    }
}

impl Default for VendorRef {
    fn default() -> Self {
        Self::new(NO_VENDOR, "")
    }
}

/// Devices the IOMMU isolates as one unit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DeviceGroup {
    /// Group number as emitted by lspci, `None` when the kernel reports no group
    #[serde(default, deserialize_with = "group_number")]
    pub iommugroup: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// Accept group numbers written as JSON numbers in hand-made `--data` documents
fn group_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GroupNumber {
        Text(String),
        Number(u64),
    }

    Ok(
        Option::<GroupNumber>::deserialize(deserializer)?.map(|number| match number {
            GroupNumber::Text(text) => text,
            GroupNumber::Number(n) => n.to_string(),
        }),
    )
}

/// A single field of a PCI function record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum DeviceField {
    /// Value carrying a bracketed hex ID, split apart
    Identified(VendorRef),
    Text(String),
}

impl DeviceField {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DeviceField::Text(value) => Some(value),
            DeviceField::Identified(_) => None,
        }
    }

    pub fn as_identified(&self) -> Option<&VendorRef> {
        match self {
            DeviceField::Identified(vendor) => Some(vendor),
            DeviceField::Text(_) => None,
        }
    }
}

impl From<&str> for DeviceField {
    fn from(value: &str) -> Self {
        DeviceField::Text(value.to_string())
    }
}

/// Open, insertion-ordered set of lspci fields for one PCI function
///
/// Keys are whatever lspci emits, so new fields pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceRecord {
    fields: Vec<(String, DeviceField)>,
}

impl DeviceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing value in place
    pub fn insert(&mut self, key: impl Into<String>, value: DeviceField) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DeviceField> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DeviceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DeviceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeviceRecordVisitor;

        impl<'de> Visitor<'de> for DeviceRecordVisitor {
            type Value = DeviceRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of lspci fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = DeviceRecord::new();
                while let Some((key, value)) = access.next_entry::<String, DeviceField>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(DeviceRecordVisitor)
    }
}

/// Raw contents of the DMI files that were present and non-empty, keyed by file name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiSnapshot {
    values: HashMap<String, String>,
}

impl DmiSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; blank values are treated as absent
    pub fn insert(&mut self, file: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.insert(file.to_string(), value.to_string());
        }
    }

    pub fn get(&self, file: &str) -> Option<&str> {
        self.values.get(file).map(String::as_str)
    }
}

/// What the server echoed back for an accepted submission
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionReceipt {
    pub board_name: Option<String>,
    pub board_vendor: Option<String>,
    /// Page on the site that shows the submitted board
    pub view_url: Option<String>,
}

/// Which lspci keys get their bracketed `[xxxx]` suffix split into `{name, vendorid}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSplitRule {
    /// Only keys ending in `vendor`
    #[default]
    VendorKeysOnly,
    /// Every key, as early versions of the submitter did
    AnyKey,
}

/// Configuration for assembling a record
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Directory holding the DMI files
    pub dmi_path: PathBuf,
    /// PCI enumeration program, invoked with `-nnvmm`
    pub lspci_program: String,
    pub id_split: IdSplitRule,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dmi_path: PathBuf::from(DEFAULT_DMI_PATH),
            lspci_program: DEFAULT_LSPCI_PROGRAM.to_string(),
            id_split: IdSplitRule::default(),
        }
    }
}

/// Configuration for submitting records
#[derive(Debug, Clone, PartialEq)]
pub struct PublishConfig {
    /// API base URL; vendor lookups go to `<api_url>/vendor`
    pub api_url: String,
    /// Print the record instead of submitting it
    pub dry_run: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            dry_run: false,
        }
    }
}

/// Per-invocation inputs of a run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Pre-built record replacing the sysfs reader
    pub data_file: Option<PathBuf>,
    pub dry_run: bool,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The record as submitted or printed
    pub record: HardwareRecord,
    /// Recoverable problems recorded along the way
    pub report: ErrorReport,
    /// Diagnostic copy of the record, when it could be written
    pub dump_path: Option<PathBuf>,
    /// Server echo of an accepted submission
    pub receipt: Option<SubmissionReceipt>,
    pub dry_run: bool,
}

impl RunOutcome {
    /// Process exit code: non-zero once anything was recorded
    pub fn exit_code(&self) -> i32 {
        if self.report.is_empty() {
            0
        } else {
            1
        }
    }
}
