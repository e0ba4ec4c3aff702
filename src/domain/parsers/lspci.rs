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

//! IOMMU group topology parsing from `lspci -nnvmm` output
//!
//! Each PCI function is a block of `Key:\tValue` lines terminated by a blank
//! line. The `IOMMUGroup` line belongs to the group, every other line to the
//! device.

use super::common::{parse_key_value, split_bracketed_id};
use crate::domain::{
    DeviceField, DeviceGroup, DeviceRecord, HardwareRecord, IdSplitRule, VendorRef,
};

/// Normalize an lspci key for JSON: lower-case, `class` becomes `dev_class`
pub fn normalize_lspci_key(key: &str) -> String {
    let key = key.to_lowercase();
    if key == "class" {
        "dev_class".to_string()
    } else {
        key
    }
}

/// Turn a raw lspci value into a device field, splitting a bracketed ID when the rule allows
pub fn lspci_field(key: &str, value: &str, rule: IdSplitRule) -> DeviceField {
    let eligible = match rule {
        IdSplitRule::VendorKeysOnly => key.ends_with("vendor"),
        IdSplitRule::AnyKey => true,
    };

    if eligible {
        if let Some((name, vendorid)) = split_bracketed_id(value) {
            return DeviceField::Identified(VendorRef { name, vendorid });
        }
    }
    DeviceField::Text(value.to_string())
}

/// Merge one finished device into the record's groups
///
/// A device already present in its group is not added twice.
pub fn merge_device(groups: &mut Vec<DeviceGroup>, iommugroup: Option<String>, device: DeviceRecord) {
    match groups.iter_mut().find(|g| g.iommugroup == iommugroup) {
        Some(group) => {
            if group.devices.contains(&device) {
                log::debug!("Device already present in IOMMU group {iommugroup:?}, skipping");
            } else {
                group.devices.push(device);
            }
        }
        None => groups.push(DeviceGroup {
            iommugroup,
            devices: vec![device],
        }),
    }
}

/// Parse `lspci -nnvmm` output into `record.groups`
///
/// Existing groups in the record are kept; devices with a known group number
/// are appended to that group in encounter order.
pub fn parse_lspci_output(output: &str, record: &mut HardwareRecord, rule: IdSplitRule) {
    let mut device = DeviceRecord::new();
    let mut iommugroup: Option<String> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            // Blank lines end a device; repeated ones carry nothing
            if !device.is_empty() {
                merge_device(
                    &mut record.groups,
                    iommugroup.take(),
                    std::mem::take(&mut device),
                );
            }
            continue;
        }

        let line = line.replace('\t', "");
        let (key, value) = match parse_key_value(&line, ':') {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("Skipping lspci line: {e}");
                continue;
            }
        };
        let key = normalize_lspci_key(&key);

        if key.starts_with("iommugroup") {
            iommugroup = Some(value);
            continue;
        }

        let field = lspci_field(&key, &value, rule);
        device.insert(key, field);
    }

    // Output that does not end in a blank line still holds a finished device
    if !device.is_empty() {
        merge_device(&mut record.groups, iommugroup, device);
    }
}
