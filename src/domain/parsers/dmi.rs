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

//! Board/BIOS record assembly from DMI sysfs values

use super::common::normalize_dmi_date;
use crate::domain::{
    BiosInfo, BoardInfo, ChassisInfo, DmiSnapshot, DomainError, HardwareRecord, ProductInfo,
};

/// Declared `(section, field)` pairs of the record
pub const DMI_FIELDS: &[(&str, &str)] = &[
    ("board", "name"),
    ("board", "board_vendor"),
    ("board", "version"),
    ("bios", "date"),
    ("bios", "release"),
    ("bios", "bios_vendor"),
    ("bios", "version"),
    ("chassis", "type"),
    ("product", "family"),
    ("product", "name"),
];

/// SMBIOS chassis types for portable, laptop and notebook machines
pub const PORTABLE_CHASSIS_TYPES: &[&str] = &["8", "9", "10"];

/// File backing a declared field; vendor fields name their file directly
pub fn dmi_file_name(section: &str, field: &str) -> String {
    if field.ends_with("vendor") {
        field.to_string()
    } else {
        format!("{section}_{field}")
    }
}

/// Every DMI file the record reads
pub fn dmi_file_names() -> Vec<String> {
    DMI_FIELDS
        .iter()
        .map(|(section, field)| dmi_file_name(section, field))
        .collect()
}

/// Build a hardware record from DMI values, using placeholders for missing files
///
/// # Errors
/// * `DomainError::ParsingFailed` - `bios_date` is not `MM/DD/YYYY`
pub fn parse_dmi_snapshot(snapshot: &DmiSnapshot) -> Result<HardwareRecord, DomainError> {
    let value = |section: &str, field: &str| -> Option<String> {
        snapshot
            .get(&dmi_file_name(section, field))
            .map(str::to_string)
    };

    let mut board = BoardInfo::default();
    if let Some(name) = value("board", "name") {
        board.name = name;
    }
    if let Some(version) = value("board", "version") {
        board.version = version;
    }
    if let Some(vendor) = value("board", "board_vendor") {
        board.vendor.name = vendor;
    }

    let mut bios = BiosInfo::default();
    if let Some(date) = value("bios", "date") {
        bios.date = normalize_dmi_date(&date).map_err(DomainError::ParsingFailed)?;
    }
    if let Some(release) = value("bios", "release") {
        bios.release = release;
    }
    if let Some(version) = value("bios", "version") {
        bios.version = version;
    }
    if let Some(vendor) = value("bios", "bios_vendor") {
        bios.vendor.name = vendor;
    }

    let chassis = ChassisInfo {
        type_: value("chassis", "type").unwrap_or_default(),
    };
    let product = ProductInfo {
        family: value("product", "family").unwrap_or_default(),
        name: value("product", "name").unwrap_or_default(),
    };

    let mut record = HardwareRecord {
        board,
        bios,
        chassis: Some(chassis),
        product: Some(product),
        groups: Vec::new(),
    };
    apply_portable_board_name(&mut record);
    Ok(record)
}

/// Relabel OEM laptop boards by product, whose board tables are rarely useful
///
/// Drops the chassis and product sections once they have been folded into
/// the board name.
pub fn apply_portable_board_name(record: &mut HardwareRecord) {
    let portable = record
        .chassis
        .as_ref()
        .is_some_and(|chassis| PORTABLE_CHASSIS_TYPES.contains(&chassis.type_.as_str()));
    if !portable {
        return;
    }

    if let Some(product) = record.product.take() {
        record.board.name = format!("{} ({})", product.name, product.family);
    }
    record.chassis = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NO_VENDOR, UNKNOWN_VALUE};

    fn desktop_snapshot() -> DmiSnapshot {
        let mut snapshot = DmiSnapshot::new();
        snapshot.insert("board_name", "ROG STRIX X570-E GAMING");
        snapshot.insert("board_vendor", "ASUSTeK COMPUTER INC.");
        snapshot.insert("board_version", "Rev X.0x");
        snapshot.insert("bios_date", "01/15/2023");
        snapshot.insert("bios_release", "5.17");
        snapshot.insert("bios_vendor", "American Megatrends Inc.");
        snapshot.insert("bios_version", "4408");
        snapshot.insert("chassis_type", "3");
        snapshot.insert("product_family", "To be filled by O.E.M.");
        snapshot.insert("product_name", "System Product Name");
        snapshot
    }

    #[test]
    fn test_file_names() {
        assert_eq!(dmi_file_name("board", "name"), "board_name");
        assert_eq!(dmi_file_name("board", "board_vendor"), "board_vendor");
        assert_eq!(dmi_file_name("bios", "date"), "bios_date");
        assert_eq!(
            dmi_file_names(),
            vec![
                "board_name",
                "board_vendor",
                "board_version",
                "bios_date",
                "bios_release",
                "bios_vendor",
                "bios_version",
                "chassis_type",
                "product_family",
                "product_name",
            ]
        );
    }

    #[test]
    fn test_parse_full_snapshot() {
        let record = parse_dmi_snapshot(&desktop_snapshot()).unwrap();

        assert_eq!(record.board.name, "ROG STRIX X570-E GAMING");
        assert_eq!(record.board.version, "Rev X.0x");
        assert_eq!(record.board.vendor.name, "ASUSTeK COMPUTER INC.");
        assert_eq!(record.board.vendor.vendorid, "");
        assert_eq!(record.bios.date, "2023-01-15");
        assert_eq!(record.bios.release, "5.17");
        assert_eq!(record.bios.version, "4408");
        assert_eq!(record.bios.vendor.name, "American Megatrends Inc.");
        assert_eq!(record.chassis.unwrap().type_, "3");
        assert_eq!(record.product.unwrap().name, "System Product Name");
        assert!(record.groups.is_empty());
    }

    #[test]
    fn test_empty_snapshot_uses_placeholders() {
        let record = parse_dmi_snapshot(&DmiSnapshot::new()).unwrap();

        assert_eq!(record.board.name, UNKNOWN_VALUE);
        assert_eq!(record.board.version, UNKNOWN_VALUE);
        assert_eq!(record.board.vendor.name, NO_VENDOR);
        assert_eq!(record.bios.date, "");
        assert_eq!(record.bios.release, "");
        assert_eq!(record.bios.version, UNKNOWN_VALUE);
        assert_eq!(record.bios.vendor.name, NO_VENDOR);
        assert_eq!(record.chassis, Some(ChassisInfo::default()));
        assert_eq!(record.product, Some(ProductInfo::default()));

        let value = serde_json::to_value(&record).unwrap();
        for section in ["board", "bios", "chassis", "product", "groups"] {
            assert!(value.get(section).is_some(), "missing section {section}");
        }
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let mut snapshot = desktop_snapshot();
        snapshot.insert("bios_date", "2023-01-15");

        let err = parse_dmi_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, DomainError::ParsingFailed(_)));
        assert!(err.to_string().contains("2023-01-15"));
    }

    #[test]
    fn test_portable_chassis_relabels_board() {
        for chassis_type in PORTABLE_CHASSIS_TYPES {
            let mut snapshot = DmiSnapshot::new();
            snapshot.insert("board_name", "0K8HC8");
            snapshot.insert("chassis_type", chassis_type);
            snapshot.insert("product_family", "XPS");
            snapshot.insert("product_name", "XPS 13 9310");

            let record = parse_dmi_snapshot(&snapshot).unwrap();
            assert_eq!(record.board.name, "XPS 13 9310 (XPS)");
            assert!(record.chassis.is_none());
            assert!(record.product.is_none());

            let value = serde_json::to_value(&record).unwrap();
            assert!(value.get("chassis").is_none());
            assert!(value.get("product").is_none());
        }
    }

    #[test]
    fn test_portable_chassis_without_product_files() {
        let mut snapshot = DmiSnapshot::new();
        snapshot.insert("chassis_type", "10");

        let record = parse_dmi_snapshot(&snapshot).unwrap();
        assert_eq!(record.board.name, " ()");
    }

    #[test]
    fn test_other_chassis_types_keep_sections() {
        for chassis_type in ["1", "3", "17", "31"] {
            let mut snapshot = desktop_snapshot();
            snapshot.insert("chassis_type", chassis_type);
            let record = parse_dmi_snapshot(&snapshot).unwrap();
            assert_eq!(record.board.name, "ROG STRIX X570-E GAMING");
            assert!(record.chassis.is_some());
            assert!(record.product.is_some());
        }
    }
}
