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

//! Common parsing utilities and helper functions

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[xxxx]` at the very end of a value, as lspci -nn appends to names
    pub static ref BRACKETED_ID_RE: Regex = Regex::new(r"\[[\s\w]{4}\]$").unwrap();
}

/// Length of a bracketed ID suffix such as `[8086]`
const ID_SUFFIX_LEN: usize = 6;

/// Parse a key-value pair from system output
///
/// # Arguments
/// * `line` - Line to parse (e.g., "Vendor:\tIntel Corporation [8086]")
/// * `separator` - Separator character (usually ':')
///
/// # Returns
/// * `Ok((String, String))` - Key-value pair, split on the first separator
/// * `Err(String)` - Parse error
pub fn parse_key_value(line: &str, separator: char) -> Result<(String, String), String> {
    if let Some(pos) = line.find(separator) {
        let key = line[..pos].trim().to_string();
        let value = line[pos + separator.len_utf8()..].trim().to_string();
        Ok((key, value))
    } else {
        Err(format!("No separator '{separator}' found in line: {line}"))
    }
}

/// Split a trailing bracketed ID off a display value
///
/// Values of six characters or fewer never carry an ID. The character before
/// the bracket (normally a space) is dropped along with the suffix.
///
/// # Returns
/// * `Some((name, id))` - e.g. `("Intel Corporation", "8086")`
/// * `None` - No bracketed ID suffix
pub fn split_bracketed_id(value: &str) -> Option<(String, String)> {
    if value.len() <= ID_SUFFIX_LEN {
        return None;
    }

    let found = BRACKETED_ID_RE.find(value)?;
    if found.end() - found.start() != ID_SUFFIX_LEN {
        return None;
    }

    let id = found.as_str().trim_matches(|c| c == '[' || c == ']');
    let mut name = value[..found.start()].chars();
    name.next_back();

    Some((name.as_str().to_string(), id.to_string()))
}

/// Convert a DMI `MM/DD/YYYY` date to `YYYY-MM-DD`
pub fn normalize_dmi_date(value: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("Invalid BIOS date '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        let (key, value) = parse_key_value("Slot:\t00:1f.3", ':').unwrap();
        assert_eq!(key, "Slot");
        assert_eq!(value, "00:1f.3");
        assert!(parse_key_value("no separator here", ':').is_err());
    }

    #[test]
    fn test_split_bracketed_id() {
        assert_eq!(
            split_bracketed_id("Intel Corporation [8086]"),
            Some(("Intel Corporation".to_string(), "8086".to_string()))
        );
        assert_eq!(
            split_bracketed_id("Advanced Micro Devices, Inc. [AMD/ATI] [1002]"),
            Some((
                "Advanced Micro Devices, Inc. [AMD/ATI]".to_string(),
                "1002".to_string()
            ))
        );
        assert_eq!(split_bracketed_id("Ethernet"), None);
        assert_eq!(split_bracketed_id("Device [abc]"), None);
    }

    #[test]
    fn test_short_values_never_split() {
        // Exactly six characters matching the pattern is still a plain value
        assert_eq!(split_bracketed_id("[8086]"), None);
        assert_eq!(
            split_bracketed_id("x[8086]"),
            Some((String::new(), "8086".to_string()))
        );
    }

    #[test]
    fn test_normalize_dmi_date() {
        assert_eq!(normalize_dmi_date("01/15/2023").unwrap(), "2023-01-15");
        assert_eq!(normalize_dmi_date("12/31/1999\n").unwrap(), "1999-12-31");
        assert!(normalize_dmi_date("2023-01-15").is_err());
        assert!(normalize_dmi_date("13/01/2023").is_err());
        assert!(normalize_dmi_date("").is_err());
    }
}
