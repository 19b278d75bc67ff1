//! Apple package metadata extraction.
//!
//! Unlike the Android path, the source material is already structured: the
//! bundle's Info.plist and the embedded provisioning profile arrive as
//! parsed property-list dictionaries, and extraction is a field-by-field
//! projection. A key absent from the source stays `None` and serializes as
//! `null`; it is never coerced to the empty string.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use plist::{Dictionary, Value};
use serde::Serialize;

use crate::error::Result;

/// The two descriptors collected from an opened Apple package.
#[derive(Debug, Clone, Default)]
pub struct IpaDescriptors {
    pub info_plist: Dictionary,
    pub provisioning: Dictionary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpaAppInfo {
    pub app_title: Option<String>,
    pub bundle_id: Option<String>,
    pub version: Option<String>,
    pub build_number: Option<String>,
    #[serde(rename = "min_OS_version")]
    pub min_os_version: Option<String>,
    pub device_family_list: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisioningInfo {
    pub creation_date: Option<DateTime<Utc>>,
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(rename = "device_UDID_list")]
    pub device_udid_list: Option<Vec<String>>,
    pub team_name: Option<String>,
    pub profile_name: Option<String>,
    pub provisions_all_devices: Option<bool>,
}

/// Metadata of an Apple package, shaped for the finalize-phase payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpaInfo {
    pub file_size_bytes: u64,
    pub app_info: IpaAppInfo,
    pub provisioning_info: ProvisioningInfo,
}

impl IpaInfo {
    pub fn from_descriptors(descriptors: &IpaDescriptors, file_size_bytes: u64) -> Self {
        let info = &descriptors.info_plist;
        let prov = &descriptors.provisioning;

        Self {
            file_size_bytes,
            app_info: IpaAppInfo {
                app_title: string_field(info, "CFBundleName"),
                bundle_id: string_field(info, "CFBundleIdentifier"),
                version: string_field(info, "CFBundleShortVersionString"),
                build_number: string_field(info, "CFBundleVersion"),
                min_os_version: string_field(info, "MinimumOSVersion"),
                device_family_list: int_list_field(info, "UIDeviceFamily"),
            },
            provisioning_info: ProvisioningInfo {
                creation_date: date_field(prov, "CreationDate"),
                expire_date: date_field(prov, "ExpirationDate"),
                device_udid_list: string_list_field(prov, "ProvisionedDevices"),
                team_name: string_field(prov, "TeamName"),
                profile_name: string_field(prov, "Name"),
                provisions_all_devices: bool_field(prov, "ProvisionsAllDevices"),
            },
        }
    }

    /// Serialize the finalize-phase metadata payload. Absent fields stay
    /// `null` in the JSON.
    pub fn artifact_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn string_field(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::as_string).map(str::to_string)
}

fn bool_field(dict: &Dictionary, key: &str) -> Option<bool> {
    dict.get(key).and_then(Value::as_boolean)
}

fn date_field(dict: &Dictionary, key: &str) -> Option<DateTime<Utc>> {
    dict.get(key)
        .and_then(Value::as_date)
        .map(|date| DateTime::<Utc>::from(SystemTime::from(date)))
}

fn int_list_field(dict: &Dictionary, key: &str) -> Option<Vec<i64>> {
    dict.get(key).and_then(Value::as_array).map(|values| {
        values
            .iter()
            .filter_map(Value::as_signed_integer)
            .collect()
    })
}

fn string_list_field(dict: &Dictionary, key: &str) -> Option<Vec<String>> {
    dict.get(key).and_then(Value::as_array).map(|values| {
        values
            .iter()
            .filter_map(Value::as_string)
            .map(str::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_descriptors() -> IpaDescriptors {
        let mut info_plist = Dictionary::new();
        info_plist.insert("CFBundleName".into(), Value::String("CardsUp".into()));
        info_plist.insert(
            "CFBundleIdentifier".into(),
            Value::String("hu.kntcrw.cardsup".into()),
        );
        info_plist.insert(
            "CFBundleShortVersionString".into(),
            Value::String("1.1".into()),
        );
        info_plist.insert("CFBundleVersion".into(), Value::String("12".into()));
        info_plist.insert("MinimumOSVersion".into(), Value::String("9.0".into()));
        info_plist.insert(
            "UIDeviceFamily".into(),
            Value::Array(vec![
                Value::Integer(1i64.into()),
                Value::Integer(2i64.into()),
            ]),
        );

        let mut provisioning = Dictionary::new();
        provisioning.insert("TeamName".into(), Value::String("Example Team".into()));
        provisioning.insert("Name".into(), Value::String("AdHoc Profile".into()));
        provisioning.insert("ProvisionsAllDevices".into(), Value::Boolean(false));
        provisioning.insert(
            "ProvisionedDevices".into(),
            Value::Array(vec![
                Value::String("udid-one".into()),
                Value::String("udid-two".into()),
            ]),
        );

        IpaDescriptors {
            info_plist,
            provisioning,
        }
    }

    #[test]
    fn test_projection_of_present_fields() {
        let info = IpaInfo::from_descriptors(&full_descriptors(), 2048);

        assert_eq!(info.file_size_bytes, 2048);
        assert_eq!(info.app_info.app_title.as_deref(), Some("CardsUp"));
        assert_eq!(
            info.app_info.bundle_id.as_deref(),
            Some("hu.kntcrw.cardsup")
        );
        assert_eq!(info.app_info.version.as_deref(), Some("1.1"));
        assert_eq!(info.app_info.build_number.as_deref(), Some("12"));
        assert_eq!(info.app_info.min_os_version.as_deref(), Some("9.0"));
        assert_eq!(info.app_info.device_family_list, Some(vec![1, 2]));
        assert_eq!(
            info.provisioning_info.device_udid_list,
            Some(vec!["udid-one".to_string(), "udid-two".to_string()])
        );
        assert_eq!(
            info.provisioning_info.team_name.as_deref(),
            Some("Example Team")
        );
        assert_eq!(
            info.provisioning_info.profile_name.as_deref(),
            Some("AdHoc Profile")
        );
        assert_eq!(info.provisioning_info.provisions_all_devices, Some(false));
    }

    #[test]
    fn test_absent_fields_stay_none() {
        let info = IpaInfo::from_descriptors(&IpaDescriptors::default(), 0);

        assert_eq!(info.app_info.app_title, None);
        assert_eq!(info.app_info.device_family_list, None);
        assert_eq!(info.provisioning_info.creation_date, None);
        assert_eq!(info.provisioning_info.provisions_all_devices, None);
    }

    #[test]
    fn test_absent_fields_serialize_as_null_not_empty_string() {
        // The Apple path's "absent" is null; the Android path's is "".
        // Downstream consumers rely on the asymmetry, so it is asserted
        // here rather than unified.
        let info = IpaInfo::from_descriptors(&IpaDescriptors::default(), 0);
        let value: serde_json::Value =
            serde_json::from_str(&info.artifact_info().unwrap()).unwrap();

        assert!(value["app_info"]["app_title"].is_null());
        assert!(value["provisioning_info"]["team_name"].is_null());
        assert!(value["provisioning_info"]["device_UDID_list"].is_null());
    }

    #[test]
    fn test_wrongly_typed_fields_degrade_to_absent() {
        let mut info_plist = Dictionary::new();
        info_plist.insert("CFBundleName".into(), Value::Integer(7i64.into()));
        let descriptors = IpaDescriptors {
            info_plist,
            provisioning: Dictionary::new(),
        };

        let info = IpaInfo::from_descriptors(&descriptors, 0);
        assert_eq!(info.app_info.app_title, None);
    }
}
