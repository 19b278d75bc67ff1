//! Android package metadata extraction.
//!
//! Every field comes from a pattern match over one `aapt dump badging`
//! blob, first match wins. A pattern that does not match yields the empty
//! string rather than an error: optional badging lines are expected to be
//! absent on some packages. Captures stop at the first single quote, so a
//! label that legitimately contains one is truncated there; that is an
//! accepted limitation of the badging format.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;

static PACKAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^package: name='([^']*)' versionCode='([^']*)' versionName='([^']*)'")
        .unwrap()
});

// The application label appears under two on-the-wire spellings.
static APP_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"application: label='([^']*)'").unwrap());
static APP_LABEL_ALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"application-label:'([^']*)'").unwrap());

static MIN_SDK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"sdkVersion:'([^']*)'").unwrap());

/// Metadata of an Android package. Fields that did not match are empty
/// strings, a deliberate "found nothing" sentinel distinct from a parse
/// error (and from the Apple path's `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApkInfo {
    pub package_name: String,
    pub version_code: String,
    pub version_name: String,
    pub app_label: String,
    pub min_sdk_version: String,
}

impl ApkInfo {
    /// Extract from one badging dump. Absent lines degrade to empty fields;
    /// this function cannot fail.
    pub fn from_badging(badging: &str) -> Self {
        let (package_name, version_code, version_name) = package_infos(badging);
        Self {
            package_name,
            version_code,
            version_name,
            app_label: app_label(badging),
            min_sdk_version: min_sdk_version(badging),
        }
    }

    /// Serialize the finalize-phase metadata payload.
    pub fn artifact_info(&self, file_size_bytes: u64) -> Result<String> {
        #[derive(Serialize)]
        struct Payload<'a> {
            file_size_bytes: u64,
            app_info: &'a ApkInfo,
        }

        Ok(serde_json::to_string(&Payload {
            file_size_bytes,
            app_info: self,
        })?)
    }
}

/// `(package name, version code, version name)` from the first `package:`
/// line, or three empty strings when no such line exists.
pub fn package_infos(badging: &str) -> (String, String, String) {
    match PACKAGE_LINE.captures(badging) {
        Some(caps) => (
            caps[1].to_string(),
            caps[2].to_string(),
            caps[3].to_string(),
        ),
        None => (String::new(), String::new(), String::new()),
    }
}

pub fn app_label(badging: &str) -> String {
    APP_LABEL
        .captures(badging)
        .or_else(|| APP_LABEL_ALT.captures(badging))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

pub fn min_sdk_version(badging: &str) -> String {
    MIN_SDK
        .captures(badging)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}
