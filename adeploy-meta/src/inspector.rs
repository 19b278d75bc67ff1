//! External package-inspection capabilities.
//!
//! Both inspectors are modeled as injected traits so the extractors can be
//! exercised against literal fixtures without an SDK installation or a real
//! package on disk. The real implementations shell out to aapt or open the
//! package archive.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::process::Command;

use plist::{Dictionary, Value};
use tracing::debug;
use zip::ZipArchive;

use crate::error::{MetaError, Result};
use crate::ipa::IpaDescriptors;
use crate::sdk::{latest_build_tool, sdk_root_from_env};

/// Produces the `aapt dump badging` text blob for an Android package.
pub trait BadgingSource {
    fn badging(&self, apk: &Path) -> Result<String>;
}

/// Real implementation: locates the newest aapt under the SDK installation
/// and invokes it once per artifact.
pub struct AaptBadging {
    sdk_root: Option<PathBuf>,
}

impl AaptBadging {
    /// Resolve the SDK root from `ANDROID_HOME` at first use, so a missing
    /// SDK only surfaces when an Android package is actually deployed.
    pub fn from_env() -> Self {
        Self { sdk_root: None }
    }

    pub fn with_sdk_root(sdk_root: impl Into<PathBuf>) -> Self {
        Self {
            sdk_root: Some(sdk_root.into()),
        }
    }
}

impl BadgingSource for AaptBadging {
    fn badging(&self, apk: &Path) -> Result<String> {
        let sdk_root = match &self.sdk_root {
            Some(root) => root.clone(),
            None => sdk_root_from_env()?,
        };
        let aapt = latest_build_tool(&sdk_root, "aapt")?;
        debug!("using {}", aapt.display());

        let output = Command::new(&aapt).args(["dump", "badging"]).arg(apk).output()?;
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if !output.status.success() {
            return Err(MetaError::BadgingFailed {
                path: apk.to_path_buf(),
                output: combined.trim().to_string(),
            });
        }
        Ok(combined)
    }
}

/// Collects the Info.plist and provisioning descriptors from an Apple
/// package. Both descriptors are required; a package missing either one
/// cannot be deployed with metadata.
pub trait IpaReader {
    fn descriptors(&self, ipa: &Path) -> Result<IpaDescriptors>;
}

/// Real implementation: opens the .ipa container, reads the two descriptor
/// files out of `Payload/<bundle>.app/`, and drops the archive handle once
/// both are collected.
pub struct ZipIpaReader;

impl IpaReader for ZipIpaReader {
    fn descriptors(&self, ipa: &Path) -> Result<IpaDescriptors> {
        let file = File::open(ipa)?;
        let mut archive = ZipArchive::new(file)?;

        let info_name = bundle_entry(&archive, "Info.plist")
            .ok_or_else(|| MetaError::DescriptorMissing("Info.plist", ipa.to_path_buf()))?;
        let prov_name = bundle_entry(&archive, "embedded.mobileprovision").ok_or_else(|| {
            MetaError::DescriptorMissing("provisioning profile", ipa.to_path_buf())
        })?;

        let info_bytes = read_entry(&mut archive, &info_name)?;
        let prov_bytes = read_entry(&mut archive, &prov_name)?;

        let info_plist = parse_dictionary(&info_bytes)?;
        let prov_window = provision_plist_window(&prov_bytes).ok_or_else(|| {
            MetaError::DescriptorMissing("provisioning profile", ipa.to_path_buf())
        })?;
        let provisioning = parse_dictionary(prov_window)?;

        Ok(IpaDescriptors {
            info_plist,
            provisioning,
        })
    }
}

/// Name of `Payload/<bundle>.app/<file>`, ignoring entries nested deeper
/// inside the bundle (frameworks and plugins carry their own plists).
fn bundle_entry<R: Read + Seek>(archive: &ZipArchive<R>, file: &str) -> Option<String> {
    archive
        .file_names()
        .filter(|name| {
            name.starts_with("Payload/")
                && name.ends_with(file)
                && name.matches('/').count() == 2
                && name
                    .split('/')
                    .nth(1)
                    .map(|dir| dir.ends_with(".app"))
                    .unwrap_or(false)
        })
        .min()
        .map(str::to_string)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name)?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// The provisioning profile is a plist wrapped in a CMS signature envelope;
/// only the XML window between `<?xml` and `</plist>` parses.
fn provision_plist_window(raw: &[u8]) -> Option<&[u8]> {
    let start = raw.windows(5).position(|w| w == b"<?xml")?;
    let end = raw.windows(8).rposition(|w| w == b"</plist>")? + 8;
    raw.get(start..end)
}

fn parse_dictionary(bytes: &[u8]) -> Result<Dictionary> {
    let value = Value::from_reader(Cursor::new(bytes))?;
    value.into_dictionary().ok_or(MetaError::UnexpectedPlist)
}
