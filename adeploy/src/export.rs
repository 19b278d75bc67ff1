//! Environment export collaborator.
//!
//! On success the resolved public install page URL is handed to the host
//! pipeline through an envman-style key/value store. The core only supplies
//! the final string; the store itself is external.

use std::process::Command;

use crate::error::{DeployError, Result};

/// Output slot consumed by downstream pipeline steps.
pub const PUBLIC_PAGE_KEY: &str = "PUBLIC_INSTALL_PAGE_URL";

pub trait OutputExporter {
    fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// Real exporter: `envman add --key KEY --value VALUE`.
pub struct EnvmanExporter;

impl OutputExporter for EnvmanExporter {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        let output = Command::new("envman")
            .args(["add", "--key", key, "--value", value])
            .output()
            .map_err(|err| DeployError::Export {
                key: key.to_string(),
                message: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(DeployError::Export {
                key: key.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
