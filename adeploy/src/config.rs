//! Inbound configuration bundle.
//!
//! All values arrive pre-parsed from the CLI layer; the core treats them as
//! opaque inputs and performs no argument-syntax parsing of its own.

use std::path::PathBuf;

use tracing::info;

#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Base URL of the artifact-hosting service for this run.
    pub base_url: String,
    pub api_token: String,
    /// File or directory to deploy.
    pub deploy_path: PathBuf,
    pub notify_user_groups: Option<String>,
    pub notify_emails: Option<String>,
    /// Request a public install page for application packages.
    pub public_page: bool,
    /// Compress a directory into a single archive before uploading.
    pub compress: bool,
}

impl DeployConfig {
    /// Echo the effective configuration. The token is redacted.
    pub fn log(&self) {
        info!("Configs:");
        info!(" * base_url: {}", self.base_url);
        info!(" * api_token: ***");
        info!(" * deploy_path: {}", self.deploy_path.display());
        info!(
            " * notify_user_groups: {}",
            self.notify_user_groups.as_deref().unwrap_or("")
        );
        info!(
            " * notify_emails: {}",
            self.notify_emails.as_deref().unwrap_or("")
        );
        info!(" * public_page: {}", self.public_page);
        info!(" * compress: {}", self.compress);
    }
}
