//! adeploy: deploy build artifacts to an artifact-hosting service
//!
//! One invocation deploys a single file, every file of a directory, or a
//! directory compressed into one archive. Application packages get their
//! metadata extracted and registered alongside the binary upload; the
//! resolved public install page URL is exported to the invoking
//! environment.

pub mod archive;
pub mod config;
pub mod deploy;
pub mod error;
pub mod export;

pub use config::DeployConfig;
pub use deploy::Deployer;
pub use error::{DeployError, Result};
