use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("deploy source path does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error(transparent)]
    Meta(#[from] adeploy_meta::MetaError),

    #[error(transparent)]
    Client(#[from] adeploy_client::ClientError),

    #[error("failed to create archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to export {key}: {message}")]
    Export { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
