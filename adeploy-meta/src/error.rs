use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("ANDROID_HOME environment not set")]
    AndroidHomeUnset,

    #[error("no build-tools release found under {0}")]
    NoBuildTools(PathBuf),

    #[error("aapt failed on {path}: {output}")]
    BadgingFailed { path: PathBuf, output: String },

    #[error("not a readable package archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to parse property list: {0}")]
    Plist(#[from] plist::Error),

    #[error("property list root is not a dictionary")]
    UnexpectedPlist,

    #[error("failed to collect {0} information from {1}")]
    DescriptorMissing(&'static str, PathBuf),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetaError>;
