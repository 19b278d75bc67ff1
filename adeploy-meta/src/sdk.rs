//! Android SDK build-tools discovery.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MetaError, Result};

/// Resolve the SDK installation root from `ANDROID_HOME`. An unset or empty
/// variable is a configuration error, not a per-artifact one.
pub fn sdk_root_from_env() -> Result<PathBuf> {
    env::var("ANDROID_HOME")
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(MetaError::AndroidHomeUnset)
}

/// Locate `tool` in the numerically newest build-tools release under the
/// SDK root. Release directories must parse as three dot-separated numeric
/// components; previews and stray files are skipped.
pub fn latest_build_tool(sdk_root: &Path, tool: &str) -> Result<PathBuf> {
    let build_tools = sdk_root.join("build-tools");
    let entries =
        fs::read_dir(&build_tools).map_err(|_| MetaError::NoBuildTools(build_tools.clone()))?;

    let mut best: Option<((u64, u64, u64), PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(revision) = parse_revision(&name.to_string_lossy()) else {
            continue;
        };
        if best.as_ref().map(|(r, _)| revision > *r).unwrap_or(true) {
            best = Some((revision, entry.path()));
        }
    }

    match best {
        Some((_, dir)) => Ok(dir.join(tool)),
        None => Err(MetaError::NoBuildTools(build_tools)),
    }
}

/// Three-component numeric revision, compared as a tuple so that `22.0.1`
/// outranks `9.9.9`.
fn parse_revision(name: &str) -> Option<(u64, u64, u64)> {
    let mut parts = name.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}
