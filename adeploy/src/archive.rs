//! Directory compression collaborator.
//!
//! Used when a directory is deployed as one artifact: its contents are
//! zipped into a scoped temporary file whose guard removes it on every exit
//! path, including panics.

use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// Zip the contents of `dir` into a temporary archive. The archive lives
/// only as long as the returned guard.
pub fn compress_dir(dir: &Path) -> Result<NamedTempFile> {
    let stem = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deploy".to_string());
    let tmp = tempfile::Builder::new()
        .prefix(&format!("{}-", stem))
        .suffix(".zip")
        .tempfile()?;

    let mut writer = ZipWriter::new(tmp.reopen()?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_dir(&mut writer, dir, "", options)?;
    writer.finish()?;

    Ok(tmp)
}

fn add_dir(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = if prefix.is_empty() {
            entry.file_name().to_string_lossy().into_owned()
        } else {
            format!("{}/{}", prefix, entry.file_name().to_string_lossy())
        };

        if path.is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
            add_dir(writer, &path, &name, options)?;
        } else {
            writer.start_file(name.as_str(), options)?;
            let mut file = File::open(&path)?;
            io::copy(&mut file, writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use zip::ZipArchive;

    use super::*;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.txt"), "artifact").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("report.xml"), "<r/>").unwrap();
        dir
    }

    #[test]
    fn test_compress_dir_archives_contents_recursively() {
        let dir = fixture_dir();
        let archive = compress_dir(dir.path()).unwrap();

        let mut zip = ZipArchive::new(File::open(archive.path()).unwrap()).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"app.txt".to_string()));
        assert!(names.contains(&"nested/report.xml".to_string()));
    }

    #[test]
    fn test_archive_is_removed_when_the_guard_drops() {
        let dir = fixture_dir();
        let archive = compress_dir(dir.path()).unwrap();
        let archive_path: PathBuf = archive.path().to_path_buf();
        assert!(archive_path.exists());

        drop(archive);
        assert!(!archive_path.exists());
    }
}
