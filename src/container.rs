//! Extraction of the XLSX (ZIP) container into a working directory.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of the shared strings part inside the container.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Path of a worksheet part inside the container.
pub fn worksheet_part(sheet: u32) -> String {
    format!("xl/worksheets/sheet{}.xml", sheet)
}

/// Unpack every entry of `archive` into `dest`.
pub fn extract(archive: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let archive = archive.as_ref();
    let file = File::open(archive)
        .map_err(|e| Error::Extraction(format!("{}: {}", archive.display(), e)))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;
    zip.extract(dest.as_ref())?;
    Ok(())
}

/// Recursively delete a directory tree.
///
/// A path that does not exist counts as deleted.
pub fn delete_tree(path: impl AsRef<Path>) -> bool {
    match fs::remove_dir_all(path.as_ref()) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("failed to remove {}: {}", path.as_ref().display(), e);
            false
        }
    }
}

/// A uniquely named directory holding one extracted archive.
///
/// Owned by a single parse. Call [`WorkingDir::cleanup`] when done; if it
/// is dropped instead, the directory is still removed on a best-effort
/// basis.
#[derive(Debug)]
pub struct WorkingDir {
    dir: TempDir,
}

impl WorkingDir {
    /// Create an empty working directory for `archive` inside `base`.
    ///
    /// The directory name starts with the archive's file stem.
    pub fn create(base: impl AsRef<Path>, archive: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let stem = archive
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "workbook".to_string());

        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .tempdir_in(base)
            .map_err(|e| {
                Error::Extraction(format!(
                    "cannot create working directory in {}: {}",
                    base.display(),
                    e
                ))
            })?;

        Ok(Self { dir })
    }

    /// Create a working directory and unpack `archive` into it.
    pub fn extract(base: impl AsRef<Path>, archive: impl AsRef<Path>) -> Result<Self> {
        let archive = archive.as_ref();
        let working = Self::create(base, archive)?;
        extract(archive, working.path())?;
        log::debug!("extracted {} to {}", archive.display(), working.path().display());
        Ok(working)
    }

    /// Root of the working directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Filesystem path of a container part.
    pub fn part(&self, part: &str) -> PathBuf {
        self.dir.path().join(part)
    }

    /// Remove the working directory and everything in it.
    ///
    /// Failures are logged and reported as `false`, never as an error.
    pub fn cleanup(self) -> bool {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                log::debug!("removed {}", path.display());
                true
            }
            Err(_) => delete_tree(&path),
        }
    }
}
