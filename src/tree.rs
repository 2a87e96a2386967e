//! Idempotent construction of the output tree.
//!
//! Directories may be requested any number of times. Files are written at
//! most once: a file that already holds content is reported as a conflict
//! and left exactly as it was.

use crate::constants::{DIRECTORY_MODE, FILE_MODE};
use crate::error::{Error, Result};
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// What [`TreeBuilder::ensure_directory`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// The directory did not exist and was created.
    Created,
    /// The directory was already there.
    Existing,
}

/// What [`TreeBuilder::ensure_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Content was written into a new (or empty) file.
    Written,
    /// An intentionally empty file was left in place.
    Empty,
}

/// Creates directories and files with fixed permission bits.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    dir_mode: u32,
    file_mode: u32,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

impl TreeBuilder {
    /// Creates a builder using `0o755` for directories and `0o644` for files.
    pub fn new() -> Self {
        Self::with_modes(DIRECTORY_MODE, FILE_MODE)
    }

    pub fn with_modes(dir_mode: u32, file_mode: u32) -> Self {
        Self { dir_mode, file_mode }
    }

    /// Ensures a directory and all of its missing ancestors exist.
    ///
    /// # Arguments
    /// * `path` - Directory to create
    ///
    /// # Returns
    /// * `Result<DirectoryOutcome>` - Whether the directory was already present
    ///
    /// # Errors
    /// * `Error::IoError` if a segment cannot be created, a non-directory is in
    ///   the way, or the permission bits cannot be set
    pub fn ensure_directory(&self, path: &Path) -> Result<DirectoryOutcome> {
        let outcome = match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => DirectoryOutcome::Existing,
            Ok(_) => {
                return Err(Error::IoError {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "a file exists where a directory is expected",
                    ),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(path).map_err(Error::io(path))?;
                DirectoryOutcome::Created
            }
            Err(e) => return Err(Error::io(path)(e)),
        };
        set_mode(path, self.dir_mode)?;
        debug!("Directory {}: {:?}", path.display(), outcome);
        Ok(outcome)
    }

    /// Ensures a file exists and holds `content`.
    ///
    /// The parent directory is ensured first. A missing or zero length file
    /// receives the content; an empty `content` leaves a zero length file.
    ///
    /// # Arguments
    /// * `path` - File to create
    /// * `content` - Text to write, may be empty
    ///
    /// # Returns
    /// * `Result<FileOutcome>` - Whether content was written
    ///
    /// # Errors
    /// * `Error::ConflictError` if the file already has content; the file is not touched
    /// * `Error::IoError` on any filesystem failure
    pub fn ensure_file(&self, path: &Path, content: &str) -> Result<FileOutcome> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.ensure_directory(parent)?;
        }

        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                return Err(Error::IoError {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "a directory exists where a file is expected",
                    ),
                })
            }
            Ok(meta) if meta.len() > 0 => {
                return Err(Error::ConflictError { path: path.to_path_buf() })
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(path)(e)),
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(Error::io(path))?;
        set_mode(path, self.file_mode)?;

        if content.is_empty() {
            debug!("File {}: empty", path.display());
            return Ok(FileOutcome::Empty);
        }
        file.write_all(content.as_bytes()).map_err(Error::io(path))?;
        debug!("File {}: {} bytes", path.display(), content.len());
        Ok(FileOutcome::Written)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(Error::io(path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
