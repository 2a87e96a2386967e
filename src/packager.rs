//! Packaging of the finished tree.
//!
//! The archive is only ever built from a complete tree. A failed archive
//! leaves the tree in place.

use crate::constants::{DIRECTORY_MODE, FILE_MODE};
use crate::error::{Error, Result};
use log::debug;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// The archive produced for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    pub path: PathBuf,
    /// Number of directory and file entries written.
    pub entries: usize,
}

/// Trait for archive producers.
pub trait Archiver {
    /// Bundles the package root into a single archive named after it.
    ///
    /// # Arguments
    /// * `root` - Package root directory
    ///
    /// # Returns
    /// * `Result<ArchiveResult>` - Location and size of the archive
    fn archive(&self, root: &Path) -> Result<ArchiveResult>;
}

/// Writes `<root>.zip` next to the package root.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        ZipArchiver
    }
}

fn archive_error(path: &Path, reason: impl ToString) -> Error {
    Error::ArchiveError { path: path.to_path_buf(), reason: reason.to_string() }
}

/// Archive entry name of `path`: the package directory name followed by the
/// path below the root, always '/' separated.
fn entry_name(package: &str, root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut name = package.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(component.as_os_str().to_str()?);
    }
    Some(name)
}

impl Archiver for ZipArchiver {
    /// Writes a deflate compressed zip archive.
    ///
    /// Entries are added in file name order so equal trees give equal entry lists.
    ///
    /// # Errors
    /// * `Error::ArchiveError` if the tree cannot be walked or the archive cannot be written
    fn archive(&self, root: &Path) -> Result<ArchiveResult> {
        let package = root
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| archive_error(root, "package root has no usable name"))?;
        let path = root.with_file_name(format!("{package}.zip"));
        debug!("Archiving {} into {}", root.display(), path.display());

        let file = File::create(&path).map_err(|e| archive_error(&path, e))?;
        let mut zip = ZipWriter::new(file);
        let dir_options = SimpleFileOptions::default().unix_permissions(DIRECTORY_MODE);
        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(FILE_MODE);

        let mut entries = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| archive_error(root, e))?;
            let name = entry_name(package, root, entry.path()).ok_or_else(|| {
                archive_error(entry.path(), "path cannot be stored in the archive")
            })?;
            if entry.file_type().is_dir() {
                zip.add_directory(name, dir_options).map_err(|e| archive_error(&path, e))?;
            } else {
                zip.start_file(name, file_options).map_err(|e| archive_error(&path, e))?;
                let mut source =
                    File::open(entry.path()).map_err(|e| archive_error(entry.path(), e))?;
                std::io::copy(&mut source, &mut zip).map_err(|e| archive_error(&path, e))?;
            }
            entries += 1;
        }
        zip.finish().map_err(|e| archive_error(&path, e))?;

        debug!("Archive {} holds {} entries", path.display(), entries);
        Ok(ArchiveResult { path, entries })
    }
}

/// Trait for the diagnostic listing of a generated tree.
pub trait TreeViewer {
    fn view(&self, root: &Path) -> Result<String>;
}

/// Renders a `tree`-like indented listing using walkdir.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirTreeViewer;

impl WalkDirTreeViewer {
    pub fn new() -> Self {
        WalkDirTreeViewer
    }
}

impl TreeViewer for WalkDirTreeViewer {
    /// Lists every entry below `root`, one per line, indented by depth,
    /// followed by a summary line.
    ///
    /// # Errors
    /// * `Error::IoError` if the tree cannot be walked
    fn view(&self, root: &Path) -> Result<String> {
        let mut listing = String::new();
        let (mut directories, mut files) = (0usize, 0usize);
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::IoError { path, source: e.into() }
            })?;
            let name = entry.file_name().to_string_lossy();
            if entry.depth() == 0 {
                listing.push_str(&entry.path().display().to_string());
            } else {
                listing.push_str(&"    ".repeat(entry.depth() - 1));
                listing.push_str("|-- ");
                listing.push_str(&name);
                if entry.file_type().is_dir() {
                    directories += 1;
                } else {
                    files += 1;
                }
            }
            listing.push('\n');
        }
        listing.push_str(&format!("\n{directories} directories, {files} files\n"));
        Ok(listing)
    }
}
