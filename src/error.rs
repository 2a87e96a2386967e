//! Error handling for the extsmith application.
//! Defines custom error types and results used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for extsmith operations.
///
/// This enum represents all possible errors that can occur while generating a package.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad, missing or contradictory input. Always reported before any filesystem mutation.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The template registry has no rule for the requested artifact and kind.
    #[error("Unsupported variant: no '{artifact}' template for {kind} extensions.")]
    UnsupportedVariantError { artifact: String, kind: String },

    /// A target file already exists with content.
    #[error("Conflict: '{path}' already exists and is not empty.")]
    ConflictError { path: PathBuf },

    /// Every file conflict collected during one run.
    #[error("Conflicts: {} file(s) already exist: {}.", paths.len(), display_paths(paths))]
    ConflictsError { paths: Vec<PathBuf> },

    /// Represents errors that occur during file system operations
    #[error("IO error at '{path}': {source}.")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Represents errors that occur during template rendering
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// The archiving step failed. The generated tree is left in place.
    #[error("Archive error for '{path}': {reason}.")]
    ArchiveError { path: PathBuf, reason: String },

    /// The run was stopped between two artifact requests.
    #[error("Generation cancelled before '{next}'.")]
    CancelledError { next: PathBuf },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("'{}'", p.display())).collect::<Vec<_>>().join(", ")
}

impl Error {
    /// Wraps an I/O failure together with the path it happened on.
    pub fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::IoError { path, source }
    }
}

/// Convenience type alias for Results with Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
