//! extsmith generates installable extension packages for a plugin-style CMS.
//! It resolves a set of named options into a build configuration, writes the
//! package tree, assembles a manifest consistent with what was written, and
//! archives the result.

/// Command-line interface module for the extsmith application
pub mod cli;

/// Option parsing, validation and defaults
/// Options come from flags and/or a JSON or YAML options file
pub mod config;

/// Common constants used throughout the application
pub mod constants;

/// Error types and handling for the extsmith application
pub mod error;

/// Logger initialization
pub mod logger;

/// Manifest accumulator and rendering
pub mod manifest;

/// Identifiers derived from the human entered names
pub mod naming;

/// Zip archiving and the diagnostic tree view
pub mod packager;

/// Build plan stages and artifact requests
pub mod plan;

/// Pipeline engine and its phases
pub mod processor;

/// Template lookup by artifact and extension kind
pub mod registry;

/// Template rendering engine
pub mod renderer;

/// Idempotent directory and file creation
pub mod tree;
