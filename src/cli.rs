//! Command-line interface implementation for extsmith.
//! Provides argument parsing and help text formatting using clap.

use crate::config::RawOptions;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for extsmith.
#[derive(Parser, Debug)]
#[command(version, about = "extsmith: extension package scaffolding tool", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub options: RawOptions,

    /// JSON or YAML file with the same options; flags given on the command line win
    #[arg(long, value_name = "FILE")]
    pub options_file: Option<PathBuf>,

    /// Directory in which the package directory and archive are created
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Build the package tree without creating the zip archive
    #[arg(long)]
    pub no_archive: bool,

    /// Do not print the tree of generated files
    #[arg(long)]
    pub no_tree: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Returns
/// * `Args` - Parsed command line arguments
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
