//! extsmith's main application entry point.
//! Parses the command line, merges the options file, runs the pipeline and
//! reports where the package was written.

use extsmith::{
    cli::{get_args, Args},
    config::load_options_file,
    error::{default_error_handler, Result},
    logger::init_logger,
    packager::{TreeViewer, WalkDirTreeViewer, ZipArchiver},
    processor::Engine,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Merges command line options over the options file, if any
/// 2. Runs the engine into the output directory
/// 3. Prints the generated tree unless disabled
/// 4. Prints the archive path
fn run(args: Args) -> Result<()> {
    let options = match &args.options_file {
        Some(path) => args.options.merge(load_options_file(path)?),
        None => args.options,
    };

    let renderer = MiniJinjaRenderer::new();
    let archiver = ZipArchiver::new();
    let mut engine = Engine::new(&renderer, &args.output_dir);
    if !args.no_archive {
        engine = engine.with_archiver(&archiver);
    }
    let outcome = engine.run(options)?;

    if !args.no_tree {
        match WalkDirTreeViewer::new().view(&outcome.root) {
            Ok(listing) => println!("{listing}"),
            Err(e) => log::warn!("Could not list the generated tree: {e}"),
        }
    }

    match outcome.archive {
        Some(archive) => println!("{}", archive.path.display()),
        None => println!("{}", outcome.root.display()),
    }
    Ok(())
}
