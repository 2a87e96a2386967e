//! Pipeline engine.
//!
//! Drives one generation run through its phases:
//! `Configuring -> Deriving -> Building -> AssemblingManifest -> Packaging -> Done`.
//! Any error moves the engine to the terminal `Failed` phase. Nothing is
//! retried and nothing already written is rolled back.

use crate::config::{resolve as resolve_config, BuildConfig, RawOptions};
use crate::error::{Error, Result};
use crate::manifest::ManifestAssembler;
use crate::naming::DerivedIdentifiers;
use crate::packager::{ArchiveResult, Archiver};
use crate::plan::{ArtifactRequest, Planner, Stage};
use crate::renderer::TemplateRenderer;
use crate::tree::{DirectoryOutcome, FileOutcome, TreeBuilder};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Phase of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Deriving,
    Building,
    AssemblingManifest,
    Packaging,
    Done,
    Failed { during: &'static str, reason: String },
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Configuring => "configuring",
            Phase::Deriving => "deriving",
            Phase::Building => "building",
            Phase::AssemblingManifest => "assembling manifest",
            Phase::Packaging => "packaging",
            Phase::Done => "done",
            Phase::Failed { .. } => "failed",
        }
    }
}

/// Result of applying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Directory(DirectoryOutcome),
    File(FileOutcome),
    /// The file already had content and was left alone.
    Conflict,
}

/// Applies artifact requests to the tree and folds each one into the manifest.
pub struct Processor {
    root: PathBuf,
    tree: TreeBuilder,
    manifest: ManifestAssembler,
    conflicts: Vec<PathBuf>,
    cancel: Arc<AtomicBool>,
}

impl Processor {
    /// Creates a new Processor.
    ///
    /// # Arguments
    /// * `root` - Package root; request paths are relative to it
    /// * `tree` - Tree builder doing the filesystem work
    /// * `manifest` - Manifest accumulator
    /// * `cancel` - Checked before every request
    pub fn new(
        root: impl Into<PathBuf>,
        tree: TreeBuilder,
        manifest: ManifestAssembler,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            root: root.into(),
            tree,
            manifest,
            conflicts: Vec::new(),
            cancel,
        }
    }

    fn target(&self, relative: &str) -> PathBuf {
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Applies one request.
    ///
    /// The request's contribution reaches the manifest only when the
    /// filesystem step succeeded. A file conflict is remembered and reported
    /// as [`Applied::Conflict`] so the remaining requests still run.
    ///
    /// # Errors
    /// * `Error::CancelledError` if cancellation was requested
    /// * `Error::IoError` on filesystem failure
    pub fn apply(&mut self, request: ArtifactRequest) -> Result<Applied> {
        let target = self.target(request.path());
        if self.cancel.load(Ordering::SeqCst) {
            return Err(Error::CancelledError { next: target });
        }

        let applied = match &request {
            ArtifactRequest::Directory { .. } => {
                Applied::Directory(self.tree.ensure_directory(&target)?)
            }
            ArtifactRequest::File { content, .. } => {
                match self.tree.ensure_file(&target, content) {
                    Ok(outcome) => Applied::File(outcome),
                    Err(Error::ConflictError { path }) => {
                        warn!("{} already exists and is not empty", path.display());
                        self.conflicts.push(path);
                        return Ok(Applied::Conflict);
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        self.manifest.record(request.contribution());
        Ok(applied)
    }

    pub fn manifest(&self) -> &ManifestAssembler {
        &self.manifest
    }

    /// Files that already had content, in the order they were met.
    pub fn conflicts(&self) -> &[PathBuf] {
        &self.conflicts
    }

    pub fn into_parts(self) -> (ManifestAssembler, Vec<PathBuf>) {
        (self.manifest, self.conflicts)
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub config: BuildConfig,
    pub identifiers: DerivedIdentifiers,
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    /// Package relative paths listed in the manifest's `<files>` blocks.
    pub listed: Vec<String>,
    /// `None` when no archiver was configured.
    pub archive: Option<ArchiveResult>,
}

/// Runs the whole pipeline for one set of raw options.
pub struct Engine<'a> {
    renderer: &'a dyn TemplateRenderer,
    archiver: Option<&'a dyn Archiver>,
    output_dir: PathBuf,
    tree: TreeBuilder,
    cancel: Arc<AtomicBool>,
    phase: Phase,
}

impl<'a> Engine<'a> {
    /// Creates an engine writing packages below `output_dir`, without archiving.
    pub fn new(renderer: &'a dyn TemplateRenderer, output_dir: impl AsRef<Path>) -> Self {
        Self {
            renderer,
            archiver: None,
            output_dir: output_dir.as_ref().to_path_buf(),
            tree: TreeBuilder::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            phase: Phase::Configuring,
        }
    }

    pub fn with_archiver(mut self, archiver: &'a dyn Archiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    pub fn with_tree_builder(mut self, tree: TreeBuilder) -> Self {
        self.tree = tree;
        self
    }

    /// Shares a cancellation flag. Setting it stops the run before the next request.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    fn enter(&mut self, phase: Phase) {
        info!("Phase: {}", phase.label());
        self.phase = phase;
    }

    /// Runs the pipeline.
    ///
    /// # Arguments
    /// * `raw` - Options as supplied by the user
    ///
    /// # Returns
    /// * `Result<Outcome>` - Paths of the generated package and archive
    ///
    /// # Errors
    /// * `Error::ConfigError` before anything is written
    /// * `Error::ConflictsError` when files already had content; neither the manifest
    ///   nor the archive is written
    /// * `Error::CancelledError`, `Error::IoError`, `Error::ArchiveError`, template errors
    pub fn run(&mut self, raw: RawOptions) -> Result<Outcome> {
        match self.execute(raw) {
            Ok(outcome) => {
                self.enter(Phase::Done);
                Ok(outcome)
            }
            Err(err) => {
                let during = self.phase.label();
                self.phase = Phase::Failed { during, reason: err.to_string() };
                Err(err)
            }
        }
    }

    fn execute(&mut self, raw: RawOptions) -> Result<Outcome> {
        self.enter(Phase::Configuring);
        let config = resolve_config(raw)?;

        self.enter(Phase::Deriving);
        let ids = DerivedIdentifiers::derive(&config)?;
        let root = self.output_dir.join(ids.package_dir());
        let renderer = self.renderer;
        let planner = Planner::new(&config, &ids, renderer);

        self.enter(Phase::Building);
        let manifest = ManifestAssembler::new(planner.context().clone(), config.kind.clone());
        let mut processor = Processor::new(&root, self.tree, manifest, self.cancel.clone());
        for stage in Stage::ALL {
            let requests = planner.requests(stage)?;
            if !requests.is_empty() {
                debug!("Stage {:?}: {} requests", stage, requests.len());
            }
            for request in requests {
                debug!("Applying {}", request.path());
                processor.apply(request)?;
            }
        }

        // Conflicting files were not recorded; never write a manifest missing them.
        if !processor.conflicts().is_empty() {
            let (_, paths) = processor.into_parts();
            return Err(Error::ConflictsError { paths });
        }

        self.enter(Phase::AssemblingManifest);
        let request = planner.manifest_request(processor.manifest())?;
        let manifest_path = root.join(request.path());
        processor.apply(request)?;

        let (manifest, conflicts) = processor.into_parts();
        if !conflicts.is_empty() {
            return Err(Error::ConflictsError { paths: conflicts });
        }

        let archive = match self.archiver {
            Some(archiver) => {
                self.enter(Phase::Packaging);
                Some(archiver.archive(&root)?)
            }
            None => None,
        };

        Ok(Outcome {
            listed: manifest.listed_paths(),
            config,
            identifiers: ids,
            root,
            manifest_path,
            archive,
        })
    }
}
