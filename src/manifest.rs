//! Manifest assembly.
//!
//! The [`ManifestAssembler`] is the explicit accumulator of everything the
//! manifest declares. Each applied request folds its [`Contribution`] into it;
//! nothing else writes to it. Entries keep the position of their first
//! contribution and are never listed twice.

use crate::config::ExtensionKind;
use crate::error::Result;
use crate::plan::{Hook, Listing, Section};
use crate::registry::{extend_context, resolve, Artifact};
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};

/// Element used for a `<files>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Element {
    #[serde(rename = "folder")]
    Folder,
    #[serde(rename = "filename")]
    File,
}

/// What one applied artifact request adds to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Path relative to the package root.
    pub path: String,
    pub element: Element,
    pub listing: Listing,
}

/// A `<folder>` or `<filename>` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub section: Section,
    pub element: Element,
    /// Path relative to the section folder.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageDeclaration {
    #[serde(skip)]
    pub section: Section,
    pub tag: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HookDeclarations {
    pub install: Option<String>,
    pub uninstall: Option<String>,
    pub update: Option<String>,
}

impl HookDeclarations {
    fn slot(&mut self, hook: Hook) -> &mut Option<String> {
        match hook {
            Hook::Install => &mut self.install,
            Hook::Uninstall => &mut self.uninstall,
            Hook::Update => &mut self.update,
        }
    }
}

/// Accumulates manifest declarations in first contribution order.
#[derive(Debug, Clone)]
pub struct ManifestAssembler {
    header: Value,
    kind: ExtensionKind,
    entries: IndexMap<String, ManifestEntry>,
    languages: IndexMap<String, LanguageDeclaration>,
    hooks: HookDeclarations,
}

impl ManifestAssembler {
    /// Creates an empty manifest.
    ///
    /// # Arguments
    /// * `header` - Base template context; provides the header metadata
    /// * `kind` - Extension kind, selects the manifest template
    pub fn new(header: Value, kind: ExtensionKind) -> Self {
        Self {
            header,
            kind,
            entries: IndexMap::new(),
            languages: IndexMap::new(),
            hooks: HookDeclarations::default(),
        }
    }

    /// Folds one contribution into the manifest.
    ///
    /// Returns true when the contribution declared something new. Unlisted
    /// contributions and repeats of an already recorded path return false.
    pub fn record(&mut self, contribution: Contribution) -> bool {
        let Contribution { path, element, listing } = contribution;
        match listing {
            Listing::Unlisted => false,
            Listing::Entry(section) => {
                if self.entries.contains_key(&path) {
                    return false;
                }
                let name = section.relative(&path).to_string();
                debug!("Manifest entry {:?} <{:?}> {}", section, element, name);
                self.entries.insert(path, ManifestEntry { section, element, name });
                true
            }
            Listing::Language { section, tag } => {
                if self.languages.contains_key(&path) {
                    return false;
                }
                self.languages
                    .insert(path.clone(), LanguageDeclaration { section, tag, path });
                true
            }
            Listing::Hook { section, hook } => {
                let slot = self.hooks.slot(hook);
                if slot.is_some() {
                    return false;
                }
                *slot = Some(section.relative(&path).to_string());
                true
            }
        }
    }

    /// Package relative paths of every `<files>` entry, in manifest order.
    pub fn listed_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn hooks(&self) -> &HookDeclarations {
        &self.hooks
    }

    fn files_in(&self, section: Section) -> Vec<&ManifestEntry> {
        self.entries.values().filter(|e| e.section == section).collect()
    }

    fn languages_in(&self, section: Section) -> Vec<&LanguageDeclaration> {
        self.languages.values().filter(|l| l.section == section).collect()
    }

    /// The manifest model as seen by the manifest templates.
    pub fn model(&self) -> Value {
        json!({
            "files": {
                "site": self.files_in(Section::Site),
                "admin": self.files_in(Section::Admin),
                "api": self.files_in(Section::Api),
                "root": self.files_in(Section::Root),
            },
            "languages": {
                "site": self.languages_in(Section::Site),
                "admin": self.languages_in(Section::Admin),
                "root": self.languages_in(Section::Root),
            },
            "hooks": self.hooks,
        })
    }

    /// Renders the manifest with the kind's manifest template.
    ///
    /// # Errors
    /// * `Error::UnsupportedVariantError` if the kind has no manifest template
    /// * `Error::MinijinjaError` if rendering fails
    pub fn render(&self, renderer: &dyn TemplateRenderer) -> Result<String> {
        let template = resolve(Artifact::Manifest, &self.kind)?;
        let context = extend_context(&self.header, "manifest", self.model());
        template.render(renderer, &context)
    }
}
