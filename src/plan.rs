//! Build plan.
//!
//! The plan is produced stage by stage. Each [`Stage`] yields an ordered list
//! of [`ArtifactRequest`]s with paths relative to the package root, always
//! directories before the files inside them. Stages that do not apply to the
//! configured kind yield nothing.

use crate::config::{BuildConfig, ExtensionKind};
use crate::constants::{SQL_INSTALL_FILE, SQL_UNINSTALL_FILE, SQL_UPDATES_DIR};
use crate::error::Result;
use crate::manifest::{Contribution, Element, ManifestAssembler};
use crate::naming::DerivedIdentifiers;
use crate::registry::{base_context, extend_context, resolve, Artifact};
use crate::renderer::TemplateRenderer;
use serde::Serialize;
use serde_json::{json, Value};

/// A `<files>` block of the manifest, named after its source folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Site,
    Admin,
    Api,
    Root,
}

impl Section {
    /// Folder of the section, relative to the package root.
    pub fn folder(&self) -> &'static str {
        match self {
            Section::Site => "site",
            Section::Admin => "admin",
            Section::Api => "api",
            Section::Root => "",
        }
    }

    /// Joins a path relative to the section folder onto it.
    pub fn join(&self, relative: &str) -> String {
        match self.folder() {
            "" => relative.to_string(),
            folder => format!("{folder}/{relative}"),
        }
    }

    /// Strips the section folder from a package relative path.
    pub fn relative<'a>(&self, path: &'a str) -> &'a str {
        match self.folder() {
            "" => path,
            folder => path
                .strip_prefix(folder)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(path),
        }
    }
}

/// Lifecycle hook declared in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Install,
    Uninstall,
    Update,
}

/// How an artifact shows up in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Not declared.
    Unlisted,
    /// A `<folder>` or `<filename>` entry of the section's `<files>` block.
    Entry(Section),
    /// A `<language>` declaration.
    Language { section: Section, tag: String },
    /// The target of an install, uninstall or update hook.
    Hook { section: Section, hook: Hook },
}

/// One step of the build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRequest {
    Directory { path: String, listing: Listing },
    File { path: String, content: String, listing: Listing },
}

impl ArtifactRequest {
    pub fn path(&self) -> &str {
        match self {
            ArtifactRequest::Directory { path, .. } | ArtifactRequest::File { path, .. } => path,
        }
    }

    pub fn listing(&self) -> &Listing {
        match self {
            ArtifactRequest::Directory { listing, .. } | ArtifactRequest::File { listing, .. } => {
                listing
            }
        }
    }

    /// What applying this request adds to the manifest.
    pub fn contribution(&self) -> Contribution {
        let element = match self {
            ArtifactRequest::Directory { .. } => Element::Folder,
            ArtifactRequest::File { .. } => Element::File,
        };
        Contribution {
            path: self.path().to_string(),
            element,
            listing: self.listing().clone(),
        }
    }
}

fn dir(path: impl Into<String>, listing: Listing) -> ArtifactRequest {
    ArtifactRequest::Directory { path: path.into(), listing }
}

fn file(path: impl Into<String>, content: String, listing: Listing) -> ArtifactRequest {
    ArtifactRequest::File { path: path.into(), content, listing }
}

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Layout,
    Localization,
    Services,
    AdminMvc,
    SiteMvc,
    ExtraControllers,
    Api,
    Extension,
    Sql,
    ExtraFolders,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Layout,
        Stage::Localization,
        Stage::Services,
        Stage::AdminMvc,
        Stage::SiteMvc,
        Stage::ExtraControllers,
        Stage::Api,
        Stage::Extension,
        Stage::Sql,
        Stage::ExtraFolders,
    ];

    /// Whether the stage emits anything for the configuration.
    pub fn applies_to(&self, config: &BuildConfig) -> bool {
        match (self, &config.kind) {
            (Stage::Layout | Stage::Localization, _) => true,
            (Stage::Services, ExtensionKind::Custom(_)) => false,
            (Stage::Services, _) => true,
            (Stage::AdminMvc | Stage::SiteMvc, kind) => {
                matches!(kind, ExtensionKind::Component { .. })
            }
            (Stage::ExtraControllers, _) => !config.controllers.is_empty(),
            (Stage::Api, ExtensionKind::Component { api, .. }) => *api,
            (Stage::Api, _) => false,
            (Stage::Extension, ExtensionKind::Component { .. }) => false,
            (Stage::Extension, _) => true,
            (Stage::Sql, _) => config.include_sql,
            (Stage::ExtraFolders, _) => !config.extra_folders.is_empty(),
        }
    }
}

/// Produces the requests of each stage for one configuration.
pub struct Planner<'a> {
    config: &'a BuildConfig,
    ids: &'a DerivedIdentifiers,
    renderer: &'a dyn TemplateRenderer,
    context: Value,
}

impl<'a> Planner<'a> {
    pub fn new(
        config: &'a BuildConfig,
        ids: &'a DerivedIdentifiers,
        renderer: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            config,
            ids,
            renderer,
            context: base_context(config, ids),
        }
    }

    /// Values shared by every template of the run.
    pub fn context(&self) -> &Value {
        &self.context
    }

    fn render(&self, artifact: Artifact) -> Result<String> {
        resolve(artifact, &self.config.kind)?.render(self.renderer, &self.context)
    }

    /// Section holding admin side or top level folders of the kind.
    fn main_section(&self) -> Section {
        if self.config.is_component() {
            Section::Admin
        } else {
            Section::Root
        }
    }

    /// Returns the requests of one stage, in application order.
    ///
    /// # Errors
    /// * `Error::UnsupportedVariantError` if a template has no rule for the kind
    /// * `Error::MinijinjaError` if a template fails to render
    pub fn requests(&self, stage: Stage) -> Result<Vec<ArtifactRequest>> {
        if !stage.applies_to(self.config) {
            return Ok(Vec::new());
        }
        match stage {
            Stage::Layout => Ok(self.layout()),
            Stage::Localization => self.localization(),
            Stage::Services => self.services(),
            Stage::AdminMvc => self.admin_mvc(),
            Stage::SiteMvc => self.site_mvc(),
            Stage::ExtraControllers => self.extra_controllers(),
            Stage::Api => self.api(),
            Stage::Extension => self.extension(),
            Stage::Sql => self.sql(),
            Stage::ExtraFolders => Ok(self.extra_folders()),
        }
    }

    /// Renders the manifest from everything recorded so far.
    pub fn manifest_request(&self, manifest: &ManifestAssembler) -> Result<ArtifactRequest> {
        Ok(file(
            self.ids.manifest_file.clone(),
            manifest.render(self.renderer)?,
            Listing::Unlisted,
        ))
    }

    fn layout(&self) -> Vec<ArtifactRequest> {
        let mut requests = vec![dir("", Listing::Unlisted)];
        if let ExtensionKind::Component { api, .. } = self.config.kind {
            requests.push(dir(Section::Site.folder(), Listing::Unlisted));
            requests.push(dir(Section::Admin.folder(), Listing::Unlisted));
            if api {
                requests.push(dir(Section::Api.folder(), Listing::Unlisted));
            }
        }
        requests
    }

    fn language_file(&self, section: Section, suffix: &str, content: String) -> ArtifactRequest {
        let locale = &self.config.locale;
        file(
            section.join(&format!(
                "language/{locale}/{locale}.{}.{suffix}",
                self.ids.manifest_key
            )),
            content,
            Listing::Language { section, tag: locale.clone() },
        )
    }

    fn localization(&self) -> Result<Vec<ArtifactRequest>> {
        let locale = &self.config.locale;
        let main = self.main_section();
        let mut requests = vec![
            dir(main.join("language"), Listing::Entry(main)),
            dir(main.join(&format!("language/{locale}")), Listing::Unlisted),
            self.language_file(main, "ini", self.render(Artifact::Language)?),
            self.language_file(main, "sys.ini", self.render(Artifact::SystemLanguage)?),
        ];
        if self.config.is_component() {
            let site = Section::Site;
            requests.push(dir(site.join("language"), Listing::Entry(site)));
            requests.push(dir(site.join(&format!("language/{locale}")), Listing::Unlisted));
            requests.push(self.language_file(site, "ini", self.render(Artifact::SiteLanguage)?));
        }
        Ok(requests)
    }

    fn services(&self) -> Result<Vec<ArtifactRequest>> {
        let main = self.main_section();
        Ok(vec![
            dir(main.join("services"), Listing::Entry(main)),
            file(
                main.join("services/provider.php"),
                self.render(Artifact::ServiceProvider)?,
                Listing::Unlisted,
            ),
        ])
    }

    fn admin_mvc(&self) -> Result<Vec<ArtifactRequest>> {
        let view = &self.ids.view;
        let view_slug = &self.ids.view_slug;
        Ok(vec![
            dir("admin/src", Listing::Entry(Section::Admin)),
            dir("admin/src/Controller", Listing::Unlisted),
            file(
                "admin/src/Controller/DisplayController.php",
                self.render(Artifact::AdminDisplayController)?,
                Listing::Unlisted,
            ),
            dir(format!("admin/src/View/{view}"), Listing::Unlisted),
            file(
                format!("admin/src/View/{view}/HtmlView.php"),
                self.render(Artifact::AdminHtmlView)?,
                Listing::Unlisted,
            ),
            dir("admin/src/Model", Listing::Unlisted),
            file(
                "admin/src/Model/MessageModel.php",
                self.render(Artifact::AdminModel)?,
                Listing::Unlisted,
            ),
            dir("admin/tmpl", Listing::Entry(Section::Admin)),
            dir(format!("admin/tmpl/{view_slug}"), Listing::Unlisted),
            file(
                format!("admin/tmpl/{view_slug}/default.php"),
                self.render(Artifact::AdminLayout)?,
                Listing::Unlisted,
            ),
        ])
    }

    fn site_mvc(&self) -> Result<Vec<ArtifactRequest>> {
        let view = &self.ids.view;
        let view_slug = &self.ids.view_slug;
        Ok(vec![
            dir("site/src", Listing::Entry(Section::Site)),
            dir("site/src/Controller", Listing::Unlisted),
            file(
                "site/src/Controller/DisplayController.php",
                self.render(Artifact::SiteDisplayController)?,
                Listing::Unlisted,
            ),
            dir(format!("site/src/View/{view}"), Listing::Unlisted),
            file(
                format!("site/src/View/{view}/HtmlView.php"),
                self.render(Artifact::SiteHtmlView)?,
                Listing::Unlisted,
            ),
            dir("site/src/Model", Listing::Unlisted),
            file(
                "site/src/Model/MessageModel.php",
                self.render(Artifact::SiteModel)?,
                Listing::Unlisted,
            ),
            dir("site/tmpl", Listing::Entry(Section::Site)),
            dir(format!("site/tmpl/{view_slug}"), Listing::Unlisted),
            file(
                format!("site/tmpl/{view_slug}/default.php"),
                self.render(Artifact::SiteLayout)?,
                Listing::Unlisted,
            ),
            file(
                format!("site/tmpl/{view_slug}/default.xml"),
                self.render(Artifact::SiteMenuItem)?,
                Listing::Unlisted,
            ),
        ])
    }

    /// One controller and one view per extra controller token.
    fn extra_controllers(&self) -> Result<Vec<ArtifactRequest>> {
        let template = resolve(Artifact::ExtraController, &self.config.kind)?;
        let view_template = resolve(Artifact::ExtraHtmlView, &self.config.kind)?;
        let mut requests = Vec::new();
        for controller in &self.ids.controllers {
            let context = extend_context(&self.context, "controller", json!(controller));
            let name = &controller.namespace;
            requests.push(file(
                format!("admin/src/Controller/{name}Controller.php"),
                template.render(self.renderer, &context)?,
                Listing::Unlisted,
            ));
            requests.push(dir(format!("admin/src/View/{name}"), Listing::Unlisted));
            requests.push(file(
                format!("admin/src/View/{name}/HtmlView.php"),
                view_template.render(self.renderer, &context)?,
                Listing::Unlisted,
            ));
        }
        Ok(requests)
    }

    fn api(&self) -> Result<Vec<ArtifactRequest>> {
        Ok(vec![
            dir("api/src", Listing::Entry(Section::Api)),
            dir("api/src/Controller", Listing::Unlisted),
            file(
                format!("api/src/Controller/{}Controller.php", self.ids.view),
                self.render(Artifact::ApiController)?,
                Listing::Unlisted,
            ),
        ])
    }

    fn extension(&self) -> Result<Vec<ArtifactRequest>> {
        let root = Listing::Entry(Section::Root);
        match &self.config.kind {
            ExtensionKind::Plugin { .. } => Ok(vec![
                dir("src", root),
                dir("src/Extension", Listing::Unlisted),
                file(
                    format!("src/Extension/{}.php", self.ids.namespace),
                    self.render(Artifact::PluginExtension)?,
                    Listing::Unlisted,
                ),
            ]),
            ExtensionKind::Module { .. } => Ok(vec![
                dir("src", root.clone()),
                dir("src/Dispatcher", Listing::Unlisted),
                file(
                    "src/Dispatcher/Dispatcher.php",
                    self.render(Artifact::ModuleDispatcher)?,
                    Listing::Unlisted,
                ),
                dir("tmpl", root),
                file("tmpl/default.php", self.render(Artifact::ModuleLayout)?, Listing::Unlisted),
            ]),
            ExtensionKind::Custom(_) => Ok(vec![file(
                format!("{}.php", self.ids.slug),
                self.render(Artifact::EntryPoint)?,
                root,
            )]),
            ExtensionKind::Component { .. } => Ok(Vec::new()),
        }
    }

    fn sql(&self) -> Result<Vec<ArtifactRequest>> {
        let section = self.main_section();
        let hook = |hook| Listing::Hook { section, hook };
        let updates = section.join(SQL_UPDATES_DIR);
        Ok(vec![
            dir(section.join("sql"), Listing::Entry(section)),
            file(
                section.join(&format!("sql/{SQL_INSTALL_FILE}")),
                self.render(Artifact::SqlInstall)?,
                hook(Hook::Install),
            ),
            file(
                section.join(&format!("sql/{SQL_UNINSTALL_FILE}")),
                self.render(Artifact::SqlUninstall)?,
                hook(Hook::Uninstall),
            ),
            dir(section.join("sql/updates"), Listing::Unlisted),
            dir(updates.clone(), hook(Hook::Update)),
            file(
                format!("{updates}/{}.sql", self.config.version),
                self.render(Artifact::SqlUpdate)?,
                Listing::Unlisted,
            ),
        ])
    }

    fn extra_folders(&self) -> Vec<ArtifactRequest> {
        let section = self.main_section();
        self.config
            .extra_folders
            .iter()
            .map(|folder| dir(section.join(folder), Listing::Entry(section)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_paths() {
        assert_eq!(Section::Admin.join("sql"), "admin/sql");
        assert_eq!(Section::Root.join("sql"), "sql");
        assert_eq!(Section::Admin.relative("admin/sql/updates/mysql"), "sql/updates/mysql");
        assert_eq!(Section::Root.relative("language"), "language");
        assert_eq!(Section::Site.relative("admin/src"), "admin/src");
    }
}
