//! Template registry.
//!
//! Maps an [`Artifact`] and the resolved [`ExtensionKind`] to exactly one
//! embedded template. Dispatch is an exhaustive `match`, so adding a kind or
//! an artifact does not compile until every branch says what it produces.
//! Combinations without a rule fail with [`Error::UnsupportedVariantError`].

use crate::config::{BuildConfig, ControllerDesign, ExtensionKind, ModuleClient, PluginGroup};
use crate::constants::INITIAL_TABLE_NAME;
use crate::error::{Error, Result};
use crate::naming::{capitalize, DerivedIdentifiers};
use crate::renderer::TemplateRenderer;
use serde_json::{json, Value};
use std::fmt;

/// Every template backed artifact the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Manifest,
    ServiceProvider,
    AdminDisplayController,
    AdminHtmlView,
    AdminLayout,
    AdminModel,
    SiteDisplayController,
    SiteHtmlView,
    SiteLayout,
    SiteModel,
    SiteMenuItem,
    ExtraController,
    ExtraHtmlView,
    Language,
    SystemLanguage,
    SiteLanguage,
    SqlInstall,
    SqlUninstall,
    SqlUpdate,
    PluginExtension,
    ModuleDispatcher,
    ModuleLayout,
    EntryPoint,
    ApiController,
}

impl Artifact {
    pub const ALL: [Artifact; 24] = [
        Artifact::Manifest,
        Artifact::ServiceProvider,
        Artifact::AdminDisplayController,
        Artifact::AdminHtmlView,
        Artifact::AdminLayout,
        Artifact::AdminModel,
        Artifact::SiteDisplayController,
        Artifact::SiteHtmlView,
        Artifact::SiteLayout,
        Artifact::SiteModel,
        Artifact::SiteMenuItem,
        Artifact::ExtraController,
        Artifact::ExtraHtmlView,
        Artifact::Language,
        Artifact::SystemLanguage,
        Artifact::SiteLanguage,
        Artifact::SqlInstall,
        Artifact::SqlUninstall,
        Artifact::SqlUpdate,
        Artifact::PluginExtension,
        Artifact::ModuleDispatcher,
        Artifact::ModuleLayout,
        Artifact::EntryPoint,
        Artifact::ApiController,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Manifest => "manifest",
            Artifact::ServiceProvider => "service provider",
            Artifact::AdminDisplayController => "admin display controller",
            Artifact::AdminHtmlView => "admin html view",
            Artifact::AdminLayout => "admin layout",
            Artifact::AdminModel => "admin model",
            Artifact::SiteDisplayController => "site display controller",
            Artifact::SiteHtmlView => "site html view",
            Artifact::SiteLayout => "site layout",
            Artifact::SiteModel => "site model",
            Artifact::SiteMenuItem => "site menu item",
            Artifact::ExtraController => "extra controller",
            Artifact::ExtraHtmlView => "extra html view",
            Artifact::Language => "language strings",
            Artifact::SystemLanguage => "system language strings",
            Artifact::SiteLanguage => "site language strings",
            Artifact::SqlInstall => "sql install script",
            Artifact::SqlUninstall => "sql uninstall script",
            Artifact::SqlUpdate => "sql update script",
            Artifact::PluginExtension => "plugin extension class",
            Artifact::ModuleDispatcher => "module dispatcher",
            Artifact::ModuleLayout => "module layout",
            Artifact::EntryPoint => "entry point",
            Artifact::ApiController => "api controller",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An embedded template: its registry name and its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub source: &'static str,
}

impl Template {
    /// Renders the template. Performs no I/O.
    ///
    /// # Arguments
    /// * `renderer` - Template engine
    /// * `context` - Values available to the template
    ///
    /// # Returns
    /// * `Result<String>` - The rendered payload
    pub fn render(&self, renderer: &dyn TemplateRenderer, context: &Value) -> Result<String> {
        renderer.render(self.source, context)
    }
}

macro_rules! template {
    ($path:literal) => {
        Template {
            name: $path,
            source: include_str!(concat!("../templates/", $path, ".j2")),
        }
    };
}

/// Templates shared by every kind.
fn common_template(artifact: Artifact) -> Option<Template> {
    match artifact {
        Artifact::Language => Some(template!("common/language.ini")),
        Artifact::SystemLanguage => Some(template!("common/language.sys.ini")),
        Artifact::SqlInstall => Some(template!("common/install.sql")),
        Artifact::SqlUninstall => Some(template!("common/uninstall.sql")),
        Artifact::SqlUpdate => Some(template!("common/update.sql")),
        _ => None,
    }
}

fn component_template(
    artifact: Artifact,
    controller: ControllerDesign,
    api: bool,
) -> Option<Template> {
    match artifact {
        Artifact::Manifest => Some(template!("component/manifest.xml")),
        Artifact::ServiceProvider => Some(template!("component/provider.php")),
        Artifact::AdminDisplayController => Some(match controller {
            ControllerDesign::Display => template!("component/admin_display_controller.php"),
            ControllerDesign::Form => template!("component/admin_form_controller.php"),
        }),
        Artifact::SiteDisplayController => Some(match controller {
            ControllerDesign::Display => template!("component/site_display_controller.php"),
            ControllerDesign::Form => template!("component/site_form_controller.php"),
        }),
        Artifact::AdminHtmlView => Some(template!("component/admin_html_view.php")),
        Artifact::AdminLayout => Some(template!("component/admin_layout.php")),
        Artifact::AdminModel => Some(template!("component/admin_model.php")),
        Artifact::SiteHtmlView => Some(template!("component/site_html_view.php")),
        Artifact::SiteLayout => Some(template!("component/site_layout.php")),
        Artifact::SiteModel => Some(template!("component/site_model.php")),
        Artifact::SiteMenuItem => Some(template!("component/site_menu_item.xml")),
        Artifact::ExtraController => Some(template!("component/extra_controller.php")),
        Artifact::ExtraHtmlView => Some(template!("component/extra_html_view.php")),
        Artifact::SiteLanguage => Some(template!("component/site_language.ini")),
        Artifact::ApiController if api => Some(template!("component/api_controller.php")),
        Artifact::ApiController => None,
        Artifact::Language
        | Artifact::SystemLanguage
        | Artifact::SqlInstall
        | Artifact::SqlUninstall
        | Artifact::SqlUpdate => common_template(artifact),
        Artifact::PluginExtension
        | Artifact::ModuleDispatcher
        | Artifact::ModuleLayout
        | Artifact::EntryPoint => None,
    }
}

fn plugin_template(artifact: Artifact, group: &PluginGroup) -> Option<Template> {
    match artifact {
        Artifact::Manifest => Some(template!("plugin/manifest.xml")),
        Artifact::ServiceProvider => Some(template!("plugin/provider.php")),
        Artifact::PluginExtension => Some(match group {
            PluginGroup::System => template!("plugin/system_extension.php"),
            PluginGroup::Content => template!("plugin/content_extension.php"),
            PluginGroup::Other(_) => template!("plugin/extension.php"),
        }),
        Artifact::Language
        | Artifact::SystemLanguage
        | Artifact::SqlInstall
        | Artifact::SqlUninstall
        | Artifact::SqlUpdate => common_template(artifact),
        Artifact::AdminDisplayController
        | Artifact::AdminHtmlView
        | Artifact::AdminLayout
        | Artifact::AdminModel
        | Artifact::SiteDisplayController
        | Artifact::SiteHtmlView
        | Artifact::SiteLayout
        | Artifact::SiteModel
        | Artifact::SiteMenuItem
        | Artifact::ExtraController
        | Artifact::ExtraHtmlView
        | Artifact::SiteLanguage
        | Artifact::ModuleDispatcher
        | Artifact::ModuleLayout
        | Artifact::EntryPoint
        | Artifact::ApiController => None,
    }
}

fn module_template(artifact: Artifact, client: ModuleClient) -> Option<Template> {
    match artifact {
        Artifact::Manifest => Some(template!("module/manifest.xml")),
        Artifact::ServiceProvider => Some(template!("module/provider.php")),
        Artifact::ModuleDispatcher => Some(template!("module/dispatcher.php")),
        Artifact::ModuleLayout => Some(match client {
            ModuleClient::Site => template!("module/site_layout.php"),
            ModuleClient::Administrator => template!("module/admin_layout.php"),
        }),
        Artifact::Language
        | Artifact::SystemLanguage
        | Artifact::SqlInstall
        | Artifact::SqlUninstall
        | Artifact::SqlUpdate => common_template(artifact),
        Artifact::AdminDisplayController
        | Artifact::AdminHtmlView
        | Artifact::AdminLayout
        | Artifact::AdminModel
        | Artifact::SiteDisplayController
        | Artifact::SiteHtmlView
        | Artifact::SiteLayout
        | Artifact::SiteModel
        | Artifact::SiteMenuItem
        | Artifact::ExtraController
        | Artifact::ExtraHtmlView
        | Artifact::SiteLanguage
        | Artifact::PluginExtension
        | Artifact::EntryPoint
        | Artifact::ApiController => None,
    }
}

fn custom_template(artifact: Artifact) -> Option<Template> {
    match artifact {
        Artifact::Manifest => Some(template!("custom/manifest.xml")),
        Artifact::EntryPoint => Some(template!("custom/entry_point.php")),
        Artifact::Language
        | Artifact::SystemLanguage
        | Artifact::SqlInstall
        | Artifact::SqlUninstall
        | Artifact::SqlUpdate => common_template(artifact),
        Artifact::ServiceProvider
        | Artifact::AdminDisplayController
        | Artifact::AdminHtmlView
        | Artifact::AdminLayout
        | Artifact::AdminModel
        | Artifact::SiteDisplayController
        | Artifact::SiteHtmlView
        | Artifact::SiteLayout
        | Artifact::SiteModel
        | Artifact::SiteMenuItem
        | Artifact::ExtraController
        | Artifact::ExtraHtmlView
        | Artifact::SiteLanguage
        | Artifact::PluginExtension
        | Artifact::ModuleDispatcher
        | Artifact::ModuleLayout
        | Artifact::ApiController => None,
    }
}

/// Selects the template for an artifact of the given kind.
///
/// # Arguments
/// * `artifact` - What is being generated
/// * `kind` - The resolved extension kind, carrying its specializations
///
/// # Returns
/// * `Result<Template>` - The one template producing that artifact
///
/// # Errors
/// * `Error::UnsupportedVariantError` if the kind has no such artifact
pub fn resolve(artifact: Artifact, kind: &ExtensionKind) -> Result<Template> {
    let template = match kind {
        ExtensionKind::Component { controller, api } => {
            component_template(artifact, *controller, *api)
        }
        ExtensionKind::Plugin { group } => plugin_template(artifact, group),
        ExtensionKind::Module { client } => module_template(artifact, *client),
        ExtensionKind::Custom(_) => custom_template(artifact),
    };
    template.ok_or_else(|| Error::UnsupportedVariantError {
        artifact: artifact.to_string(),
        kind: kind.to_string(),
    })
}

/// PHP namespace root of the extension.
pub fn php_namespace(config: &BuildConfig, ids: &DerivedIdentifiers) -> String {
    match &config.kind {
        ExtensionKind::Component { .. } => {
            format!("{}\\Component\\{}", config.vendor, ids.namespace)
        }
        ExtensionKind::Plugin { group } => format!(
            "{}\\Plugin\\{}\\{}",
            config.vendor,
            capitalize(group.as_str()),
            ids.namespace
        ),
        ExtensionKind::Module { .. } => format!("{}\\Module\\{}", config.vendor, ids.namespace),
        ExtensionKind::Custom(kind) => {
            format!("{}\\{}\\{}", config.vendor, capitalize(kind), ids.namespace)
        }
    }
}

fn kind_context(kind: &ExtensionKind) -> Value {
    match kind {
        ExtensionKind::Component { controller, api } => json!({
            "name": kind.name(),
            "controller": controller,
            "api": api,
        }),
        ExtensionKind::Plugin { group } => json!({
            "name": kind.name(),
            "group": group.as_str(),
            "group_namespace": capitalize(group.as_str()),
        }),
        ExtensionKind::Module { client } => json!({
            "name": kind.name(),
            "client": client,
            "client_namespace": match client {
                ModuleClient::Site => "Site",
                ModuleClient::Administrator => "Administrator",
            },
        }),
        ExtensionKind::Custom(custom) => json!({
            "name": custom,
            "custom_namespace": capitalize(custom),
        }),
    }
}

/// Builds the values every template can use.
///
/// Artifacts that need more (the controller being rendered, the manifest
/// model) extend this object with [`extend_context`].
pub fn base_context(config: &BuildConfig, ids: &DerivedIdentifiers) -> Value {
    let mut config_value = json!(config);
    if let Some(fields) = config_value.as_object_mut() {
        fields.insert("creation_date".to_string(), Value::String(config.creation_date()));
    }
    json!({
        "config": config_value,
        "kind": kind_context(&config.kind),
        "ids": ids,
        "namespace": php_namespace(config, ids),
        "sql": {
            "table_name": INITIAL_TABLE_NAME,
            "table": format!("#__{}_{}", ids.table_prefix, INITIAL_TABLE_NAME),
        },
    })
}

/// Returns a copy of `base` with one more top level key.
pub fn extend_context(base: &Value, key: &str, value: Value) -> Value {
    let mut context = base.clone();
    if let Some(fields) = context.as_object_mut() {
        fields.insert(key.to_string(), value);
    }
    context
}
