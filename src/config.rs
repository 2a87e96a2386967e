//! Configuration handling for extsmith.
//! This module turns the raw named options (command line flags and/or an options file)
//! into a fully validated, immutable [`BuildConfig`].

use crate::constants::{DEFAULT_LICENSE, DEFAULT_LOCALE, DEFAULT_VIEW_NAME};
use crate::error::{Error, Result};
use crate::naming::{slug, validate_name};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Custom kinds and plugin groups.
static LOWER_IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*$").expect("LOWER_IDENTIFIER_PATTERN regex should compile")
});
static FOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("FOLDER_PATTERN regex should compile")
});
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z][0-9A-Za-z.+-]*$").expect("VERSION_PATTERN regex should compile")
});
static LOCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}-[A-Z]{2}$").expect("LOCALE_PATTERN regex should compile")
});
/// Vendor names become the first namespace segment.
static VENDOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("VENDOR_PATTERN regex should compile")
});

/// Raw named options as supplied by the user.
///
/// Every field is optional here; [`resolve`] decides which ones are required
/// and substitutes defaults for the rest. The same structure is filled from
/// command line flags and from an options file.
#[derive(clap::Args, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawOptions {
    /// The extension's human readable name, e.g. "Generic Hello World"
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// The extension's description
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Vendor used in PHP namespaces, typically your org or author's name
    #[arg(long, value_name = "VENDOR")]
    pub vendor: Option<String>,

    /// The code author's name
    #[arg(long, value_name = "NAME")]
    pub author_name: Option<String>,

    /// The code author's website URL
    #[arg(long, value_name = "URL")]
    pub author_url: Option<String>,

    /// The copyright holder's name
    #[arg(long, value_name = "NAME")]
    pub copyright_holder: Option<String>,

    /// Month of the extension's creation
    #[arg(long, value_name = "MONTH")]
    pub creation_month: Option<String>,

    /// Year of the extension's creation
    #[arg(long, value_name = "YEAR")]
    pub creation_year: Option<String>,

    /// License type [default: GPL v2]
    #[arg(long, value_name = "LICENSE")]
    pub license: Option<String>,

    /// The extension's version string
    #[arg(long, value_name = "VERSION")]
    pub package_version: Option<String>,

    /// Extension kind: component, plugin or module
    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    /// A custom extension kind, used instead of --kind
    #[arg(long, value_name = "KIND")]
    pub custom_kind: Option<String>,

    /// Locale code of the generated language files [default: en-GB]
    #[arg(long, value_name = "CODE")]
    pub locale: Option<String>,

    /// Name of the initial component view [default: Main]
    #[arg(long, value_name = "NAME")]
    pub initial_view: Option<String>,

    /// Generate install, uninstall and update SQL scripts
    #[arg(long)]
    pub include_sql: bool,

    /// Component controller design: display or form [default: display]
    #[arg(long, value_name = "DESIGN")]
    pub controller_design: Option<String>,

    /// Generate the web services (api) side of a component
    #[arg(long)]
    pub include_api: bool,

    /// Comma separated names of additional component controllers
    #[arg(long, value_name = "NAMES")]
    pub controllers: Option<String>,

    /// Plugin group [default: system]
    #[arg(long, value_name = "GROUP")]
    pub plugin_group: Option<String>,

    /// Module client: site or administrator [default: site]
    #[arg(long, value_name = "CLIENT")]
    pub module_client: Option<String>,

    /// Comma separated names of extra folders to create and declare
    #[arg(long, value_name = "NAMES")]
    pub extra_folders: Option<String>,
}

impl RawOptions {
    /// Fills every option missing from `self` with the one from `fallback`.
    /// Boolean flags are set when either side sets them.
    pub fn merge(self, fallback: RawOptions) -> RawOptions {
        RawOptions {
            name: self.name.or(fallback.name),
            description: self.description.or(fallback.description),
            vendor: self.vendor.or(fallback.vendor),
            author_name: self.author_name.or(fallback.author_name),
            author_url: self.author_url.or(fallback.author_url),
            copyright_holder: self.copyright_holder.or(fallback.copyright_holder),
            creation_month: self.creation_month.or(fallback.creation_month),
            creation_year: self.creation_year.or(fallback.creation_year),
            license: self.license.or(fallback.license),
            package_version: self.package_version.or(fallback.package_version),
            kind: self.kind.or(fallback.kind),
            custom_kind: self.custom_kind.or(fallback.custom_kind),
            locale: self.locale.or(fallback.locale),
            initial_view: self.initial_view.or(fallback.initial_view),
            include_sql: self.include_sql || fallback.include_sql,
            controller_design: self.controller_design.or(fallback.controller_design),
            include_api: self.include_api || fallback.include_api,
            controllers: self.controllers.or(fallback.controllers),
            plugin_group: self.plugin_group.or(fallback.plugin_group),
            module_client: self.module_client.or(fallback.module_client),
            extra_folders: self.extra_folders.or(fallback.extra_folders),
        }
    }
}

/// Loads raw options from a JSON or YAML file.
///
/// # Arguments
/// * `path` - Path to the options file
///
/// # Returns
/// * `Result<RawOptions>` - Options read from the file
///
/// # Errors
/// * `Error::IoError` if the file cannot be read
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML
pub fn load_options_file<P: AsRef<Path>>(path: P) -> Result<RawOptions> {
    let path = path.as_ref();
    debug!("Loading options from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(Error::io(path))?;
    parse_options(&content)
}

/// Parses options content, trying JSON first and YAML second.
pub fn parse_options(content: &str) -> Result<RawOptions> {
    match serde_json::from_str(content) {
        Ok(options) => Ok(options),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid options format: {e}"))),
    }
}

/// Controller flavour generated for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerDesign {
    Display,
    Form,
}

/// Plugin group the generated plugin belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginGroup {
    System,
    Content,
    Other(String),
}

impl PluginGroup {
    pub fn as_str(&self) -> &str {
        match self {
            PluginGroup::System => "system",
            PluginGroup::Content => "content",
            PluginGroup::Other(group) => group,
        }
    }
}

/// Application side a module is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleClient {
    Site,
    Administrator,
}

/// The category of extension to generate.
///
/// Flag driven specializations live inside the variant they apply to, so a
/// resolved configuration can never carry a flag for the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKind {
    Component { controller: ControllerDesign, api: bool },
    Plugin { group: PluginGroup },
    Module { client: ModuleClient },
    Custom(String),
}

/// Kind names understood by `--kind`.
pub const KNOWN_KINDS: [&str; 3] = ["component", "plugin", "module"];

impl ExtensionKind {
    pub fn name(&self) -> &str {
        match self {
            ExtensionKind::Component { .. } => "component",
            ExtensionKind::Plugin { .. } => "plugin",
            ExtensionKind::Module { .. } => "module",
            ExtensionKind::Custom(kind) => kind,
        }
    }

    /// Folder names the generator itself creates for this kind.
    /// Extra folders may not reuse them.
    pub fn reserved_folders(&self) -> &'static [&'static str] {
        match self {
            ExtensionKind::Component { .. } => &["language", "services", "src", "tmpl", "sql"],
            ExtensionKind::Plugin { .. } => &["language", "services", "src", "sql"],
            ExtensionKind::Module { .. } => &["language", "services", "src", "tmpl", "sql"],
            ExtensionKind::Custom(_) => &["language", "src", "sql"],
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKind::Component { controller, api } => {
                write!(f, "component ({controller:?} controller")?;
                if *api {
                    write!(f, ", api")?;
                }
                write!(f, ")")
            }
            ExtensionKind::Plugin { group } => write!(f, "plugin ({} group)", group.as_str()),
            ExtensionKind::Module { client } => write!(f, "module ({client:?} client)"),
            ExtensionKind::Custom(kind) => write!(f, "custom '{kind}'"),
        }
    }
}

/// Fully typed and validated build configuration. Never mutated once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub name: String,
    pub description: String,
    pub vendor: String,
    pub author_name: String,
    pub author_url: String,
    pub copyright_holder: String,
    pub creation_month: String,
    pub creation_year: String,
    pub license: String,
    pub version: String,
    #[serde(skip)]
    pub kind: ExtensionKind,
    pub locale: String,
    pub initial_view: String,
    pub include_sql: bool,
    pub controllers: Vec<String>,
    pub extra_folders: Vec<String>,
}

impl BuildConfig {
    pub fn creation_date(&self) -> String {
        format!("{} {}", self.creation_month, self.creation_year)
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, ExtensionKind::Component { .. })
    }
}

fn required(value: Option<String>, option: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::ConfigError(format!("missing required option '{option}'"))),
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Splits a comma separated option into trimmed, non-empty tokens.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn reject_for(kind: &str, option: &str) -> Error {
    Error::ConfigError(format!("option '{option}' does not apply to {kind} extensions"))
}

fn resolve_kind(raw: &RawOptions) -> Result<ExtensionKind> {
    let kind = match (raw.kind.as_deref(), raw.custom_kind.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(Error::ConfigError(
                "options 'kind' and 'custom-kind' are mutually exclusive".to_string(),
            ))
        }
        (None, None) => {
            return Err(Error::ConfigError(
                "one of the options 'kind' or 'custom-kind' is required".to_string(),
            ))
        }
        (Some(known), None) => match known.trim() {
            "component" => ExtensionKind::Component {
                controller: resolve_controller_design(raw.controller_design.as_deref())?,
                api: raw.include_api,
            },
            "plugin" => ExtensionKind::Plugin {
                group: resolve_plugin_group(raw.plugin_group.as_deref())?,
            },
            "module" => ExtensionKind::Module {
                client: resolve_module_client(raw.module_client.as_deref())?,
            },
            other => {
                return Err(Error::ConfigError(format!(
                    "unknown kind '{other}' (expected one of: {}); use 'custom-kind' for anything else",
                    KNOWN_KINDS.join(", ")
                )))
            }
        },
        (None, Some(custom)) => {
            let custom = custom.trim();
            if KNOWN_KINDS.contains(&custom) {
                return Err(Error::ConfigError(format!(
                    "'{custom}' is a known kind, pass it with 'kind' instead of 'custom-kind'"
                )));
            }
            if !LOWER_IDENTIFIER_PATTERN.is_match(custom) {
                return Err(Error::ConfigError(format!(
                    "custom kind '{custom}' must be a lowercase identifier"
                )));
            }
            ExtensionKind::Custom(custom.to_string())
        }
    };

    let name = kind.name().to_string();
    if !matches!(kind, ExtensionKind::Component { .. }) {
        if raw.controller_design.is_some() {
            return Err(reject_for(&name, "controller-design"));
        }
        if raw.include_api {
            return Err(reject_for(&name, "include-api"));
        }
        if !split_list(raw.controllers.as_deref()).is_empty() {
            return Err(reject_for(&name, "controllers"));
        }
    }
    if !matches!(kind, ExtensionKind::Plugin { .. }) && raw.plugin_group.is_some() {
        return Err(reject_for(&name, "plugin-group"));
    }
    if !matches!(kind, ExtensionKind::Module { .. }) && raw.module_client.is_some() {
        return Err(reject_for(&name, "module-client"));
    }
    Ok(kind)
}

fn resolve_controller_design(value: Option<&str>) -> Result<ControllerDesign> {
    match value.map(str::trim) {
        None | Some("display") => Ok(ControllerDesign::Display),
        Some("form") => Ok(ControllerDesign::Form),
        Some(other) => Err(Error::ConfigError(format!(
            "unknown controller design '{other}' (expected display or form)"
        ))),
    }
}

fn resolve_plugin_group(value: Option<&str>) -> Result<PluginGroup> {
    match value.map(str::trim) {
        None | Some("system") => Ok(PluginGroup::System),
        Some("content") => Ok(PluginGroup::Content),
        Some(other) if LOWER_IDENTIFIER_PATTERN.is_match(other) => {
            Ok(PluginGroup::Other(other.to_string()))
        }
        Some(other) => Err(Error::ConfigError(format!(
            "plugin group '{other}' must be a lowercase identifier"
        ))),
    }
}

fn resolve_module_client(value: Option<&str>) -> Result<ModuleClient> {
    match value.map(str::trim) {
        None | Some("site") => Ok(ModuleClient::Site),
        Some("administrator") => Ok(ModuleClient::Administrator),
        Some(other) => Err(Error::ConfigError(format!(
            "unknown module client '{other}' (expected site or administrator)"
        ))),
    }
}

fn resolve_controllers(raw: &RawOptions, initial_view: &str) -> Result<Vec<String>> {
    let tokens = split_list(raw.controllers.as_deref());
    let mut seen = Vec::new();
    for token in &tokens {
        validate_name(token, "controller name")?;
        // Views, layouts and menu links use the lowercase form, so names
        // differing only in case or spacing are the same controller.
        let key = slug(token);
        if key == slug(initial_view) || key == "display" {
            return Err(Error::ConfigError(format!(
                "controller name '{token}' clashes with a generated controller"
            )));
        }
        if seen.contains(&key) {
            return Err(Error::ConfigError(format!("controller name '{token}' is given twice")));
        }
        seen.push(key);
    }
    Ok(tokens)
}

fn resolve_extra_folders(raw: &RawOptions, kind: &ExtensionKind) -> Result<Vec<String>> {
    let folders = split_list(raw.extra_folders.as_deref());
    for (index, folder) in folders.iter().enumerate() {
        if !FOLDER_PATTERN.is_match(folder) {
            return Err(Error::ConfigError(format!(
                "extra folder '{folder}' is not a valid folder name"
            )));
        }
        if kind.reserved_folders().contains(&folder.as_str()) {
            return Err(Error::ConfigError(format!(
                "extra folder '{folder}' is already generated for {} extensions",
                kind.name()
            )));
        }
        if folders[..index].contains(folder) {
            return Err(Error::ConfigError(format!("extra folder '{folder}' is given twice")));
        }
    }
    Ok(folders)
}

/// Resolves raw options into a validated [`BuildConfig`].
///
/// # Arguments
/// * `raw` - Options as supplied by the user
///
/// # Returns
/// * `Result<BuildConfig>` - The immutable build configuration
///
/// # Errors
/// * `Error::ConfigError` when a required option is missing, the kind options are
///   contradictory, or any value fails validation
pub fn resolve(raw: RawOptions) -> Result<BuildConfig> {
    let kind = resolve_kind(&raw)?;

    let name = required(raw.name.clone(), "name")?;
    validate_name(&name, "name")?;

    let author_url = required(raw.author_url.clone(), "author-url")?;
    url::Url::parse(&author_url)
        .map_err(|e| Error::ConfigError(format!("invalid author url '{author_url}': {e}")))?;

    let version = required(raw.package_version.clone(), "package-version")?;
    if !VERSION_PATTERN.is_match(&version) {
        return Err(Error::ConfigError(format!(
            "version '{version}' can only contain letters, digits, '.', '+' and '-'"
        )));
    }

    let locale = or_default(raw.locale.clone(), DEFAULT_LOCALE);
    if !LOCALE_PATTERN.is_match(&locale) {
        return Err(Error::ConfigError(format!("locale '{locale}' is not of the form xx-XX")));
    }

    let initial_view = or_default(raw.initial_view.clone(), DEFAULT_VIEW_NAME);
    validate_name(&initial_view, "initial view name")?;

    let controllers = resolve_controllers(&raw, &initial_view)?;
    let extra_folders = resolve_extra_folders(&raw, &kind)?;

    let description = required(raw.description.clone(), "description")?;
    if description.contains('"') {
        return Err(Error::ConfigError(
            "description must not contain '\"', it is written into quoted language strings"
                .to_string(),
        ));
    }

    let config = BuildConfig {
        name,
        description,
        vendor: required(raw.vendor, "vendor")?,
        author_name: required(raw.author_name, "author-name")?,
        author_url,
        copyright_holder: required(raw.copyright_holder, "copyright-holder")?,
        creation_month: required(raw.creation_month, "creation-month")?,
        creation_year: required(raw.creation_year, "creation-year")?,
        license: or_default(raw.license, DEFAULT_LICENSE),
        version,
        kind,
        locale,
        initial_view,
        include_sql: raw.include_sql,
        controllers,
        extra_folders,
    };
    if !VENDOR_PATTERN.is_match(&config.vendor) {
        return Err(Error::ConfigError(format!(
            "vendor '{}' must be a single identifier usable in a namespace",
            config.vendor
        )));
    }

    debug!("Resolved {} configuration for '{}'", config.kind, config.name);
    Ok(config)
}
