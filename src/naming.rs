//! Derived identifiers.
//!
//! Every name that ends up in a path, a PHP namespace, a manifest key or a
//! table name is computed here, once, from the human entered names in the
//! [`BuildConfig`]. All functions are pure, so equal configurations always
//! derive equal identifiers.

use crate::config::{BuildConfig, ExtensionKind};
use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Human entered names: a letter, then letters, digits, underscores and spaces.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_ ]*$").expect("NAME_PATTERN regex should compile")
});

/// Checks that a human entered name can be turned into paths and identifiers.
///
/// Names are rejected rather than silently stripped, so that generated file
/// names never diverge from the displayed name.
///
/// # Errors
/// * `Error::ConfigError` if the name is empty after trimming, does not start
///   with a letter, or contains anything besides letters, digits, underscores and spaces
pub fn validate_name<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::ConfigError(format!("{what} must not be empty")));
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Err(Error::ConfigError(format!(
            "{what} '{trimmed}' may only contain letters, digits, underscores and spaces, \
             and must start with a letter"
        )));
    }
    Ok(trimmed)
}

/// Lowercase, whitespace removed: "Generic Hello World" -> "generichelloworld".
pub fn slug(name: &str) -> String {
    name.split_whitespace().collect::<String>().to_lowercase()
}

/// Whitespace removed, case kept: "Generic Hello World" -> "GenericHelloWorld".
pub fn namespace_token(name: &str) -> String {
    name.split_whitespace().collect()
}

/// Lowercase, whitespace runs replaced by one underscore:
/// "Generic Hello World" -> "generic_hello_world".
pub fn table_prefix(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Upper cases the first character: "system" -> "System".
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Names derived from one additional controller token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerNames {
    pub token: String,
    pub namespace: String,
    pub slug: String,
}

/// The family of identifiers derived from a [`BuildConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedIdentifiers {
    pub slug: String,
    pub namespace: String,
    pub manifest_key: String,
    pub table_prefix: String,
    pub language_prefix: String,
    pub manifest_file: String,
    pub view: String,
    pub view_slug: String,
    pub controllers: Vec<ControllerNames>,
}

impl DerivedIdentifiers {
    /// Derives every identifier from the configuration.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the extension name, the initial view name or a
    ///   controller name is not a valid name
    pub fn derive(config: &BuildConfig) -> Result<Self> {
        let name = validate_name(&config.name, "name")?;
        let view = validate_name(&config.initial_view, "initial view name")?;

        let base = slug(name);
        let manifest_key = match &config.kind {
            ExtensionKind::Component { .. } => format!("com_{base}"),
            ExtensionKind::Plugin { group } => format!("plg_{}_{base}", group.as_str()),
            ExtensionKind::Module { .. } => format!("mod_{base}"),
            ExtensionKind::Custom(kind) => format!("{kind}_{base}"),
        };
        let manifest_file = match &config.kind {
            ExtensionKind::Module { .. } => format!("{manifest_key}.xml"),
            _ => format!("{base}.xml"),
        };

        let controllers = config
            .controllers
            .iter()
            .map(|token| {
                let token = validate_name(token, "controller name")?;
                Ok(ControllerNames {
                    token: token.to_string(),
                    namespace: namespace_token(token),
                    slug: slug(token),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            namespace: namespace_token(name),
            table_prefix: table_prefix(name),
            language_prefix: manifest_key.to_uppercase(),
            view: namespace_token(view),
            view_slug: slug(view),
            slug: base,
            manifest_key,
            manifest_file,
            controllers,
        })
    }

    /// Name of the package root directory.
    pub fn package_dir(&self) -> &str {
        &self.manifest_key
    }
}
