//! Plugin and bundler wiring.
//!
//! Plugins are declared as `[[plugins]]` entries with a `name` and an
//! `options` table. Two plugins are known and their options are decoded and
//! checked here:
//!
//! - `container`: custom container blocks (`::: type ... :::`)
//! - `register-components`: components auto-registered from a directory
//!
//! Options of any other plugin are handed to the site framework untouched.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Name of the custom container plugin.
pub const CONTAINER_PLUGIN: &str = "container";

/// Name of the component auto-registration plugin.
pub const REGISTER_COMPONENTS_PLUGIN: &str = "register-components";

/// Plugin entry as written in the configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PluginConfig {
    /// Plugin name.
    pub name: String,
    /// Plugin options, keyed by option name.
    #[serde(default)]
    pub options: toml::Table,
}

/// Options of the `container` plugin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all(serialize = "camelCase"))]
pub struct ContainerOptions {
    /// Container type used in the `::: type` marker.
    #[serde(rename = "type")]
    pub kind: String,
    /// Markup rendered before the container content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Markup rendered after the container content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Per-locale settings keyed by locale path (`/`, `/fr/`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub locales: BTreeMap<String, ContainerLocale>,
}

/// Locale-specific options of the `container` plugin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all(serialize = "camelCase"))]
pub struct ContainerLocale {
    /// Title shown when the container marker has no title.
    pub default_info: String,
}

/// Options of the `register-components` plugin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all(serialize = "camelCase"))]
pub struct RegisterComponentsOptions {
    /// Directory scanned for components (absolute after loading).
    pub components_dir: String,
    /// Glob selecting component files inside `components_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_pattern: Option<String>,
}

/// Decoded plugin options.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PluginOptions {
    Container(ContainerOptions),
    RegisterComponents(RegisterComponentsOptions),
    /// Options of a plugin this crate does not know, passed through.
    Other(toml::Table),
}

/// Validated plugin, ready to hand to the site framework.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPlugin {
    pub name: String,
    pub options: PluginOptions,
}

impl PluginConfig {
    /// Decode and validate the plugin options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the name is empty, and
    /// `ConfigError::Plugin` if options of a known plugin are missing,
    /// unknown or invalid.
    pub fn resolve(&self) -> Result<ResolvedPlugin, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "plugins.name cannot be empty".to_owned(),
            ));
        }

        let options = match self.name.as_str() {
            CONTAINER_PLUGIN => {
                let options: ContainerOptions = self.decode_options()?;
                self.validate_container(&options)?;
                PluginOptions::Container(options)
            }
            REGISTER_COMPONENTS_PLUGIN => {
                let options: RegisterComponentsOptions = self.decode_options()?;
                if options.components_dir.is_empty() {
                    return Err(self.error("components_dir cannot be empty"));
                }
                PluginOptions::RegisterComponents(options)
            }
            _ => {
                tracing::debug!(plugin = %self.name, "Passing through options of unknown plugin");
                PluginOptions::Other(self.options.clone())
            }
        };

        Ok(ResolvedPlugin {
            name: self.name.clone(),
            options,
        })
    }

    /// Resolve directory options relative to `config_dir`.
    pub(crate) fn resolve_paths(&mut self, config_dir: &Path) {
        if self.name != REGISTER_COMPONENTS_PLUGIN {
            return;
        }
        if let Some(toml::Value::String(dir)) = self.options.get_mut("components_dir")
            && !dir.is_empty()
        {
            *dir = config_dir.join(dir.as_str()).display().to_string();
        }
    }

    fn decode_options<T>(&self) -> Result<T, ConfigError>
    where
        T: for<'de> Deserialize<'de>,
    {
        toml::Value::Table(self.options.clone())
            .try_into()
            .map_err(|e: toml::de::Error| self.error(e.message()))
    }

    fn validate_container(&self, options: &ContainerOptions) -> Result<(), ConfigError> {
        if options.kind.is_empty() {
            return Err(self.error("type cannot be empty"));
        }
        if !options
            .kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(self.error(&format!(
                "type {:?} may only contain letters, digits, '-' and '_'",
                options.kind
            )));
        }
        for locale in options.locales.keys() {
            if !locale.starts_with('/') || !locale.ends_with('/') {
                return Err(self.error(&format!(
                    "locale {locale:?} must start and end with '/'"
                )));
            }
        }
        Ok(())
    }

    fn error(&self, message: &str) -> ConfigError {
        ConfigError::Plugin {
            name: self.name.clone(),
            message: message.to_owned(),
        }
    }
}

/// Validate every plugin and reject containers registered twice.
pub(crate) fn resolve_plugins(plugins: &[PluginConfig]) -> Result<Vec<ResolvedPlugin>, ConfigError> {
    let mut container_types = HashSet::new();
    let mut resolved = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        let plugin = plugin.resolve()?;
        if let PluginOptions::Container(options) = &plugin.options
            && !container_types.insert(options.kind.clone())
        {
            return Err(ConfigError::Plugin {
                name: plugin.name,
                message: format!("container type {:?} is registered twice", options.kind),
            });
        }
        resolved.push(plugin);
    }

    Ok(resolved)
}

/// Bundler selection.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Bundler name (`vite`, `webpack`).
    pub name: String,
    /// Options passed to the bundler.
    #[serde(skip_serializing_if = "toml::Table::is_empty")]
    pub options: toml::Table,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            name: "vite".to_owned(),
            options: toml::Table::new(),
        }
    }
}

impl BundlerConfig {
    /// Validate the bundler selection.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "bundler.name cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
