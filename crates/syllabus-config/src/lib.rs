//! Site configuration for Syllabus.
//!
//! Parses `syllabus.toml` with serde, auto-discovers it in parent
//! directories, validates it and builds the sidebar [`Sidebar`] tree.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `title`
//! - `description`
//! - `base`
//! - `bundler.name`
//!
//! ## Example
//!
//! ```toml
//! lang = "en-US"
//! title = "Full Stack Development"
//!
//! [theme]
//! sidebar_depth = 0
//!
//! [[theme.sidebar]]
//! label = "Development Tools"
//! children = ["/01_developmenttools/README.md"]
//!
//! [[plugins]]
//! name = "container"
//! options = { type = "codeoutput" }
//! ```

mod expand;
pub mod plugins;
pub mod sidebar;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use plugins::{BundlerConfig, PluginConfig, PluginOptions, ResolvedPlugin};
pub use sidebar::{
    DocumentIndex, NavGroup, PageRef, PageRefError, ReferenceCheck, Sidebar, SidebarGroup,
    SidebarWarning,
};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override how missing sidebar pages are treated.
    pub references: Option<ReferenceCheck>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "syllabus.toml";

/// Site configuration.
///
/// Built once by [`SiteConfig::load`] and read-only afterwards.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Language tag of the site (`en-US`).
    pub lang: String,
    /// Site title.
    pub title: String,
    /// Site description.
    pub description: String,
    /// Base URL the site is deployed under.
    pub base: String,
    /// Whether the framework should generate a service worker.
    pub service_worker: bool,
    /// Theme options.
    pub theme: ThemeConfig,
    /// Plugin wirings in registration order.
    pub plugins: Vec<PluginConfig>,
    /// Bundler selection.
    pub bundler: BundlerConfig,
    /// Content configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Validated sidebar tree (set after loading).
    #[serde(skip)]
    pub sidebar_resolved: Sidebar,
    /// Validated plugins (set after loading).
    #[serde(skip)]
    pub plugins_resolved: Vec<ResolvedPlugin>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Color mode of the default theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
    #[default]
    Auto,
}

/// Navbar link.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavLink {
    /// Link text.
    pub text: String,
    /// Link target (page path or external URL).
    pub link: String,
}

/// Theme configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Initial color mode.
    pub color_mode: ColorMode,
    /// Whether readers may switch the color mode.
    pub color_mode_switch: bool,
    /// Navbar links in display order.
    pub navbar: Vec<NavLink>,
    /// Sidebar groups in display order.
    pub sidebar: Vec<SidebarGroup>,
    /// Heading depth expanded below every sidebar page link.
    pub sidebar_depth: u8,
    /// Whether in-page anchor links scroll smoothly.
    pub smooth_scroll: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::default(),
            color_mode_switch: true,
            navbar: Vec::new(),
            sidebar: Vec::new(),
            sidebar_depth: 2,
            smooth_scroll: false,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    references: Option<ReferenceCheck>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Root directory that sidebar page references are relative to.
    pub source_dir: PathBuf,
    /// How missing sidebar pages are treated.
    pub references: ReferenceCheck,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`title`").
        field: String,
        /// Error message (e.g., "${`COURSE_TITLE`} not set").
        message: String,
    },
    /// Sidebar group without a label.
    #[error("Sidebar group #{index} has an empty label")]
    EmptyLabel { index: usize },
    /// Sidebar group without pages.
    #[error("Sidebar group {group:?} has no children")]
    EmptyGroup { group: String },
    /// Malformed page reference.
    #[error("Invalid page {page:?} in sidebar group {group:?}: {reason}")]
    InvalidPageRef {
        group: String,
        page: String,
        #[source]
        reason: PageRefError,
    },
    /// Two sidebar groups with the same label and children.
    #[error("Sidebar group {group:?} (#{second}) duplicates group #{first}")]
    DuplicateGroup {
        group: String,
        first: usize,
        second: usize,
    },
    /// Page reference that names no existing document.
    #[error("Page {page:?} in sidebar group {group:?} does not exist")]
    UnresolvedPage { group: String, page: String },
    /// Invalid plugin options.
    #[error("Plugin {name}: {message}")]
    Plugin { name: String, message: String },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl SiteConfig {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `syllabus.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::info!("No {CONFIG_FILENAME} found, using defaults");
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(references) = settings.references {
            self.docs_resolved.references = references;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            lang: "en-US".to_owned(),
            title: "Documentation".to_owned(),
            description: String::new(),
            base: "/".to_owned(),
            service_worker: false,
            theme: ThemeConfig::default(),
            plugins: Vec::new(),
            bundler: BundlerConfig::default(),
            docs: DocsConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                references: ReferenceCheck::default(),
            },
            sidebar_resolved: Sidebar::default(),
            plugins_resolved: Vec::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        config.resolve()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that site-level fields are set and well-formed. Sidebar and
    /// plugins are checked when they are resolved during loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.lang, "lang")?;
        require_non_empty(&self.title, "title")?;
        self.validate_base()?;
        self.validate_navbar()?;
        self.bundler.validate()?;
        Ok(())
    }

    fn validate_base(&self) -> Result<(), ConfigError> {
        if !self.base.starts_with('/') || !self.base.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base must start and end with '/', got {:?}",
                self.base
            )));
        }
        Ok(())
    }

    fn validate_navbar(&self) -> Result<(), ConfigError> {
        for (index, link) in self.theme.navbar.iter().enumerate() {
            require_non_empty(&link.text, &format!("theme.navbar[{index}].text"))?;
            require_non_empty(&link.link, &format!("theme.navbar[{index}].link"))?;
        }
        Ok(())
    }

    /// Build the sidebar tree and decode plugin options.
    fn resolve(&mut self) -> Result<(), ConfigError> {
        self.sidebar_resolved = Sidebar::build(&self.theme.sidebar, self.theme.sidebar_depth)?;
        self.plugins_resolved = plugins::resolve_plugins(&self.plugins)?;

        tracing::info!(
            groups = self.sidebar_resolved.groups().len(),
            plugins = self.plugins_resolved.len(),
            bundler = %self.bundler.name,
            "Configuration loaded"
        );
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.title = expand::expand_env(&self.title, "title")?;
        self.description = expand::expand_env(&self.description, "description")?;
        self.base = expand::expand_env(&self.base, "base")?;
        self.bundler.name = expand::expand_env(&self.bundler.name, "bundler.name")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            references: self.docs.references.unwrap_or_default(),
        };

        for plugin in &mut self.plugins {
            plugin.resolve_paths(config_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COURSE_TOML: &str = r#"
lang = "en-US"
title = "Full Stack Development"
description = "Course Full Stack Development"
service_worker = true

[theme]
color_mode = "light"
color_mode_switch = false
sidebar_depth = 0
smooth_scroll = true

[[theme.sidebar]]
text = "Development Tools"
children = ["/01_developmenttools/README.md"]

[[theme.sidebar]]
text = "Introduction"
children = [
    "/11_history_and_evolution/README.md",
    "/12_tcp_ip_stack/README.md",
]

[[plugins]]
name = "container"

[plugins.options]
type = "codeoutput"

[plugins.options.locales."/"]
default_info = "Output"

[[plugins]]
name = "register-components"
options = { components_dir = "components" }

[bundler]
name = "vite"
"#;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &SiteConfig, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default_with_base(Path::new("/test"));
        assert_eq!(config.lang, "en-US");
        assert_eq!(config.title, "Documentation");
        assert_eq!(config.base, "/");
        assert!(!config.service_worker);
        assert_eq!(config.theme.color_mode, ColorMode::Auto);
        assert!(config.theme.color_mode_switch);
        assert_eq!(config.theme.sidebar_depth, 2);
        assert_eq!(config.bundler.name, "vite");
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.references, ReferenceCheck::Error);
        assert!(config.sidebar_resolved.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.lang, "en-US");
        assert!(config.theme.sidebar.is_empty());
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_parse_course_config() {
        let config: SiteConfig = toml::from_str(COURSE_TOML).unwrap();

        assert_eq!(config.title, "Full Stack Development");
        assert_eq!(config.description, "Course Full Stack Development");
        assert!(config.service_worker);
        assert_eq!(config.theme.color_mode, ColorMode::Light);
        assert!(!config.theme.color_mode_switch);
        assert_eq!(config.theme.sidebar_depth, 0);
        assert!(config.theme.smooth_scroll);
        assert_eq!(config.theme.sidebar.len(), 2);
        assert_eq!(config.theme.sidebar[1].label, "Introduction");
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins[0].name, "container");
    }

    #[test]
    fn test_parse_navbar() {
        let toml = r#"
[[theme.navbar]]
text = "Guide"
link = "/01_developmenttools/README.md"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.theme.navbar,
            vec![NavLink {
                text: "Guide".to_owned(),
                link: "/01_developmenttools/README.md".to_owned(),
            }]
        );
    }

    #[test]
    fn test_parse_unknown_color_mode_fails() {
        let toml = r#"
[theme]
color_mode = "sepia"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "content"
references = "warn"

[[plugins]]
name = "register-components"
options = { components_dir = "components" }
"#;
        let mut config: SiteConfig = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/content")
        );
        assert_eq!(config.docs_resolved.references, ReferenceCheck::Warn);
        assert_eq!(
            config.plugins[0].options["components_dir"].as_str(),
            Some(
                Path::new("/project/components")
                    .display()
                    .to_string()
                    .as_str()
            )
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), COURSE_TOML);

        let config = SiteConfig::load(Some(path.as_path()), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("docs"));
        assert_eq!(config.sidebar_resolved.depth(), 0);
        let labels: Vec<_> = config
            .sidebar_resolved
            .groups()
            .iter()
            .map(NavGroup::label)
            .collect();
        assert_eq!(labels, vec!["Development Tools", "Introduction"]);
        assert_eq!(config.plugins_resolved.len(), 2);
    }

    #[test]
    fn test_load_demo_course() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/fullstack/syllabus.toml");

        let config = SiteConfig::load(Some(path.as_path()), None).unwrap();

        let labels: Vec<_> = config
            .sidebar_resolved
            .groups()
            .iter()
            .map(NavGroup::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Development Tools",
                "Introduction",
                "Frontend Webdesign",
                "Frontend Scripting",
                "Backend databases",
                "Backend Scripting",
                "Frontend Development",
                "Privacy regulations",
                "Deployment",
            ]
        );
        assert_eq!(config.sidebar_resolved.pages().count(), 36);
        assert!(config.sidebar_resolved.warnings().is_empty());
        assert_eq!(config.sidebar_resolved.depth(), 0);
        assert!(config.service_worker);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SiteConfig::load(Some(Path::new("/nonexistent/syllabus.toml")), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_empty_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[[theme.sidebar]]
label = "Privacy regulations"
children = []
"#,
        );

        let err = SiteConfig::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::EmptyGroup { .. }), "{err:?}");
        assert!(err.to_string().contains("Privacy regulations"));
    }

    #[test]
    fn test_load_rejects_invalid_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[[plugins]]
name = "container"
"#,
        );

        let err = SiteConfig::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::Plugin { .. }), "{err:?}");
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), COURSE_TOML);
        let settings = CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
            references: Some(ReferenceCheck::Off),
        };

        let config = SiteConfig::load(Some(path.as_path()), Some(&settings)).unwrap();

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/custom/docs")
        );
        assert_eq!(config.docs_resolved.references, ReferenceCheck::Off);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(config.docs_resolved.references, ReferenceCheck::Error);
    }

    #[test]
    fn test_expand_env_vars_title() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SYLLABUS_CONFIG_TEST_TITLE", "Web Course");
        }

        let toml = r#"
title = "${SYLLABUS_CONFIG_TEST_TITLE}"
description = "${SYLLABUS_CONFIG_TEST_UNSET_DESC:-No description}"
"#;
        let mut config: SiteConfig = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.title, "Web Course");
        assert_eq!(config.description, "No description");

        unsafe {
            std::env::remove_var("SYLLABUS_CONFIG_TEST_TITLE");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SYLLABUS_CONFIG_TEST_MISSING_BASE");
        }

        let toml = r#"
base = "${SYLLABUS_CONFIG_TEST_MISSING_BASE}"
"#;
        let mut config: SiteConfig = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("base"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = SiteConfig::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_lang_empty() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.lang = String::new();
        assert_validation_error(&config, &["lang", "empty"]);
    }

    #[test]
    fn test_validate_title_empty() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.title = "  ".to_owned();
        assert_validation_error(&config, &["title", "empty"]);
    }

    #[test]
    fn test_load_rejects_empty_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
title = ""

[[theme.sidebar]]
label = "Intro"
children = ["/a/README.md"]
"#,
        );

        let err = SiteConfig::load(Some(path.as_path()), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)), "{err:?}");
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_validate_base_without_slashes() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.base = "course".to_owned();
        assert_validation_error(&config, &["base", "course"]);
    }

    #[test]
    fn test_validate_base_with_subpath() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.base = "/fullstack/".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_navbar_empty_link() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.theme.navbar.push(NavLink {
            text: "Guide".to_owned(),
            link: String::new(),
        });
        assert_validation_error(&config, &["theme.navbar[0].link"]);
    }

    #[test]
    fn test_validate_bundler_name_empty() {
        let mut config = SiteConfig::default_with_base(Path::new("/test"));
        config.bundler.name = String::new();
        assert_validation_error(&config, &["bundler.name"]);
    }
}
