//! Site manifest handed to the site framework.
//!
//! The manifest uses the framework's camelCase option names
//! (`sidebarDepth`, `colorModeSwitch`, `serviceWorker`).

use serde::Serialize;
use syllabus_config::{BundlerConfig, ColorMode, NavGroup, NavLink, ResolvedPlugin, SiteConfig};

/// Validated site configuration in the shape the framework consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteManifest<'a> {
    lang: &'a str,
    title: &'a str,
    description: &'a str,
    base: &'a str,
    service_worker: bool,
    theme: ThemeManifest<'a>,
    plugins: &'a [ResolvedPlugin],
    bundler: &'a BundlerConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemeManifest<'a> {
    color_mode: ColorMode,
    color_mode_switch: bool,
    navbar: &'a [NavLink],
    sidebar: &'a [NavGroup],
    sidebar_depth: u8,
    smooth_scroll: bool,
}

impl<'a> SiteManifest<'a> {
    pub(crate) fn new(config: &'a SiteConfig) -> Self {
        Self {
            lang: &config.lang,
            title: &config.title,
            description: &config.description,
            base: &config.base,
            service_worker: config.service_worker,
            theme: ThemeManifest {
                color_mode: config.theme.color_mode,
                color_mode_switch: config.theme.color_mode_switch,
                navbar: &config.theme.navbar,
                sidebar: config.sidebar_resolved.groups(),
                sidebar_depth: config.sidebar_resolved.depth(),
                smooth_scroll: config.theme.smooth_scroll,
            },
            plugins: &config.plugins_resolved,
            bundler: &config.bundler,
        }
    }
}
