//! Sidebar navigation model.
//!
//! Turns the `[[theme.sidebar]]` groups of `syllabus.toml` into a validated
//! [`Sidebar`] tree for the external renderer.
//!
//! # Validation
//!
//! - every group has a non-empty label and at least one child
//! - every child is a well-formed [`PageRef`] (relative path to a `.md` file)
//! - no two groups are identical (same label and same ordered children,
//!   compared relative to the docs root)
//!
//! A page listed in more than one place is accepted but reported as a
//! [`SidebarWarning::DuplicatePage`].
//!
//! Building a sidebar never touches the filesystem. Whether pages exist is
//! checked separately through a [`DocumentIndex`], see
//! [`Sidebar::check_references`].
//!
//! # Example
//!
//! ```
//! use syllabus_config::{Sidebar, SidebarGroup};
//!
//! let groups = vec![SidebarGroup {
//!     label: "Intro".to_owned(),
//!     children: vec!["/a/README.md".to_owned()],
//! }];
//! let sidebar = Sidebar::build(&groups, 0).unwrap();
//!
//! assert_eq!(sidebar.groups()[0].label(), "Intro");
//! assert_eq!(sidebar.groups()[0].children()[0].as_str(), "/a/README.md");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// File suffix every content page must carry.
pub const CONTENT_SUFFIX: &str = ".md";

/// Deepest heading level the renderer may expand below a page link.
pub const MAX_SIDEBAR_DEPTH: u8 = 5;

/// Reason a page reference was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PageRefError {
    #[error("path is empty")]
    Empty,
    #[error("path contains an empty segment")]
    EmptySegment,
    #[error("path contains a `{0}` segment")]
    DotSegment(String),
    #[error("path contains a backslash")]
    Backslash,
    #[error("path must name a `.md` file")]
    MissingSuffix,
}

/// Reference to a content document, relative to the docs source directory.
///
/// A single leading `/` is allowed and denotes the docs root
/// (`/intro/README.md` and `intro/README.md` name the same file).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageRef(String);

impl PageRef {
    /// Parse and validate a page reference.
    pub fn parse(path: &str) -> Result<Self, PageRefError> {
        if path.is_empty() {
            return Err(PageRefError::Empty);
        }
        if path.contains('\\') {
            return Err(PageRefError::Backslash);
        }

        let body = path.strip_prefix('/').unwrap_or(path);
        for segment in body.split('/') {
            match segment {
                "" => return Err(PageRefError::EmptySegment),
                "." | ".." => return Err(PageRefError::DotSegment(segment.to_owned())),
                _ => {}
            }
        }

        let file_name = body.rsplit('/').next().unwrap_or(body);
        if file_name.len() <= CONTENT_SUFFIX.len() || !file_name.ends_with(CONTENT_SUFFIX) {
            return Err(PageRefError::MissingSuffix);
        }

        Ok(Self(path.to_owned()))
    }

    /// The reference exactly as written in the configuration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path relative to the docs root, without the leading `/`.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        self.0.strip_prefix('/').unwrap_or(&self.0)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sidebar group as written in the configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SidebarGroup {
    /// Display label. Accepts `text` as an alias.
    #[serde(alias = "text")]
    pub label: String,
    /// Page references in display order.
    #[serde(default)]
    pub children: Vec<String>,
}

/// Validated sidebar group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    #[serde(rename = "text")]
    label: String,
    children: Vec<PageRef>,
}

impl NavGroup {
    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pages in display order. Never empty.
    #[must_use]
    pub fn children(&self) -> &[PageRef] {
        &self.children
    }
}

/// Non-fatal finding about the sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SidebarWarning {
    /// The same page is listed more than once.
    DuplicatePage {
        page: PageRef,
        first_group: String,
        group: String,
    },
    /// The page does not name an existing document.
    UnresolvedPage { page: PageRef, group: String },
}

impl fmt::Display for SidebarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePage {
                page,
                first_group,
                group,
            } => write!(
                f,
                "page {page} in group {group:?} is already listed in group {first_group:?}"
            ),
            Self::UnresolvedPage { page, group } => {
                write!(f, "page {page} in group {group:?} does not exist")
            }
        }
    }
}

/// How missing documents are treated by [`Sidebar::check_references`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceCheck {
    /// Do not look documents up.
    Off,
    /// Report missing documents as warnings.
    Warn,
    /// Fail on the first missing document.
    #[default]
    Error,
}

impl FromStr for ReferenceCheck {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::Validation(format!(
                "unknown reference check mode {other:?} (expected off, warn or error)"
            ))),
        }
    }
}

impl fmt::Display for ReferenceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Lookup of existing content documents.
pub trait DocumentIndex {
    /// Whether `page` names an existing document.
    fn contains(&self, page: &PageRef) -> bool;
}

/// Set of document paths relative to the docs root (`intro/README.md`).
impl<S: BuildHasher> DocumentIndex for HashSet<String, S> {
    fn contains(&self, page: &PageRef) -> bool {
        HashSet::contains(self, page.relative_path())
    }
}

/// Validated sidebar tree.
///
/// Group order and child order are exactly the configured order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    depth: u8,
    groups: Vec<NavGroup>,
    #[serde(skip)]
    warnings: Vec<SidebarWarning>,
}

impl Sidebar {
    /// Validate `groups` and apply `depth` to the whole tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending group when a label is
    /// empty, a group has no children, a page reference is malformed, two
    /// groups are identical, or `depth` exceeds [`MAX_SIDEBAR_DEPTH`].
    pub fn build(groups: &[SidebarGroup], depth: u8) -> Result<Self, ConfigError> {
        if depth > MAX_SIDEBAR_DEPTH {
            return Err(ConfigError::Validation(format!(
                "theme.sidebar_depth cannot exceed {MAX_SIDEBAR_DEPTH}"
            )));
        }

        let mut resolved = Vec::with_capacity(groups.len());
        // Keyed on docs-root-relative paths so `/a.md` and `a.md` compare equal.
        let mut seen_groups: HashMap<(&str, Vec<&str>), usize> = HashMap::new();
        let mut seen_pages: HashMap<&str, &str> = HashMap::new();
        let mut warnings = Vec::new();

        for (index, group) in groups.iter().enumerate() {
            if group.label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel { index });
            }
            if group.children.is_empty() {
                return Err(ConfigError::EmptyGroup {
                    group: group.label.clone(),
                });
            }

            let children = group
                .children
                .iter()
                .map(|child| {
                    PageRef::parse(child).map_err(|reason| ConfigError::InvalidPageRef {
                        group: group.label.clone(),
                        page: child.clone(),
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let relative: Vec<&str> = group
                .children
                .iter()
                .map(|child| child.strip_prefix('/').unwrap_or(child))
                .collect();

            if let Some(&first) = seen_groups.get(&(group.label.as_str(), relative.clone())) {
                return Err(ConfigError::DuplicateGroup {
                    group: group.label.clone(),
                    first,
                    second: index,
                });
            }

            for (page, &path) in children.iter().zip(&relative) {
                if let Some(first_group) = seen_pages.get(path) {
                    tracing::warn!(
                        page = %page,
                        group = %group.label,
                        first_group = %first_group,
                        "Page listed in more than one sidebar position"
                    );
                    warnings.push(SidebarWarning::DuplicatePage {
                        page: page.clone(),
                        first_group: (*first_group).to_owned(),
                        group: group.label.clone(),
                    });
                } else {
                    seen_pages.insert(path, group.label.as_str());
                }
            }
            seen_groups.insert((group.label.as_str(), relative), index);

            resolved.push(NavGroup {
                label: group.label.clone(),
                children,
            });
        }

        tracing::debug!(
            groups = resolved.len(),
            depth,
            warnings = warnings.len(),
            "Sidebar validated"
        );

        Ok(Self {
            depth,
            groups: resolved,
            warnings,
        })
    }

    /// Heading depth the renderer expands below every page link.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[NavGroup] {
        &self.groups
    }

    /// Warnings collected while building.
    #[must_use]
    pub fn warnings(&self) -> &[SidebarWarning] {
        &self.warnings
    }

    /// All `(group label, page)` pairs in display order.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &PageRef)> {
        self.groups.iter().flat_map(|group| {
            group
                .children
                .iter()
                .map(move |page| (group.label.as_str(), page))
        })
    }

    /// Whether the sidebar has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Check that every page names an existing document.
    ///
    /// Returns one warning per missing page in [`ReferenceCheck::Warn`] mode
    /// and nothing in [`ReferenceCheck::Off`] mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedPage`] for the first missing page in
    /// [`ReferenceCheck::Error`] mode.
    pub fn check_references(
        &self,
        index: &dyn DocumentIndex,
        mode: ReferenceCheck,
    ) -> Result<Vec<SidebarWarning>, ConfigError> {
        if mode == ReferenceCheck::Off {
            return Ok(Vec::new());
        }

        let mut warnings = Vec::new();
        for (group, page) in self.pages() {
            if index.contains(page) {
                continue;
            }
            if mode == ReferenceCheck::Error {
                return Err(ConfigError::UnresolvedPage {
                    group: group.to_owned(),
                    page: page.as_str().to_owned(),
                });
            }
            tracing::warn!(page = %page, group = %group, "Sidebar page does not exist");
            warnings.push(SidebarWarning::UnresolvedPage {
                page: page.clone(),
                group: group.to_owned(),
            });
        }

        Ok(warnings)
    }
}
