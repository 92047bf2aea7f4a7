//! Drivers described in TOML instead of code.
//!
//! They cover user drivers dropped into the extension directory and a project's own
//! `parkgate-driver.toml`:
//!
//! ```toml
//! name = "legacy-app"
//! uri_prefix = ""
//! static_roots = ["htdocs", "assets"]
//! document_root = "htdocs"
//! front_controller = "htdocs/app.php"
//!
//! [serves]
//! files = ["htdocs/app.php"]
//! directories = ["lib"]
//! file_contains = [{ path = "composer.json", needle = "acme/legacy" }]
//!
//! [env]
//! APP_ENV = "local"
//! ```

use super::basic::{front_controller_in, static_file_in};
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{exists, has_parent_segment, is_actual_file, trim_trailing_slash};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name of a project's own driver definition.
pub const SITE_DRIVER_FILE: &str = "parkgate-driver.toml";

#[derive(Debug, Error)]
pub enum DriverLoadError {
    #[error("failed to read driver definition `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse driver definition `{0}`")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid driver definition `{path}`: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Conditions that must all hold for the driver to serve a site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServesRule {
    /// Paths (relative to the site) that must exist.
    #[serde(default)]
    pub files: Vec<String>,

    /// Paths that must be directories.
    #[serde(default)]
    pub directories: Vec<String>,

    #[serde(default)]
    pub file_contains: Vec<ContainsRule>,
}

impl ServesRule {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty() && self.file_contains.is_empty()
    }

    fn paths(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .chain(&self.directories)
            .map(String::as_str)
            .chain(self.file_contains.iter().map(|rule| rule.path.as_str()))
    }
}

/// A file that must contain `needle`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainsRule {
    pub path: String,
    pub needle: String,
}

/// The deserialized form of a declarative driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverDefinition {
    pub name: String,

    #[serde(default)]
    pub serves: ServesRule,

    /// Prepended to every request URI (e.g. `/dist`).
    pub uri_prefix: Option<String>,

    /// Directories searched in order for static files. Defaults to the document root.
    #[serde(default)]
    pub static_roots: Vec<String>,

    /// Document root relative to the site (default: the site itself).
    pub document_root: Option<String>,

    /// Bootstrap script relative to the site. Without one, the generic candidate
    /// search runs inside the document root.
    pub front_controller: Option<String>,

    /// Environment defaults for the executed script.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl DriverDefinition {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }

        let relative = self
            .serves
            .paths()
            .chain(self.static_roots.iter().map(String::as_str))
            .chain(self.document_root.as_deref())
            .chain(self.front_controller.as_deref());
        for path in relative {
            if has_parent_segment(path) {
                return Err(format!("path `{}` escapes the site directory", path));
            }
        }

        if let Some(prefix) = &self.uri_prefix {
            if !prefix.is_empty() && !prefix.starts_with('/') {
                return Err(format!("uri_prefix `{}` must start with `/`", prefix));
            }
        }
        Ok(())
    }
}

/// Resolve a definition path against the site. Empty and `.` mean the site itself.
fn site_path(site: &Path, relative: &str) -> PathBuf {
    match relative.trim_matches('/') {
        "" | "." => site.to_path_buf(),
        relative => site.join(relative),
    }
}

/// A driver built from a [`DriverDefinition`].
#[derive(Debug, Clone)]
pub struct DeclarativeDriver {
    definition: DriverDefinition,
}

impl DeclarativeDriver {
    pub fn new(definition: DriverDefinition) -> Result<Self, String> {
        definition.validate()?;
        Ok(Self { definition })
    }

    pub fn definition(&self) -> &DriverDefinition {
        &self.definition
    }

    /// Parse and validate a single definition file.
    pub fn from_file(path: &Path) -> Result<Self, DriverLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| DriverLoadError::Io(path.to_path_buf(), e))?;
        let definition: DriverDefinition =
            toml::from_str(&content).map_err(|e| DriverLoadError::Parse(path.to_path_buf(), e))?;
        Self::new(definition).map_err(|reason| DriverLoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// The project's own driver, if `<site>/parkgate-driver.toml` exists.
    pub fn for_site(site: &Path) -> Result<Option<Self>, DriverLoadError> {
        let path = site.join(SITE_DRIVER_FILE);
        if !is_actual_file(&path) {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    fn document_root(&self, site: &Path) -> PathBuf {
        site_path(site, self.definition.document_root.as_deref().unwrap_or(""))
    }
}

/// Load every `*.toml` definition in `dir`, sorted by file name.
///
/// A missing directory yields no drivers. Extension drivers must name at least one
/// `serves` condition, since an unconditional one would shadow every built-in.
pub fn load_dir(dir: &Path) -> Result<Vec<DeclarativeDriver>, DriverLoadError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "No extension driver directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DriverLoadError::Io(dir.to_path_buf(), e)),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml") && is_actual_file(path))
        .collect();
    files.sort();

    let mut drivers = Vec::with_capacity(files.len());
    for path in files {
        let driver = DeclarativeDriver::from_file(&path)?;
        if driver.definition.serves.is_empty() {
            return Err(DriverLoadError::Invalid {
                path,
                reason: "at least one `serves` condition is required".to_string(),
            });
        }
        info!(driver = %driver.definition.name, path = %path.display(), "Loaded extension driver");
        drivers.push(driver);
    }
    Ok(drivers)
}

impl Driver for DeclarativeDriver {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        let rule = &self.definition.serves;

        rule.files.iter().all(|file| exists(&site_path(site, file)))
            && rule.directories.iter().all(|dir| site_path(site, dir).is_dir())
            && rule.file_contains.iter().all(|contains| {
                std::fs::read_to_string(site_path(site, &contains.path))
                    .map(|content| content.contains(&contains.needle))
                    .unwrap_or(false)
            })
    }

    fn mutate_uri<'a>(&self, uri: &'a str) -> Cow<'a, str> {
        match self.definition.uri_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                Cow::Owned(trim_trailing_slash(&format!("{}{}", prefix, uri)).to_string())
            }
            _ => Cow::Borrowed(uri),
        }
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if self.definition.static_roots.is_empty() {
            return static_file_in(&self.document_root(site), uri);
        }
        self.definition
            .static_roots
            .iter()
            .find_map(|root| static_file_in(&site_path(site, root), uri))
    }

    fn before_loading(&self, _site: &Path, _site_name: &str, _uri: &str, ctx: &mut RequestContext) {
        for (key, value) in &self.definition.env {
            ctx.set_env_default(key, value.as_str());
        }
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let doc_root = self.document_root(site);
        match self.definition.front_controller.as_deref() {
            Some(script) => {
                let script = site_path(site, script);
                if !is_actual_file(&script) {
                    return None;
                }
                ctx.set_script(&script, &doc_root);
                Some(FrontController::Script(script))
            }
            None => front_controller_in(&doc_root, uri, ctx),
        }
    }
}
