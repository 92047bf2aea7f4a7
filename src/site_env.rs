//! Per-site environment overrides read from `<site>/.parkgate-env.toml`.
//!
//! ```toml
//! ["*"]
//! APP_DEBUG = true
//!
//! [shop]
//! APP_URL = "http://shop.test"
//! ```
//!
//! `*` applies to every site served from the directory; a table named after the site
//! overrides it key by key.

use crate::context::RequestContext;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const SITE_ENV_FILE: &str = ".parkgate-env.toml";

const EVERY_SITE: &str = "*";

#[derive(Debug, Error)]
pub enum SiteEnvError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse `{0}`")]
    Parse(PathBuf, #[source] toml::de::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnvValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<EnvValue> for String {
    fn from(value: EnvValue) -> Self {
        match value {
            EnvValue::Text(text) => text,
            EnvValue::Integer(n) => n.to_string(),
            EnvValue::Float(n) => n.to_string(),
            EnvValue::Bool(b) => b.to_string(),
        }
    }
}

/// Environment entries that apply to `site_name`, or an empty map when the site has
/// no environment file.
pub fn load(site: &Path, site_name: &str) -> Result<BTreeMap<String, String>, SiteEnvError> {
    let path = site.join(SITE_ENV_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(SiteEnvError::Io(path, e)),
    };

    let mut tables: BTreeMap<String, BTreeMap<String, EnvValue>> =
        toml::from_str(&content).map_err(|e| SiteEnvError::Parse(path, e))?;

    let mut env = BTreeMap::new();
    for key in [EVERY_SITE, site_name] {
        if let Some(table) = tables.remove(key) {
            env.extend(table.into_iter().map(|(name, value)| (name, String::from(value))));
        }
    }
    Ok(env)
}

/// Merge the site's environment file into the context. Broken files are logged and
/// skipped.
pub fn apply(site: &Path, site_name: &str, ctx: &mut RequestContext) {
    match load(site, site_name) {
        Ok(env) => {
            for (key, value) in env {
                ctx.set_env(&key, value);
            }
        }
        Err(e) => warn!(site = %site_name, error = %e, "Ignoring site environment file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_named_table_overrides_wildcard() {
        let site = tempfile::tempdir().unwrap();
        fs::write(
            site.path().join(SITE_ENV_FILE),
            r#"
["*"]
APP_DEBUG = true
APP_URL = "http://example.test"

[shop]
APP_URL = "http://shop.test"
WORKERS = 4

[blog]
APP_URL = "http://blog.test"
"#,
        )
        .unwrap();

        let env = load(site.path(), "shop").unwrap();
        assert_eq!(env.get("APP_DEBUG").map(String::as_str), Some("true"));
        assert_eq!(env.get("APP_URL").map(String::as_str), Some("http://shop.test"));
        assert_eq!(env.get("WORKERS").map(String::as_str), Some("4"));

        let env = load(site.path(), "other").unwrap();
        assert_eq!(env.get("APP_URL").map(String::as_str), Some("http://example.test"));
        assert!(!env.contains_key("WORKERS"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let site = tempfile::tempdir().unwrap();
        assert!(load(site.path(), "shop").unwrap().is_empty());
    }

    #[test]
    fn test_broken_file_is_ignored_by_apply() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(SITE_ENV_FILE), "[shop\nAPP_URL = ").unwrap();

        assert!(matches!(load(site.path(), "shop"), Err(SiteEnvError::Parse(..))));

        let mut ctx = RequestContext::new("shop.test", "GET", "/");
        apply(site.path(), "shop", &mut ctx);
        assert!(ctx.env_vars().is_empty());
    }
}
