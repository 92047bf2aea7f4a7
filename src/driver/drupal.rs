use super::concrete5::LEADING_SCRIPT;
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file, uri_extension};
use std::path::{Path, PathBuf};

/// Drupal 7 (`misc/drupal.js`) and 8+ (`core/lib/Drupal.php`), optionally under a
/// `docroot/`, `public/` or `web/` subdirectory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrupalDriver;

impl DrupalDriver {
    pub fn web_root(site: &Path) -> PathBuf {
        ["docroot", "public", "web"]
            .iter()
            .map(|dir| site.join(dir))
            .find(|candidate| exists(candidate))
            .unwrap_or_else(|| site.to_path_buf())
    }
}

impl Driver for DrupalDriver {
    fn name(&self) -> &str {
        "drupal"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        let root = Self::web_root(site);
        exists(&root.join("misc/drupal.js")) || exists(&root.join("core/lib/Drupal.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if uri_extension(uri) == Some("php") {
            return None;
        }
        let file = append(&Self::web_root(site), uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let root = Self::web_root(site);

        if ctx.query("q").is_none() && !uri.is_empty() && uri != "/" && !uri.contains("/jsonapi/") {
            ctx.set_query("q", uri);
        }

        if let Some(found) = LEADING_SCRIPT.find(uri) {
            let script = append(&root, found.as_str());
            if is_actual_file(&script) {
                ctx.set_script(&script, &root);
                return Some(FrontController::Script(script));
            }
        }

        let script = root.join("index.php");
        ctx.set_script(&script, &root);
        Some(FrontController::Script(script))
    }
}
