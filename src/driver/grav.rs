use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Paths Grav's shipped server configs refuse to serve.
static GRAV_PRIVATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/(\.git|cache|bin|logs|backup|tests)/",
        r"^/(system|vendor)/.*\.(txt|xml|md|html|json|yaml|yml|php|pl|py|cgi|twig|sh|bat)$",
        r"^/user/.*\.(txt|md|json|yaml|yml|php|pl|py|cgi|twig|sh|bat)$",
        r"^/(LICENSE\.txt|composer\.lock|composer\.json|nginx\.conf|web\.config|htaccess\.txt|\.htaccess)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid grav pattern"))
    .collect()
});

fn is_private(uri: &str) -> bool {
    GRAV_PRIVATE.iter().any(|pattern| pattern.is_match(uri))
}

/// Grav flat-file CMS.
#[derive(Debug, Default, Clone, Copy)]
pub struct GravDriver;

impl Driver for GravDriver {
    fn name(&self) -> &str {
        "grav"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("system/defines.php")) && site.join("user").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if is_private(uri) {
            return None;
        }
        let file = append(site, uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        if is_private(uri) {
            return Some(FrontController::Forbidden);
        }
        let script = site.join("index.php");
        ctx.set_script(&script, site);
        Some(FrontController::Script(script))
    }
}
