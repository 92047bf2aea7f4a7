use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file, uri_extension};
use std::path::{Path, PathBuf};

/// Site folders ProcessWire never exposes directly.
const PRIVATE_PREFIXES: &[&str] = &[
    "/site/assets/cache/",
    "/site/assets/logs/",
    "/site/assets/backups/",
    "/site/assets/sessions/",
    "/site/config.php",
    "/site/install/",
    "/wire/config.php",
];

/// ProcessWire CMS. Page URLs reach `index.php` through the `it` parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessWireDriver;

impl Driver for ProcessWireDriver {
    fn name(&self) -> &str {
        "processwire"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("wire/core/ProcessWire.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if PRIVATE_PREFIXES.iter().any(|prefix| uri.starts_with(prefix)) || uri_extension(uri) == Some("php") {
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
        if PRIVATE_PREFIXES.iter().any(|prefix| uri.starts_with(prefix)) {
            return Some(FrontController::Forbidden);
        }
        ctx.set_query("it", uri.trim_start_matches('/'));

        let script = site.join("index.php");
        ctx.set_script(&script, site);
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;

    #[test]
    fn test_processwire_routing() {
        let site = site_with(&["wire/core/ProcessWire.php", "index.php", "site/config.php", "site/templates/styles/main.css"]);
        assert!(ProcessWireDriver.serves(site.path(), "p", "/"));

        assert_eq!(static_file(&ProcessWireDriver, site.path(), "/site/config.php"), None);
        assert_eq!(
            static_file(&ProcessWireDriver, site.path(), "/site/templates/styles/main.css"),
            Some(site.path().join("site/templates/styles/main.css"))
        );

        let (front_controller, _) = front(&ProcessWireDriver, site.path(), "/site/config.php");
        assert_eq!(front_controller, Some(FrontController::Forbidden));

        let (front_controller, ctx) = front(&ProcessWireDriver, site.path(), "/about/team/");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("index.php"))));
        assert_eq!(ctx.query("it"), Some("about/team/"));
    }
}
