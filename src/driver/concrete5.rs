use super::basic::static_file_in;
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Leading `/<name>.php` of a URI, as used by the CMSs that route through named
/// scripts (`/index.php/path`, `/update.php?...`).
pub(crate) static LEADING_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(.*?)\.php").expect("valid script regex"));

/// Concrete CMS (formerly concrete5).
#[derive(Debug, Default, Clone, Copy)]
pub struct Concrete5Driver;

impl Driver for Concrete5Driver {
    fn name(&self) -> &str {
        "concrete5"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("concrete/dispatcher.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if uri.to_ascii_lowercase().starts_with("/application/files") {
            let file = append(site, uri);
            return is_actual_file(&file).then_some(file);
        }
        static_file_in(site, uri)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        ctx.set_env_default("CONCRETE5_ENV", "local");

        if let Some(found) = LEADING_SCRIPT.find(uri) {
            let script = append(site, found.as_str());
            if is_actual_file(&script) {
                ctx.set_script(&script, site);
                return Some(FrontController::Script(script));
            }
        }

        let script = site.join("index.php");
        ctx.set_script(&script, site);
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;
    use crate::context::SCRIPT_NAME;

    #[test]
    fn test_concrete5_scripts_and_files() {
        let site = site_with(&["concrete/dispatcher.php", "index.php", "application/files/a/b.jpg"]);

        assert!(Concrete5Driver.serves(site.path(), "c", "/"));
        assert_eq!(
            static_file(&Concrete5Driver, site.path(), "/application/files/a/b.jpg"),
            Some(site.path().join("application/files/a/b.jpg"))
        );

        let (front_controller, ctx) = front(&Concrete5Driver, site.path(), "/index.php/dashboard");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("index.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/index.php"));
        assert_eq!(ctx.env("CONCRETE5_ENV"), Some("local"));

        let (front_controller, _) = front(&Concrete5Driver, site.path(), "/missing.php");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("index.php"))));
    }

    #[test]
    fn test_concrete5_uploads_must_be_real_files() {
        let site = site_with(&["concrete/dispatcher.php", "index.php", "application/files/a/b.jpg"]);

        assert_eq!(static_file(&Concrete5Driver, site.path(), "/application/files/nope.jpg"), None);
        assert_eq!(static_file(&Concrete5Driver, site.path(), "/application/files"), None);
        assert_eq!(static_file(&Concrete5Driver, site.path(), "/application/files/a"), None);
    }
}
