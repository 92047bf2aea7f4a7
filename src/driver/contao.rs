use super::{Driver, FrontController};
use crate::context::{RequestContext, SCRIPT_FILENAME, SCRIPT_NAME};
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Contao 4 on the Symfony `web/app.php` layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContaoDriver;

impl Driver for ContaoDriver {
    fn name(&self) -> &str {
        "contao"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("vendor/contao").is_dir() && exists(&site.join("web/app.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&site.join("web"), uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let web = site.join("web");
        if uri == "/install.php" {
            return Some(FrontController::Script(web.join("install.php")));
        }

        let front = if uri.starts_with("/app_dev.php") { "app_dev.php" } else { "app.php" };
        ctx.set_server(SCRIPT_NAME, format!("/{}", front));
        ctx.set_server(SCRIPT_FILENAME, site.join(front).to_string_lossy());
        Some(FrontController::Script(web.join(front)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with};
    use super::*;

    #[test]
    fn test_contao_front_controllers() {
        let site = site_with(&["vendor/contao/", "web/app.php", "web/app_dev.php", "web/install.php"]);
        assert!(ContaoDriver.serves(site.path(), "c", "/"));

        let (front_controller, ctx) = front(&ContaoDriver, site.path(), "/app_dev.php/news");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/app_dev.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/app_dev.php"));

        let (front_controller, _) = front(&ContaoDriver, site.path(), "/install.php");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/install.php"))));

        let (front_controller, _) = front(&ContaoDriver, site.path(), "/news");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/app.php"))));
    }
}
