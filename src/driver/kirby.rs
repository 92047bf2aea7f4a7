use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, is_actual_file};
use std::path::{Path, PathBuf};

/// Kirby CMS, with or without a public folder, and the legacy `panel/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KirbyDriver;

impl Driver for KirbyDriver {
    fn name(&self) -> &str {
        "kirby"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("kirby").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(site, uri);
        if is_actual_file(&file) {
            return Some(file);
        }
        let public = site.join("public");
        if public.is_dir() {
            let file = append(&public, uri);
            if is_actual_file(&file) {
                return Some(file);
            }
        }
        None
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let public_index = site.join("public/index.php");
        let above_webroot = is_actual_file(&public_index);

        let (mut script, mut doc_root) = if above_webroot {
            (public_index, site.join("public"))
        } else {
            (site.join("index.php"), site.to_path_buf())
        };

        let panel = site.join("panel/index.php");
        if uri.starts_with("/panel") && is_actual_file(&panel) {
            script = panel;
            doc_root = site.to_path_buf();
        }

        ctx.set_script(&script, &doc_root);
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;
    use crate::context::{DOCUMENT_ROOT, SCRIPT_NAME};

    #[test]
    fn test_kirby_public_folder_setup() {
        let site = site_with(&["kirby/", "public/index.php", "public/assets/app.css"]);

        assert_eq!(
            static_file(&KirbyDriver, site.path(), "/assets/app.css"),
            Some(site.path().join("public/assets/app.css"))
        );

        let (front_controller, ctx) = front(&KirbyDriver, site.path(), "/projects");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("public/index.php"))));
        assert_eq!(ctx.server(DOCUMENT_ROOT), Some(site.path().join("public").to_str().unwrap()));
    }

    #[test]
    fn test_kirby_legacy_panel() {
        let site = site_with(&["kirby/", "index.php", "panel/index.php"]);

        let (front_controller, ctx) = front(&KirbyDriver, site.path(), "/panel/pages");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("panel/index.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/panel/index.php"));

        let (front_controller, _) = front(&KirbyDriver, site.path(), "/about");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("index.php"))));
    }
}
