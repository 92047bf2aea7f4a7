use super::basic::first_script;
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Symfony, both the `web/app.php` layout and the Flex `public/index.php` one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymfonyDriver;

impl Driver for SymfonyDriver {
    fn name(&self) -> &str {
        "symfony"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        let legacy = (exists(&site.join("web/app_dev.php")) || exists(&site.join("web/app.php")))
            && exists(&site.join("app/AppKernel.php"));
        let flex = exists(&site.join("public/index.php")) && exists(&site.join("src/Kernel.php"));
        legacy || flex
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        ["web", "public"]
            .into_iter()
            .map(|dir| append(&site.join(dir), uri))
            .find(|file| is_actual_file(file))
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        _uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let web = site.join("web");
        let public = site.join("public");
        let candidates = [
            (web.join("app_dev.php"), web.clone()),
            (web.join("app.php"), web),
            (public.join("index.php"), public),
        ];
        first_script(candidates, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;
    use crate::context::SCRIPT_NAME;

    #[test]
    fn test_symfony_flex() {
        let site = site_with(&["public/index.php", "src/Kernel.php", "public/build/app.js"]);
        assert!(SymfonyDriver.serves(site.path(), "s", "/"));

        assert_eq!(
            static_file(&SymfonyDriver, site.path(), "/build/app.js"),
            Some(site.path().join("public/build/app.js"))
        );
        let (front_controller, ctx) = front(&SymfonyDriver, site.path(), "/blog/1");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("public/index.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/index.php"));
    }

    #[test]
    fn test_symfony_legacy_prefers_dev_controller() {
        let site = site_with(&["web/app.php", "web/app_dev.php", "app/AppKernel.php"]);
        assert!(SymfonyDriver.serves(site.path(), "s", "/"));

        let (front_controller, _) = front(&SymfonyDriver, site.path(), "/");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/app_dev.php"))));
    }

    #[test]
    fn test_kernel_alone_is_not_symfony() {
        let site = site_with(&["src/Kernel.php"]);
        assert!(!SymfonyDriver.serves(site.path(), "s", "/"));
    }
}
