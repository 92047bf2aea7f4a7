use super::{Driver, FrontController};
use crate::context::{RequestContext, PHP_SELF};
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// CakePHP: `bin/cake` console and a `webroot/` document root.
#[derive(Debug, Default, Clone, Copy)]
pub struct CakeDriver;

impl Driver for CakeDriver {
    fn name(&self) -> &str {
        "cake"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("bin/cake"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&site.join("webroot"), uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        _uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let webroot = site.join("webroot");
        let script = webroot.join("index.php");
        ctx.set_script(&script, &webroot);
        ctx.set_server(PHP_SELF, "/index.php");
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;
    use crate::context::{DOCUMENT_ROOT, SCRIPT_NAME};

    #[test]
    fn test_cake_webroot() {
        let site = site_with(&["bin/cake", "webroot/index.php", "webroot/css/cake.css"]);

        assert!(CakeDriver.serves(site.path(), "c", "/"));
        assert_eq!(
            static_file(&CakeDriver, site.path(), "/css/cake.css"),
            Some(site.path().join("webroot/css/cake.css"))
        );

        let (front_controller, ctx) = front(&CakeDriver, site.path(), "/articles/view/1");
        assert_eq!(
            front_controller,
            Some(FrontController::Script(site.path().join("webroot/index.php")))
        );
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/index.php"));
        assert_eq!(ctx.server(PHP_SELF), Some("/index.php"));
        assert_eq!(ctx.server(DOCUMENT_ROOT), Some(site.path().join("webroot").to_str().unwrap()));
    }
}
