use super::{Driver, FrontController};
use crate::context::{RequestContext, DOCUMENT_ROOT, SCRIPT_FILENAME, SCRIPT_NAME, SERVER_NAME};
use crate::paths::{exists, is_actual_file};
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Deployed static content is addressed as `static/version<deploy id>/...`.
static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version\d*/").expect("valid version regex"));

/// Remove deployment version segments so the file can be found on disk.
pub fn strip_versions(uri: &str) -> Cow<'_, str> {
    VERSION_SEGMENT.replace_all(uri, "")
}

/// Magento 2 with the `pub/` document root.
///
/// Missing files under `static/` are materialized by `pub/static.php` (given the
/// resource path) and missing media by `pub/get.php`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Magento2Driver;

impl Driver for Magento2Driver {
    fn name(&self) -> &str {
        "magento2"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("bin/magento")) && exists(&site.join("pub/index.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let uri = strip_versions(uri);
        let route = uri.trim_start_matches('/');
        if route.is_empty() || route.starts_with("setup/") {
            return None;
        }
        let file = site.join("pub").join(route);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let uri = strip_versions(uri);
        let route = uri.trim_start_matches('/');
        let public = site.join("pub");

        let host = ctx.server_name().to_string();
        ctx.set_server(SERVER_NAME, host);

        let (script, script_name) = if let Some(resource) = route.strip_prefix("static/") {
            ctx.set_query("resource", resource);
            (public.join("static.php"), "/static.php")
        } else if route.starts_with("media/") {
            (public.join("get.php"), "/get.php")
        } else if route == "setup" || route.starts_with("setup/") {
            (site.join("setup/index.php"), "/setup/index.php")
        } else {
            (public.join("index.php"), "/index.php")
        };

        ctx.set_server(SCRIPT_FILENAME, script.to_string_lossy());
        ctx.set_server(SCRIPT_NAME, script_name);
        ctx.set_server(DOCUMENT_ROOT, site.to_string_lossy());
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;

    fn magento_site() -> tempfile::TempDir {
        site_with(&[
            "bin/magento",
            "pub/index.php",
            "pub/static.php",
            "pub/get.php",
            "pub/static/frontend/Magento/luma/en_US/css/styles-m.css",
        ])
    }

    #[test]
    fn test_strip_versions() {
        assert_eq!(
            strip_versions("/static/version1700000000/frontend/x.css"),
            "/static/frontend/x.css"
        );
        assert_eq!(strip_versions("/static/frontend/x.css"), "/static/frontend/x.css");
    }

    #[test]
    fn test_versioned_static_files_resolve() {
        let site = magento_site();
        assert!(Magento2Driver.serves(site.path(), "m", "/"));

        assert_eq!(
            static_file(
                &Magento2Driver,
                site.path(),
                "/static/version1700000000/frontend/Magento/luma/en_US/css/styles-m.css"
            ),
            Some(site.path().join("pub/static/frontend/Magento/luma/en_US/css/styles-m.css"))
        );
    }

    #[test]
    fn test_missing_static_is_generated() {
        let site = magento_site();
        let (front_controller, ctx) = front(
            &Magento2Driver,
            site.path(),
            "/static/version1/frontend/Magento/luma/en_US/js/app.js",
        );

        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("pub/static.php"))));
        assert_eq!(ctx.query("resource"), Some("frontend/Magento/luma/en_US/js/app.js"));
    }

    #[test]
    fn test_media_and_pages() {
        let site = magento_site();

        let (front_controller, _) = front(&Magento2Driver, site.path(), "/media/catalog/product/a.jpg");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("pub/get.php"))));

        let (front_controller, ctx) = front(&Magento2Driver, site.path(), "/women/tops.html");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("pub/index.php"))));
        assert_eq!(ctx.server(DOCUMENT_ROOT), Some(site.path().to_str().unwrap()));
    }
}
