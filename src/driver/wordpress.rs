use super::basic::{static_file_in, BasicDriver};
use super::{prime_server_identity, Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::exists;
use std::path::{Path, PathBuf};

/// Classic WordPress installs with `wp-config.php` at the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordPressDriver;

impl Driver for WordPressDriver {
    fn name(&self) -> &str {
        "wordpress"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("wp-config.php")) || exists(&site.join("wp-config-sample.php"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        static_file_in(site, uri)
    }

    fn before_loading(&self, _site: &Path, _site_name: &str, uri: &str, ctx: &mut RequestContext) {
        prime_server_identity(uri, ctx);
    }

    fn front_controller_path(
        &self,
        site: &Path,
        site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        if let Some(redirect) = force_trailing_slash(uri, "/wp-admin") {
            return Some(redirect);
        }
        BasicDriver.front_controller_path(site, site_name, uri, ctx)
    }
}

/// The admin area only works with a trailing slash; redirect the bare path.
pub(crate) fn force_trailing_slash(uri: &str, admin_path: &str) -> Option<FrontController> {
    uri.ends_with(admin_path)
        .then(|| FrontController::Redirect(format!("{}/", uri)))
}
