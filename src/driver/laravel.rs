use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Laravel applications: `artisan` at the root and `public/index.php`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaravelDriver;

impl LaravelDriver {
    /// `/storage/...` maps onto the public storage disk.
    pub(crate) fn storage_file(site: &Path, uri: &str) -> Option<PathBuf> {
        let storage_uri = uri.strip_prefix("/storage").filter(|rest| rest.starts_with('/')).unwrap_or(uri);
        let file = append(&site.join("storage/app/public"), storage_uri);
        is_actual_file(&file).then_some(file)
    }
}

impl Driver for LaravelDriver {
    fn name(&self) -> &str {
        "laravel"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("public/index.php")) && exists(&site.join("artisan"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let public_file = append(&site.join("public"), uri);
        if is_actual_file(&public_file) {
            return Some(public_file);
        }
        Self::storage_file(site, uri)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        _uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let public = site.join("public");
        let script = public.join("index.php");
        ctx.set_script(&script, &public);
        Some(FrontController::Script(script))
    }
}
