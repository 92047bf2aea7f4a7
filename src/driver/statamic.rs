//! Statamic, across its three layouts.

use super::laravel::LaravelDriver;
use super::locales::{uri_locale, STATAMIC_LOCALES};
use super::{Driver, FrontController};
use crate::context::{RequestContext, REQUEST_URI, SCRIPT_FILENAME, SCRIPT_NAME};
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Statamic 3+ (a Laravel application with a `please` console).
///
/// GET requests are answered from the static cache
/// (`public/static<path>_<query>.html`) when a cached page exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatamicDriver;

impl StatamicDriver {
    pub fn static_cache_path(site: &Path, uri: &str, ctx: &RequestContext) -> PathBuf {
        let query = ctx.query_string().unwrap_or("");
        append(&site.join("public/static"), &format!("{}_{}.html", uri, query))
    }
}

impl Driver for StatamicDriver {
    fn name(&self) -> &str {
        "statamic"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("please"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, ctx: &RequestContext) -> Option<PathBuf> {
        let public_file = append(&site.join("public"), uri);
        if is_actual_file(&public_file) {
            return Some(public_file);
        }
        if ctx.is_get() {
            let cached = Self::static_cache_path(site, uri, ctx);
            if is_actual_file(&cached) {
                return Some(cached);
            }
        }
        LaravelDriver::storage_file(site, uri)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        LaravelDriver.front_controller_path(site, site_name, uri, ctx)
    }
}

/// Statamic 2 (`statamic/` application folder, optional locale subfolders).
#[derive(Debug, Default, Clone, Copy)]
pub struct StatamicV2Driver;

impl Driver for StatamicV2Driver {
    fn name(&self) -> &str {
        "statamic-v2"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("statamic").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        [append(site, uri), append(&site.join("public"), uri)]
            .into_iter()
            .find(|path| is_actual_file(path))
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let static_page = append(site, &format!("/static{}/index.html", uri));
        if is_actual_file(&static_page) {
            return Some(FrontController::Script(static_page));
        }

        if let Some(rest) = ctx.request_uri().strip_prefix("/index.php") {
            let rest = if rest.is_empty() { "/" } else { rest }.to_string();
            ctx.set_server(REQUEST_URI, rest);
        }

        let uri = if uri.is_empty() { "/" } else { uri };
        if uri == "/installer.php" {
            return Some(FrontController::Script(site.join("installer.php")));
        }

        let mut index = site.join("index.php");
        let public_index = site.join("public/index.php");
        if is_actual_file(&public_index) {
            index = public_index;
        }
        let mut script_name = "/index.php".to_string();

        if let Some(locale) = uri_locale(uri, STATAMIC_LOCALES) {
            let localized = site.join(locale).join("index.php");
            if is_actual_file(&localized) {
                if uri == format!("/{}", locale) {
                    return Some(FrontController::Redirect(format!("{}/", uri)));
                }
                index = localized;
                script_name = format!("/{}/index.php", locale);
            }
        }

        ctx.set_server(SCRIPT_FILENAME, index.to_string_lossy());
        ctx.set_server(SCRIPT_NAME, script_name);
        Some(FrontController::Script(index))
    }
}

/// Statamic 1 (`_app/core`), with its private folders never served as files.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatamicV1Driver;

const STATAMIC_V1_PRIVATE: &[&str] = &["/_add-ons", "/_app", "/_content", "/_cache", "/_config", "/_logs"];

impl Driver for StatamicV1Driver {
    fn name(&self) -> &str {
        "statamic-v1"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("_app/core/statamic.php").is_file()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if uri == "/admin" || STATAMIC_V1_PRIVATE.iter().any(|prefix| uri.starts_with(prefix)) {
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
        let (script, script_name) = if uri.starts_with("/admin.php") {
            (site.join("admin.php"), "/admin.php")
        } else if uri == "/admin" {
            (site.join("admin/index.php"), "/admin/index.php")
        } else {
            (site.join("index.php"), "/index.php")
        };

        ctx.set_server(SCRIPT_FILENAME, script.to_string_lossy());
        ctx.set_server(SCRIPT_NAME, script_name);
        Some(FrontController::Script(script))
    }
}
