//! Generic drivers and the shared front controller search.

use super::{prime_server_identity, Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, is_actual_file, trim_trailing_slash};
use std::path::{Path, PathBuf};

/// Pick the first candidate that is an actual file, recording it in the context
/// against the document root paired with it.
pub fn first_script<I>(candidates: I, ctx: &mut RequestContext) -> Option<FrontController>
where
    I: IntoIterator<Item = (PathBuf, PathBuf)>,
{
    for (candidate, doc_root) in candidates {
        if is_actual_file(&candidate) {
            ctx.set_script(&candidate, &doc_root);
            return Some(FrontController::Script(candidate));
        }
    }
    None
}

/// The candidate search rooted at a single document root:
/// the URI itself, its `index.php`, then the root's `index.php` and `index.html`.
pub fn docroot_candidates(doc_root: &Path, uri: &str) -> Vec<(PathBuf, PathBuf)> {
    let uri = trim_trailing_slash(uri);
    [
        append(doc_root, uri),
        append(doc_root, &format!("{}/index.php", uri)),
        doc_root.join("index.php"),
        doc_root.join("index.html"),
    ]
    .into_iter()
    .map(|candidate| (candidate, doc_root.to_path_buf()))
    .collect()
}

/// Resolve a front controller inside one document root.
pub fn front_controller_in(doc_root: &Path, uri: &str, ctx: &mut RequestContext) -> Option<FrontController> {
    first_script(docroot_candidates(doc_root, uri), ctx)
}

/// Static lookup inside one document root: an `index.html` under the URI, then the
/// URI itself.
pub fn static_file_in(doc_root: &Path, uri: &str) -> Option<PathBuf> {
    let index = append(doc_root, &format!("{}/index.html", trim_trailing_slash(uri)));
    if is_actual_file(&index) {
        return Some(index);
    }
    let file = append(doc_root, uri);
    is_actual_file(&file).then_some(file)
}

/// Catch-all driver: serves every site from its root, falling back to `public/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicDriver;

impl Driver for BasicDriver {
    fn name(&self) -> &str {
        "basic"
    }

    fn serves(&self, _site: &Path, _site_name: &str, _uri: &str) -> bool {
        true
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        static_file_in(site, uri)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let trimmed = trim_trailing_slash(uri);
        let public = site.join("public");
        let root = site.to_path_buf();

        let candidates = [
            (append(site, uri), root.clone()),
            (append(site, &format!("{}/index.php", trimmed)), root.clone()),
            (append(site, &format!("{}/index.html", trimmed)), root.clone()),
            (site.join("index.php"), root),
            (public.join("index.php"), public.clone()),
            (public.join("index.html"), public),
        ];
        first_script(candidates, ctx)
    }
}

/// Sites whose web root is a `public/` directory, without a recognised framework.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicWithPublicDriver;

impl Driver for BasicWithPublicDriver {
    fn name(&self) -> &str {
        "basic-with-public"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("public").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let public = site.join("public");
        let file = append(&public, uri);
        if is_actual_file(&file) {
            return Some(file);
        }
        let index = append(&public, &format!("{}/index.html", trim_trailing_slash(uri)));
        is_actual_file(&index).then_some(index)
    }

    fn before_loading(&self, _site: &Path, _site_name: &str, uri: &str, ctx: &mut RequestContext) {
        prime_server_identity(uri, ctx);
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        front_controller_in(&site.join("public"), uri, ctx)
    }
}
