use super::{Driver, FrontController};
use crate::context::{RequestContext, DOCUMENT_ROOT, DOCUMENT_URI, PHP_SELF, SCRIPT_FILENAME, SCRIPT_NAME};
use crate::paths::{append, exists, is_actual_file, trim_trailing_slash, uri_extension};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const DOCUMENT_ROOT_DIR: &str = "/web";

/// Paths TYPO3 keeps private even though they live under the document root.
static FORBIDDEN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"_(recycler|temp)_/",
        r"^/(typo3conf/ext|typo3/sysext|typo3/ext)/[^/]+/(Resources/Private|Tests)/",
        r"^/typo3/.+\.map$",
        r"^/typo3temp/var/",
        r"\.(htaccess|gitkeep|gitignore)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid typo3 pattern"))
    .collect()
});

/// `name.1700000000.css` cache busters that do not exist on disk.
static CACHE_BUSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.(\d+)\.(js|css|png|jpg|gif|gzip)$").expect("valid cache buster regex"));

fn is_forbidden(uri: &str) -> bool {
    FORBIDDEN.iter().any(|pattern| pattern.is_match(uri))
}

/// TYPO3 CMS served from `web/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Typo3Driver;

impl Typo3Driver {
    fn docroot(site: &Path) -> PathBuf {
        append(site, DOCUMENT_ROOT_DIR)
    }

    /// Record `uri` (relative to the document root) as the executing script.
    fn serve_script(site: &Path, uri: &str, ctx: &mut RequestContext) -> FrontController {
        let docroot = Self::docroot(site);
        let script = append(&docroot, uri);

        ctx.set_server(DOCUMENT_ROOT, docroot.to_string_lossy());
        ctx.set_server(DOCUMENT_URI, uri);
        ctx.set_server(SCRIPT_FILENAME, script.to_string_lossy());
        ctx.set_server(SCRIPT_NAME, uri);
        ctx.set_server(PHP_SELF, uri);
        FrontController::Script(script)
    }
}

impl Driver for Typo3Driver {
    fn name(&self) -> &str {
        "typo3"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        Self::docroot(site).join("typo3").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let docroot = Self::docroot(site);
        let mut file = append(&docroot, uri);
        let mut uri = uri.to_string();
        if !is_actual_file(&file) {
            uri = CACHE_BUSTER.replace(&uri, "$1.$3").into_owned();
            file = append(&docroot, &uri);
        }
        (is_actual_file(&file) && !is_forbidden(&uri)).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        if uri == "/typo3" {
            return Some(FrontController::Redirect("/typo3/".to_string()));
        }
        if is_forbidden(uri) {
            return Some(FrontController::Forbidden);
        }

        let uri = trim_trailing_slash(uri);
        let target = append(&Self::docroot(site), uri);

        if target.is_dir() {
            if exists(&target.join("index.php")) {
                return Some(Self::serve_script(site, &format!("{}/index.php", uri), ctx));
            }
            let index = target.join("index.html");
            if exists(&index) {
                return Some(FrontController::Script(index));
            }
        } else if uri_extension(uri) == Some("php") {
            return Some(Self::serve_script(site, uri, ctx));
        }

        Some(Self::serve_script(site, "/index.php", ctx))
    }
}
