//! WordPress boilerplates that move core into a `wp/` subfolder of the web root.

use super::wordpress::force_trailing_slash;
use super::{prime_server_identity, Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file, trim_trailing_slash};
use std::path::{Path, PathBuf};

/// Shared resolution for Bedrock-style layouts rooted at `site/<web_dir>`.
fn wp_front_controller(site: &Path, web_dir: &str, uri: &str, ctx: &mut RequestContext) -> FrontController {
    let web_root = site.join(web_dir);

    if uri.starts_with("/wp/") || uri == "/wp" {
        if let Some(redirect) = force_trailing_slash(uri, "/wp/wp-admin") {
            return redirect;
        }
        let target = append(&web_root, uri);
        let script = if target.is_dir() {
            append(&web_root, &format!("{}/index.php", trim_trailing_slash(uri)))
        } else {
            target
        };
        ctx.set_script(&script, &web_root);
        return FrontController::Script(script);
    }

    let script = web_root.join("index.php");
    ctx.set_script(&script, &web_root);
    FrontController::Script(script)
}

/// Roots' Bedrock: `web/` document root, `config/application.php`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BedrockDriver;

impl Driver for BedrockDriver {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("web/app/mu-plugins/bedrock-autoloader.php"))
            || (site.join("web/app").is_dir()
                && exists(&site.join("web/wp-config.php"))
                && exists(&site.join("config/application.php")))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&site.join("web"), uri);
        is_actual_file(&file).then_some(file)
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
        Some(wp_front_controller(site, "web", uri, ctx))
    }
}

/// Roots' Radicle: Bedrock conventions with a `public/` document root.
#[derive(Debug, Default, Clone, Copy)]
pub struct RadicleDriver;

impl Driver for RadicleDriver {
    fn name(&self) -> &str {
        "radicle"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("public/content/mu-plugins/bedrock-autoloader.php"))
            || (site.join("public").is_dir()
                && exists(&site.join("public/wp-config.php"))
                && exists(&site.join("bedrock/application.php")))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&site.join("public"), uri);
        is_actual_file(&file).then_some(file)
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
        Some(wp_front_controller(site, "public", uri, ctx))
    }
}
