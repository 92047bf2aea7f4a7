use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Neos / Flow: `flow` launcher and a capitalised `Web/` document root.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeosDriver;

impl Driver for NeosDriver {
    fn name(&self) -> &str {
        "neos"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("flow")) && site.join("Web").is_dir()
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&site.join("Web"), uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        _uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        ctx.set_env_default("FLOW_CONTEXT", "Development");
        ctx.set_env_default("FLOW_REWRITEURLS", "1");

        let web = site.join("Web");
        let script = web.join("index.php");
        ctx.set_script(&script, &web);
        Some(FrontController::Script(script))
    }
}
