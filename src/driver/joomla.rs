use super::basic::{static_file_in, BasicDriver};
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::exists;
use std::path::{Path, PathBuf};

/// Joomla, served with the generic rules once recognised.
#[derive(Debug, Default, Clone, Copy)]
pub struct JoomlaDriver;

impl Driver for JoomlaDriver {
    fn name(&self) -> &str {
        "joomla"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("libraries/joomla").is_dir()
            || (exists(&site.join("administrator/index.php")) && exists(&site.join("libraries/src/Version.php")))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        static_file_in(site, uri)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        BasicDriver.front_controller_path(site, site_name, uri, ctx)
    }
}
