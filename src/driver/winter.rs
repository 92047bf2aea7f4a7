use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// The only places a Winter CMS install exposes files from.
static PUBLIC_ASSETS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^/storage/app/uploads/public/",
        r"^/storage/app/media/",
        r"^/storage/app/resized/",
        r"^/storage/temp/public/",
        r"^/themes/[^/]+/(assets|resources)/",
        r"^/plugins/[^/]+/[^/]+/(assets|resources)/",
        r"^/modules/[^/]+/(assets|resources)/",
        r"^/favicon\.ico$",
        r"^/robots\.txt$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid winter asset pattern"))
    .collect()
});

/// Winter CMS (and October CMS before it): everything but whitelisted assets goes
/// through `index.php`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WinterDriver;

impl Driver for WinterDriver {
    fn name(&self) -> &str {
        "winter"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        site.join("modules/system").is_dir() && exists(&site.join("artisan"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        if !PUBLIC_ASSETS.iter().any(|pattern| pattern.is_match(uri)) {
            return None;
        }
        let file = append(site, uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        _uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let script = site.join("index.php");
        ctx.set_script(&script, site);
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;

    #[test]
    fn test_only_whitelisted_assets_are_static() {
        let site = site_with(&[
            "modules/system/",
            "artisan",
            "index.php",
            "config/app.php",
            "themes/demo/assets/css/theme.css",
            "themes/demo/layouts/default.htm",
        ]);
        assert!(WinterDriver.serves(site.path(), "w", "/"));

        assert_eq!(
            static_file(&WinterDriver, site.path(), "/themes/demo/assets/css/theme.css"),
            Some(site.path().join("themes/demo/assets/css/theme.css"))
        );
        assert_eq!(static_file(&WinterDriver, site.path(), "/themes/demo/layouts/default.htm"), None);
        assert_eq!(static_file(&WinterDriver, site.path(), "/config/app.php"), None);

        let (front_controller, _) = front(&WinterDriver, site.path(), "/config/app.php");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("index.php"))));
    }
}
