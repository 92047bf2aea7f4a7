use super::locales::{uri_locale, CRAFT_LOCALES};
use super::{Driver, FrontController};
use crate::context::{RequestContext, SCRIPT_FILENAME, SCRIPT_NAME};
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Craft CMS. The web root is `web/` (Craft 3+) or `public/` (Craft 2).
///
/// Localized sites may ship `<web root>/<locale>/index.php`; when the first URI
/// segment is a known locale and that file exists it becomes the front controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct CraftDriver;

impl CraftDriver {
    pub fn web_root(site: &Path) -> PathBuf {
        for dir in ["web", "public"] {
            let candidate = site.join(dir);
            if candidate.is_dir() {
                return candidate;
            }
        }
        if site.join("craft").is_dir() {
            site.join("public")
        } else {
            site.join("web")
        }
    }
}

impl Driver for CraftDriver {
    fn name(&self) -> &str {
        "craft"
    }

    fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
        exists(&site.join("craft"))
    }

    fn is_static_file(&self, site: &Path, _site_name: &str, uri: &str, _ctx: &RequestContext) -> Option<PathBuf> {
        let file = append(&Self::web_root(site), uri);
        is_actual_file(&file).then_some(file)
    }

    fn front_controller_path(
        &self,
        site: &Path,
        _site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController> {
        let web_root = Self::web_root(site);
        let mut script = web_root.join("index.php");
        let mut script_name = "/index.php".to_string();

        if let Some(locale) = uri_locale(uri, CRAFT_LOCALES) {
            let localized = web_root.join(locale).join("index.php");
            if exists(&localized) {
                script = localized;
                script_name = format!("/{}/index.php", locale);
            }
        }

        ctx.set_server(SCRIPT_FILENAME, script.to_string_lossy());
        ctx.set_server(SCRIPT_NAME, script_name);
        Some(FrontController::Script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{front, site_with, static_file};
    use super::*;

    #[test]
    fn test_craft_web_root_detection() {
        let craft3 = site_with(&["craft", "web/index.php"]);
        assert_eq!(CraftDriver::web_root(craft3.path()), craft3.path().join("web"));

        let craft2 = site_with(&["craft/", "public/index.php"]);
        assert_eq!(CraftDriver::web_root(craft2.path()), craft2.path().join("public"));

        let bare = site_with(&["craft"]);
        assert_eq!(CraftDriver::web_root(bare.path()), bare.path().join("web"));
    }

    #[test]
    fn test_craft_locale_front_controller() {
        let site = site_with(&["craft", "web/index.php", "web/de/index.php", "web/assets/site.css"]);

        let (front_controller, ctx) = front(&CraftDriver, site.path(), "/de/ueber-uns");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/de/index.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/de/index.php"));

        let (front_controller, ctx) = front(&CraftDriver, site.path(), "/fr/a-propos");
        assert_eq!(front_controller, Some(FrontController::Script(site.path().join("web/index.php"))));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/index.php"));

        assert_eq!(
            static_file(&CraftDriver, site.path(), "/assets/site.css"),
            Some(site.path().join("web/assets/site.css"))
        );
    }
}
