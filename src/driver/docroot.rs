//! Frameworks that differ from the generic driver only in how they are recognised and
//! which folder is the document root.

use super::basic::front_controller_in;
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{append, exists, is_actual_file};
use std::path::{Path, PathBuf};

/// Declares a driver whose static files and front controller live in one subfolder.
macro_rules! docroot_driver {
    ($(#[$meta:meta])* $driver:ident, $name:literal, $docroot:literal, |$site:ident| $serves:expr) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $driver;

        impl Driver for $driver {
            fn name(&self) -> &str {
                $name
            }

            fn serves(&self, $site: &Path, _site_name: &str, _uri: &str) -> bool {
                $serves
            }

            fn is_static_file(
                &self,
                site: &Path,
                _site_name: &str,
                uri: &str,
                _ctx: &RequestContext,
            ) -> Option<PathBuf> {
                let file = append(&site.join($docroot), uri);
                is_actual_file(&file).then_some(file)
            }

            fn front_controller_path(
                &self,
                site: &Path,
                _site_name: &str,
                uri: &str,
                ctx: &mut RequestContext,
            ) -> Option<FrontController> {
                front_controller_in(&site.join($docroot), uri, ctx)
            }
        }
    };
}

docroot_driver!(
    /// CodeIgniter 4 (`spark` launcher).
    CodeIgniterDriver,
    "codeigniter",
    "public",
    |site| exists(&site.join("spark")) && exists(&site.join("public/index.php"))
);

docroot_driver!(
    /// Laminas MVC and Mezzio skeletons.
    LaminasDriver,
    "laminas",
    "public",
    |site| exists(&site.join("public/index.php"))
        && (exists(&site.join("config/application.config.php")) || exists(&site.join("config/config.php")))
);

docroot_driver!(
    /// Nette web projects, served from `www/`.
    NetteDriver,
    "nette",
    "www",
    |site| exists(&site.join("www/index.php")) && exists(&site.join("app/Bootstrap.php"))
);

docroot_driver!(
    ShopwareDriver,
    "shopware",
    "public",
    |site| exists(&site.join("bin/console")) && site.join("vendor/shopware").is_dir()
);

docroot_driver!(
    /// Yii 2 basic application template.
    Yii2Driver,
    "yii2",
    "web",
    |site| exists(&site.join("yii")) && exists(&site.join("web/index.php"))
);
