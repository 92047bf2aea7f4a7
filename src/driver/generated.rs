//! Static-site generators and other projects that live entirely in one build folder.
//!
//! These drivers only prefix the URI with the build directory and then defer to the
//! generic driver.

use super::basic::BasicDriver;
use super::{Driver, FrontController};
use crate::context::RequestContext;
use crate::paths::{exists, trim_trailing_slash};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

fn prefixed(prefix: &str, uri: &str) -> String {
    trim_trailing_slash(&format!("{}{}", prefix, uri)).to_string()
}

macro_rules! build_folder_driver {
    ($(#[$doc:meta])* $driver:ident, $name:literal, $prefix:literal, $serves:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $driver;

        impl Driver for $driver {
            fn name(&self) -> &str {
                $name
            }

            fn serves(&self, site: &Path, _site_name: &str, _uri: &str) -> bool {
                let serves: fn(&Path) -> bool = $serves;
                serves(site)
            }

            fn mutate_uri<'a>(&self, uri: &'a str) -> Cow<'a, str> {
                Cow::Owned(prefixed($prefix, uri))
            }

            fn is_static_file(&self, site: &Path, site_name: &str, uri: &str, ctx: &RequestContext) -> Option<PathBuf> {
                BasicDriver.is_static_file(site, site_name, uri, ctx)
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
    };
}

build_folder_driver!(
    /// Jigsaw: local builds land in `build_local/`.
    JigsawDriver,
    "jigsaw",
    "/build_local",
    |site| site.join("build_local").is_dir()
);

build_folder_driver!(
    /// Sculpin: development builds land in `output_dev/`.
    SculpinDriver,
    "sculpin",
    "/output_dev",
    |site| {
        let modern = site.join("source").is_dir()
            && site.join("output_dev").is_dir()
            && exists(&site.join("app/SculpinKernel.php"));
        let legacy = site.join(".sculpin").is_dir();
        modern || legacy
    }
);

build_folder_driver!(
    /// Katana: builds land in `public/`.
    KatanaDriver,
    "katana",
    "/public",
    |site| exists(&site.join("katana"))
);
