//! The driver contract and the built-in drivers.
//!
//! A driver encodes one project convention: whether it recognises a site
//! ([`Driver::serves`]), which request URIs are plain files
//! ([`Driver::is_static_file`]), and which bootstrap script handles the rest
//! ([`Driver::front_controller_path`]). Drivers are stateless; everything that varies
//! per request goes into the [`RequestContext`].

use crate::context::RequestContext;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub mod basic;
pub mod bedrock;
pub mod cake;
pub mod concrete5;
pub mod contao;
pub mod craft;
pub mod declarative;
pub mod docroot;
pub mod drupal;
pub mod generated;
pub mod grav;
pub mod joomla;
pub mod kirby;
pub mod laravel;
pub mod locales;
pub mod magento;
pub mod neos;
pub mod processwire;
pub mod registry;
pub mod statamic;
pub mod symfony;
pub mod typo3;
pub mod winter;
pub mod wordpress;

pub use declarative::{DeclarativeDriver, DriverDefinition, DriverLoadError};
pub use registry::DriverRegistry;

/// What a driver decided should handle a non-static request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontController {
    /// Execute this bootstrap script with the populated context.
    Script(PathBuf),
    /// Answer with a redirect to this location (e.g. a forced trailing slash).
    Redirect(String),
    /// Refuse the request.
    Forbidden,
}

/// Capability interface implemented by every driver.
///
/// `uri` is always the percent-decoded request path, already passed through this
/// driver's [`Driver::mutate_uri`].
pub trait Driver: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether this driver recognises the project. Must be side-effect free and cheap;
    /// it runs for every driver ahead of this one on every request.
    fn serves(&self, site: &Path, site_name: &str, uri: &str) -> bool;

    /// Rewrite the URI before `serves` and every later step.
    fn mutate_uri<'a>(&self, uri: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(uri)
    }

    /// Absolute path of a file to stream verbatim, if the URI addresses one.
    fn is_static_file(&self, site: &Path, site_name: &str, uri: &str, ctx: &RequestContext) -> Option<PathBuf>;

    /// Resolve the bootstrap for a dynamic request, populating `ctx` on the way.
    fn front_controller_path(
        &self,
        site: &Path,
        site_name: &str,
        uri: &str,
        ctx: &mut RequestContext,
    ) -> Option<FrontController>;

    /// Context mutations needed before the front controller is resolved.
    fn before_loading(&self, _site: &Path, _site_name: &str, _uri: &str, _ctx: &mut RequestContext) {}
}

/// Every built-in driver, most specific first. The generic drivers close the list and
/// [`basic::BasicDriver`] serves everything, so it must stay last.
pub fn builtin_drivers() -> Vec<Box<dyn Driver>> {
    vec![
        Box::new(statamic::StatamicDriver),
        Box::new(laravel::LaravelDriver),
        Box::new(bedrock::BedrockDriver),
        Box::new(cake::CakeDriver),
        Box::new(docroot::CodeIgniterDriver),
        Box::new(concrete5::Concrete5Driver),
        Box::new(contao::ContaoDriver),
        Box::new(craft::CraftDriver),
        Box::new(drupal::DrupalDriver),
        Box::new(grav::GravDriver),
        Box::new(generated::JigsawDriver),
        Box::new(joomla::JoomlaDriver),
        Box::new(generated::KatanaDriver),
        Box::new(kirby::KirbyDriver),
        Box::new(docroot::LaminasDriver),
        Box::new(magento::Magento2Driver),
        Box::new(neos::NeosDriver),
        Box::new(docroot::NetteDriver),
        Box::new(processwire::ProcessWireDriver),
        Box::new(bedrock::RadicleDriver),
        Box::new(generated::SculpinDriver),
        Box::new(docroot::ShopwareDriver),
        Box::new(statamic::StatamicV1Driver),
        Box::new(statamic::StatamicV2Driver),
        Box::new(symfony::SymfonyDriver),
        Box::new(typo3::Typo3Driver),
        Box::new(winter::WinterDriver),
        Box::new(wordpress::WordPressDriver),
        Box::new(docroot::Yii2Driver),
        Box::new(basic::BasicWithPublicDriver),
        Box::new(basic::BasicDriver),
    ]
}

/// Address written to `SERVER_ADDR` when the pipeline did not set one.
pub const DEFAULT_LOOPBACK: &str = "127.0.0.1";

/// Set the variables WordPress-style applications read before bootstrapping.
pub(crate) fn prime_server_identity(uri: &str, ctx: &mut RequestContext) {
    use crate::context::{PHP_SELF, SERVER_ADDR, SERVER_NAME};

    ctx.set_server(PHP_SELF, uri);
    if ctx.server(SERVER_ADDR).is_none() {
        ctx.set_server(SERVER_ADDR, DEFAULT_LOOPBACK);
    }
    let host = ctx.host().to_string();
    ctx.set_server(SERVER_NAME, host);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A temporary site tree with the given files (empty contents) and directories
    /// (paths ending in `/`).
    pub fn site_with(entries: &[&str]) -> TempDir {
        let site = tempfile::tempdir().unwrap();
        for entry in entries {
            let path = site.path().join(entry.trim_start_matches('/'));
            if entry.ends_with('/') {
                fs::create_dir_all(&path).unwrap();
            } else {
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, "").unwrap();
            }
        }
        site
    }

    pub fn ctx(uri: &str) -> RequestContext {
        RequestContext::new("site.test", "GET", uri)
    }

    /// Mutate the URI, run `before_loading`, then resolve the front controller.
    pub fn front(driver: &dyn Driver, site: &Path, uri: &str) -> (Option<FrontController>, RequestContext) {
        let mut ctx = ctx(uri);
        let uri = driver.mutate_uri(uri).into_owned();
        driver.before_loading(site, "site", &uri, &mut ctx);
        let front = driver.front_controller_path(site, "site", &uri, &mut ctx);
        (front, ctx)
    }

    pub fn static_file(driver: &dyn Driver, site: &Path, uri: &str) -> Option<PathBuf> {
        let uri = driver.mutate_uri(uri).into_owned();
        driver.is_static_file(site, "site", &uri, &ctx(&uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order_ends_with_generic_drivers() {
        let drivers = builtin_drivers();
        let names: Vec<&str> = drivers.iter().map(|d| d.name()).collect();

        assert_eq!(names.first(), Some(&"statamic"));
        assert_eq!(names[1], "laravel");
        assert_eq!(names[names.len() - 2], "basic-with-public");
        assert_eq!(names.last(), Some(&"basic"));

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }
}
