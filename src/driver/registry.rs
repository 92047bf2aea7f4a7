use super::declarative::{load_dir, DeclarativeDriver, DriverLoadError};
use super::{builtin_drivers, Driver};
use std::path::Path;
use tracing::debug;

/// Ordered driver list consulted on every request. Immutable after startup.
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    /// Only the built-in drivers.
    pub fn builtin() -> Self {
        Self::new(builtin_drivers())
    }

    /// An explicit driver list, consulted in the given order.
    pub fn new(drivers: Vec<Box<dyn Driver>>) -> Self {
        Self { drivers }
    }

    /// Extension drivers from `dir` (sorted by file name) ahead of the built-ins.
    pub fn with_extensions(dir: &Path) -> Result<Self, DriverLoadError> {
        let mut drivers: Vec<Box<dyn Driver>> = load_dir(dir)?
            .into_iter()
            .map(|driver| Box::new(driver) as Box<dyn Driver>)
            .collect();
        drivers.extend(builtin_drivers());
        Ok(Self::new(drivers))
    }

    /// Insert a driver ahead of every registered one.
    pub fn register(&mut self, driver: Box<dyn Driver>) {
        self.drivers.insert(0, driver);
    }

    pub fn drivers(&self) -> impl Iterator<Item = &dyn Driver> {
        self.drivers.iter().map(|driver| driver.as_ref())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// The first registered driver that serves the site.
    pub fn assign(&self, site: &Path, site_name: &str, uri: &str) -> Option<&dyn Driver> {
        self.drivers().find(|driver| {
            let uri = driver.mutate_uri(uri);
            driver.serves(site, site_name, &uri)
        })
    }

    /// Like [`DriverRegistry::assign`], but a project's own driver gets the first look.
    pub fn assign_with<'a>(
        &'a self,
        local: Option<&'a DeclarativeDriver>,
        site: &Path,
        site_name: &str,
        uri: &str,
    ) -> Option<&'a dyn Driver> {
        if let Some(local) = local {
            if local.serves(site, site_name, &local.mutate_uri(uri)) {
                debug!(site = %site_name, driver = local.name(), "Using site-local driver");
                return Some(local as &dyn Driver);
            }
        }
        self.assign(site, site_name, uri)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.drivers().map(|driver| driver.name())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::site_with;
    use super::super::{DriverDefinition, FrontController};
    use super::*;
    use crate::context::RequestContext;
    use std::borrow::Cow;
    use std::fs;
    use std::path::PathBuf;

    /// Claims sites that contain its prefixed URI, so a leaked mutation is observable.
    struct PrefixProbe;

    impl Driver for PrefixProbe {
        fn name(&self) -> &str {
            "probe"
        }

        fn serves(&self, site: &Path, _site_name: &str, uri: &str) -> bool {
            assert!(uri.starts_with("/probe"), "probe saw an unmutated uri: {uri}");
            site.join("probe-marker").exists()
        }

        fn mutate_uri<'a>(&self, uri: &'a str) -> Cow<'a, str> {
            Cow::Owned(format!("/probe{}", uri))
        }

        fn is_static_file(&self, _: &Path, _: &str, _: &str, _: &RequestContext) -> Option<PathBuf> {
            None
        }

        fn front_controller_path(&self, _: &Path, _: &str, _: &str, _: &mut RequestContext) -> Option<FrontController> {
            None
        }
    }

    /// Fails the test if it is consulted with a mutated URI.
    struct ExpectsRaw;

    impl Driver for ExpectsRaw {
        fn name(&self) -> &str {
            "expects-raw"
        }

        fn serves(&self, _site: &Path, _site_name: &str, uri: &str) -> bool {
            assert_eq!(uri, "/page");
            true
        }

        fn is_static_file(&self, _: &Path, _: &str, _: &str, _: &RequestContext) -> Option<PathBuf> {
            None
        }

        fn front_controller_path(&self, _: &Path, _: &str, _: &str, _: &mut RequestContext) -> Option<FrontController> {
            None
        }
    }

    #[test]
    fn test_rejected_mutation_does_not_leak() {
        let registry = DriverRegistry::new(vec![Box::new(PrefixProbe), Box::new(ExpectsRaw)]);
        let site = site_with(&[]);

        let driver = registry.assign(site.path(), "site", "/page").unwrap();
        assert_eq!(driver.name(), "expects-raw");
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let registry = DriverRegistry::builtin();
        let site = site_with(&["public/index.php", "artisan"]);

        for _ in 0..5 {
            let driver = registry.assign(site.path(), "app", "/").unwrap();
            assert_eq!(driver.name(), "laravel");
        }
    }

    #[test]
    fn test_builtin_fallbacks() {
        let registry = DriverRegistry::builtin();

        let public = site_with(&["public/index.html"]);
        assert_eq!(registry.assign(public.path(), "p", "/").unwrap().name(), "basic-with-public");

        let plain = site_with(&["index.html"]);
        assert_eq!(registry.assign(plain.path(), "p", "/").unwrap().name(), "basic");
    }

    #[test]
    fn test_specific_drivers_win_over_generic() {
        let registry = DriverRegistry::builtin();

        let statamic = site_with(&["please", "artisan", "public/index.php"]);
        assert_eq!(registry.assign(statamic.path(), "s", "/").unwrap().name(), "statamic");

        let wordpress = site_with(&["wp-config.php", "index.php"]);
        assert_eq!(registry.assign(wordpress.path(), "w", "/").unwrap().name(), "wordpress");
    }

    #[test]
    fn test_extensions_precede_builtins_and_local_precedes_all() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("custom.toml"),
            "name = \"custom\"\n[serves]\nfiles = [\"artisan\"]\n",
        )
        .unwrap();
        let registry = DriverRegistry::with_extensions(dir.path()).unwrap();
        assert_eq!(registry.len(), builtin_drivers().len() + 1);

        let site = site_with(&["public/index.php", "artisan"]);
        assert_eq!(registry.assign(site.path(), "app", "/").unwrap().name(), "custom");

        let local: DriverDefinition = toml::from_str("name = \"mine\"").unwrap();
        let local = DeclarativeDriver::new(local).unwrap();
        let driver = registry.assign_with(Some(&local), site.path(), "app", "/").unwrap();
        assert_eq!(driver.name(), "mine");
    }

    #[test]
    fn test_register_goes_first() {
        let mut registry = DriverRegistry::builtin();
        registry.register(Box::new(ExpectsRaw));
        assert_eq!(registry.drivers().next().unwrap().name(), "expects-raw");
    }
}
