//! The composition root: Host header and request target in, [`Resolution`] out.

use crate::config::Config;
use crate::context::{RequestContext, SERVER_ADDR};
use crate::driver::{DeclarativeDriver, DriverRegistry, FrontController};
use crate::hostname::HostnameResolver;
use crate::locator::SiteLocator;
use crate::paths::{append, has_parent_segment, split_request_target, uri_extension};
use crate::site_env;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What the serving layer should do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Stream this file verbatim.
    Static(PathBuf),
    /// Hand this bootstrap script and its context to the execution layer.
    Script { path: PathBuf, context: RequestContext },
    Redirect(String),
    Forbidden,
    NotFound,
    /// Render a listing of this directory.
    DirectoryListing(PathBuf),
}

impl Resolution {
    /// Short name for logs and response headers.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Static(_) => "static",
            Resolution::Script { .. } => "script",
            Resolution::Redirect(_) => "redirect",
            Resolution::Forbidden => "forbidden",
            Resolution::NotFound => "not-found",
            Resolution::DirectoryListing(_) => "directory-listing",
        }
    }
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug)]
pub struct Resolver {
    hostnames: HostnameResolver,
    locator: SiteLocator,
    registry: DriverRegistry,
    default_site: Option<PathBuf>,
    directory_listing: bool,
    loopback: String,
}

impl Resolver {
    pub fn new(hostnames: HostnameResolver, locator: SiteLocator, registry: DriverRegistry) -> Self {
        Self {
            hostnames,
            locator,
            registry,
            default_site: None,
            directory_listing: false,
            loopback: crate::driver::DEFAULT_LOOPBACK.to_string(),
        }
    }

    pub fn with_default_site(mut self, site: Option<PathBuf>) -> Self {
        self.default_site = site;
        self
    }

    pub fn with_directory_listing(mut self, enabled: bool) -> Self {
        self.directory_listing = enabled;
        self
    }

    pub fn with_loopback(mut self, loopback: impl Into<String>) -> Self {
        self.loopback = loopback.into();
        self
    }

    /// Build everything the configuration describes, including extension drivers.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let hostnames =
            HostnameResolver::new(&config.tld, &config.tunnel_services).context("Invalid tunnel service pattern")?;
        let locator = SiteLocator::new(config.links_path(), config.parked_paths());
        let registry = match config.drivers_path() {
            Some(dir) => DriverRegistry::with_extensions(&dir)
                .with_context(|| format!("Failed to load extension drivers from {}", dir.display()))?,
            None => DriverRegistry::builtin(),
        };

        Ok(Self::new(hostnames, locator, registry)
            .with_default_site(config.default_site())
            .with_directory_listing(config.directory_listing)
            .with_loopback(config.loopback.clone()))
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    pub fn site_name(&self, host: &str) -> String {
        self.hostnames.site_name(host)
    }

    /// The site directory for a site name, falling back to the default site.
    pub fn locate(&self, site_name: &str) -> Option<PathBuf> {
        if let Some(site) = self.locator.locate(site_name) {
            return Some(site);
        }
        self.default_site.as_ref().filter(|site| site.is_dir()).cloned()
    }

    /// Resolve one request. `target` is the raw request target (path and query).
    pub fn resolve(&self, host: &str, target: &str, method: &str) -> Resolution {
        let (uri, query) = split_request_target(target);
        if has_parent_segment(&uri) {
            debug!(uri = %uri, "Rejecting parent directory segment");
            return Resolution::NotFound;
        }

        let site_name = self.site_name(host);
        let Some(site) = self.locate(&site_name) else {
            debug!(host, site = %site_name, "No site directory");
            return Resolution::NotFound;
        };

        let local = match DeclarativeDriver::for_site(&site) {
            Ok(local) => local,
            Err(e) => {
                warn!(site = %site_name, error = %e, "Ignoring site-local driver");
                None
            }
        };

        let Some(driver) = self.registry.assign_with(local.as_ref(), &site, &site_name, &uri) else {
            debug!(site = %site_name, "No driver serves site");
            return Resolution::NotFound;
        };
        debug!(site = %site_name, driver = driver.name(), "Driver assigned");

        let mut ctx = RequestContext::new(host, method, &uri).with_query_string(query);
        ctx.set_server(SERVER_ADDR, self.loopback.as_str());

        let uri = driver.mutate_uri(&uri);

        // Scripts are never handed out as source.
        if uri_extension(&uri) != Some("php") {
            if let Some(path) = driver.is_static_file(&site, &site_name, &uri, &ctx) {
                return Resolution::Static(path);
            }
        }

        site_env::apply(&site, &site_name, &mut ctx);
        driver.before_loading(&site, &site_name, &uri, &mut ctx);

        match driver.front_controller_path(&site, &site_name, &uri, &mut ctx) {
            Some(FrontController::Script(path)) => Resolution::Script { path, context: ctx },
            Some(FrontController::Redirect(location)) => Resolution::Redirect(location),
            Some(FrontController::Forbidden) => Resolution::Forbidden,
            None => self.unresolved(&site, &uri),
        }
    }

    fn unresolved(&self, site: &Path, uri: &str) -> Resolution {
        if self.directory_listing {
            let dir = append(site, uri);
            if dir.is_dir() {
                return Resolution::DirectoryListing(dir);
            }
        }
        Resolution::NotFound
    }
}
