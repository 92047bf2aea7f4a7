//! Parkgate - a local development front end for parked PHP projects
//!
//! This library turns an incoming request into a serving decision:
//! - Derives a site name from the Host header (configured TLD, `www.`, wildcard DNS
//!   services such as nip.io)
//! - Finds the project directory among linked sites and parked directories
//! - Picks the first framework driver that recognises the project
//! - Resolves the request to a static file or a bootstrap script plus its context
//! - Serves the outcome over HTTP/1.1 and HTTP/2

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod handler;
pub mod hostname;
pub mod listing;
pub mod locator;
pub mod paths;
pub mod pipeline;
pub mod server;
pub mod site_env;

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
