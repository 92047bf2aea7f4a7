//! Per-request environment handed from drivers to the execution layer.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Server variable holding the absolute path of the bootstrap script.
pub const SCRIPT_FILENAME: &str = "SCRIPT_FILENAME";
/// Server variable holding the script path relative to the document root.
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
/// Server variable holding the document root.
pub const DOCUMENT_ROOT: &str = "DOCUMENT_ROOT";
pub const PHP_SELF: &str = "PHP_SELF";
pub const SERVER_NAME: &str = "SERVER_NAME";
pub const SERVER_ADDR: &str = "SERVER_ADDR";
pub const REQUEST_URI: &str = "REQUEST_URI";
pub const DOCUMENT_URI: &str = "DOCUMENT_URI";

/// The mutable bag of values a driver populates for one request.
///
/// Request inputs (host, method, query string) are read-only to drivers; the three
/// maps are what the dynamic execution layer consumes:
/// - `server`: server variables such as [`SCRIPT_FILENAME`] and [`DOCUMENT_ROOT`]
/// - `env`: process environment entries (e.g. `FLOW_CONTEXT`)
/// - `query`: query parameter overrides (e.g. Drupal's `q`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    host: String,
    method: String,
    request_uri: String,
    query_string: Option<String>,
    server: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new(host: &str, method: &str, request_uri: &str) -> Self {
        let mut ctx = Self {
            host: host.to_string(),
            method: method.to_ascii_uppercase(),
            request_uri: request_uri.to_string(),
            ..Self::default()
        };
        ctx.set_server(REQUEST_URI, request_uri);
        ctx
    }

    pub fn with_query_string(mut self, query: Option<String>) -> Self {
        self.query_string = query.filter(|q| !q.is_empty());
        self
    }

    /// The Host header as received (port included).
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Original request URI, query string excluded.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    pub fn set_server(&mut self, key: &str, value: impl Into<String>) {
        self.server.insert(key.to_string(), value.into());
    }

    pub fn server(&self, key: &str) -> Option<&str> {
        self.server.get(key).map(String::as_str)
    }

    pub fn server_vars(&self) -> &BTreeMap<String, String> {
        &self.server
    }

    pub fn set_env(&mut self, key: &str, value: impl Into<String>) {
        self.env.insert(key.to_string(), value.into());
    }

    /// Set an environment entry only if nothing set it before.
    pub fn set_env_default(&mut self, key: &str, value: impl Into<String>) {
        self.env.entry(key.to_string()).or_insert_with(|| value.into());
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn set_query(&mut self, key: &str, value: impl Into<String>) {
        self.query.insert(key.to_string(), value.into());
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn query_vars(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Record the chosen bootstrap script together with its document root.
    pub fn set_script(&mut self, script: &Path, doc_root: &Path) {
        self.set_server(SCRIPT_FILENAME, script.to_string_lossy());
        self.set_server(SCRIPT_NAME, crate::paths::script_name(doc_root, script));
        self.set_server(DOCUMENT_ROOT, doc_root.to_string_lossy());
    }

    /// Host without the port, as `SERVER_NAME` is usually populated.
    pub fn server_name(&self) -> &str {
        self.host.split(':').next().unwrap_or(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_records_request_uri() {
        let ctx = RequestContext::new("blog.test:8080", "get", "/posts");
        assert_eq!(ctx.method(), "GET");
        assert!(ctx.is_get());
        assert_eq!(ctx.server(REQUEST_URI), Some("/posts"));
        assert_eq!(ctx.server_name(), "blog.test");
    }

    #[test]
    fn test_empty_query_string_is_none() {
        let ctx = RequestContext::new("a.test", "GET", "/").with_query_string(Some(String::new()));
        assert_eq!(ctx.query_string(), None);
    }

    #[test]
    fn test_set_script() {
        let mut ctx = RequestContext::new("a.test", "GET", "/");
        ctx.set_script(Path::new("/srv/a/public/index.php"), Path::new("/srv/a/public"));

        assert_eq!(ctx.server(SCRIPT_FILENAME), Some("/srv/a/public/index.php"));
        assert_eq!(ctx.server(SCRIPT_NAME), Some("/index.php"));
        assert_eq!(ctx.server(DOCUMENT_ROOT), Some("/srv/a/public"));
    }

    #[test]
    fn test_set_env_default_keeps_existing() {
        let mut ctx = RequestContext::new("a.test", "GET", "/");
        ctx.set_env("CONCRETE5_ENV", "production");
        ctx.set_env_default("CONCRETE5_ENV", "local");
        assert_eq!(ctx.env("CONCRETE5_ENV"), Some("production"));
    }
}
