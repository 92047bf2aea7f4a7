//! Host header to site name resolution.

use regex::Regex;
use tracing::trace;

/// Wildcard DNS services that embed an IP address in the hostname.
///
/// `*` stands for any run of characters; the part of the host left of the match
/// becomes the effective host.
pub const DEFAULT_WILDCARD_SERVICES: &[&str] = &[
    ".*.*.*.*.nip.io",
    "-*-*-*-*.nip.io",
    ".*.*.*.*.sslip.io",
    "-*-*-*-*.sslip.io",
    ".*.*.*.*.xip.io",
    "-*-*-*-*.xip.io",
];

/// Compiled wildcard DNS patterns, tried in registration order.
#[derive(Debug, Clone)]
pub struct WildcardDns {
    patterns: Vec<Regex>,
}

impl WildcardDns {
    /// Built-in services followed by operator-configured ones.
    pub fn new<S: AsRef<str>>(extra_services: &[S]) -> Result<Self, regex::Error> {
        let mut patterns = Vec::with_capacity(DEFAULT_WILDCARD_SERVICES.len() + extra_services.len());
        for service in DEFAULT_WILDCARD_SERVICES {
            patterns.push(compile_service(service)?);
        }
        for service in extra_services {
            patterns.push(compile_service(service.as_ref())?);
        }

        Ok(Self { patterns })
    }

    /// Return the host with a wildcard DNS service suffix removed.
    ///
    /// Uses the first capture group of the first pattern that matches; hosts that
    /// match no pattern are returned unchanged.
    pub fn unwrap<'a>(&self, host: &'a str) -> &'a str {
        for pattern in &self.patterns {
            if let Some(inner) = pattern.captures(host).and_then(|caps| caps.get(1)) {
                trace!(host, inner = inner.as_str(), "Unwrapped wildcard DNS host");
                return inner.as_str();
            }
        }
        host
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn compile_service(service: &str) -> Result<Regex, regex::Error> {
    let literal = regex::escape(&service.to_ascii_lowercase()).replace(r"\*", ".*");
    Regex::new(&format!("^(.*){}$", literal))
}

/// Turns Host headers into site names.
#[derive(Debug, Clone)]
pub struct HostnameResolver {
    suffix: String,
    wildcard: WildcardDns,
}

impl HostnameResolver {
    pub fn new<S: AsRef<str>>(tld: &str, extra_services: &[S]) -> Result<Self, regex::Error> {
        let tld = tld.trim_matches('.').to_ascii_lowercase();
        Ok(Self {
            suffix: format!(".{}", tld),
            wildcard: WildcardDns::new(extra_services)?,
        })
    }

    /// The configured top-level suffix, including the leading dot.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Derive the site name for a Host header.
    ///
    /// The port is stripped, wildcard DNS services are unwrapped, then the configured
    /// suffix and a leading `www.` are removed. A host without the suffix is returned
    /// whole (minus `www.`); the locator treats such a name as unknown.
    pub fn site_name(&self, host_header: &str) -> String {
        let host = strip_port(host_header.trim())
            .trim_end_matches('.')
            .to_ascii_lowercase();

        let host = self.wildcard.unwrap(&host);
        let host = host.strip_suffix(self.suffix.as_str()).unwrap_or(host);
        let host = host.strip_prefix("www.").unwrap_or(host);

        host.trim_end_matches('.').to_string()
    }
}

/// Strip a trailing `:<digits>` port.
pub fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(tld: &str) -> HostnameResolver {
        HostnameResolver::new::<&str>(tld, &[]).unwrap()
    }

    #[test]
    fn test_www_and_suffix_are_stripped() {
        assert_eq!(resolver("test").site_name("www.Foo.test"), "foo");
        assert_eq!(resolver("test").site_name("foo.test"), "foo");
        assert_eq!(resolver(".test").site_name("foo.test."), "foo");
    }

    #[test]
    fn test_port_is_stripped() {
        assert_eq!(resolver("test").site_name("blog.test:8080"), "blog");
        assert_eq!(strip_port("blog.test:"), "blog.test:");
        assert_eq!(strip_port("blog.test"), "blog.test");
    }

    #[test]
    fn test_subdomains_are_kept() {
        assert_eq!(resolver("test").site_name("api.myapp.test"), "api.myapp");
    }

    #[test]
    fn test_dash_delimited_ip_service() {
        assert_eq!(resolver("test").site_name("foo-192-168-0-10.nip.io"), "foo");
        assert_eq!(resolver("test").site_name("foo-10-0-0-1.sslip.io"), "foo");
    }

    #[test]
    fn test_dot_delimited_ip_service() {
        assert_eq!(resolver("test").site_name("app.203.0.113.5.nip.io"), "app");
        assert_eq!(resolver("test").site_name("www.app.10.0.0.1.xip.io"), "app");
    }

    #[test]
    fn test_wildcard_with_suffix_inside() {
        assert_eq!(resolver("test").site_name("app.test.10.0.0.1.nip.io"), "app");
    }

    #[test]
    fn test_unknown_suffix_is_returned_whole() {
        assert_eq!(resolver("test").site_name("www.example.com"), "example.com");
    }

    #[test]
    fn test_extra_tunnel_services() {
        let resolver = HostnameResolver::new("test", &[".*.ngrok.io"]).unwrap();
        assert_eq!(resolver.site_name("shop.abc123.ngrok.io"), "shop");

        let loose = HostnameResolver::new("test", &["*.ngrok.io"]).unwrap();
        assert_eq!(loose.site_name("shop.abc123.ngrok.io"), "shop.abc123");
    }

    #[test]
    fn test_wildcard_patterns_are_counted() {
        let wildcard = WildcardDns::new(&["*.example.dev"]).unwrap();
        assert_eq!(wildcard.len(), DEFAULT_WILDCARD_SERVICES.len() + 1);
        assert_eq!(wildcard.unwrap("plain.test"), "plain.test");
    }
}
