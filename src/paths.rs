//! Path and URI helpers shared by the resolver and every driver.
//!
//! URIs handled here always start with `/` and are appended to site directories as
//! plain strings, so `append(site, "/public")` yields `<site>/public` rather than the
//! absolute `/public` that `Path::join` would produce.

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Split a raw request target into its percent-decoded path and raw query string.
pub fn split_request_target(target: &str) -> (String, Option<String>) {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (target, None),
    };

    let path = if path.is_empty() { "/" } else { path };
    (decode_uri(path).into_owned(), query)
}

/// Percent-decode a URI path. Invalid UTF-8 sequences leave the input untouched.
pub fn decode_uri(uri: &str) -> Cow<'_, str> {
    urlencoding::decode(uri).unwrap_or(Cow::Borrowed(uri))
}

/// Remove every trailing `/` from a URI (`"/"` becomes `""`).
pub fn trim_trailing_slash(uri: &str) -> &str {
    uri.trim_end_matches('/')
}

/// The registrable label of a site name: the last `.`-separated label.
///
/// `api.myapp` yields `myapp`; a single-label name yields itself.
pub fn domain_label(site_name: &str) -> &str {
    site_name.rsplit('.').next().unwrap_or(site_name)
}

/// Append a URI-like suffix to a directory without `Path::join` semantics.
pub fn append(base: &Path, suffix: &str) -> PathBuf {
    let mut joined = OsString::from(base.as_os_str());
    joined.push(suffix);
    PathBuf::from(joined)
}

/// True if the path exists and is not a directory.
pub fn is_actual_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}

/// True if anything (file, directory, or symlink target) exists at the path.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Script name as the execution layer expects it: the path relative to the document
/// root with a leading slash.
pub fn script_name(doc_root: &Path, script: &Path) -> String {
    match script.strip_prefix(doc_root) {
        Ok(relative) => format!("/{}", relative.to_string_lossy()),
        Err(_) => script.to_string_lossy().into_owned(),
    }
}

/// Extension of the last path segment of a URI, if any.
pub fn uri_extension(uri: &str) -> Option<&str> {
    let segment = uri.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// True if any segment of the URI is `..`.
pub fn has_parent_segment(uri: &str) -> bool {
    uri.split(['/', '\\']).any(|segment| segment == "..")
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
