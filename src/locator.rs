//! Site name to project directory lookup across the links directory and parked paths.

use crate::paths::domain_label;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Searches the links directory and then every parked path, in order.
#[derive(Debug, Clone, Default)]
pub struct SiteLocator {
    roots: Vec<PathBuf>,
}

impl SiteLocator {
    /// The links directory, when given, is searched before any parked path.
    pub fn new(links_path: Option<PathBuf>, parked_paths: Vec<PathBuf>) -> Self {
        let mut roots = Vec::with_capacity(parked_paths.len() + 1);
        roots.extend(links_path);
        for path in parked_paths {
            if !roots.contains(&path) {
                roots.push(path);
            }
        }
        Self { roots }
    }

    /// Search roots in priority order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn locate(&self, site_name: &str) -> Option<PathBuf> {
        locate_in(site_name, &self.roots)
    }
}

/// Find the project directory for a site name.
///
/// Equivalent to searching `links_path` followed by `parked_paths`; see
/// [`locate_in`] for the matching rules.
pub fn locate(site_name: &str, parked_paths: &[PathBuf], links_path: Option<&Path>) -> Option<PathBuf> {
    let roots: Vec<PathBuf> = links_path
        .map(Path::to_path_buf)
        .into_iter()
        .chain(parked_paths.iter().cloned())
        .collect();
    locate_in(site_name, &roots)
}

/// Scan each root's immediate subdirectories, comparing lowercase names.
///
/// Within one root an exact site name match returns immediately; a match on the
/// domain label (`api.shop` -> `shop`) is remembered and returned once the root is
/// exhausted without an exact match. The first root with either kind of match wins.
pub fn locate_in(site_name: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    if site_name.is_empty() {
        return None;
    }

    let site_name = site_name.to_lowercase();
    let domain = domain_label(&site_name);

    for root in roots {
        let entries = match subdirectories(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "Skipping unreadable site root");
                continue;
            }
        };

        let mut candidate = None;
        for (name, path) in entries {
            if name == site_name {
                trace!(site = %site_name, path = %path.display(), "Exact site match");
                return Some(path);
            }
            if candidate.is_none() && name == domain {
                candidate = Some(path);
            }
        }

        if let Some(path) = candidate {
            trace!(site = %site_name, path = %path.display(), "Domain site match");
            return Some(path);
        }
    }

    None
}

/// Immediate subdirectories of a root (symlinks to directories included), as
/// `(lowercase name, path)` pairs sorted by name so the scan is deterministic.
fn subdirectories(root: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().to_lowercase(), path));
        }
    }
    dirs.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root_with(dirs: &[&str]) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        for dir in dirs {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        root
    }

    #[test]
    fn test_exact_match_any_case() {
        let root = root_with(&["MyBlog", "shop"]);
        let locator = SiteLocator::new(None, vec![root.path().to_path_buf()]);

        assert_eq!(locator.locate("myblog"), Some(root.path().join("MyBlog")));
        assert_eq!(locator.locate("MYBLOG"), Some(root.path().join("MyBlog")));
        assert_eq!(locator.locate("shop"), Some(root.path().join("shop")));
    }

    #[test]
    fn test_subdomain_falls_back_to_domain() {
        let root = root_with(&["shop"]);
        let locator = SiteLocator::new(None, vec![root.path().to_path_buf()]);

        assert_eq!(locator.locate("api.shop"), Some(root.path().join("shop")));
    }

    #[test]
    fn test_exact_subdomain_beats_domain_in_same_root() {
        let root = root_with(&["a", "shop", "api.shop", "zzz"]);
        let locator = SiteLocator::new(None, vec![root.path().to_path_buf()]);

        assert_eq!(locator.locate("api.shop"), Some(root.path().join("api.shop")));
    }

    #[test]
    fn test_first_root_with_domain_match_wins() {
        let first = root_with(&["shop"]);
        let second = root_with(&["api.shop"]);
        let locator = SiteLocator::new(
            None,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );

        assert_eq!(locator.locate("api.shop"), Some(first.path().join("shop")));
    }

    #[test]
    fn test_fallback_across_roots() {
        let first = root_with(&["other"]);
        let second = root_with(&["blog"]);
        let locator = SiteLocator::new(
            None,
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
        );

        assert_eq!(locator.locate("blog"), Some(second.path().join("blog")));
    }

    #[test]
    fn test_links_directory_searched_first() {
        let links = root_with(&["blog"]);
        let parked = root_with(&["blog"]);
        let locator = SiteLocator::new(
            Some(links.path().to_path_buf()),
            vec![parked.path().to_path_buf()],
        );

        assert_eq!(locator.roots()[0], links.path());
        assert_eq!(locator.locate("blog"), Some(links.path().join("blog")));
        assert_eq!(
            locate("blog", &[parked.path().to_path_buf()], Some(links.path())),
            Some(links.path().join("blog"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_site_is_found() {
        let project = root_with(&["project"]);
        let links = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(project.path().join("project"), links.path().join("linked")).unwrap();

        let locator = SiteLocator::new(Some(links.path().to_path_buf()), Vec::new());
        assert_eq!(locator.locate("linked"), Some(links.path().join("linked")));
    }

    #[test]
    fn test_files_and_missing_roots_are_ignored() {
        let root = root_with(&[]);
        fs::write(root.path().join("blog"), "not a directory").unwrap();
        let locator = SiteLocator::new(
            Some(PathBuf::from("/definitely/not/here")),
            vec![root.path().to_path_buf()],
        );

        assert_eq!(locator.locate("blog"), None);
        assert_eq!(locator.locate(""), None);
    }
}
