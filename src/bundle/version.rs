// src/bundle/version.rs

//! Version detection for build output directories.
//!
//! Build output lands in directories like `out/linux/0.4.8.9`; the first
//! `major.minor.patch` triple found in the path is the bundle version.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+)").expect("version regex is valid"))
}

/// First `x.y.z` version found in `s`.
pub fn find_version(s: &str) -> Option<String> {
    version_regex().find(s).map(|m| m.as_str().to_string())
}

/// First `x.y.z` version found anywhere in `path`.
pub fn version_from_path(path: &Path) -> Option<String> {
    find_version(&path.to_string_lossy())
}

/// Package name for a bundle version: `0.4.8` becomes `tor_0_4_8`.
///
/// Unversioned bundles are called `tor_latest`.
pub fn package_name(version: Option<&str>) -> String {
    match version {
        Some(v) => format!("tor_{}", v.replace('.', "_")),
        None => "tor_latest".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_triple_in_path() {
        assert_eq!(
            version_from_path(Path::new("out/linux/0.4.8.9")),
            Some("0.4.8".to_string())
        );
        assert_eq!(
            find_version("tor-browser-linux64-8.0.8_en-US.tar.xz"),
            Some("8.0.8".to_string())
        );
        assert_eq!(find_version("out/linux/latest"), None);
    }

    #[test]
    fn package_names() {
        assert_eq!(package_name(Some("0.4.8")), "tor_0_4_8");
        assert_eq!(package_name(None), "tor_latest");
    }
}
