// src/bundle/mod.rs

//! Bundle model: the executable payload plus the files that travel with it.
//!
//! A bundle comes either from a build output directory ([`Bundle::from_dir`])
//! or, with the `embedded` feature, from data compiled into the binary
//! ([`Bundle::embedded`]). Either way it is materialized into a working
//! directory before the executable can run.

#[cfg(feature = "embedded")]
pub mod embedded;
pub mod payload;
pub mod version;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{Result, TorPrebuiltError};
use crate::fs::FileSystem;
use crate::materialize::{self, MaterializedBundle};

pub use payload::Payload;
pub use version::{package_name, version_from_path};

/// Fixed file name of the materialized executable.
#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "tor.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "tor";

/// Some macOS distributions ship a wrapper script named `tor` next to the
/// real binary; the real binary wins.
const EXECUTABLE_CANDIDATES: [&str; 2] = ["tor.real", EXECUTABLE_NAME];

pub const TORRC: &str = "torrc";
pub const TORRC_DEFAULTS: &str = "torrc-defaults";

/// Config files that must exist in the working directory.
pub const CONFIG_FILES: [&str; 2] = [TORRC_DEFAULTS, TORRC];

/// Options for [`Bundle::from_dir`].
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// Path prefix that config files use for the executable's directory.
    ///
    /// Every occurrence in `torrc` / `torrc-defaults` is replaced with `./`,
    /// so those paths resolve against the working directory.
    pub rewrite_prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Bundle {
    version: Option<String>,
    executable: Payload,
    assets: BTreeMap<PathBuf, Payload>,
}

impl Bundle {
    pub fn new(executable: impl Into<Payload>) -> Self {
        Self {
            version: None,
            executable: executable.into(),
            assets: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a non-executable file, keyed by its path relative to the
    /// working directory.
    pub fn with_asset(mut self, rel_path: impl Into<PathBuf>, data: impl Into<Payload>) -> Self {
        self.assets.insert(rel_path.into(), data.into());
        self
    }

    /// Load a build output directory.
    ///
    /// The executable must sit at the top of `dir`; every other regular file
    /// below `dir` becomes an asset.
    pub fn from_dir<F>(fs: &F, dir: &Path, options: &BundleOptions) -> Result<Self>
    where
        F: FileSystem + ?Sized,
    {
        if !fs.is_dir(dir) {
            return Err(TorPrebuiltError::Config(format!(
                "bundle directory {:?} does not exist",
                dir
            )));
        }

        let mut paths = Vec::new();
        collect_files(fs, dir, dir, &mut paths)?;

        let mut files = Vec::with_capacity(paths.len());
        for rel in paths {
            let data = fs.read(&dir.join(&rel))?;
            debug!(file = ?rel, len = data.len(), "read bundle file");
            files.push((rel, Payload::from(data)));
        }

        Self::from_files(dir, files, options)
    }

    /// Assemble a bundle from files keyed by their path relative to `source`.
    ///
    /// `tor.real` wins over the plain executable name and neither becomes an
    /// asset. `torrc` / `torrc-defaults` get the prefix rewrite from
    /// `options`. The version is read from `source`.
    pub fn from_files<I>(source: &Path, files: I, options: &BundleOptions) -> Result<Self>
    where
        I: IntoIterator<Item = (PathBuf, Payload)>,
    {
        let mut assets: BTreeMap<PathBuf, Payload> = files.into_iter().collect();

        let mut executable = None;
        for candidate in EXECUTABLE_CANDIDATES {
            let found = assets.remove(Path::new(candidate));
            if executable.is_none() {
                executable = found.map(|payload| (candidate, payload));
            }
        }
        let Some((exe_name, executable)) = executable else {
            return Err(TorPrebuiltError::Config(format!(
                "no executable ({}) found in bundle {:?}",
                EXECUTABLE_CANDIDATES.join(" or "),
                source
            )));
        };

        if let Some(prefix) = options.rewrite_prefix.as_deref() {
            for name in CONFIG_FILES {
                if let Some(data) = assets.get_mut(Path::new(name)) {
                    *data = Payload::from(rewrite_prefix(data.bytes().to_vec(), prefix));
                }
            }
        }

        let version = version_from_path(source);
        info!(
            source = ?source,
            version = version.as_deref().unwrap_or("unknown"),
            executable = exe_name,
            assets = assets.len(),
            "loaded bundle"
        );

        Ok(Self {
            version,
            executable,
            assets,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `tor_<x>_<y>_<z>` for versioned bundles, `tor_latest` otherwise.
    pub fn package_name(&self) -> String {
        package_name(self.version())
    }

    pub fn executable(&self) -> &Payload {
        &self.executable
    }

    pub fn assets(&self) -> impl Iterator<Item = (&Path, &Payload)> {
        self.assets.iter().map(|(p, d)| (p.as_path(), d))
    }

    /// Write the bundle into `dir`; see [`materialize::materialize_bundle`].
    pub fn materialize<F>(&self, fs: &F, dir: &Path) -> Result<MaterializedBundle>
    where
        F: FileSystem + ?Sized,
    {
        materialize::materialize_bundle(fs, self, dir)
    }
}

fn collect_files<F>(fs: &F, root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<()>
where
    F: FileSystem + ?Sized,
{
    for path in fs.read_dir(dir)? {
        if fs.is_dir(&path) {
            collect_files(fs, root, &path, out)?;
        } else if fs.is_file(&path) {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

fn rewrite_prefix(data: Vec<u8>, prefix: &str) -> Vec<u8> {
    match String::from_utf8(data) {
        Ok(text) => text.replace(prefix, "./").into_bytes(),
        Err(e) => e.into_bytes(),
    }
}
