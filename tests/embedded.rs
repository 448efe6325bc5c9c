// tests/embedded.rs

#![cfg(feature = "embedded")]

mod common;
use crate::common::scripts::spawn_guard;

use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use tor_prebuilt::bundle::{Bundle, BundleOptions, EXECUTABLE_NAME, TORRC, TORRC_DEFAULTS};
use tor_prebuilt::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

fn options() -> BundleOptions {
    BundleOptions {
        rewrite_prefix: Some("./TorBrowser/Tor/".to_string()),
    }
}

fn digests(bundle: &Bundle) -> BTreeMap<PathBuf, String> {
    bundle
        .assets()
        .map(|(path, data)| (path.to_path_buf(), data.digest()))
        .collect()
}

#[test]
fn embedded_bundle_matches_its_build_dir() -> TestResult {
    let dir = Path::new(env!("TOR_PREBUILT_DIR"));

    let embedded = Bundle::embedded(&options())?;
    let loaded = Bundle::from_dir(&RealFileSystem, dir, &options())?;

    assert_eq!(embedded.version(), loaded.version());
    assert_eq!(embedded.executable().digest(), loaded.executable().digest());
    assert_eq!(digests(&embedded), digests(&loaded));

    Ok(())
}

#[test]
fn embedded_bundle_materializes_every_file() -> TestResult {
    let embedded = Bundle::embedded(&options())?;
    let work = tempfile::tempdir()?;

    let out = {
        let _g = spawn_guard();
        embedded.materialize(&RealFileSystem, work.path())?
    };

    assert_eq!(out.executable, work.path().join(EXECUTABLE_NAME));
    for (rel, data) in embedded.assets() {
        assert_eq!(std::fs::read(work.path().join(rel))?, data.bytes());
    }
    assert!(work.path().join(TORRC).is_file());
    assert!(work.path().join(TORRC_DEFAULTS).is_file());

    Ok(())
}
