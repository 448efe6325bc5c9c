// build.rs

//! With the `embedded` feature, generate `$OUT_DIR/embedded_bundle.rs`:
//! `DIR`, the bundle's source directory, and `FILES`, one `include_bytes!`
//! entry per regular file below `$TOR_PREBUILT_DIR` keyed by its
//! `/`-separated relative path.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TOR_PREBUILT_DIR");

    if env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    let dir = env::var("TOR_PREBUILT_DIR")
        .expect("the `embedded` feature needs TOR_PREBUILT_DIR set to a build output directory");
    let dir = fs::canonicalize(&dir)
        .unwrap_or_else(|e| panic!("TOR_PREBUILT_DIR {dir:?} is not usable: {e}"));
    println!("cargo:rerun-if-changed={}", dir.display());

    let mut files = Vec::new();
    collect(&dir, &dir, &mut files).unwrap_or_else(|e| panic!("reading {dir:?}: {e}"));
    files.sort();

    let mut out = String::new();
    writeln!(out, "pub(crate) const DIR: &str = {:?};", dir.to_string_lossy()).unwrap();
    writeln!(out, "pub(crate) static FILES: &[(&str, &[u8])] = &[").unwrap();
    for rel in &files {
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let abs = dir.join(rel);
        writeln!(
            out,
            "    ({key:?}, include_bytes!({:?})),",
            abs.to_string_lossy()
        )
        .unwrap();
    }
    writeln!(out, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("embedded_bundle.rs"), out).expect("writing embedded_bundle.rs");
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(root, &path, out)?;
        } else if path.is_file() {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}
