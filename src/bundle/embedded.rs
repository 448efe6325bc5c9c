// src/bundle/embedded.rs

//! Bundle compiled into the binary.
//!
//! Build with `--features embedded` and `TOR_PREBUILT_DIR` pointing at a
//! build output directory. `build.rs` turns every regular file below it into
//! an `include_bytes!` entry, so shared libraries, geoip data and pluggable
//! transports travel with the executable.

use std::path::{Path, PathBuf};

use super::{Bundle, BundleOptions, Payload};
use crate::errors::Result;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/embedded_bundle.rs"));
}

impl Bundle {
    /// The bundle embedded at compile time.
    ///
    /// Executable choice and torrc rewriting follow [`Bundle::from_dir`].
    pub fn embedded(options: &BundleOptions) -> Result<Bundle> {
        let files = generated::FILES
            .iter()
            .map(|&(rel, data)| (PathBuf::from(rel), Payload::from_static(data)));
        Bundle::from_files(Path::new(generated::DIR), files, options)
    }
}
