// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::bundle::{TORRC, TORRC_DEFAULTS};
use crate::process::OutputMode;

/// Launcher configuration as read from a TOML file.
///
/// ```toml
/// [launcher]
/// work_dir = "/var/lib/tor-prebuilt"
/// timeout = "30s"
/// output = "log"
/// ready_on_stdout = "Bootstrapped 100%"
///
/// [bundle]
/// dir = "out/linux/0.4.8.9"
/// rewrite_prefix = "./TorBrowser/Tor/"
///
/// [tor]
/// torrc = "torrc"
/// defaults_torrc = "torrc-defaults"
/// args = ["--SocksPort", "9050"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub launcher: LauncherSection,

    #[serde(default)]
    pub bundle: BundleSection,

    #[serde(default)]
    pub tor: TorSection,
}

/// `[launcher]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LauncherSection {
    /// Where the bundle is materialized and the process runs.
    ///
    /// Defaults to `<temp>/tor-prebuilt/<package name>`.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Kill the process after this long, e.g. `"30s"`, `"250ms"`, `"2h"`.
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub output: OutputMode,

    /// Regex marking the process ready when it matches a stdout line.
    /// Requires `output = "log"`.
    #[serde(default)]
    pub ready_on_stdout: Option<String>,
}

/// `[bundle]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleSection {
    /// Build output directory holding the executable and its files.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub rewrite_prefix: Option<String>,
}

/// `[tor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TorSection {
    #[serde(default = "default_torrc")]
    pub torrc: String,

    #[serde(default = "default_defaults_torrc")]
    pub defaults_torrc: String,

    /// Extra arguments appended after the torrc flags.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_torrc() -> String {
    TORRC.to_string()
}

fn default_defaults_torrc() -> String {
    TORRC_DEFAULTS.to_string()
}

impl Default for TorSection {
    fn default() -> Self {
        Self {
            torrc: default_torrc(),
            defaults_torrc: default_defaults_torrc(),
            args: Vec::new(),
        }
    }
}

/// Validated configuration.
///
/// Obtained through `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub work_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub output: OutputMode,
    pub ready_on_stdout: Option<Regex>,
    pub bundle_dir: Option<PathBuf>,
    pub rewrite_prefix: Option<String>,
    pub torrc: String,
    pub defaults_torrc: String,
    pub args: Vec<String>,
}

impl ConfigFile {
    /// Startup arguments: `-f <torrc> --defaults-torrc <defaults>` followed
    /// by the configured extra arguments.
    pub fn tor_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.torrc.clone(),
            "--defaults-torrc".to_string(),
            self.defaults_torrc.clone(),
        ];
        args.extend(self.args.iter().cloned());
        args
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let tor = TorSection::default();
        Self {
            work_dir: None,
            timeout: None,
            output: OutputMode::default(),
            ready_on_stdout: None,
            bundle_dir: None,
            rewrite_prefix: None,
            torrc: tor.torrc,
            defaults_torrc: tor.defaults_torrc,
            args: tor.args,
        }
    }
}
