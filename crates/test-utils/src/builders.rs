#![allow(dead_code)]

use std::path::PathBuf;

use tor_prebuilt::config::{ConfigFile, RawConfigFile};
use tor_prebuilt::process::OutputMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.launcher.work_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.launcher.timeout = Some(timeout.to_string());
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.config.launcher.output = output;
        self
    }

    pub fn ready_on_stdout(mut self, pattern: &str) -> Self {
        self.config.launcher.ready_on_stdout = Some(pattern.to_string());
        self
    }

    pub fn bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.bundle.dir = Some(dir.into());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.config.tor.args.push(arg.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
