// src/process/creator.rs

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::bundle::Bundle;
use crate::context::Context;
use crate::errors::{Result, TorPrebuiltError};
use crate::fs::FileSystem;

use super::handle::ProcessHandle;
use super::output::OutputMode;
use super::{Process, ProcessCreator};

/// Binds an executable and its working directory; hands out
/// [`ProcessHandle`]s for individual runs.
#[derive(Debug, Clone)]
pub struct Creator {
    exe: PathBuf,
    work_dir: PathBuf,
    output: OutputMode,
    ready_pattern: Option<Regex>,
}

impl Creator {
    /// Use an executable that is already on disk. The process runs in
    /// `work_dir`, so relative config paths resolve against it.
    pub fn new(exe: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            work_dir: work_dir.into(),
            output: OutputMode::default(),
            ready_pattern: None,
        }
    }

    /// Materialize `bundle` into `work_dir` and bind the resulting executable.
    pub fn from_bundle<F>(fs: &F, bundle: &Bundle, work_dir: &Path) -> Result<Self>
    where
        F: FileSystem + ?Sized,
    {
        let out = bundle.materialize(fs, work_dir)?;
        Ok(Self::new(out.executable, out.work_dir))
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Flag the process ready when a stdout line matches `pattern`.
    ///
    /// Only effective with [`OutputMode::Log`].
    pub fn with_ready_pattern(mut self, pattern: Regex) -> Self {
        self.ready_pattern = Some(pattern);
        self
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Bind `ctx` and `args` to a new, not yet started handle.
    pub fn new_handle<I, S>(&self, ctx: Context, args: I) -> Result<ProcessHandle>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.exe.is_file() {
            return Err(TorPrebuiltError::Config(format!(
                "executable not found at {:?}",
                self.exe
            )));
        }
        if !self.work_dir.is_dir() {
            return Err(TorPrebuiltError::Config(format!(
                "working directory {:?} does not exist",
                self.work_dir
            )));
        }

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        debug!(exe = ?self.exe, args = ?args, "created process handle");

        Ok(ProcessHandle::new(
            self.exe.clone(),
            self.work_dir.clone(),
            args,
            ctx,
            self.output,
            self.ready_pattern.clone(),
        ))
    }
}

impl ProcessCreator for Creator {
    fn new_process(&self, ctx: Context, args: Vec<String>) -> Result<Box<dyn Process>> {
        Ok(Box::new(self.new_handle(ctx, args)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let creator = Creator::new(dir.path().join("tor"), dir.path());

        match creator.new_handle(Context::background(), ["--version"]) {
            Err(TorPrebuiltError::Config(msg)) => assert!(msg.contains("executable not found")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
