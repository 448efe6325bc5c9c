// src/process/handle.rs

//! A single supervised child process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::SystemTime;

use regex::Regex;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::context::{Context, ContextError};
use crate::errors::{Result, TorPrebuiltError};

use super::output::{self, OutputMode};
use super::{ExitReport, ProcessState};

/// Runtime record for one child process.
///
/// Created in [`ProcessState::Created`] by [`super::Creator::new_process`].
/// The child is killed if the handle is dropped while it is still running.
#[derive(Debug)]
pub struct ProcessHandle {
    exe: PathBuf,
    work_dir: PathBuf,
    args: Vec<String>,
    ctx: Context,
    output: OutputMode,
    ready_pattern: Option<Regex>,

    state: ProcessState,
    child: Option<Child>,
    pid: Option<u32>,
    started_at: Option<SystemTime>,
    started: Option<Instant>,
    ready: Option<watch::Receiver<bool>>,
}

enum Race {
    Exited(io::Result<ExitStatus>),
    Cancelled(ContextError),
}

impl ProcessHandle {
    pub(crate) fn new(
        exe: PathBuf,
        work_dir: PathBuf,
        args: Vec<String>,
        ctx: Context,
        output: OutputMode,
        ready_pattern: Option<Regex>,
    ) -> Self {
        Self {
            exe,
            work_dir,
            args,
            ctx,
            output,
            ready_pattern,
            state: ProcessState::Created,
            child: None,
            pid: None,
            started_at: None,
            started: None,
            ready: None,
        }
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    /// Readiness flag, present once started with [`OutputMode::Log`] and a
    /// readiness pattern. Flips to `true` on the first matching stdout line.
    pub fn ready(&self) -> Option<watch::Receiver<bool>> {
        self.ready.clone()
    }

    /// Launch the OS process.
    ///
    /// Must be called from within a Tokio runtime. Accepted only in
    /// [`ProcessState::Created`]; a context that already fired prevents the
    /// launch.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ProcessState::Created {
            return Err(TorPrebuiltError::InvalidState {
                op: "start",
                state: self.state,
            });
        }

        if let Some(cause) = self.ctx.err() {
            self.state = ProcessState::LaunchFailed;
            warn!(exe = ?self.exe, cause = %cause, "context done before launch");
            return Err(TorPrebuiltError::Launch {
                exe: self.exe.clone(),
                source: io::Error::new(io::ErrorKind::Interrupted, cause),
            });
        }

        let mut cmd = Command::new(&self.exe);
        cmd.args(&self.args)
            .current_dir(&self.work_dir)
            .kill_on_drop(true);
        self.output.configure(&mut cmd);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                self.state = ProcessState::LaunchFailed;
                warn!(exe = ?self.exe, error = %source, "failed to launch process");
                return Err(TorPrebuiltError::Launch {
                    exe: self.exe.clone(),
                    source,
                });
            }
        };

        self.pid = child.id();
        self.started_at = Some(SystemTime::now());
        self.started = Some(Instant::now());
        self.ready = output::attach(&mut child, self.pid, self.ready_pattern.as_ref());
        self.child = Some(child);
        self.state = ProcessState::Started;

        info!(
            pid = self.pid,
            exe = ?self.exe,
            work_dir = ?self.work_dir,
            args = ?self.args,
            "process started"
        );
        Ok(())
    }

    /// Wait for the process to exit, killing it if the context fires first.
    ///
    /// - clean exit: `Ok(ExitReport)`
    /// - non-zero exit: [`TorPrebuiltError::RuntimeExit`]
    /// - killed because the context fired: [`TorPrebuiltError::Killed`]
    ///
    /// Accepted only in [`ProcessState::Started`]. The child is always reaped
    /// before this returns.
    pub async fn wait(&mut self) -> Result<ExitReport> {
        if self.state != ProcessState::Started {
            return Err(TorPrebuiltError::InvalidState {
                op: "wait",
                state: self.state,
            });
        }
        let Some(mut child) = self.child.take() else {
            return Err(TorPrebuiltError::InvalidState {
                op: "wait",
                state: self.state,
            });
        };

        // An exit that is already observable wins over a concurrent cancel.
        let race = tokio::select! {
            biased;
            status = child.wait() => Race::Exited(status),
            cause = self.ctx.done() => Race::Cancelled(cause),
        };

        match race {
            Race::Exited(status) => self.finish(status),
            Race::Cancelled(cause) => {
                info!(pid = self.pid, cause = %cause, "context done; killing process");
                let kill_sent = match child.start_kill() {
                    Ok(()) => true,
                    Err(e) => {
                        // Already exited; nothing to kill.
                        debug!(pid = self.pid, error = %e, "kill not delivered");
                        false
                    }
                };

                let status = child.wait().await;
                match status {
                    Ok(status) if kill_sent && terminated_by_kill(&status) => {
                        self.state = ProcessState::Killed;
                        info!(pid = self.pid, "process killed");
                        Err(TorPrebuiltError::Killed(cause))
                    }
                    other => self.finish(other),
                }
            }
        }
    }

    fn finish(&mut self, status: io::Result<ExitStatus>) -> Result<ExitReport> {
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                self.state = ProcessState::Exited { code: None };
                warn!(pid = self.pid, error = %e, "failed to wait for process");
                return Err(TorPrebuiltError::Io(e));
            }
        };

        let code = status.code();
        self.state = ProcessState::Exited { code };
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();

        info!(
            pid = self.pid,
            exit_code = code,
            success = status.success(),
            elapsed_ms = elapsed.as_millis() as u64,
            "process exited"
        );

        if status.success() {
            Ok(ExitReport {
                pid: self.pid,
                code,
                elapsed,
            })
        } else {
            Err(TorPrebuiltError::RuntimeExit { status })
        }
    }
}

/// Whether the exit status is the result of our kill request rather than a
/// normal exit that raced with it.
#[cfg(unix)]
fn terminated_by_kill(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal().is_some()
}

#[cfg(not(unix))]
fn terminated_by_kill(_status: &ExitStatus) -> bool {
    true
}
