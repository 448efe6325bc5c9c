// src/process/mod.rs

//! Process supervision.
//!
//! - [`Creator`] binds an executable + working directory and creates handles.
//! - [`ProcessHandle`] owns one child process: `start`, then `wait`, with the
//!   bound [`crate::context::Context`] able to kill it.
//! - [`ProcessCreator`] / [`Process`] are the object-safe seam the launcher
//!   talks to, so tests can run it against fake processes.

pub mod creator;
pub mod handle;
pub mod output;
pub mod state;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::context::Context;
use crate::errors::Result;

pub use creator::Creator;
pub use handle::ProcessHandle;
pub use output::OutputMode;
pub use state::ProcessState;

/// Result of a clean (zero) exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub pid: Option<u32>,
    pub code: Option<i32>,
    pub elapsed: Duration,
}

/// A process that can be started once and waited on once.
pub trait Process: Send {
    fn start(&mut self) -> Result<()>;

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>>;
}

/// Creates processes bound to a cancellation context.
pub trait ProcessCreator: Send + Sync {
    fn new_process(&self, ctx: Context, args: Vec<String>) -> Result<Box<dyn Process>>;
}

impl Process for ProcessHandle {
    fn start(&mut self) -> Result<()> {
        ProcessHandle::start(self)
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(ProcessHandle::wait(self))
    }
}
