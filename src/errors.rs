// src/errors.rs

//! Crate-wide error type.
//!
//! Callers tell the outcomes apart structurally:
//! - the process never started: [`TorPrebuiltError::Launch`]
//! - the process ran and failed: [`TorPrebuiltError::RuntimeExit`]
//! - the process was killed because its context fired: [`TorPrebuiltError::Killed`]

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::context::ContextError;
use crate::process::ProcessState;

#[derive(Error, Debug)]
pub enum TorPrebuiltError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("materializing {path:?}: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("launching {exe:?}: {source}")]
    Launch {
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("process exited unsuccessfully: {status}")]
    RuntimeExit { status: ExitStatus },

    #[error("process killed: {0}")]
    Killed(ContextError),

    #[error("cannot {op} a process in state {state}")]
    InvalidState {
        op: &'static str,
        state: ProcessState,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TorPrebuiltError {
    /// True when the process was terminated because its context fired.
    pub fn is_killed(&self) -> bool {
        matches!(self, TorPrebuiltError::Killed(_))
    }

    /// True when no OS process was ever created.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, TorPrebuiltError::Launch { .. })
    }

    /// Exit code of a process that ran and exited non-zero.
    ///
    /// `None` for every other error, and for processes terminated by a
    /// signal we did not send.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            TorPrebuiltError::RuntimeExit { status } => status.code(),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TorPrebuiltError>;
