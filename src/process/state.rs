// src/process/state.rs

use std::fmt;

/// Lifecycle of a [`super::ProcessHandle`].
///
/// `Created → Started → {Exited | Killed | LaunchFailed}`. Only `Created`
/// accepts `start`, only `Started` accepts `wait`; the last three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Started,
    /// `code` is `None` when a signal we did not send ended the process.
    Exited { code: Option<i32> },
    Killed,
    LaunchFailed,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Created => f.write_str("created"),
            ProcessState::Started => f.write_str("started"),
            ProcessState::Exited { code: Some(code) } => write!(f, "exited({code})"),
            ProcessState::Exited { code: None } => f.write_str("exited(signal)"),
            ProcessState::Killed => f.write_str("killed"),
            ProcessState::LaunchFailed => f.write_str("launch-failed"),
        }
    }
}
