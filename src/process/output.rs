// src/process/output.rs

//! Where the child's stdout / stderr go.
//!
//! With [`OutputMode::Log`] both pipes are drained by background Tokio tasks
//! and every line becomes a `tracing` event, so OS pipe buffers never fill.
//! An optional readiness regex is matched against stdout lines.

use std::process::Stdio;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Share the parent's stdout / stderr.
    #[default]
    Inherit,
    /// Discard all output.
    Null,
    /// Pipe output into the log.
    Log,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inherit" => Ok(OutputMode::Inherit),
            "null" => Ok(OutputMode::Null),
            "log" => Ok(OutputMode::Log),
            other => Err(format!(
                "invalid output mode: {other} (expected \"inherit\", \"null\" or \"log\")"
            )),
        }
    }
}

impl OutputMode {
    pub(crate) fn configure(self, cmd: &mut Command) {
        let (out, err) = match self {
            OutputMode::Inherit => (Stdio::inherit(), Stdio::inherit()),
            OutputMode::Null => (Stdio::null(), Stdio::null()),
            OutputMode::Log => (Stdio::piped(), Stdio::piped()),
        };
        cmd.stdin(Stdio::null()).stdout(out).stderr(err);
    }
}

/// Spawn line forwarders for a freshly started child.
///
/// Returns the readiness flag when `ready` is set and stdout is piped.
pub(crate) fn attach(
    child: &mut Child,
    pid: Option<u32>,
    ready: Option<&Regex>,
) -> Option<watch::Receiver<bool>> {
    let mut ready_rx = None;

    if let Some(stdout) = child.stdout.take() {
        let ready_tx = ready.map(|re| {
            let (tx, rx) = watch::channel(false);
            ready_rx = Some(rx);
            (re.clone(), tx)
        });
        spawn_forwarder(stdout, pid, "stdout", ready_tx);
    }

    if let Some(stderr) = child.stderr.take() {
        spawn_forwarder(stderr, pid, "stderr", None);
    }

    ready_rx
}

fn spawn_forwarder<R>(
    stream: R,
    pid: Option<u32>,
    name: &'static str,
    ready: Option<(Regex, watch::Sender<bool>)>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            debug!(pid, stream = name, "{}", line);

            if let Some((re, tx)) = &ready {
                if !*tx.borrow() && re.is_match(&line) {
                    info!(pid, "readiness pattern matched on {}", name);
                    tx.send_replace(true);
                }
            }
        }

        debug!(pid, stream = name, "output forwarder ended");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        assert_eq!("LOG".parse::<OutputMode>(), Ok(OutputMode::Log));
        assert_eq!(" null ".parse::<OutputMode>(), Ok(OutputMode::Null));
        assert!("file".parse::<OutputMode>().is_err());
    }
}
