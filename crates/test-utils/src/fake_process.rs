use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tor_prebuilt::context::Context;
use tor_prebuilt::errors::{Result, TorPrebuiltError};
use tor_prebuilt::process::{ExitReport, Process, ProcessCreator, ProcessState};

/// How a fake process behaves once started.
#[derive(Debug, Clone, Copy)]
pub enum FakeBehaviour {
    /// Exit cleanly right away.
    ExitClean,
    /// Run until the context fires, then report a kill.
    RunUntilCancelled,
    /// Refuse to launch.
    FailLaunch,
}

/// A fake creator that:
/// - records the arguments of every process it creates
/// - hands out processes with a fixed [`FakeBehaviour`].
pub struct FakeCreator {
    behaviour: FakeBehaviour,
    launched: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeCreator {
    pub fn new(behaviour: FakeBehaviour) -> Self {
        Self {
            behaviour,
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Argument lists of all processes created so far.
    pub fn launched(&self) -> Vec<Vec<String>> {
        self.launched.lock().unwrap().clone()
    }
}

impl ProcessCreator for FakeCreator {
    fn new_process(&self, ctx: Context, args: Vec<String>) -> Result<Box<dyn Process>> {
        self.launched.lock().unwrap().push(args);
        Ok(Box::new(FakeProcess {
            behaviour: self.behaviour,
            ctx,
            state: ProcessState::Created,
        }))
    }
}

pub struct FakeProcess {
    behaviour: FakeBehaviour,
    ctx: Context,
    state: ProcessState,
}

impl Process for FakeProcess {
    fn start(&mut self) -> Result<()> {
        if self.state != ProcessState::Created {
            return Err(TorPrebuiltError::InvalidState {
                op: "start",
                state: self.state,
            });
        }
        if let FakeBehaviour::FailLaunch = self.behaviour {
            self.state = ProcessState::LaunchFailed;
            return Err(TorPrebuiltError::Launch {
                exe: PathBuf::from("fake"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "fake launch failure"),
            });
        }
        self.state = ProcessState::Started;
        Ok(())
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(async move {
            if self.state != ProcessState::Started {
                return Err(TorPrebuiltError::InvalidState {
                    op: "wait",
                    state: self.state,
                });
            }
            match self.behaviour {
                FakeBehaviour::RunUntilCancelled => {
                    let cause = self.ctx.done().await;
                    self.state = ProcessState::Killed;
                    Err(TorPrebuiltError::Killed(cause))
                }
                _ => {
                    self.state = ProcessState::Exited { code: Some(0) };
                    Ok(ExitReport {
                        pid: None,
                        code: Some(0),
                        elapsed: Duration::ZERO,
                    })
                }
            }
        })
    }
}
