//! Shell-script payloads standing in for a real executable.
//!
//! Writing an executable and exec'ing it from a multi-threaded test binary
//! can fail with `ETXTBSY` when another test forks while the file is still
//! open for writing. Tests hold [`spawn_guard`] around both materializing a
//! payload and starting a process.

use std::sync::{Mutex, MutexGuard};

use tor_prebuilt::bundle::Payload;

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

pub fn spawn_guard() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// A payload that prints a version line and exits 0.
pub fn version_payload() -> Payload {
    Payload::from_static(b"#!/bin/sh\necho \"Tor version 0.4.8.9.\"\nexit 0\n")
}

/// A payload that exits with `code` right away.
pub fn exit_payload(code: i32) -> Payload {
    Payload::from(format!("#!/bin/sh\nexit {code}\n").into_bytes())
}

/// A payload that runs far longer than any test.
pub fn long_running_payload() -> Payload {
    Payload::from_static(b"#!/bin/sh\nexec sleep 30\n")
}

/// A payload that prints its working directory and arguments, one per line,
/// into `out.txt` inside the working directory.
pub fn echo_args_payload() -> Payload {
    Payload::from_static(b"#!/bin/sh\npwd > out.txt\nfor a in \"$@\"; do echo \"$a\" >> out.txt; done\n")
}

/// A payload that prints `line` on stdout and then keeps running.
pub fn announce_then_sleep_payload(line: &str) -> Payload {
    Payload::from(format!("#!/bin/sh\necho \"{line}\"\nexec sleep 30\n").into_bytes())
}
