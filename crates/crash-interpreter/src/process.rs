//! Child process lifecycle: fork, resolve and exec in the child, wait in the parent.

use crate::resolver::{Resolution, Resolver};
use crash_ast::{ArgVector, CrashError, Origin};
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execv, fork};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::debug;

const NO_CHILD: i32 = -1;

/// The most recently spawned child, read by the interrupt handler.
///
/// Only one pid is tracked. The slot is racy and callers must live with it:
/// an interrupt that lands between `fork` and the store sees the previous
/// value, and a second spawn before the first child exits overwrites the
/// first pid, so that child can no longer be interrupted through the slot.
pub struct ChildSlot(AtomicI32);

impl ChildSlot {
    const fn empty() -> Self {
        Self(AtomicI32::new(NO_CHILD))
    }

    /// Current child, if any. Async-signal-safe.
    pub fn get(&self) -> Option<Pid> {
        match self.0.load(Ordering::SeqCst) {
            NO_CHILD => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }

    fn set(&self, pid: Pid) {
        self.0.store(pid.as_raw(), Ordering::SeqCst);
    }

    /// Clear the slot only if it still holds `pid`
    fn release(&self, pid: Pid) {
        let _ = self
            .0
            .compare_exchange(pid.as_raw(), NO_CHILD, Ordering::SeqCst, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.0.store(NO_CHILD, Ordering::SeqCst);
    }
}

/// Process-wide child slot
pub static CHILD: ChildSlot = ChildSlot::empty();

/// How the parent waits for the child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Block until the child terminates
    Foreground,
    /// Check once without blocking, never reap later
    Background,
}

/// Write straight to fd 1, bypassing std's stdout lock.
///
/// Used where taking a lock is unsafe: inside a signal handler and in a
/// freshly forked child of a possibly multi-threaded parent.
pub(crate) fn write_stdout(bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        // SAFETY: the pointer and length describe a live slice
        let written = unsafe { libc::write(libc::STDOUT_FILENO, rest.as_ptr().cast(), rest.len()) };
        if written <= 0 {
            if written < 0 && Errno::last() == Errno::EINTR {
                continue;
            }
            return;
        }
        rest = &rest[written.unsigned_abs()..];
    }
}

/// Message printed by a child that could not exec its command
#[must_use]
pub fn not_found_message(closest: &str) -> String {
    format!("Command not found\nDid you mean: {closest}?\n")
}

/// Fork and run `argv` in the child.
///
/// Returns the child's exit code for foreground commands (128 + signal
/// number when it was killed) and `None` for background ones.
///
/// # Errors
///
/// Returns `CrashError::Fork` if the process cannot be duplicated and
/// `CrashError::Wait` if waiting on the child fails
pub fn spawn(
    argv: &ArgVector,
    resolver: &Resolver,
    mode: WaitMode,
    origin: &Origin,
) -> Result<Option<i32>, CrashError> {
    // SAFETY: the child only resolves, execs and `_exit`s. It never returns
    // into the caller and never takes std's stdout lock.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(argv, resolver),
        Ok(ForkResult::Parent { child }) => {
            CHILD.set(child);
            debug!(pid = child.as_raw(), command = argv.command(), ?mode, "spawned");
            wait_for(child, mode, origin)
        }
        Err(errno) => Err(CrashError::Fork {
            reason: errno.desc().to_string(),
            origin: origin.clone(),
        }),
    }
}

fn wait_for(child: Pid, mode: WaitMode, origin: &Origin) -> Result<Option<i32>, CrashError> {
    let wait_error = |errno: Errno| CrashError::Wait {
        pid: child.as_raw(),
        reason: errno.desc().to_string(),
        origin: origin.clone(),
    };

    match mode {
        WaitMode::Background => {
            let status = waitpid(child, Some(WaitPidFlag::WNOHANG)).map_err(wait_error)?;
            debug!(pid = child.as_raw(), ?status, "background poll");
            Ok(None)
        }
        WaitMode::Foreground => {
            let status = loop {
                match waitpid(child, None) {
                    // The interrupt handler runs while we block here
                    Err(Errno::EINTR) => {}
                    Ok(WaitStatus::StillAlive) => {}
                    other => break other,
                }
            };
            CHILD.release(child);
            let status = status.map_err(wait_error)?;
            debug!(pid = child.as_raw(), ?status, "reaped");
            Ok(Some(exit_code_of(status)))
        }
    }
}

fn exit_code_of(status: WaitStatus) -> i32 {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => 128 + signal as i32,
        _ => 0,
    }
}

/// Child side of `spawn`. Never returns.
fn run_child(argv: &ArgVector, resolver: &Resolver) -> ! {
    // The inherited handler would forward interrupts to a stale pid
    // SAFETY: restoring the default disposition is always sound
    let _ = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) };
    CHILD.clear();

    let search_path = std::env::var("PATH").unwrap_or_default();
    let resolution = resolver.resolve(argv.command(), &search_path);
    exec_resolved(argv, &resolution);

    write_stdout(not_found_message(&resolution.closest).as_bytes());
    // SAFETY: `_exit` skips atexit handlers and stdio flushing that belong to the parent
    unsafe { libc::_exit(1) }
}

/// Replace the process image. Returns only if that was impossible.
fn exec_resolved(argv: &ArgVector, resolution: &Resolution) {
    let Some(path) = &resolution.found else {
        return;
    };
    let Ok(path) = CString::new(path.as_os_str().as_bytes()) else {
        return;
    };
    let Ok(exec_args) = argv.to_exec_args() else {
        return;
    };

    let view = exec_args.view();
    let _ = execv(&path, view.as_slice());
}
