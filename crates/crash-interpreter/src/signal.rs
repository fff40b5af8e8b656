//! Interrupt forwarding.
//!
//! Ctrl-C never stops the shell itself. While a child runs, the interrupt is
//! turned into `SIGTERM` for the pid in [`CHILD`](crate::process::CHILD).

use crate::process::{CHILD, write_stdout};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

extern "C" fn forward_interrupt(_signal: libc::c_int) {
    // Only async-signal-safe work here: an atomic load, kill(2) and write(2)
    if let Some(pid) = CHILD.get() {
        let _ = signal::kill(pid, Signal::SIGTERM);
    }
    write_stdout(b"\n");
}

/// Install the `SIGINT` handler for the current process.
///
/// No `SA_RESTART`: a blocking `waitpid` sees `EINTR` and retries on its own.
///
/// # Errors
///
/// Returns the errno from `sigaction` if the handler cannot be installed
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(forward_interrupt),
        SaFlags::empty(),
        SigSet::empty(),
    );
    // SAFETY: the handler only performs async-signal-safe operations
    unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}
