use std::fmt::Debug;

use tracing::error;

/// Terminates the process once a shutdown is stuck.
pub trait ProcessKiller: Send + Debug {
    /// Kills the process. Never expected to return in production.
    fn kill(&self);
}

/// Kills the current process with `SIGKILL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfTerminate;

impl ProcessKiller for SelfTerminate {
    #[cfg(unix)]
    fn kill(&self) {
        error!(target: "relay::shutdown", "Sending SIGKILL to self");
        // SAFETY: getpid has no preconditions and signalling our own pid cannot touch memory.
        let ret = unsafe { libc::kill(libc::getpid(), libc::SIGKILL) };
        if ret != 0 {
            error!(
                target: "relay::shutdown",
                err = %std::io::Error::last_os_error(),
                "SIGKILL failed, aborting"
            );
            std::process::abort();
        }
    }

    #[cfg(not(unix))]
    fn kill(&self) {
        error!(target: "relay::shutdown", "Aborting process");
        std::process::abort();
    }
}
