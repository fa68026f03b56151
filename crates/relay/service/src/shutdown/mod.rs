//! Coordinated shutdown of the relay.
//!
//! A termination signal or the first task failure cancels the relay's [`TaskGroup`]. The
//! [`ShutdownSupervisor`] then gives every task a grace period to wind down and kills the process
//! through a [`ProcessKiller`] if they do not.
//!
//! [`TaskGroup`]: bridge_relay_core::TaskGroup

mod killer;
pub use killer::{ProcessKiller, SelfTerminate};

mod signal;
pub use signal::termination_signal;

mod supervisor;
pub use supervisor::{DEFAULT_GRACE_PERIOD, ShutdownError, ShutdownState, ShutdownSupervisor};
