//! Orchestration of the bridge relay.
//!
//! [`Relay`] builds the commitment store and the two chain adapters, wires them together
//! following a [`WiringPlan`] and runs them as a single task group. Shutdown is coordinated by
//! the [`ShutdownSupervisor`]: the first termination signal or task failure cancels every task,
//! and tasks that do not wind down within the grace period get the process killed.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod error;
pub use error::RelayError;

mod metrics;
pub(crate) use metrics::Metrics;

mod relay;
pub use relay::Relay;

pub mod shutdown;
pub use shutdown::{
    DEFAULT_GRACE_PERIOD, ProcessKiller, SelfTerminate, ShutdownError, ShutdownState,
    ShutdownSupervisor, termination_signal,
};

mod wiring;
pub use wiring::{Leg, LegPlan, Side, WiringPlan};

#[cfg(test)]
mod test_utils;
