use std::{fmt, future::Future, time::Duration};

use bridge_relay_core::{TaskError, TaskGroup};
use thiserror::Error;
use tokio::{sync::oneshot, time::timeout};
use tracing::{error, info, warn};

use crate::{Metrics, shutdown::ProcessKiller};

/// Default time tasks get to wind down once the relay is cancelled.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Lifecycle of a running relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownState {
    /// Tasks are running.
    Running,
    /// Tasks were cancelled and are winding down.
    Draining,
    /// Every task completed.
    Terminated,
    /// Tasks failed to complete within the grace period, the process was killed.
    Killed,
}

impl ShutdownState {
    /// Config and metric label of the state.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
            Self::Killed => "killed",
        }
    }

    /// Returns true for states the relay never leaves.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Killed)
    }

    const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining) |
                (Self::Draining, Self::Terminated) |
                (Self::Draining, Self::Killed)
        )
    }
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors of the shutdown state machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ShutdownError {
    /// The requested transition is not allowed from the current state.
    #[error("invalid shutdown transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: ShutdownState,
        /// Requested state.
        to: ShutdownState,
    },
}

/// Watches the relay's task group and escalates a stuck shutdown into killing the process.
#[derive(Debug)]
pub struct ShutdownSupervisor<K> {
    grace_period: Duration,
    killer: K,
    state: ShutdownState,
}

impl<K: ProcessKiller> ShutdownSupervisor<K> {
    /// Creates a supervisor in [`ShutdownState::Running`].
    pub const fn new(grace_period: Duration, killer: K) -> Self {
        Self { grace_period, killer, state: ShutdownState::Running }
    }

    /// Current state.
    pub const fn state(&self) -> ShutdownState {
        self.state
    }

    /// Grace period of the drain.
    pub const fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Moves to `next` if the transition is allowed.
    pub fn transition(&mut self, next: ShutdownState) -> Result<(), ShutdownError> {
        if !self.state.can_transition_to(next) {
            return Err(ShutdownError::InvalidTransition { from: self.state, to: next });
        }
        info!(target: "relay::shutdown", from = %self.state, to = %next, "Shutdown state changed");
        self.state = next;
        Ok(())
    }

    fn enter(&mut self, next: ShutdownState) {
        if let Err(err) = self.transition(next) {
            warn!(target: "relay::shutdown", %err, "Ignoring shutdown transition");
        }
    }

    /// Spawns the listener cancelling `tasks` once `signal` resolves.
    pub fn listen<F>(&self, tasks: &mut TaskGroup, signal: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = tasks.token();
        tasks.spawn("signal-listener", async move {
            tokio::select! {
                _ = signal => {
                    info!(target: "relay::shutdown", "Received termination signal, shutting down");
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
            Ok(())
        });
    }

    /// Waits for `tasks` to be cancelled, then for them to drain.
    ///
    /// Tasks still running `grace_period` after cancellation are considered deadlocked:
    /// `stop_adapters` is called and the process is killed.
    pub async fn supervise(
        &mut self,
        tasks: TaskGroup,
        stop_adapters: impl FnOnce(),
    ) -> ShutdownState {
        let cancel = tasks.token();
        let (done_tx, mut done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = done_tx.send(tasks.wait().await);
        });

        let finished = tokio::select! {
            biased;
            result = &mut done_rx => Some(result),
            _ = cancel.cancelled() => None,
        };

        self.enter(ShutdownState::Draining);
        cancel.cancel();

        let finished = match finished {
            Some(result) => Some(result),
            None => timeout(self.grace_period, &mut done_rx).await.ok(),
        };

        let state = match finished {
            Some(result) => {
                match result.unwrap_or_else(|_| Err(TaskError::Join("task group waiter".into()))) {
                    Err(err) if !err.is_cancelled() => {
                        error!(target: "relay::shutdown", %err, "Encountered an unrecoverable failure");
                    }
                    _ => {}
                }
                ShutdownState::Terminated
            }
            None => return self.kill(stop_adapters),
        };
        self.finish(state)
    }

    /// Kills the process of a relay that did not wind down within the grace period, after
    /// `stop_adapters`.
    pub fn kill(&mut self, stop_adapters: impl FnOnce()) -> ShutdownState {
        if self.state == ShutdownState::Running {
            self.enter(ShutdownState::Draining);
        }
        error!(
            target: "relay::shutdown",
            grace_period = ?self.grace_period,
            "Tasks appear deadlocked. Killing process"
        );
        stop_adapters();
        self.finish(ShutdownState::Killed)
    }

    fn finish(&mut self, state: ShutdownState) -> ShutdownState {
        self.enter(state);
        Metrics::record_shutdown(state);
        if state == ShutdownState::Killed {
            self.killer.kill();
        }
        state
    }
}
