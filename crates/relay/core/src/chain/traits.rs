use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::{
    ChainError, CommitmentSender, HeaderReceiver, HeaderSender, Init, MessageReceiver,
    MessageSender, TaskGroup,
};

/// One side of the bridge.
///
/// The relay owns exactly two adapters, one per chain, and wires them together with channels
/// before starting them. An adapter that observes new finality on its native chain pushes heads
/// and message batches into the channels registered with [`Chain::set_receiver`]; an adapter
/// that submits to its native chain drains the channels registered with [`Chain::set_sender`].
///
/// Adapters must send a head on its (rendezvous) head channel and see that send complete before
/// they hand over any message batch finalized under that head.
#[async_trait]
pub trait Chain: Send + Sync + Debug {
    /// Name of the chain, used for diagnostics.
    fn name(&self) -> &str;

    /// Registers the channels this adapter reads from and forwards onto its own chain.
    ///
    /// `messages` is `None` when the leg runs in headers-only mode.
    fn set_sender(
        &mut self,
        messages: Option<MessageReceiver>,
        headers: Option<HeaderReceiver>,
        commitments: CommitmentSender,
    ) -> Result<(), ChainError>;

    /// Registers the channels this adapter populates from its native chain.
    fn set_receiver(
        &mut self,
        messages: Option<MessageSender>,
        headers: Option<HeaderSender>,
        commitments: CommitmentSender,
    ) -> Result<(), ChainError>;

    /// Spawns the adapter tasks into `tasks` and exchanges the init handshake with the
    /// counterpart adapter.
    ///
    /// `outbound` may be sent right away, but `inbound` must only be awaited from a spawned task
    /// that also selects on the group's cancellation token: adapters are started one after the
    /// other, so the counterpart's init never arrives while this call is pending. A start still
    /// pending once the relay is cancelled and its grace period has passed gets the process
    /// killed.
    ///
    /// Only unrecoverable setup failures are returned here. Failures after start are reported
    /// by the spawned tasks through the task group.
    async fn start(
        &mut self,
        tasks: &mut TaskGroup,
        inbound: oneshot::Receiver<Init>,
        outbound: oneshot::Sender<Init>,
    ) -> Result<(), ChainError>;

    /// Requests the adapter to stop. Idempotent and non-blocking.
    fn stop(&self);
}
