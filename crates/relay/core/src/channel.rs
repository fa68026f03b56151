//! Channels connecting the two adapters and the commitment store.
//!
//! Head channels are rendezvous channels: [`RendezvousSender::send`] only completes once the
//! receiving adapter has taken the value. Message and commitment channels are bounded with a
//! single slot.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::{Header, MessageBatch, StoreCommand};

/// Capacity of every message channel.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 1;

/// Capacity of the commitment channel shared by both adapters.
pub const COMMITMENT_CHANNEL_CAPACITY: usize = 1;

/// The receiving side of a channel went away.
#[derive(Debug, Clone, Copy, Default, Error, PartialEq, Eq)]
#[error("channel closed")]
pub struct ChannelClosed;

/// Sending half of a rendezvous channel.
#[derive(Debug)]
pub struct RendezvousSender<T> {
    inner: mpsc::Sender<(T, oneshot::Sender<()>)>,
}

impl<T> Clone for RendezvousSender<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Send> RendezvousSender<T> {
    /// Sends a value and waits until the receiver has taken it.
    pub async fn send(&self, value: T) -> Result<(), ChannelClosed> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.inner.send((value, ack_tx)).await.map_err(|_| ChannelClosed)?;
        ack_rx.await.map_err(|_| ChannelClosed)
    }

    /// Returns true if the receiver was dropped.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Receiving half of a rendezvous channel.
#[derive(Debug)]
pub struct RendezvousReceiver<T> {
    inner: mpsc::Receiver<(T, oneshot::Sender<()>)>,
}

impl<T> RendezvousReceiver<T> {
    /// Takes the next value, releasing its sender. Returns `None` once every sender is gone.
    ///
    /// Cancel safe.
    pub async fn recv(&mut self) -> Option<T> {
        let (value, ack) = self.inner.recv().await?;
        // The sender may have given up waiting, nothing to release then.
        let _ = ack.send(());
        Some(value)
    }

    /// Closes the channel, pending and future sends fail.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

/// Creates a rendezvous channel.
pub fn rendezvous<T>() -> (RendezvousSender<T>, RendezvousReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (RendezvousSender { inner: tx }, RendezvousReceiver { inner: rx })
}

/// Sends heads to the destination adapter.
pub type HeaderSender = RendezvousSender<Header>;
/// Receives heads from the source adapter.
pub type HeaderReceiver = RendezvousReceiver<Header>;
/// Sends message batches to the destination adapter.
pub type MessageSender = mpsc::Sender<MessageBatch>;
/// Receives message batches from the source adapter.
pub type MessageReceiver = mpsc::Receiver<MessageBatch>;
/// Enqueues commands for the commitment store.
pub type CommitmentSender = mpsc::Sender<StoreCommand>;
/// Commitment store side of the commitment channel.
pub type CommitmentReceiver = mpsc::Receiver<StoreCommand>;

/// Creates a head channel.
pub fn header_channel() -> (HeaderSender, HeaderReceiver) {
    rendezvous()
}

/// Creates a message channel.
pub fn message_channel() -> (MessageSender, MessageReceiver) {
    mpsc::channel(MESSAGE_CHANNEL_CAPACITY)
}

/// Creates the commitment channel.
pub fn commitment_channel() -> (CommitmentSender, CommitmentReceiver) {
    mpsc::channel(COMMITMENT_CHANNEL_CAPACITY)
}
