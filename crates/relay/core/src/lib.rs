//! Core types of the bridge relay.
//!
//! The relay is built from two chain adapters, one per side of the bridge, and a commitment
//! store. This crate defines the contract between those pieces:
//!
//! - [`Chain`], the capability set every adapter implements;
//! - the channels the relay wires adapters with ([`channel`]);
//! - [`TaskGroup`], the cancellable group every long running task is spawned into;
//! - [`CommitmentStore`] and the [`StoreCommand`]s adapters enqueue for it;
//! - the relay [`config`].

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod chain;
pub use chain::{Chain, ChainError, HeadRecord, Header, Init, Message, MessageBatch};

pub mod channel;
pub use channel::{
    COMMITMENT_CHANNEL_CAPACITY, ChannelClosed, CommitmentReceiver, CommitmentSender,
    HeaderReceiver, HeaderSender, MESSAGE_CHANNEL_CAPACITY, MessageReceiver, MessageSender,
};

pub mod config;
pub use config::{ConfigError, Credentials, Direction, RelayConfig};

mod retry;
pub use retry::{Backoff, RetryError, retry_with_backoff};

mod store;
pub use store::{
    BeefyRecord, BeefyStatus, BeefyUpdate, CommitmentStore, StoreCommand, StoreError,
};

mod task;
pub use task::{BoxError, TaskError, TaskGroup};
