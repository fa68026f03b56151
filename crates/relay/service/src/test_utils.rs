//! Scripted adapters and store recording what the relay asks of them.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy_primitives::Bytes;
use async_trait::async_trait;
use bridge_relay_core::{
    Chain, ChainError, ChannelClosed, CommitmentReceiver, CommitmentSender, CommitmentStore,
    HeaderReceiver, HeaderSender, Init, MessageReceiver, MessageSender, StoreCommand, StoreError,
    TaskError, TaskGroup,
};
use mockall::mock;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::shutdown::ProcessKiller;

mock! {
    #[derive(Debug)]
    pub Killer {}

    impl ProcessKiller for Killer {
        fn kill(&self);
    }
}

/// Ordered log of everything the relay did to the recording components.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::default()
    }

    pub(crate) fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, event: &str) -> bool {
        self.events.lock().unwrap().iter().any(|e| e == event)
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub(crate) fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }
}

/// How a [`RecordingChain`]'s main task behaves once started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Behaviour {
    /// Runs until cancelled or stopped.
    #[default]
    Cooperative,
    /// Never returns.
    Stubborn,
    /// Fails after the given delay.
    FailAfter(Duration),
    /// Fails to start.
    FailStart,
    /// Waits for the counterpart's init inside `start`.
    AwaitInit,
}

type Readers = (Option<MessageReceiver>, Option<HeaderReceiver>);
type Writers = (Option<MessageSender>, Option<HeaderSender>);

/// Chain adapter recording its lifecycle into an [`EventLog`].
#[derive(Debug)]
pub(crate) struct RecordingChain {
    name: &'static str,
    log: Arc<EventLog>,
    behaviour: Behaviour,
    readers: Option<Readers>,
    writers: Option<Writers>,
    commitments: Option<CommitmentSender>,
    witness: Option<StoreCommand>,
    stopped: CancellationToken,
}

impl RecordingChain {
    pub(crate) fn new(name: &'static str, log: Arc<EventLog>) -> Self {
        Self {
            name,
            log,
            behaviour: Behaviour::default(),
            readers: None,
            writers: None,
            commitments: None,
            witness: None,
            stopped: CancellationToken::new(),
        }
    }

    pub(crate) fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Enqueues `command` on the commitment channel once started.
    pub(crate) fn witnessing(mut self, command: StoreCommand) -> Self {
        self.witness = Some(command);
        self
    }

    /// Which channels were registered through [`Chain::set_sender`].
    pub(crate) fn reads(&self) -> Option<(bool, bool)> {
        self.readers.as_ref().map(|(messages, headers)| (messages.is_some(), headers.is_some()))
    }

    /// Which channels were registered through [`Chain::set_receiver`].
    pub(crate) fn writes(&self) -> Option<(bool, bool)> {
        self.writers.as_ref().map(|(messages, headers)| (messages.is_some(), headers.is_some()))
    }

    pub(crate) fn take_readers(&mut self) -> Readers {
        self.readers.take().unwrap_or((None, None))
    }

    pub(crate) fn take_writers(&mut self) -> Writers {
        self.writers.take().unwrap_or((None, None))
    }
}

#[async_trait]
impl Chain for RecordingChain {
    fn name(&self) -> &str {
        self.name
    }

    fn set_sender(
        &mut self,
        messages: Option<MessageReceiver>,
        headers: Option<HeaderReceiver>,
        commitments: CommitmentSender,
    ) -> Result<(), ChainError> {
        self.log.record(format!("{}:set_sender", self.name));
        self.readers = Some((messages, headers));
        self.commitments = Some(commitments);
        Ok(())
    }

    fn set_receiver(
        &mut self,
        messages: Option<MessageSender>,
        headers: Option<HeaderSender>,
        commitments: CommitmentSender,
    ) -> Result<(), ChainError> {
        self.log.record(format!("{}:set_receiver", self.name));
        self.writers = Some((messages, headers));
        self.commitments = Some(commitments);
        Ok(())
    }

    async fn start(
        &mut self,
        tasks: &mut TaskGroup,
        inbound: oneshot::Receiver<Init>,
        outbound: oneshot::Sender<Init>,
    ) -> Result<(), ChainError> {
        let name = self.name;
        self.log.record(format!("{name}:start"));
        if self.behaviour == Behaviour::FailStart {
            return Err(ChainError::Connection {
                endpoint: format!("ws://{name}"),
                reason: "connection refused".into(),
            });
        }

        let _ = outbound.send(Init(Bytes::from(name.as_bytes().to_vec())));
        if self.behaviour == Behaviour::AwaitInit {
            if let Ok(Init(payload)) = inbound.await {
                self.log.record(format!("{name}:init:{}", String::from_utf8_lossy(&payload)));
            }
            return Ok(());
        }

        let log = self.log.clone();
        tasks.spawn(format!("{name}-init"), async move {
            match inbound.await {
                Ok(Init(payload)) => {
                    log.record(format!("{name}:init:{}", String::from_utf8_lossy(&payload)));
                    Ok(())
                }
                Err(_) => Err(TaskError::failed(
                    name,
                    ChainError::Handshake("counterpart dropped its init".into()),
                )),
            }
        });

        if let (Some(commitments), Some(command)) = (self.commitments.clone(), self.witness.take())
        {
            tasks.spawn(format!("{name}-witness"), async move {
                commitments
                    .send(command)
                    .await
                    .map_err(|_| TaskError::failed(name, ChainError::Channel(ChannelClosed)))
            });
        }

        let cancel = tasks.token();
        let stopped = self.stopped.clone();
        match self.behaviour {
            Behaviour::Cooperative | Behaviour::FailStart | Behaviour::AwaitInit => {
                tasks.spawn(name, async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = stopped.cancelled() => {}
                    }
                    Err(TaskError::Cancelled)
                })
            }
            Behaviour::Stubborn => tasks.spawn(name, async {
                std::future::pending::<()>().await;
                Ok(())
            }),
            Behaviour::FailAfter(delay) => tasks.spawn(name, async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => Err(TaskError::failed(name, "rpc connection lost")),
                    _ = cancel.cancelled() => Err(TaskError::Cancelled),
                }
            }),
        }
        Ok(())
    }

    fn stop(&self) {
        self.log.record(format!("{}:stop", self.name));
        self.stopped.cancel();
    }
}

/// Commitment store recording the commands it drains.
#[derive(Debug)]
pub(crate) struct RecordingStore {
    log: Arc<EventLog>,
    commands: Option<CommitmentReceiver>,
}

impl RecordingStore {
    pub(crate) fn new(log: Arc<EventLog>, commands: CommitmentReceiver) -> Self {
        Self { log, commands: Some(commands) }
    }
}

#[async_trait]
impl CommitmentStore for RecordingStore {
    async fn start(&mut self, tasks: &mut TaskGroup) -> Result<(), StoreError> {
        let mut commands = self.commands.take().ok_or(StoreError::AlreadyStarted)?;
        self.log.record("store:start");

        let log = self.log.clone();
        let cancel = tasks.token();
        tasks.spawn("recording-store", async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    command = commands.recv() => match command {
                        Some(command) => log.record(format!("store:{}", command.kind())),
                        None => return Ok(()),
                    },
                }
            }
        });
        Ok(())
    }
}
