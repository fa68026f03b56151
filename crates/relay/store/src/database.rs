use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use bridge_relay_core::{
    Backoff, BeefyRecord, BeefyStatus, CommitmentReceiver, CommitmentStore, RetryError,
    StoreCommand, StoreError, TaskError, TaskGroup, config::DatabaseConfig, retry_with_backoff,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{Metrics, journal::Journal};

type Records = Arc<RwLock<BTreeMap<u64, BeefyRecord>>>;

const JOURNAL_MAX_RETRIES: usize = 3;

/// BEEFY commitment store.
///
/// Holds every tracked record in memory and, when configured with a path, journals each applied
/// command so that a restarted relay resumes with the same records.
#[derive(Debug)]
pub struct BeefyDatabase {
    commands: Option<CommitmentReceiver>,
    journal: Option<Journal>,
    records: Records,
    backoff: Backoff,
}

impl BeefyDatabase {
    /// Creates a store draining `commands`.
    pub fn new(config: &DatabaseConfig, commands: CommitmentReceiver) -> Self {
        Self {
            commands: Some(commands),
            journal: config.path.as_ref().map(Journal::new),
            records: Arc::default(),
            backoff: Backoff::default(),
        }
    }

    /// Overrides the backoff used when a journal write fails.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a read handle on the records.
    pub fn reader(&self) -> BeefyReader {
        BeefyReader { records: self.records.clone() }
    }
}

#[async_trait]
impl CommitmentStore for BeefyDatabase {
    async fn start(&mut self, tasks: &mut TaskGroup) -> Result<(), StoreError> {
        let commands = self.commands.take().ok_or(StoreError::AlreadyStarted)?;
        Metrics::init();

        if let Some(journal) = &self.journal {
            let replayed = journal.replay().await?;
            let count = replayed.len();
            for command in &replayed {
                apply(&self.records, command)?;
            }
            info!(
                target: "relay::store",
                path = %journal.path().display(),
                count,
                "Replayed commitment journal"
            );
        }

        let worker = Worker {
            commands,
            journal: self.journal.clone(),
            records: self.records.clone(),
            backoff: self.backoff,
        };
        let cancel = tasks.token();
        tasks.spawn("commitment-store", async move {
            worker.run(cancel).await.map_err(|err| TaskError::failed("commitment-store", err))
        });

        info!(target: "relay::store", "Commitment store started");
        Ok(())
    }
}

#[derive(Debug)]
struct Worker {
    commands: CommitmentReceiver,
    journal: Option<Journal>,
    records: Records,
    backoff: Backoff,
}

impl Worker {
    async fn run(mut self, cancel: CancellationToken) -> Result<(), StoreError> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(target: "relay::store", "Commitment store stopping");
                    return Ok(());
                }
                maybe_command = self.commands.recv() => {
                    let Some(command) = maybe_command else {
                        info!(target: "relay::store", "Commitment channel closed, store stopping");
                        return Ok(());
                    };
                    let kind = command.kind();
                    if let Err(err) = self.handle(command, &cancel).await {
                        Metrics::record_error(kind);
                        error!(target: "relay::store", %err, command = kind, "Failed to store command");
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn handle(
        &mut self,
        command: StoreCommand,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        if let Some(journal) = &self.journal {
            let written = retry_with_backoff(
                "journal append",
                || journal.append(&command),
                self.backoff,
                JOURNAL_MAX_RETRIES,
                cancel,
            )
            .await;

            match written {
                Ok(()) => {}
                // Shutting down, the command is dropped with the channel anyway.
                Err(RetryError::Cancelled) => return Ok(()),
                Err(RetryError::Exhausted { last_error, .. }) => return Err(last_error),
            }
        }

        let records = apply(&self.records, &command)?;
        Metrics::record_command(command.kind(), records);
        Ok(())
    }
}

/// Applies a command to the in-memory records, returning the number of records held after.
fn apply(records: &Records, command: &StoreCommand) -> Result<usize, StoreError> {
    let mut records = records.write().map_err(|_| StoreError::LockPoisoned)?;

    match command {
        StoreCommand::Create { record } => {
            debug!(target: "relay::store", block_number = record.block_number, "Storing BEEFY record");
            records.insert(record.block_number, record.clone());
        }
        StoreCommand::Update { block_number, update } => match records.get_mut(block_number) {
            Some(record) => record.apply(update),
            None => {
                warn!(target: "relay::store", block_number, "Update for unknown BEEFY record ignored")
            }
        },
        StoreCommand::Delete { block_number } => {
            if records.remove(block_number).is_none() {
                warn!(target: "relay::store", block_number, "Delete for unknown BEEFY record ignored");
            }
        }
    }

    Ok(records.len())
}

/// Read handle on the store's records.
#[derive(Debug, Clone)]
pub struct BeefyReader {
    records: Records,
}

impl BeefyReader {
    /// Record of the commitment at `block_number`.
    pub fn get(&self, block_number: u64) -> Result<Option<BeefyRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(&block_number).cloned())
    }

    /// Records in the given status, ordered by block number.
    pub fn by_status(&self, status: BeefyStatus) -> Result<Vec<BeefyRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.values().filter(|record| record.status == status).cloned().collect())
    }

    /// Number of tracked records.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    /// Returns true if no record is tracked.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, Bytes};
    use bridge_relay_core::{BeefyUpdate, channel::commitment_channel};
    use std::time::Duration;

    fn record(block_number: u64) -> BeefyRecord {
        BeefyRecord::witnessed(block_number, vec![Address::ZERO], Bytes::from_static(b"commitment"))
    }

    #[tokio::test]
    async fn test_applies_commands_in_order() {
        let (tx, rx) = commitment_channel();
        let mut db = BeefyDatabase::new(&DatabaseConfig::default(), rx);
        let reader = db.reader();
        let mut tasks = TaskGroup::new();
        db.start(&mut tasks).await.unwrap();

        tx.send(StoreCommand::Create { record: record(10) }).await.unwrap();
        tx.send(StoreCommand::Create { record: record(20) }).await.unwrap();
        tx.send(StoreCommand::Update {
            block_number: 10,
            update: BeefyUpdate {
                status: Some(BeefyStatus::InitialVerificationTxSent),
                initial_verification_tx: Some(B256::repeat_byte(7)),
                ..Default::default()
            },
        })
        .await
        .unwrap();
        tx.send(StoreCommand::Delete { block_number: 20 }).await.unwrap();
        tx.send(StoreCommand::Delete { block_number: 99 }).await.unwrap();
        drop(tx);

        tasks.wait().await.unwrap();

        assert_eq!(reader.len().unwrap(), 1);
        let stored = reader.get(10).unwrap().unwrap();
        assert_eq!(stored.status, BeefyStatus::InitialVerificationTxSent);
        assert_eq!(stored.initial_verification_tx, Some(B256::repeat_byte(7)));
        assert_eq!(reader.by_status(BeefyStatus::InitialVerificationTxSent).unwrap().len(), 1);
        assert!(reader.get(20).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_journal_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig { path: Some(dir.path().join("beefy.jsonl")) };

        let (tx, rx) = commitment_channel();
        let mut db = BeefyDatabase::new(&config, rx);
        let mut tasks = TaskGroup::new();
        db.start(&mut tasks).await.unwrap();
        tx.send(StoreCommand::Create { record: record(1) }).await.unwrap();
        tx.send(StoreCommand::Create { record: record(2) }).await.unwrap();
        tx.send(StoreCommand::Update {
            block_number: 2,
            update: BeefyUpdate::status(BeefyStatus::ReadyToComplete),
        })
        .await
        .unwrap();
        drop(tx);
        tasks.wait().await.unwrap();

        let (_tx, rx) = commitment_channel();
        let mut restarted = BeefyDatabase::new(&config, rx);
        let reader = restarted.reader();
        let mut tasks = TaskGroup::new();
        restarted.start(&mut tasks).await.unwrap();

        assert_eq!(reader.len().unwrap(), 2);
        assert_eq!(reader.get(2).unwrap().unwrap().status, BeefyStatus::ReadyToComplete);
        tasks.cancel();
        tasks.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_journal_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beefy.jsonl");
        std::fs::write(&path, "garbage\n").unwrap();

        let (_tx, rx) = commitment_channel();
        let mut db = BeefyDatabase::new(&DatabaseConfig { path: Some(path) }, rx);
        let mut tasks = TaskGroup::new();
        let err = db.start(&mut tasks).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_start_twice() {
        let (_tx, rx) = commitment_channel();
        let mut db = BeefyDatabase::new(&DatabaseConfig::default(), rx);
        let mut tasks = TaskGroup::new();
        db.start(&mut tasks).await.unwrap();
        assert_eq!(db.start(&mut tasks).await, Err(StoreError::AlreadyStarted));
        tasks.cancel();
        tasks.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_unwritable_journal_fails_worker() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig { path: Some(dir.path().join("missing").join("beefy.jsonl")) };

        let (tx, rx) = commitment_channel();
        let mut db = BeefyDatabase::new(&config, rx).with_backoff(Backoff {
            base: Duration::from_millis(5),
            max: Duration::from_millis(20),
        });
        let reader = db.reader();
        let mut tasks = TaskGroup::new();
        db.start(&mut tasks).await.unwrap();

        tx.send(StoreCommand::Create { record: record(1) }).await.unwrap();
        let err = tasks.wait().await.unwrap_err();
        assert!(matches!(err, TaskError::Failed { ref task, .. } if task == "commitment-store"));
        assert!(reader.is_empty().unwrap());
    }
}
