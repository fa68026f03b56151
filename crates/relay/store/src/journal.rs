use std::path::{Path, PathBuf};

use bridge_relay_core::{StoreCommand, StoreError};
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::warn;

/// Append-only JSON lines log of every command the store applied.
#[derive(Debug, Clone)]
pub(crate) struct Journal {
    path: PathBuf,
}

impl Journal {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every journaled command. A missing journal is empty.
    ///
    /// A last line without its newline is the trace of an interrupted append: it is kept and
    /// terminated when it parses, and cut from the file otherwise. Any other unparsable line is
    /// [`StoreError::Corrupt`].
    pub(crate) async fn replay(&self) -> Result<Vec<StoreCommand>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Open { path: self.path.clone(), source }),
        };

        let complete = raw.rfind('\n').map_or(0, |idx| idx + 1);
        let (body, tail) = raw.split_at(complete);

        let mut commands = body
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .map_err(|source| StoreError::Corrupt { line: idx + 1, source })
            })
            .collect::<Result<Vec<StoreCommand>, _>>()?;

        if !tail.trim().is_empty() {
            match serde_json::from_str(tail) {
                Ok(command) => {
                    commands.push(command);
                    let mut file = OpenOptions::new().append(true).open(&self.path).await?;
                    file.write_all(b"\n").await?;
                    file.flush().await?;
                }
                Err(err) => {
                    warn!(
                        target: "relay::store",
                        path = %self.path.display(),
                        %err,
                        "Dropping incomplete last journal line"
                    );
                    let file = OpenOptions::new().write(true).open(&self.path).await?;
                    file.set_len(complete as u64).await?;
                    file.sync_all().await?;
                }
            }
        }
        Ok(commands)
    }

    /// Appends one command and flushes it.
    pub(crate) async fn append(&self, command: &StoreCommand) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(command)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
