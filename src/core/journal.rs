//! Append-only removal journal with file-based persistence.
//!
//! Events are stored as newline-delimited JSON (JSONL) so the history of
//! every trigger-workflow edge can be inspected with ordinary tools.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::domain::{AssociationEvent, EdgeState};

/// JSONL journal of association removals
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Open a journal, creating its parent directory
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create journal directory: {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event to the log
    pub async fn append(&self, event: &AssociationEvent) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let json = serde_json::to_string(event).context("Failed to serialize event")?;
        file.write_all(format!("{}\n", json).as_bytes())
            .await
            .context("Failed to write event")?;
        file.flush().await.context("Failed to flush event")?;

        Ok(())
    }

    /// Replay all events in order
    pub async fn replay(&self) -> Result<Vec<AssociationEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: AssociationEvent = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse event: {}", line))?;
            events.push(event);
        }

        Ok(events)
    }

    /// Events of one trigger-workflow edge, in order
    pub async fn history(
        &self,
        trigger_id: &str,
        workflow_name: &str,
    ) -> Result<Vec<AssociationEvent>> {
        let events = self.replay().await?;
        Ok(events
            .into_iter()
            .filter(|e| e.is_for(trigger_id, workflow_name))
            .collect())
    }

    /// Latest state of an edge, if the journal has seen it
    pub async fn edge_state(
        &self,
        trigger_id: &str,
        workflow_name: &str,
    ) -> Result<Option<EdgeState>> {
        let events = self.history(trigger_id, workflow_name).await?;
        Ok(EdgeState::from_events(&events))
    }
}
