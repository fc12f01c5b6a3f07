use super::types::{StoreError, StoreState, StoredAnalysis, STORE_VERSION};
use crate::conversation::{Conversation, Message, NewConversation};
use crate::pipeline::{AnalysisSink, TranscriptSource};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STORE_FILE_NAME: &str = "store.json";

/// Load store state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store_state(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open store file at {}", path.display()))?;

    let state: StoreState = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load store from {}", path.display()))?;

    if state.version != STORE_VERSION {
        anyhow::bail!("Unsupported store version: {}", state.version);
    }

    Ok(state)
}

/// Save store state to a JSON file atomically
///
/// The file is never left half-written. Creates the parent directory if it
/// doesn't exist.
pub fn save_store_state(path: &Path, state: &StoreState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize store")?;

    file.commit().context("Failed to save store")?;

    Ok(())
}

/// Conversation store backed by a single JSON file.
///
/// Every mutation is written through, so the file always reflects the last
/// completed operation.
#[derive(Debug)]
pub struct ConversationStore {
    path: PathBuf,
    state: StoreState,
}

impl ConversationStore {
    /// Open the store in `data_dir`, starting empty if no file exists yet
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(STORE_FILE_NAME);
        let state = load_store_state(&path)?;
        debug!(
            path = %path.display(),
            conversations = state.conversations.len(),
            analyses = state.analyses.len(),
            "opened store"
        );
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn conversation(&self, id: u64) -> Result<&Conversation, StoreError> {
        self.state.conversation(id)
    }

    /// Store a new conversation and return its id
    pub fn insert_conversation(
        &mut self,
        conversation: NewConversation,
        created_at: DateTime<Utc>,
    ) -> Result<u64> {
        let id = self.state.add_conversation(conversation, created_at);
        self.save()?;
        debug!(id, "stored conversation");
        Ok(id)
    }

    fn save(&self) -> Result<()> {
        save_store_state(&self.path, &self.state)
    }
}

impl TranscriptSource for ConversationStore {
    fn conversation_ids(&self) -> Vec<u64> {
        self.state.conversations.keys().copied().collect()
    }

    fn transcript(&self, id: u64) -> Result<Vec<Message>, StoreError> {
        Ok(self.state.conversation(id)?.messages.clone())
    }
}

impl AnalysisSink for ConversationStore {
    fn upsert(&mut self, analysis: StoredAnalysis) -> Result<()> {
        let id = analysis.conversation_id;
        let replaced = self.state.upsert_analysis(analysis)?;
        self.save()?;
        debug!(id, replaced, "stored analysis");
        Ok(())
    }
}
