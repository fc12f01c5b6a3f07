use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::conversation::{Conversation, NewConversation};
use crate::scoring::AnalysisResult;

pub const STORE_VERSION: u32 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(u64),
}

/// Persisted analysis of one conversation. Replaced wholesale on recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub conversation_id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub conversations: BTreeMap<u64, Conversation>,
    #[serde(default)]
    pub analyses: BTreeMap<u64, StoredAnalysis>,
}

fn first_id() -> u64 {
    1
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    /// Create a new empty store with version 1
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            next_id: first_id(),
            conversations: BTreeMap::new(),
            analyses: BTreeMap::new(),
        }
    }

    /// Add a conversation under the next free id and return that id
    pub fn add_conversation(&mut self, new: NewConversation, created_at: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.conversations.insert(
            id,
            Conversation {
                id,
                title: new.title,
                created_at,
                messages: new.messages,
            },
        );
        id
    }

    pub fn conversation(&self, id: u64) -> Result<&Conversation, StoreError> {
        self.conversations.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Insert or fully replace the analysis for its conversation.
    /// Returns true if an earlier analysis was replaced.
    pub fn upsert_analysis(&mut self, analysis: StoredAnalysis) -> Result<bool, StoreError> {
        let id = analysis.conversation_id;
        if !self.conversations.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.analyses.insert(id, analysis).is_some())
    }

    /// Analyses newest first, ties broken by higher conversation id first
    pub fn analyses_newest_first(&self) -> Vec<&StoredAnalysis> {
        let mut list: Vec<_> = self.analyses.values().collect();
        list.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.conversation_id.cmp(&a.conversation_id))
        });
        list
    }
}
