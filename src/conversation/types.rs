use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a transcript message.
///
/// Parsed case-insensitively from the raw sender string. Anything other than
/// "user" or "ai" is kept verbatim as `Other` and ignored by the scorers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sender {
    User,
    Ai,
    Other(String),
}

impl Sender {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "user" => Sender::User,
            "ai" => Sender::Ai,
            _ => Sender::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
            Sender::Other(raw) => raw,
        }
    }
}

impl From<String> for Sender {
    fn from(raw: String) -> Self {
        Sender::parse(&raw)
    }
}

impl From<Sender> for String {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A stored conversation. `messages` are kept in transcript order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Title for display, falling back to "Untitled"
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}
