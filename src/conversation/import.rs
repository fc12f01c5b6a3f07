use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::types::{Message, Sender};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("conversation has no messages")]
    NoMessages,
    #[error("message {0}: missing sender")]
    MissingSender(usize),
    #[error("message {0}: missing text")]
    MissingText(usize),
    #[error("message {index}: invalid timestamp '{value}'")]
    InvalidTimestamp {
        index: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Upload payload, e.g.
/// ```json
/// {
///   "title": "sample",
///   "messages": [
///     {"sender": "user", "message": "Hi"},
///     {"sender": "ai", "message": "Hello! How can I help?"}
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct ConversationUpload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    messages: Vec<MessageUpload>,
}

#[derive(Debug, Deserialize)]
struct MessageUpload {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default, alias = "text")]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// A parsed conversation that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub title: String,
    pub messages: Vec<Message>,
}

/// Parse an upload payload, keeping messages in the order given.
pub fn parse_upload(json: &str) -> Result<NewConversation, ImportError> {
    let upload: ConversationUpload = serde_json::from_str(json)?;

    if upload.messages.is_empty() {
        return Err(ImportError::NoMessages);
    }

    let messages = upload
        .messages
        .into_iter()
        .enumerate()
        .map(|(index, m)| {
            let sender = m.sender.ok_or(ImportError::MissingSender(index))?;
            let text = m.message.ok_or(ImportError::MissingText(index))?;
            let timestamp = match m.timestamp {
                Some(value) if !value.trim().is_empty() => {
                    Some(parse_timestamp(&value).map_err(|source| {
                        ImportError::InvalidTimestamp {
                            index,
                            value: value.clone(),
                            source,
                        }
                    })?)
                }
                _ => None,
            };
            Ok(Message {
                sender: Sender::parse(&sender),
                text,
                timestamp,
            })
        })
        .collect::<Result<Vec<_>, ImportError>>()?;

    Ok(NewConversation {
        title: upload.title.unwrap_or_default(),
        messages,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|dt| dt.with_timezone(&Utc))
}
