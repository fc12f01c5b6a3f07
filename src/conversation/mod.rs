pub mod import;
pub mod types;

pub use import::{parse_upload, ImportError, NewConversation};
pub use types::{Conversation, Message, Sender};
