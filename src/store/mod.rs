pub mod storage;
pub mod types;

pub use storage::{load_store_state, save_store_state, ConversationStore, STORE_FILE_NAME};
pub use types::{StoreError, StoreState, StoredAnalysis};
