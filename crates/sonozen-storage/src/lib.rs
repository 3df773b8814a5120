pub mod error;
pub mod history;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use history::{AnalysisHistory, HISTORY_KEY};
pub use local::{FileStorage, LocalStorage, MemoryStorage};
