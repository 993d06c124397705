// Cursor persistence and dead-letter recording

pub mod cursor;
pub mod dead_letter;
pub mod file;
pub mod manager;
pub mod record;
pub mod store;

pub use cursor::SyncCursor;
pub use dead_letter::{DeadLetter, DeadLetterKind, DeadLetterSink, FileDeadLetterLedger};
pub use file::FileCheckpointStore;
pub use manager::CheckpointManager;
pub use record::CheckpointRecord;
pub use store::{CheckpointStatus, CheckpointStore};
