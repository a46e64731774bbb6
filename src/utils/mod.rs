pub mod errors;
pub mod storage;

pub use errors::{GameError, GameResult};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
