pub mod cli;
pub mod entity;
pub mod error;
pub mod storage;
pub mod store;
pub mod view;

pub use error::{JotterError, Result};
pub use storage::{Binding, KvStore, MemoryKv, Persistence, Seed, SqliteKv};
pub use store::{Notebook, NoteStore};
