mod binding;
mod kv;

pub use binding::{Binding, Persistence, Seed};
pub use kv::{KvStore, MemoryKv, SqliteKv};
