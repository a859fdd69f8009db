#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{CardStore, InMemoryCardStore, Storage, StorageError};
pub use sqlite::SqliteCardStore;
