#![forbid(unsafe_code)]

//! Persistence for the quiz engine's progress snapshot.
//!
//! The domain talks to the [`repository::ProgressStore`] port only; adapters
//! here cover an in-memory map, a JSON file (the local-storage analogue) and
//! `SQLite` for anything that wants a real embedded database.

pub mod json;
pub mod repository;
pub mod sqlite;

pub use json::JsonFileStore;
pub use repository::{
    InMemoryProgressStore, ProgressMap, ProgressRecord, ProgressStore, StorageError, StoreScope,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
