#![forbid(unsafe_code)]

pub mod document;
pub mod json;
pub mod repository;

pub use document::Database;
pub use json::DocumentStore;
pub use repository::{
    CardRepository, DeckRepository, Storage, StorageError, StoreEvents, StoreRevision,
};
