//! MongoDB persistence
//!
//! Typed collection wrapper, the store seam the routes use, document schemas
//! and the startup admin seed.

#[cfg(test)]
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod seed;
pub mod store;

pub use mongo::{count_value, Collections, IntoIndexes, MongoClient, MongoCollection, MutMetadata};
pub use store::{on_duplicate, DocumentStore, Stores};
