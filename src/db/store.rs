//! Document store seam
//!
//! Handlers talk to [`DocumentStore`] rather than to a driver collection, so
//! the same code runs against MongoDB in production and an in-memory store in
//! tests.

use bson::{doc, oid::ObjectId, Document};
use std::sync::Arc;

use crate::db::mongo::Collections;
use crate::db::schemas::{Kategori, Kegiatan, Kehadiran, Record, UserDoc};
use crate::types::UkmError;

/// CRUD over one collection of `T`
///
/// Filters are plain equality documents, optionally with `{"$ne": value}`.
#[async_trait::async_trait]
pub trait DocumentStore<T: Send + 'static>: Send + Sync {
    /// Insert and return the new id. A unique index violation is
    /// [`UkmError::DuplicateKey`].
    async fn insert_one(&self, item: T) -> Result<ObjectId, UkmError>;

    async fn find_one(&self, filter: Document) -> Result<Option<T>, UkmError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>, UkmError> {
        self.find_one(doc! { "_id": id }).await
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<T>, UkmError>;

    /// `$set` the given fields on one document. Returns whether a document matched.
    async fn set_fields(&self, id: ObjectId, fields: Document) -> Result<bool, UkmError>;

    /// Returns whether a document was deleted.
    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, UkmError>;
}

/// Store handles for every collection the routes touch
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn DocumentStore<UserDoc>>,
    pub kegiatan: Arc<dyn DocumentStore<Record<Kegiatan>>>,
    pub kehadiran: Arc<dyn DocumentStore<Record<Kehadiran>>>,
    pub kategori: Arc<dyn DocumentStore<Record<Kategori>>>,
}

impl Stores {
    pub fn from_collections(db: &Collections) -> Self {
        Self {
            users: Arc::new(db.users.clone()),
            kegiatan: Arc::new(db.kegiatan.clone()),
            kehadiran: Arc::new(db.kehadiran.clone()),
            kategori: Arc::new(db.kategori.clone()),
        }
    }
}

/// Turn a unique index violation into a client error with `message`.
pub fn on_duplicate(message: &'static str) -> impl Fn(UkmError) -> UkmError {
    move |err| match err {
        UkmError::DuplicateKey(_) => UkmError::BadRequest(message.to_string()),
        other => other,
    }
}
