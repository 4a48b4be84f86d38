//! In-memory [`DocumentStore`] for tests
//!
//! Keeps raw BSON documents so tests can inspect exactly what a handler wrote.
//! Unique fields behave like a unique index.

use bson::{oid::ObjectId, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::schemas::{Kategori, Kegiatan, Kehadiran, Record, UserDoc};
use crate::db::store::{DocumentStore, Stores};
use crate::types::UkmError;

pub struct MemoryStore<T> {
    docs: Mutex<Vec<Document>>,
    unique: Vec<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_unique(&[])
    }

    pub fn with_unique(fields: &[&'static str]) -> Self {
        Self {
            docs: Mutex::new(Vec::new()),
            unique: fields.to_vec(),
            _marker: PhantomData,
        }
    }

    /// Raw stored document by id
    pub fn raw(&self, id: ObjectId) -> Option<Document> {
        self.lock()
            .iter()
            .find(|doc| doc.get_object_id("_id").ok() == Some(id))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Document>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_unique(&self, docs: &[Document], candidate: &Document, skip: Option<ObjectId>) -> Result<(), UkmError> {
        for field in &self.unique {
            let Some(value) = candidate.get(*field) else {
                continue;
            };
            let clash = docs.iter().any(|doc| {
                doc.get_object_id("_id").ok() != skip && doc.get(*field) == Some(value)
            });
            if clash {
                return Err(UkmError::DuplicateKey(format!("E11000 duplicate key: {field}")));
            }
        }
        Ok(())
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match expected {
        Bson::Document(op) if op.contains_key("$ne") => doc.get(key) != op.get("$ne"),
        _ => doc.get(key) == Some(expected),
    })
}

/// Apply one `$set` entry, following a single level of dotted path.
fn set_path(doc: &mut Document, key: &str, value: Bson) {
    match key.split_once('.') {
        Some((parent, child)) => {
            if !matches!(doc.get(parent), Some(Bson::Document(_))) {
                doc.insert(parent, Document::new());
            }
            if let Ok(nested) = doc.get_document_mut(parent) {
                nested.insert(child, value);
            }
        }
        None => {
            doc.insert(key, value);
        }
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, UkmError> {
    bson::from_document(doc).map_err(|e| UkmError::Internal(format!("BSON decoding failed: {}", e)))
}

#[async_trait::async_trait]
impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn insert_one(&self, item: T) -> Result<ObjectId, UkmError> {
        let mut doc = bson::to_document(&item)?;
        let id = ObjectId::new();
        doc.insert("_id", id);

        let mut docs = self.lock();
        self.check_unique(&docs, &doc, None)?;
        docs.push(doc);
        Ok(id)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>, UkmError> {
        let found = self.lock().iter().find(|doc| matches(doc, &filter)).cloned();
        found.map(decode).transpose()
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<T>, UkmError> {
        let found: Vec<Document> = self
            .lock()
            .iter()
            .filter(|doc| matches(doc, &filter))
            .cloned()
            .collect();
        found.into_iter().map(decode).collect()
    }

    async fn set_fields(&self, id: ObjectId, fields: Document) -> Result<bool, UkmError> {
        let mut docs = self.lock();
        let Some(index) = docs
            .iter()
            .position(|doc| doc.get_object_id("_id").ok() == Some(id))
        else {
            return Ok(false);
        };

        self.check_unique(&docs, &fields, Some(id))?;
        for (key, value) in fields {
            set_path(&mut docs[index], &key, value);
        }
        Ok(true)
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, UkmError> {
        let mut docs = self.lock();
        let before = docs.len();
        docs.retain(|doc| doc.get_object_id("_id").ok() != Some(id));
        Ok(docs.len() < before)
    }
}

/// Empty in-memory stores, with `users.email` unique as in MongoDB.
pub struct MemoryStores {
    pub users: Arc<MemoryStore<UserDoc>>,
    pub kegiatan: Arc<MemoryStore<Record<Kegiatan>>>,
    pub kehadiran: Arc<MemoryStore<Record<Kehadiran>>>,
    pub kategori: Arc<MemoryStore<Record<Kategori>>>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MemoryStore::with_unique(&["email"])),
            kegiatan: Arc::new(MemoryStore::new()),
            kehadiran: Arc::new(MemoryStore::new()),
            kategori: Arc::new(MemoryStore::new()),
        }
    }

    /// Handles for `AppState`, sharing the same underlying documents
    pub fn stores(&self) -> Stores {
        Stores {
            users: self.users.clone(),
            kegiatan: self.kegiatan.clone(),
            kehadiran: self.kehadiran.clone(),
            kategori: self.kategori.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_unique_fields_and_ne_filter() {
        let store: MemoryStore<Document> = MemoryStore::with_unique(&["email"]);
        let a = store.insert_one(doc! { "email": "a@ukm.com" }).await.unwrap();
        let b = store.insert_one(doc! { "email": "b@ukm.com" }).await.unwrap();

        let err = store.insert_one(doc! { "email": "a@ukm.com" }).await.unwrap_err();
        assert!(matches!(err, UkmError::DuplicateKey(_)));

        let others = store
            .find_many(doc! { "email": "a@ukm.com", "_id": { "$ne": a } })
            .await
            .unwrap();
        assert!(others.is_empty());

        assert!(store.set_fields(b, doc! { "email": "a@ukm.com" }).await.is_err());
        assert!(store.set_fields(a, doc! { "email": "a@ukm.com" }).await.unwrap());
    }

    #[tokio::test]
    async fn test_dotted_set_and_delete() {
        let store: MemoryStore<Document> = MemoryStore::new();
        let id = store.insert_one(doc! { "nama": "Rina" }).await.unwrap();

        assert!(store.set_fields(id, doc! { "metadata.updated_at": 5_i64 }).await.unwrap());
        let stored = store.raw(id).unwrap();
        assert_eq!(stored.get_document("metadata").unwrap().get_i64("updated_at").unwrap(), 5);

        assert!(!store.set_fields(ObjectId::new(), doc! { "nama": "x" }).await.unwrap());
        assert!(store.delete_by_id(id).await.unwrap());
        assert!(!store.delete_by_id(id).await.unwrap());
    }
}
