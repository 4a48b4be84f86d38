//! Generic document wrapper for the simple CRUD resources
//!
//! A [`Record`] stores the resource's own fields flattened next to `_id` and
//! `metadata`, so every collection shares the same insert, update and
//! delete path.

use bson::{oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;

use crate::auth::Claims;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::validation::ValidationResult;

/// A resource stored through [`Record`]
pub trait Resource:
    Serialize + DeserializeOwned + Unpin + Send + Sync + Default + Clone + Debug + 'static
{
    /// MongoDB collection name
    const COLLECTION: &'static str;

    /// Human label used in response messages ("Kegiatan not found")
    const LABEL: &'static str;

    fn validate(&self) -> ValidationResult;

    /// Fill server-side defaults on create.
    fn prepare(&mut self, _caller: &Claims) {}

    fn indexes() -> Vec<(Document, Option<IndexOptions>)> {
        Vec::new()
    }

    /// Fields written by `$set` on update
    fn update_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Record<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(flatten)]
    pub fields: T,
}

impl<T: Resource> Record<T> {
    pub fn new(fields: T) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            fields,
        }
    }

    pub fn into_view(self) -> RecordView<T> {
        RecordView {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            fields: self.fields,
        }
    }
}

impl<T: Resource> IntoIndexes for Record<T> {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        T::indexes()
    }
}

impl<T: Resource> MutMetadata for Record<T> {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Response shape: hex `id` plus the resource fields
#[derive(Serialize, Clone, Debug)]
pub struct RecordView<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
}
