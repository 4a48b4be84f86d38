//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures_util::StreamExt;
use mongodb::{options::IndexOptions, Client, Collection, IndexModel};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::{
    Kategori, Kegiatan, Kehadiran, Metadata, Record, Resource, UserDoc, USER_COLLECTION,
};
use crate::db::store::DocumentStore;
use crate::types::UkmError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// Parse a path id, rejecting anything that is not a 24-char hex ObjectId
pub fn parse_object_id(id: &str) -> Result<ObjectId, UkmError> {
    ObjectId::parse_str(id).map_err(|_| UkmError::BadRequest("Invalid ID".into()))
}

/// Read a numeric field whatever width the server chose for it.
pub fn count_value(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Double(n)) => *n as i64,
        _ => 0,
    }
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping, failing fast when the server cannot be reached
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, UkmError> {
        info!("Connecting to MongoDB database '{}'", db_name);

        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| UkmError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| UkmError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, UkmError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, UkmError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), UkmError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| UkmError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    pub async fn count(&self, filter: Document) -> Result<u64, UkmError> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| UkmError::Database(format!("Count failed: {}", e)))
    }

    /// Run an aggregation pipeline and collect the raw result documents
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, UkmError> {
        let mut cursor = self
            .inner
            .aggregate(pipeline)
            .await
            .map_err(|e| UkmError::Database(format!("Aggregation failed: {}", e)))?;

        let mut results = Vec::new();
        while let Some(doc) = cursor.next().await {
            results.push(doc.map_err(|e| UkmError::Database(format!("Aggregation failed: {}", e)))?);
        }

        Ok(results)
    }
}

#[async_trait::async_trait]
impl<T> DocumentStore<T> for MongoCollection<T>
where
    T: Serialize
        + DeserializeOwned
        + Unpin
        + Send
        + Sync
        + Default
        + IntoIndexes
        + MutMetadata
        + 'static,
{
    /// Insert a document, setting metadata timestamps
    async fn insert_one(&self, mut item: T) -> Result<ObjectId, UkmError> {
        *item.mut_metadata() = Metadata::new();

        let result = self.inner.insert_one(item).await?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| UkmError::Database("Failed to get inserted ID".into()))
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>, UkmError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| UkmError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter, skipping any that fail to decode
    async fn find_many(&self, filter: Document) -> Result<Vec<T>, UkmError> {
        let cursor = self
            .inner
            .find(filter)
            .await
            .map_err(|e| UkmError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Also bumps `metadata.updated_at`
    async fn set_fields(&self, id: ObjectId, mut fields: Document) -> Result<bool, UkmError> {
        fields.insert("metadata.updated_at", DateTime::now());

        let result = self
            .inner
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<bool, UkmError> {
        let result = self
            .inner
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| UkmError::Database(format!("Delete failed: {}", e)))?;

        Ok(result.deleted_count > 0)
    }
}

/// Every collection the service touches, opened once at startup
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: MongoCollection<UserDoc>,
    pub kegiatan: MongoCollection<Record<Kegiatan>>,
    pub kehadiran: MongoCollection<Record<Kehadiran>>,
    pub kategori: MongoCollection<Record<Kategori>>,
}

impl Collections {
    pub async fn open(mongo: &MongoClient) -> Result<Self, UkmError> {
        Ok(Self {
            users: mongo.collection(USER_COLLECTION).await?,
            kegiatan: mongo.collection(Kegiatan::COLLECTION).await?,
            kehadiran: mongo.collection(Kehadiran::COLLECTION).await?,
            kategori: mongo.collection(Kategori::COLLECTION).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);

        let err = parse_object_id("not-an-id").unwrap_err();
        assert_eq!(err.public_message(), "Invalid ID");
        assert!(parse_object_id("").is_err());
    }

    #[test]
    fn test_count_value_accepts_any_width() {
        let doc = doc! { "a": 3_i32, "b": 4_i64, "c": 5.0_f64, "d": "x" };
        assert_eq!(count_value(&doc, "a"), 3);
        assert_eq!(count_value(&doc, "b"), 4);
        assert_eq!(count_value(&doc, "c"), 5);
        assert_eq!(count_value(&doc, "d"), 0);
        assert_eq!(count_value(&doc, "missing"), 0);
    }
}
