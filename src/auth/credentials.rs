//! Credential store seam used by login
//!
//! Production reads the `users` store; tests may swap in an in-memory map.

use bson::doc;
use std::sync::Arc;

use crate::auth::Role;
use crate::db::schemas::UserDoc;
use crate::db::DocumentStore;
use crate::types::UkmError;

/// An account as the login flow needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub subject_id: String,
    pub nama: String,
    pub email: String,
    pub role: Role,
    pub ukm: String,
    /// Argon2id PHC string
    pub password_hash: String,
}

impl StoredAccount {
    /// Returns `None` for documents that were never persisted.
    pub fn from_doc(user: UserDoc) -> Option<Self> {
        let id = user._id?;
        Some(Self {
            subject_id: id.to_hex(),
            nama: user.nama,
            email: user.email,
            role: user.role,
            ukm: user.ukm,
            password_hash: user.password,
        })
    }
}

/// Lookup of stored credentials by email
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredAccount>, UkmError>;
}

/// Credential lookup over the `users` document store
pub struct UserCredentialStore {
    users: Arc<dyn DocumentStore<UserDoc>>,
}

impl UserCredentialStore {
    pub fn new(users: Arc<dyn DocumentStore<UserDoc>>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl CredentialStore for UserCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredAccount>, UkmError> {
        let user = self.users.find_one(doc! { "email": email }).await?;
        Ok(user.and_then(StoredAccount::from_doc))
    }
}
