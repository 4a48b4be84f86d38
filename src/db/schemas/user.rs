//! User document schema
//!
//! Stores member accounts and their Argon2 password digests.

use bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::Role;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub nama: String,

    pub email: String,

    /// Argon2id PHC string. Never leaves the server.
    pub password: String,

    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,

    #[serde(default)]
    pub ukm: String,
}

/// Unknown or malformed stored roles read as [`Role::Member`].
fn lenient_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Bson::deserialize(deserializer)?;
    let role = raw
        .as_str()
        .and_then(|value| value.parse::<Role>().ok())
        .unwrap_or_else(|| {
            warn!(stored_role = %raw, "Unknown stored role, treating as member");
            Role::Member
        });
    Ok(role)
}

impl UserDoc {
    pub fn new(nama: String, email: String, password_hash: String, role: Role, ukm: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            nama,
            email,
            password: password_hash,
            role,
            ukm,
        }
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            nama: self.nama.clone(),
            email: self.email.clone(),
            role: self.role,
            ukm: self.ukm.clone(),
        }
    }
}

/// A user as returned to clients
#[derive(Serialize, Clone, Debug, PartialEq, Eq, ToSchema)]
pub struct UserView {
    pub id: String,
    pub nama: String,
    pub email: String,
    pub role: Role,
    pub ukm: String,
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "ukm": 1, "role": 1 },
                Some(
                    IndexOptions::builder()
                        .name("ukm_role_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
