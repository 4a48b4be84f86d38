//! Kegiatan (activity) schema

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::db::schemas::Resource;
use crate::validation::{validate_non_negative, validate_one_of, validate_required, ValidationResult};

pub const KEGIATAN_COLLECTION: &str = "kegiatan";

/// Lifecycle states a kegiatan may be tagged with
pub const KEGIATAN_STATUSES: [&str; 4] = ["upcoming", "ongoing", "completed", "cancelled"];

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Kegiatan {
    pub judul: String,
    pub deskripsi: String,
    /// Date as sent by the client, usually `YYYY-MM-DD`
    pub tanggal: String,
    pub lokasi: String,
    /// Name of the owning UKM, matches `kategori.nama_kategori`
    pub kategori: String,
    #[serde(rename = "maxParticipants")]
    pub max_participants: i64,
    pub dokumentasi_url: String,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Resource for Kegiatan {
    const COLLECTION: &'static str = KEGIATAN_COLLECTION;
    const LABEL: &'static str = "Kegiatan";

    fn validate(&self) -> ValidationResult {
        validate_required("judul", &self.judul)?;
        validate_required("tanggal", &self.tanggal)?;
        validate_non_negative("maxParticipants", self.max_participants)?;
        if let Some(status) = &self.status {
            validate_one_of("status", status, &KEGIATAN_STATUSES)?;
        }
        Ok(())
    }

    fn prepare(&mut self, caller: &Claims) {
        if self.created_by.trim().is_empty() {
            self.created_by = caller.subject_id.clone();
        }
    }

    /// An update without `created_by` keeps the original creator.
    fn update_document(&self) -> Result<Document, bson::ser::Error> {
        let mut fields = bson::to_document(self)?;
        if self.created_by.trim().is_empty() {
            fields.remove("created_by");
        }
        Ok(fields)
    }

    fn indexes() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "tanggal": -1 },
                Some(IndexOptions::builder().name("tanggal_index".to_string()).build()),
            ),
            (
                doc! { "kategori": 1 },
                Some(IndexOptions::builder().name("kategori_index".to_string()).build()),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn caller() -> Claims {
        Claims {
            subject_id: "665f1c2ab0d4e3a1f0c9b871".into(),
            email: "admin@ukm.com".into(),
            role: Role::Admin,
            iat: 0,
            exp: 1,
        }
    }

    #[test]
    fn test_required_fields() {
        let mut kegiatan = Kegiatan {
            judul: "Latihan Rutin".into(),
            tanggal: "2024-06-01".into(),
            ..Default::default()
        };
        assert!(kegiatan.validate().is_ok());

        kegiatan.tanggal.clear();
        assert_eq!(kegiatan.validate().unwrap_err().field, "tanggal");
    }

    #[test]
    fn test_status_must_be_known() {
        let kegiatan = Kegiatan {
            judul: "Konser".into(),
            tanggal: "2024-06-01".into(),
            status: Some("postponed".into()),
            ..Default::default()
        };
        assert_eq!(kegiatan.validate().unwrap_err().field, "status");
    }

    #[test]
    fn test_created_by_defaults_to_caller() {
        let mut kegiatan = Kegiatan::default();
        kegiatan.prepare(&caller());
        assert_eq!(kegiatan.created_by, "665f1c2ab0d4e3a1f0c9b871");

        let mut kegiatan = Kegiatan {
            created_by: "someone-else".into(),
            ..Default::default()
        };
        kegiatan.prepare(&caller());
        assert_eq!(kegiatan.created_by, "someone-else");
    }

    #[test]
    fn test_update_keeps_creator_when_omitted() {
        let kegiatan = Kegiatan {
            judul: "Rapat".into(),
            tanggal: "2024-06-01".into(),
            ..Default::default()
        };
        let fields = kegiatan.update_document().unwrap();
        assert!(!fields.contains_key("created_by"));
        assert!(!fields.contains_key("status"));
        assert_eq!(fields.get_str("judul").unwrap(), "Rapat");
    }

    #[test]
    fn test_json_field_names() {
        let kegiatan: Kegiatan = serde_json::from_value(serde_json::json!({
            "judul": "Rapat",
            "tanggal": "2024-06-01",
            "maxParticipants": 30
        }))
        .unwrap();
        assert_eq!(kegiatan.max_participants, 30);

        let json = serde_json::to_value(&kegiatan).unwrap();
        assert_eq!(json["maxParticipants"], 30);
        assert!(json.get("status").is_none());
    }
}
