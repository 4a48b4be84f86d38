//! Kategori schema. Each kategori names one UKM.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::schemas::Resource;
use crate::validation::{validate_required, ValidationResult};

pub const KATEGORI_COLLECTION: &str = "kategori";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Kategori {
    pub nama_kategori: String,
}

impl Resource for Kategori {
    const COLLECTION: &'static str = KATEGORI_COLLECTION;
    const LABEL: &'static str = "Kategori";

    fn validate(&self) -> ValidationResult {
        validate_required("nama_kategori", &self.nama_kategori)
    }

    fn indexes() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "nama_kategori": 1 },
            Some(
                IndexOptions::builder()
                    .name("nama_kategori_index".to_string())
                    .build(),
            ),
        )]
    }
}
