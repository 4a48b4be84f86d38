//! Kehadiran (attendance) schema

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::db::schemas::Resource;
use crate::validation::{validate_one_of, validate_required, ValidationResult};

pub const KEHADIRAN_COLLECTION: &str = "kehadiran";

pub const KEHADIRAN_STATUSES: [&str; 2] = ["hadir", "tidak"];

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct Kehadiran {
    pub user_id: String,
    /// Hex id of the kegiatan, stored as a string
    pub kegiatan_id: String,
    pub status: String,
    /// RFC 3339 check-in time
    pub waktu_cek: String,
}

impl Resource for Kehadiran {
    const COLLECTION: &'static str = KEHADIRAN_COLLECTION;
    const LABEL: &'static str = "Kehadiran";

    fn validate(&self) -> ValidationResult {
        validate_required("user_id", &self.user_id)?;
        validate_required("kegiatan_id", &self.kegiatan_id)?;
        validate_one_of("status", &self.status, &KEHADIRAN_STATUSES)
    }

    /// Members can only record their own attendance; admins may record anyone's.
    fn prepare(&mut self, caller: &Claims) {
        if !caller.is_admin() || self.user_id.trim().is_empty() {
            self.user_id = caller.subject_id.clone();
        }
        if self.waktu_cek.trim().is_empty() {
            self.waktu_cek = chrono::Utc::now().to_rfc3339();
        }
    }

    fn indexes() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "kegiatan_id": 1, "user_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("kegiatan_user_index".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn caller(role: Role) -> Claims {
        Claims {
            subject_id: "caller-id".into(),
            email: "caller@ukm.com".into(),
            role,
            iat: 0,
            exp: 1,
        }
    }

    #[test]
    fn test_member_records_own_attendance() {
        let mut kehadiran = Kehadiran {
            user_id: "someone-else".into(),
            kegiatan_id: "k1".into(),
            status: "hadir".into(),
            ..Default::default()
        };
        kehadiran.prepare(&caller(Role::Member));

        assert_eq!(kehadiran.user_id, "caller-id");
        assert!(chrono::DateTime::parse_from_rfc3339(&kehadiran.waktu_cek).is_ok());
        assert!(kehadiran.validate().is_ok());
    }

    #[test]
    fn test_admin_may_record_for_others() {
        let mut kehadiran = Kehadiran {
            user_id: "member-id".into(),
            kegiatan_id: "k1".into(),
            status: "tidak".into(),
            waktu_cek: "2024-06-01T08:00:00+07:00".into(),
        };
        kehadiran.prepare(&caller(Role::Admin));

        assert_eq!(kehadiran.user_id, "member-id");
        assert_eq!(kehadiran.waktu_cek, "2024-06-01T08:00:00+07:00");
    }

    #[test]
    fn test_status_values() {
        let kehadiran = Kehadiran {
            user_id: "u".into(),
            kegiatan_id: "k".into(),
            status: "izin".into(),
            ..Default::default()
        };
        assert_eq!(kehadiran.validate().unwrap_err().field, "status");
    }
}
