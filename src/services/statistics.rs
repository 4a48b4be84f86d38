//! Dashboard statistics
//!
//! Totals come from `count_documents`; the breakdowns come from aggregation
//! pipelines whose raw result documents are folded by the pure functions
//! below, so the shaping logic can be tested without a server.

use bson::{doc, Bson, Document};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use utoipa::ToSchema;

use crate::db::schemas::{KEGIATAN_STATUSES, KEHADIRAN_COLLECTION};
use crate::db::{count_value, Collections};
use crate::types::UkmError;

/// How many kegiatan `recentActivities` lists
pub const RECENT_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_kegiatan: i64,
    pub total_anggota: i64,
    pub total_kehadiran: i64,
    pub kegiatan_by_status: BTreeMap<String, i64>,
    pub kegiatan_by_ukm: Vec<UkmStats>,
    pub members_by_ukm: Vec<MemberStats>,
    pub recent_activities: Vec<ActivityStats>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct UkmStats {
    pub ukm: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub ukm: String,
    pub admin_count: i64,
    pub member_count: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
pub struct ActivityStats {
    pub title: String,
    pub ukm: String,
    pub date: String,
    pub attendees: i64,
}

fn group_count(field: Bson) -> Document {
    doc! { "$group": { "_id": field, "count": { "$sum": 1 } } }
}

pub fn status_pipeline() -> Vec<Document> {
    vec![group_count(Bson::String("$status".into()))]
}

pub fn ukm_pipeline() -> Vec<Document> {
    vec![
        group_count(Bson::String("$kategori".into())),
        doc! { "$sort": { "count": -1 } },
    ]
}

pub fn member_pipeline() -> Vec<Document> {
    vec![group_count(Bson::Document(doc! { "ukm": "$ukm", "role": "$role" }))]
}

/// Latest kegiatan with the number of kehadiran rows pointing at each.
///
/// Kehadiran stores `kegiatan_id` as a hex string, hence the `$toString`.
pub fn recent_pipeline() -> Vec<Document> {
    vec![
        doc! { "$sort": { "tanggal": -1 } },
        doc! { "$limit": RECENT_LIMIT },
        doc! {
            "$lookup": {
                "from": KEHADIRAN_COLLECTION,
                "let": { "kegiatan_id": { "$toString": "$_id" } },
                "pipeline": [
                    { "$match": { "$expr": { "$eq": ["$kegiatan_id", "$$kegiatan_id"] } } },
                    { "$count": "total" },
                ],
                "as": "kehadiran_count",
            }
        },
        doc! {
            "$project": {
                "judul": 1,
                "kategori": 1,
                "tanggal": 1,
                "attendees_count": {
                    "$ifNull": [{ "$arrayElemAt": ["$kehadiran_count.total", 0] }, 0]
                },
            }
        },
    ]
}

fn str_field<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get_str(key).ok()
}

/// Counts per status; the four known statuses are always present.
pub fn status_breakdown(rows: &[Document]) -> BTreeMap<String, i64> {
    let mut counts: BTreeMap<String, i64> = KEGIATAN_STATUSES
        .iter()
        .map(|status| (status.to_string(), 0))
        .collect();

    for row in rows {
        if let Some(status) = str_field(row, "_id") {
            counts.insert(status.to_string(), count_value(row, "count"));
        }
    }

    counts
}

/// Kegiatan per UKM, largest first, with each UKM's share of `total`
pub fn ukm_breakdown(rows: &[Document], total: i64) -> Vec<UkmStats> {
    let mut stats: Vec<UkmStats> = rows
        .iter()
        .filter_map(|row| {
            let ukm = str_field(row, "_id").filter(|ukm| !ukm.is_empty())?;
            let count = count_value(row, "count");
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };

            Some(UkmStats {
                ukm: ukm.to_string(),
                count,
                percentage,
            })
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ukm.cmp(&b.ukm)));
    stats
}

/// Admin and member counts per UKM, ordered by UKM name
pub fn member_breakdown(rows: &[Document]) -> Vec<MemberStats> {
    let mut by_ukm: BTreeMap<String, MemberStats> = BTreeMap::new();

    for row in rows {
        let Ok(key) = row.get_document("_id") else {
            continue;
        };
        let Some(ukm) = str_field(key, "ukm").filter(|ukm| !ukm.is_empty()) else {
            continue;
        };

        let count = count_value(row, "count");
        let entry = by_ukm.entry(ukm.to_string()).or_insert_with(|| MemberStats {
            ukm: ukm.to_string(),
            ..Default::default()
        });

        if str_field(key, "role") == Some("admin") {
            entry.admin_count += count;
        } else {
            entry.member_count += count;
        }
        entry.total = entry.admin_count + entry.member_count;
    }

    by_ukm.into_values().collect()
}

pub fn recent_activity(rows: &[Document]) -> Vec<ActivityStats> {
    rows.iter()
        .map(|row| ActivityStats {
            title: str_field(row, "judul").unwrap_or_default().to_string(),
            ukm: str_field(row, "kategori").unwrap_or_default().to_string(),
            date: str_field(row, "tanggal").unwrap_or_default().to_string(),
            attendees: count_value(row, "attendees_count"),
        })
        .collect()
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Gather every figure for `GET /statistics`
pub async fn collect_statistics(db: &Collections) -> Result<Statistics, UkmError> {
    let total_kegiatan = to_i64(db.kegiatan.count(doc! {}).await?);
    let total_anggota = to_i64(db.users.count(doc! {}).await?);
    let total_kehadiran = to_i64(db.kehadiran.count(doc! {}).await?);

    let status_rows = db.kegiatan.aggregate(status_pipeline()).await?;
    let ukm_rows = db.kegiatan.aggregate(ukm_pipeline()).await?;
    let member_rows = db.users.aggregate(member_pipeline()).await?;
    let recent_rows = db.kegiatan.aggregate(recent_pipeline()).await?;

    debug!(
        total_kegiatan,
        total_anggota,
        total_kehadiran,
        "Statistics aggregated"
    );

    Ok(Statistics {
        total_kegiatan,
        total_anggota,
        total_kehadiran,
        kegiatan_by_status: status_breakdown(&status_rows),
        kegiatan_by_ukm: ukm_breakdown(&ukm_rows, total_kegiatan),
        members_by_ukm: member_breakdown(&member_rows),
        recent_activities: recent_activity(&recent_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_and_counts() {
        let rows = vec![
            doc! { "_id": "upcoming", "count": 3_i32 },
            doc! { "_id": "completed", "count": 2_i64 },
            doc! { "_id": Bson::Null, "count": 7_i32 },
        ];

        let counts = status_breakdown(&rows);
        assert_eq!(counts["upcoming"], 3);
        assert_eq!(counts["completed"], 2);
        assert_eq!(counts["ongoing"], 0);
        assert_eq!(counts["cancelled"], 0);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_ukm_breakdown_percentages() {
        let rows = vec![
            doc! { "_id": "UKM Musik", "count": 1_i32 },
            doc! { "_id": "UKM Futsal", "count": 3_i32 },
            doc! { "_id": "", "count": 4_i32 },
        ];

        let stats = ukm_breakdown(&rows, 8);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].ukm, "UKM Futsal");
        assert_eq!(stats[0].percentage, 37.5);
        assert_eq!(stats[1].percentage, 12.5);

        assert!(ukm_breakdown(&rows, 0).iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_member_breakdown_groups_roles() {
        let rows = vec![
            doc! { "_id": { "ukm": "UKM Tari", "role": "member" }, "count": 5_i32 },
            doc! { "_id": { "ukm": "UKM Tari", "role": "admin" }, "count": 1_i32 },
            doc! { "_id": { "ukm": "UKM Catur", "role": "member" }, "count": 2.0_f64 },
            doc! { "_id": { "ukm": "", "role": "member" }, "count": 9_i32 },
        ];

        let stats = member_breakdown(&rows);
        assert_eq!(
            stats,
            vec![
                MemberStats {
                    ukm: "UKM Catur".into(),
                    admin_count: 0,
                    member_count: 2,
                    total: 2
                },
                MemberStats {
                    ukm: "UKM Tari".into(),
                    admin_count: 1,
                    member_count: 5,
                    total: 6
                },
            ]
        );
    }

    #[test]
    fn test_recent_activity_tolerates_missing_fields() {
        let rows = vec![
            doc! { "judul": "Konser Amal", "kategori": "UKM Musik", "tanggal": "2024-07-01", "attendees_count": 12_i32 },
            doc! { "judul": "Rapat" },
        ];

        let recent = recent_activity(&rows);
        assert_eq!(recent[0].attendees, 12);
        assert_eq!(recent[0].ukm, "UKM Musik");
        assert_eq!(recent[1].date, "");
        assert_eq!(recent[1].attendees, 0);
    }

    #[test]
    fn test_recent_pipeline_shape() {
        let pipeline = recent_pipeline();
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline[1].get_i64("$limit").unwrap(), RECENT_LIMIT);
        let lookup = pipeline[2].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "kehadiran");
    }

    #[test]
    fn test_serialized_field_names() {
        let stats = Statistics {
            total_kegiatan: 0,
            total_anggota: 1,
            total_kehadiran: 0,
            kegiatan_by_status: status_breakdown(&[]),
            kegiatan_by_ukm: vec![],
            members_by_ukm: vec![MemberStats {
                ukm: "UKM Tari".into(),
                admin_count: 1,
                member_count: 0,
                total: 1,
            }],
            recent_activities: vec![],
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalAnggota"], 1);
        assert_eq!(json["kegiatanByStatus"]["upcoming"], 0);
        assert_eq!(json["membersByUkm"][0]["adminCount"], 1);
        assert!(json["recentActivities"].as_array().unwrap().is_empty());
    }
}
