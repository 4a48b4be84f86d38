//! Database schemas for the UKM backend
//!
//! Defines MongoDB document structures for users, kegiatan, kehadiran and kategori.

mod kategori;
mod kegiatan;
mod kehadiran;
mod metadata;
mod record;
mod user;

pub use kategori::{Kategori, KATEGORI_COLLECTION};
pub use kegiatan::{Kegiatan, KEGIATAN_COLLECTION, KEGIATAN_STATUSES};
pub use kehadiran::{Kehadiran, KEHADIRAN_COLLECTION, KEHADIRAN_STATUSES};
pub use metadata::Metadata;
pub use record::{Record, RecordView, Resource};
pub use user::{UserDoc, UserView, USER_COLLECTION};
