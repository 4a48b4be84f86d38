//! UKM backend - campus student organization management API
//!
//! Members, kegiatan (activities), kehadiran (attendance) and kategori, with
//! an admin statistics view. Every route is guarded by the gates in [`auth`]:
//! a bearer token is verified once per request and its claims are published
//! into the request's extensions for the handler.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

pub use config::Args;
pub use server::{dispatch, run, AppState};
pub use types::UkmError;
