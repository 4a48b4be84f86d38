//! HTTP server for the UKM backend

mod http;

pub use http::{dispatch, run, AppState};
