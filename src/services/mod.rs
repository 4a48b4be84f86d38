//! Services that sit between routes and the database

pub mod statistics;

pub use statistics::{collect_statistics, Statistics};
