//! Shared types

mod error;

pub use error::UkmError;
