//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write paths that need them

pub mod account;
pub mod document;
pub mod file_asset;
pub mod plan;
pub mod snapshot;
pub mod usage;
