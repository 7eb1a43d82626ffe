//! Domain logic for the Keepsake content platform.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the API, and any future CLI tooling. It holds the
//! shared type aliases, the domain error enum, slug normalization and
//! candidate generation, usage-period keys, plan/quota decision logic,
//! the schema-tolerant document content record, and the storage backend
//! seam.

pub mod content;
pub mod error;
pub mod period;
pub mod plan;
pub mod slug;
pub mod storage;
pub mod types;
