//! Repository layer: one stateless struct per aggregate.

pub mod account_repo;
pub mod document_repo;
pub mod file_asset_repo;
pub mod plan_repo;
pub mod snapshot_repo;
pub mod usage_repo;

pub use account_repo::AccountRepo;
pub use document_repo::DocumentRepo;
pub use file_asset_repo::FileAssetRepo;
pub use plan_repo::PlanRepo;
pub use snapshot_repo::SnapshotRepo;
pub use usage_repo::UsageRepo;
