pub mod dataset_store;
pub mod quota_loader;

pub use dataset_store::{write_json, Dataset};
pub use quota_loader::{load_quota_table, parse_quota_overrides};
