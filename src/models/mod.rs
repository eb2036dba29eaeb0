pub mod detail;
pub mod loaders;
pub mod question;
pub mod quota;
pub mod section;

pub use detail::DetailPayload;
pub use loaders::{load_quota_table, write_json, Dataset};
pub use question::{CandidateSummary, Difficulty, LookupKey, MergedQuestion};
pub use quota::{QuotaTable, SamplingQuota, SelectionPolicy, MODULES};
pub use section::Section;
