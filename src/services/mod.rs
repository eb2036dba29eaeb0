pub mod detail_fetcher;
pub mod fetch_dispatcher;
pub mod merger;
pub mod module_sampler;
pub mod progress;

pub use detail_fetcher::{CatalogFetcher, DetailFetcher};
pub use fetch_dispatcher::{DetailMap, DispatchOutcome, DispatchStats, FetchDispatcher, FetchTask};
pub use merger::{merge, MergeOutcome};
pub use module_sampler::{CandidatePool, ModuleSampler, PoolRow, SampleFailure};
pub use progress::{Progress, ProgressObserver, ProgressRange};
