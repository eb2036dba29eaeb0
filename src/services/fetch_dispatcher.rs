//! 详情批量分发器 - 业务能力层
//!
//! ## 职责
//!
//! 在固定大小的并发池中执行一批详情请求，按完成顺序收集结果。
//!
//! - **并发控制**：Semaphore 限制同时在途的请求数（默认 20）
//! - **失败隔离**：单个任务失败只记为"无详情"，不影响同批其他任务
//! - **进度上报**：每完成一个任务上报一次区间内的线性进度
//! - **取消**：任务拿到许可后、发请求前检查取消令牌

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::FetchError;
use crate::models::{CandidateSummary, DetailPayload, LookupKey};
use crate::services::detail_fetcher::DetailFetcher;
use crate::services::progress::{Progress, ProgressRange};

/// 查询键 → 详情（失败为 None）
pub type DetailMap = HashMap<LookupKey, Option<DetailPayload>>;

/// 单个详情请求任务
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTask {
    pub key: LookupKey,
}

impl FetchTask {
    /// 为每个有查询键的摘要创建任务，重复的键只保留一次
    pub fn from_summaries(summaries: &[CandidateSummary]) -> Vec<FetchTask> {
        let mut seen = HashSet::new();
        summaries
            .iter()
            .filter_map(CandidateSummary::lookup_key)
            .filter(|key| seen.insert(key.clone()))
            .map(|key| FetchTask { key })
            .collect()
    }
}

/// 分发统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// 分发结果
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub details: DetailMap,
    pub stats: DispatchStats,
}

enum TaskOutcome {
    Fetched(DetailPayload),
    Failed(FetchError),
    Cancelled,
}

/// 详情批量分发器
pub struct FetchDispatcher<F: ?Sized> {
    fetcher: Arc<F>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl<F> FetchDispatcher<F>
where
    F: DetailFetcher + ?Sized + 'static,
{
    /// 创建新的分发器，`concurrency` 为 0 时按 1 处理
    pub fn new(fetcher: Arc<F>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// 使用外部取消令牌
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 执行一批任务
    ///
    /// 返回的映射包含每个任务的键，成功为 Some，失败或取消为 None
    pub async fn dispatch(
        &self,
        tasks: Vec<FetchTask>,
        progress: &Progress,
        range: ProgressRange,
    ) -> DispatchOutcome {
        let mut seen = HashSet::new();
        let tasks: Vec<FetchTask> = tasks.into_iter().filter(|t| seen.insert(t.key.clone())).collect();

        let total = tasks.len();
        let mut outcome = DispatchOutcome {
            details: tasks.iter().map(|t| (t.key.clone(), None)).collect(),
            stats: DispatchStats {
                total,
                ..Default::default()
            },
        };

        if total == 0 {
            progress.report(range.end, "没有需要获取详情的题目");
            return outcome;
        }

        debug!("开始分发 {} 个详情请求，并发上限 {}", total, self.concurrency);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for task in tasks {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let cancel = self.cancel.clone();

            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) if !cancel.is_cancelled() => {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => TaskOutcome::Cancelled,
                            fetched = fetcher.fetch_detail(&task.key) => match fetched {
                                Ok(payload) => TaskOutcome::Fetched(payload),
                                Err(e) => TaskOutcome::Failed(e),
                            },
                        }
                    }
                    _ => TaskOutcome::Cancelled,
                };
                (task.key, result)
            });
        }

        // 按完成顺序收集
        let mut done = 0;
        while let Some(joined) = join_set.join_next().await {
            done += 1;
            match joined {
                Ok((key, TaskOutcome::Fetched(payload))) => {
                    outcome.stats.succeeded += 1;
                    outcome.details.insert(key, Some(payload));
                }
                Ok((key, TaskOutcome::Failed(e))) => {
                    outcome.stats.failed += 1;
                    debug!("[{}] 详情获取失败: {}", key, e);
                }
                Ok((_, TaskOutcome::Cancelled)) => {
                    outcome.stats.cancelled += 1;
                }
                Err(e) => {
                    outcome.stats.failed += 1;
                    error!("详情任务异常退出: {}", e);
                }
            }

            progress.report(
                range.at(done, total),
                &format!("已获取题目详情 {}/{}", done, total),
            );
        }

        if outcome.stats.cancelled > 0 {
            warn!("⚠️ 有 {} 个详情请求因取消而未执行", outcome.stats.cancelled);
        }

        outcome
    }
}
