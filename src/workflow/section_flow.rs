//! 单个部分的处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 获取目录（失败即终止，带部分名称）
//! 2. 调试模式下截取前 N 条
//! 3. 并发获取详情
//! 4. 合并为以 questionId 为键的数据

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::models::{CandidateSummary, Section};
use crate::services::{
    merge, CatalogFetcher, DetailFetcher, DispatchStats, FetchDispatcher, FetchTask, MergeOutcome,
    Progress, ProgressRange,
};

/// 单个部分在整体进度中的区间
#[derive(Debug, Clone, Copy)]
pub struct SectionStages {
    pub catalog: ProgressRange,
    pub details: ProgressRange,
}

/// 单个部分的处理结果
#[derive(Debug)]
pub struct SectionResult {
    pub section: Section,
    /// 实际参与抓取的目录摘要（调试模式下已截取）
    pub summaries: Vec<CandidateSummary>,
    pub merged: MergeOutcome,
    pub dispatch: DispatchStats,
}

/// 调试模式：只保留前 `limit` 条摘要
pub fn limit_for_debug(mut summaries: Vec<CandidateSummary>, limit: Option<usize>) -> Vec<CandidateSummary> {
    if let Some(limit) = limit {
        summaries.truncate(limit);
    }
    summaries
}

/// 单个部分的处理流程
pub struct SectionFlow {
    catalog: Arc<dyn CatalogFetcher>,
    dispatcher: FetchDispatcher<dyn DetailFetcher>,
    debug_limit: Option<usize>,
}

impl SectionFlow {
    pub fn new(
        catalog: Arc<dyn CatalogFetcher>,
        dispatcher: FetchDispatcher<dyn DetailFetcher>,
        debug_limit: Option<usize>,
    ) -> Self {
        Self {
            catalog,
            dispatcher,
            debug_limit,
        }
    }

    pub async fn run(
        &self,
        section: Section,
        progress: &Progress,
        stages: SectionStages,
    ) -> Result<SectionResult, CatalogError> {
        progress.report(stages.catalog.start, &format!("正在获取 {} 目录...", section));

        let catalog = self.catalog.fetch_catalog(section).await?;
        info!("[{}] ✓ 目录共 {} 道题", section, catalog.len());

        let summaries = limit_for_debug(catalog, self.debug_limit);
        if let Some(limit) = self.debug_limit {
            info!("[{}] 🐞 调试模式，只处理前 {} 道", section, limit);
        }
        progress.report(stages.catalog.end, &format!("{} 目录获取完成", section));

        let tasks = FetchTask::from_summaries(&summaries);
        info!(
            "[{}] 🔍 获取 {} 道题的详情 (并发 {})",
            section,
            tasks.len(),
            self.dispatcher.concurrency()
        );

        let dispatched = self.dispatcher.dispatch(tasks, progress, stages.details).await;
        if dispatched.stats.failed > 0 {
            warn!(
                "[{}] ⚠️ {} / {} 道题详情获取失败",
                section, dispatched.stats.failed, dispatched.stats.total
            );
        }

        let merged = merge(&summaries, &dispatched.details);
        if merged.dropped > 0 {
            warn!("[{}] ⚠️ {} 条记录缺少 questionId，已丢弃", section, merged.dropped);
        }
        info!("[{}] ✓ 合并完成，共 {} 道题", section, merged.questions.len());

        Ok(SectionResult {
            section,
            summaries,
            merged,
            dispatch: dispatched.stats,
        })
    }
}
