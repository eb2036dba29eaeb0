//! 题库组装器 - 编排层
//!
//! 依次处理阅读、数学两个部分（目录 → 详情 → 合并），再合并为一份题库数据。
//! 只做调度和汇总，不做具体业务判断。

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clients::QbankClient;
use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{CandidateSummary, Dataset, Section};
use crate::services::{
    CatalogFetcher, DetailFetcher, DispatchStats, FetchDispatcher, Progress, ProgressRange,
};
use crate::utils::logging::{log_section_complete, log_section_start};
use crate::workflow::{SectionFlow, SectionResult, SectionStages};

/// 单个部分的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionReport {
    pub section: Section,
    pub catalog_size: usize,
    pub merged: usize,
    pub dropped: usize,
    pub details: DispatchStats,
}

/// 组装好的题库
#[derive(Debug, Default)]
pub struct QuestionBank {
    /// 两个部分合并后的题目，键为 questionId
    pub questions: Dataset,
    /// 每个部分的目录摘要，供组卷抽样使用
    pub pools: BTreeMap<Section, Vec<CandidateSummary>>,
    pub reports: Vec<SectionReport>,
}

impl QuestionBank {
    pub fn pool(&self, section: Section) -> &[CandidateSummary] {
        self.pools.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 合并一个部分的结果，已有的 questionId 不会被覆盖
    fn absorb(&mut self, result: SectionResult) {
        let SectionResult {
            section,
            summaries,
            merged,
            dispatch,
        } = result;

        let mut collisions = 0;
        let merged_count = merged.questions.len();
        for (id, question) in merged.questions {
            match self.questions.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(question);
                }
                Entry::Occupied(slot) => {
                    collisions += 1;
                    warn!("[{}] questionId {} 与已有题目重复，保留先前的记录", section, slot.key());
                }
            }
        }
        if collisions > 0 {
            warn!("[{}] ⚠️ 共 {} 道题与其他部分重复", section, collisions);
        }

        self.reports.push(SectionReport {
            section,
            catalog_size: summaries.len(),
            merged: merged_count,
            dropped: merged.dropped,
            details: dispatch,
        });
        self.pools.insert(section, summaries);
    }
}

/// 各部分的进度区间：阅读 0→45，数学 45→90
fn stages_for(section: Section) -> SectionStages {
    match section {
        Section::Reading => SectionStages {
            catalog: ProgressRange::new(0, 5),
            details: ProgressRange::new(5, 45),
        },
        Section::Math => SectionStages {
            catalog: ProgressRange::new(45, 50),
            details: ProgressRange::new(50, 90),
        },
    }
}

/// 题库组装器
pub struct BankAssembler {
    flow: SectionFlow,
}

impl BankAssembler {
    pub fn new(flow: SectionFlow) -> Self {
        Self { flow }
    }

    /// 按配置组装：目录与详情都走同一个 HTTP 客户端
    pub fn from_config(config: &Config, client: QbankClient, cancel: CancellationToken) -> Self {
        let client = Arc::new(client);
        let catalog: Arc<dyn CatalogFetcher> = client.clone();
        let details: Arc<dyn DetailFetcher> = client;
        let dispatcher =
            FetchDispatcher::new(details, config.max_concurrent_requests).with_cancellation(cancel);
        let debug_limit = config.debug_mode.then_some(config.debug_limit);

        Self::new(SectionFlow::new(catalog, dispatcher, debug_limit))
    }

    /// 组装完整题库
    ///
    /// 任一部分的目录获取失败都会终止整个组装
    pub async fn assemble(&self, progress: &Progress) -> Result<QuestionBank, CatalogError> {
        let mut bank = QuestionBank::default();

        for section in Section::ALL {
            log_section_start(section);
            let result = self.flow.run(section, progress, stages_for(section)).await?;
            bank.absorb(result);
            if let Some(report) = bank.reports.last() {
                log_section_complete(report);
            }
        }

        progress.report(95, "两个部分已合并");
        info!("✓ 题库组装完成，共 {} 道题", bank.questions.len());
        Ok(bank)
    }
}
