//! 合并服务 - 业务能力层
//!
//! 把目录摘要和详情结果合并为以 questionId 为键的题目数据。
//! 纯函数：不做 I/O，不含随机性，相同输入得到相同输出。

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::MergeError;
use crate::models::{CandidateSummary, MergedQuestion};
use crate::services::fetch_dispatcher::DetailMap;

/// 合并结果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeOutcome {
    pub questions: BTreeMap<String, MergedQuestion>,
    /// 缺少 questionId 被丢弃的记录数
    pub dropped: usize,
    /// questionId 重复而被忽略的记录数
    pub duplicates: usize,
}

/// 合并摘要与详情
///
/// - 查询键优先级：ibn → external_id → 无（详情为 None）
/// - 缺少 questionId 的记录直接丢弃
/// - questionId 重复时保留第一条
pub fn merge(summaries: &[CandidateSummary], details: &DetailMap) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for (position, summary) in summaries.iter().enumerate() {
        let Some(id) = summary.id() else {
            debug!("{}", MergeError::MissingIdentifier { position });
            outcome.dropped += 1;
            continue;
        };

        if outcome.questions.contains_key(id) {
            debug!("questionId {} 重复，保留第一条", id);
            outcome.duplicates += 1;
            continue;
        }

        let resolved = summary
            .lookup_key()
            .and_then(|key| details.get(&key).cloned().flatten());

        outcome.questions.insert(
            id.to_string(),
            MergedQuestion {
                id: id.to_string(),
                basic_info: summary.clone(),
                details: resolved,
            },
        );
    }

    outcome
}
