//! 组卷配额
//!
//! 每个 (部分, 模块) 对应一份固定的配额：目标题数、各难度上限、单个知识点上限、抽样策略。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::question::Difficulty;
use crate::models::section::Section;

/// 每个部分的模块编号
pub const MODULES: [u8; 2] = [1, 2];

/// 抽样策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// 先为每个知识点各抽一题，再补足剩余题数
    CoverageFirst,
    /// 单阶段抽样，受单知识点上限约束
    QuotaOnly,
}

/// 单个模块的配额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingQuota {
    pub target_count: usize,
    pub difficulty_ceilings: BTreeMap<Difficulty, usize>,
    pub max_per_skill: usize,
    pub policy: SelectionPolicy,
}

impl SamplingQuota {
    pub fn new(
        target_count: usize,
        ceilings: [usize; 3],
        max_per_skill: usize,
        policy: SelectionPolicy,
    ) -> Self {
        let difficulty_ceilings = Difficulty::ALL.into_iter().zip(ceilings).collect();
        Self {
            target_count,
            difficulty_ceilings,
            max_per_skill,
            policy,
        }
    }

    /// 某难度的上限，未配置视为 0
    pub fn ceiling(&self, difficulty: Difficulty) -> usize {
        self.difficulty_ceilings.get(&difficulty).copied().unwrap_or(0)
    }

    /// 各难度上限之和
    pub fn total_capacity(&self) -> usize {
        Difficulty::ALL
            .iter()
            .map(|d| self.ceiling(*d))
            .fold(0, usize::saturating_add)
    }
}

/// 全部模块的配额表
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaTable {
    quotas: BTreeMap<(Section, u8), SamplingQuota>,
}

impl Default for QuotaTable {
    fn default() -> Self {
        let mut quotas = BTreeMap::new();
        quotas.insert(
            (Section::Reading, 1),
            SamplingQuota::new(27, [11, 11, 5], 3, SelectionPolicy::QuotaOnly),
        );
        quotas.insert(
            (Section::Reading, 2),
            SamplingQuota::new(27, [7, 10, 10], 3, SelectionPolicy::QuotaOnly),
        );
        quotas.insert(
            (Section::Math, 1),
            SamplingQuota::new(22, [9, 9, 4], 1, SelectionPolicy::CoverageFirst),
        );
        quotas.insert(
            (Section::Math, 2),
            SamplingQuota::new(22, [4, 9, 9], 1, SelectionPolicy::CoverageFirst),
        );
        Self { quotas }
    }
}

impl QuotaTable {
    pub fn get(&self, section: Section, module: u8) -> Option<&SamplingQuota> {
        self.quotas.get(&(section, module))
    }

    pub fn insert(&mut self, section: Section, module: u8, quota: SamplingQuota) {
        self.quotas.insert((section, module), quota);
    }
}
