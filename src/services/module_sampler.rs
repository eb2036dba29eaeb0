//! 组卷抽样服务 - 业务能力层
//!
//! 从候选池中随机抽取恰好 `target_count` 道题，满足难度上限和知识点约束。
//!
//! ## 抽样方式
//!
//! 候选池先打乱成工作集，再按顺序逐个检验、接受或跳过，接受的题目从工作集移除，
//! 因此同一道题不会被选中两次。
//!
//! - **覆盖优先**：第一阶段为每个知识点各取一道，第二阶段只受难度上限约束补足题数
//! - **仅配额**：单阶段，同时受难度上限和单知识点上限约束
//!
//! 难度上限是严格的：已选数量 `< 上限` 才接受，最终各难度数量不会超过上限。
//!
//! 抽样前先做可行性检查，明显无解时直接返回原因；单次随机尝试失败后重新打乱再试，
//! 尝试次数有上限，因此总会结束。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::error::{QuotaShortfall, SamplingError};
use crate::models::{CandidateSummary, Difficulty, SamplingQuota, Section, SelectionPolicy};

const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// 候选池中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRow {
    pub id: String,
    pub difficulty: Difficulty,
    pub skill: String,
}

impl PoolRow {
    pub fn new(id: impl Into<String>, difficulty: Difficulty, skill: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            difficulty,
            skill: skill.into(),
        }
    }
}

/// 候选池
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    rows: Vec<PoolRow>,
}

impl CandidatePool {
    /// 由目录摘要构建，缺少 id / 难度 / 知识点的记录不进入候选池
    pub fn from_summaries(summaries: &[CandidateSummary]) -> Self {
        let rows = summaries.iter().filter_map(|s| {
            Some(PoolRow::new(s.id()?, s.difficulty?, s.skill()?))
        });
        let pool = Self::from_rows(rows);
        if pool.len() < summaries.len() {
            debug!(
                "候选池: {} 条摘要中 {} 条可用",
                summaries.len(),
                pool.len()
            );
        }
        pool
    }

    /// 由行构建，重复 id 只保留第一条
    pub fn from_rows(rows: impl IntoIterator<Item = PoolRow>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.id.clone()))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PoolRow] {
        &self.rows
    }

    /// 池中出现的全部知识点
    pub fn skills(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.skill.as_str()).collect()
    }

    fn count_by_difficulty(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.difficulty).or_insert(0) += 1;
        }
        counts
    }

    fn count_by_skill(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.skill.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// 抽样失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleFailure {
    /// 可行性检查未通过
    #[error("{0}")]
    Unsatisfiable(QuotaShortfall),
    /// 所有随机尝试都失败
    #[error("尝试 {attempts} 次均失败，最后一次: {last}")]
    BudgetExhausted { attempts: usize, last: QuotaShortfall },
}

impl SampleFailure {
    /// 补充部分与模块信息
    pub fn in_module(self, section: Section, module: u8) -> SamplingError {
        match self {
            SampleFailure::Unsatisfiable(reason) => SamplingError::UnsatisfiableQuota {
                section,
                module,
                reason,
            },
            SampleFailure::BudgetExhausted { attempts, last } => SamplingError::BudgetExhausted {
                section,
                module,
                attempts,
                last,
            },
        }
    }
}

/// 单次抽样的计数状态，只属于一次调用
struct DrawState<'a> {
    per_difficulty: BTreeMap<Difficulty, usize>,
    per_skill: HashMap<&'a str, usize>,
    chosen: Vec<&'a str>,
}

impl<'a> DrawState<'a> {
    fn new(capacity: usize) -> Self {
        Self {
            per_difficulty: BTreeMap::new(),
            per_skill: HashMap::new(),
            chosen: Vec::with_capacity(capacity),
        }
    }

    fn has_room(&self, difficulty: Difficulty, quota: &SamplingQuota) -> bool {
        self.per_difficulty.get(&difficulty).copied().unwrap_or(0) < quota.ceiling(difficulty)
    }

    fn skill_count(&self, skill: &str) -> usize {
        self.per_skill.get(skill).copied().unwrap_or(0)
    }

    fn accept(&mut self, row: &'a PoolRow) {
        *self.per_difficulty.entry(row.difficulty).or_insert(0) += 1;
        *self.per_skill.entry(row.skill.as_str()).or_insert(0) += 1;
        self.chosen.push(row.id.as_str());
    }

    fn open_difficulties(&self, quota: &SamplingQuota) -> Vec<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .filter(|d| self.has_room(*d, quota))
            .collect()
    }
}

/// 组卷抽样器
pub struct ModuleSampler {
    rng: StdRng,
    max_attempts: usize,
}

impl Default for ModuleSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleSampler {
    /// 使用系统随机源
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// 固定种子，相同种子与输入得到相同结果
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// 设置随机尝试次数上限（至少 1 次）
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 抽取一个模块的题目 id，顺序即出题顺序
    pub fn select(
        &mut self,
        pool: &CandidatePool,
        quota: &SamplingQuota,
    ) -> Result<Vec<String>, SampleFailure> {
        if quota.target_count == 0 {
            return Ok(Vec::new());
        }

        check_feasibility(pool, quota).map_err(SampleFailure::Unsatisfiable)?;

        let mut last = None;
        for attempt in 1..=self.max_attempts {
            match self.attempt(pool, quota) {
                Ok(chosen) => {
                    debug!("第 {} 次尝试抽样成功，共 {} 道", attempt, chosen.len());
                    return Ok(chosen);
                }
                Err(shortfall) => {
                    debug!("第 {} 次尝试抽样失败: {}", attempt, shortfall);
                    last = Some(shortfall);
                }
            }
        }

        Err(SampleFailure::BudgetExhausted {
            attempts: self.max_attempts,
            last: last.unwrap_or(QuotaShortfall::PoolTooSmall {
                available: pool.len(),
                required: quota.target_count,
            }),
        })
    }

    fn attempt(
        &mut self,
        pool: &CandidatePool,
        quota: &SamplingQuota,
    ) -> Result<Vec<String>, QuotaShortfall> {
        let mut working: Vec<&PoolRow> = pool.rows.iter().collect();
        working.shuffle(&mut self.rng);

        let mut state = DrawState::new(quota.target_count);

        let skill_cap = match quota.policy {
            SelectionPolicy::CoverageFirst => {
                let mut skills: Vec<&str> = pool.skills().into_iter().collect();
                skills.shuffle(&mut self.rng);

                // 第一阶段：每个知识点一道
                for skill in skills {
                    let position = working
                        .iter()
                        .position(|r| r.skill == skill && state.has_room(r.difficulty, quota))
                        .ok_or_else(|| QuotaShortfall::SkillUncoverable {
                            skill: skill.to_string(),
                        })?;
                    state.accept(working.remove(position));
                }
                usize::MAX
            }
            SelectionPolicy::QuotaOnly => quota.max_per_skill,
        };

        for row in working {
            if state.chosen.len() >= quota.target_count {
                break;
            }
            if state.has_room(row.difficulty, quota) && state.skill_count(&row.skill) < skill_cap {
                state.accept(row);
            }
        }

        if state.chosen.len() < quota.target_count {
            return Err(QuotaShortfall::DifficultyExhausted {
                open: state.open_difficulties(quota),
                chosen: state.chosen.len(),
                required: quota.target_count,
            });
        }

        Ok(state.chosen.into_iter().map(str::to_string).collect())
    }
}

/// 抽样前的可行性检查
fn check_feasibility(pool: &CandidatePool, quota: &SamplingQuota) -> Result<(), QuotaShortfall> {
    let required = quota.target_count;

    if pool.len() < required {
        return Err(QuotaShortfall::PoolTooSmall {
            available: pool.len(),
            required,
        });
    }

    let capacity = quota.total_capacity();
    if capacity < required {
        return Err(QuotaShortfall::CeilingsTooLow { capacity, required });
    }

    let by_difficulty = pool.count_by_difficulty();
    let usable: usize = by_difficulty
        .iter()
        .map(|(d, count)| (*count).min(quota.ceiling(*d)))
        .sum();
    if usable < required {
        return Err(QuotaShortfall::DifficultyExhausted {
            open: Difficulty::ALL
                .into_iter()
                .filter(|d| by_difficulty.get(d).copied().unwrap_or(0) < quota.ceiling(*d))
                .collect(),
            chosen: 0,
            required,
        });
    }

    match quota.policy {
        SelectionPolicy::CoverageFirst => {
            let skills = pool.skills();
            if skills.len() > required {
                return Err(QuotaShortfall::TooManySkills {
                    skills: skills.len(),
                    required,
                });
            }
            for skill in skills {
                let coverable = pool
                    .rows
                    .iter()
                    .any(|r| r.skill == skill && quota.ceiling(r.difficulty) > 0);
                if !coverable {
                    return Err(QuotaShortfall::SkillUncoverable {
                        skill: skill.to_string(),
                    });
                }
            }
        }
        SelectionPolicy::QuotaOnly => {
            let usable: usize = pool
                .count_by_skill()
                .values()
                .map(|count| (*count).min(quota.max_per_skill))
                .sum();
            if usable < required {
                return Err(QuotaShortfall::PoolTooSmall {
                    available: usable,
                    required,
                });
            }
        }
    }

    Ok(())
}
