//! 组卷 - 编排层
//!
//! 为每个 (部分, 模块) 独立抽样，结果交给下游的文档生成使用。
//! 抽样只需要目录层面的字段（id / 难度 / 知识点），不依赖详情。

use serde::Serialize;
use tracing::info;

use crate::error::SamplingError;
use crate::models::{QuotaTable, Section, MODULES};
use crate::orchestrator::bank_assembler::QuestionBank;
use crate::services::{CandidatePool, ModuleSampler};

/// 一个模块的抽样结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSelection {
    pub section: Section,
    pub module: u8,
    pub question_ids: Vec<String>,
}

/// 全部模块的抽样结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModulePlan {
    pub modules: Vec<ModuleSelection>,
}

impl ModulePlan {
    pub fn get(&self, section: Section, module: u8) -> Option<&[String]> {
        self.modules
            .iter()
            .find(|m| m.section == section && m.module == module)
            .map(|m| m.question_ids.as_slice())
    }

    pub fn total_questions(&self) -> usize {
        self.modules.iter().map(|m| m.question_ids.len()).sum()
    }
}

/// 为所有部分和模块抽样
///
/// 抽到的每个 id 都必须能在题库数据中找到
pub fn build_module_plan(
    bank: &QuestionBank,
    quotas: &QuotaTable,
    sampler: &mut ModuleSampler,
) -> Result<ModulePlan, SamplingError> {
    let mut plan = ModulePlan::default();

    for section in Section::ALL {
        let pool = CandidatePool::from_summaries(bank.pool(section));

        for module in MODULES {
            let quota = quotas
                .get(section, module)
                .ok_or(SamplingError::UnknownModule { section, module })?;

            let question_ids = sampler
                .select(&pool, quota)
                .map_err(|failure| failure.in_module(section, module))?;

            if let Some(missing) = question_ids.iter().find(|id| !bank.questions.contains_key(*id)) {
                return Err(SamplingError::UnresolvedQuestion {
                    section,
                    module,
                    question_id: missing.clone(),
                });
            }

            info!(
                "📝 {} 模块 {}: 抽取 {} 道题 (候选 {} 道)",
                section,
                module,
                question_ids.len(),
                pool.len()
            );

            plan.modules.push(ModuleSelection {
                section,
                module,
                question_ids,
            });
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateSummary, Difficulty, MergedQuestion, SamplingQuota, SelectionPolicy};

    fn bank_with(section: Section, skills: &[&str], per_cell: usize) -> QuestionBank {
        let mut bank = QuestionBank::default();
        let mut summaries = Vec::new();
        for skill in skills {
            for difficulty in Difficulty::ALL {
                for i in 0..per_cell {
                    let id = format!("{}-{}-{}-{}", section, skill, difficulty, i);
                    let summary = CandidateSummary {
                        question_id: Some(id.clone()),
                        difficulty: Some(difficulty),
                        skill_code: Some(skill.to_string()),
                        ..Default::default()
                    };
                    bank.questions.insert(
                        id.clone(),
                        MergedQuestion {
                            id,
                            basic_info: summary.clone(),
                            details: None,
                        },
                    );
                    summaries.push(summary);
                }
            }
        }
        bank.pools.insert(section, summaries);
        bank
    }

    #[test]
    fn test_plan_covers_every_module() {
        let mut bank = bank_with(Section::Reading, &["CID", "INF", "COE", "WIC", "TSP", "CTC", "SYN", "TRA", "BOU", "FSS"], 4);
        let math = bank_with(Section::Math, &["H.A.", "H.B.", "P.C.", "Q.A.", "S.A."], 6);
        bank.questions.extend(math.questions);
        bank.pools.extend(math.pools);

        let plan = build_module_plan(&bank, &QuotaTable::default(), &mut ModuleSampler::with_seed(7)).unwrap();

        assert_eq!(plan.modules.len(), 4);
        assert_eq!(plan.get(Section::Reading, 1).unwrap().len(), 27);
        assert_eq!(plan.get(Section::Reading, 2).unwrap().len(), 27);
        assert_eq!(plan.get(Section::Math, 1).unwrap().len(), 22);
        assert_eq!(plan.get(Section::Math, 2).unwrap().len(), 22);
        assert_eq!(plan.total_questions(), 98);

        for id in plan.get(Section::Math, 2).unwrap() {
            assert!(id.starts_with("math-"));
        }
    }

    #[test]
    fn test_unsatisfiable_module_names_section() {
        let bank = bank_with(Section::Reading, &["CID"], 1);
        let err = build_module_plan(&bank, &QuotaTable::default(), &mut ModuleSampler::with_seed(1)).unwrap_err();
        assert!(matches!(
            err,
            SamplingError::UnsatisfiableQuota {
                section: Section::Reading,
                module: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_section_pool_is_unsatisfiable() {
        let bank = bank_with(Section::Reading, &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"], 4);
        let mut quotas = QuotaTable::default();
        quotas.insert(
            Section::Reading,
            1,
            SamplingQuota::new(2, [1, 1, 1], 1, SelectionPolicy::QuotaOnly),
        );
        let mut sampler = ModuleSampler::with_seed(3);

        // 阅读模块成功后，数学部分没有候选题目
        let err = build_module_plan(&bank, &quotas, &mut sampler).unwrap_err();
        assert!(matches!(
            err,
            SamplingError::UnsatisfiableQuota { section: Section::Math, module: 1, .. }
        ));
    }
}
