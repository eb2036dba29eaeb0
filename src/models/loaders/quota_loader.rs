use crate::error::{AppResult, ConfigError, FileError};
use crate::models::quota::{QuotaTable, SamplingQuota, SelectionPolicy, MODULES};
use crate::models::{Difficulty, Section};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// 配额文件中单个模块的覆盖项，未填写的字段沿用默认值
#[derive(Debug, Default, Deserialize)]
struct QuotaOverride {
    target_count: Option<usize>,
    max_per_skill: Option<usize>,
    policy: Option<SelectionPolicy>,
    #[serde(default)]
    difficulty_ceilings: BTreeMap<String, usize>,
}

/// 从 TOML 文件加载配额覆盖
///
/// 文件格式：
/// ```toml
/// [math.1]
/// target_count = 22
/// difficulty_ceilings = { E = 9, M = 9, H = 4 }
/// ```
pub async fn load_quota_table(path: &Path) -> AppResult<QuotaTable> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;

    let table = parse_quota_overrides(&content, &path.display().to_string())?;
    tracing::info!("已加载配额文件: {}", path.display());
    Ok(table)
}

/// 在默认配额表上应用 TOML 覆盖
pub fn parse_quota_overrides(content: &str, path: &str) -> AppResult<QuotaTable> {
    let overrides: BTreeMap<String, BTreeMap<String, QuotaOverride>> =
        toml::from_str(content).map_err(|e| ConfigError::QuotaParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    let unknown = |key: &str| ConfigError::UnknownQuotaKey {
        path: path.to_string(),
        key: key.to_string(),
    };

    let mut table = QuotaTable::default();
    for (section_name, modules) in overrides {
        let section = Section::from_name(&section_name).ok_or_else(|| unknown(&section_name))?;

        for (module_key, item) in modules {
            let module = module_key
                .parse::<u8>()
                .ok()
                .filter(|m| MODULES.contains(m))
                .ok_or_else(|| unknown(&format!("{}.{}", section_name, module_key)))?;

            let mut quota = table.get(section, module).cloned().unwrap_or_else(|| {
                SamplingQuota::new(0, [0, 0, 0], usize::MAX, section.selection_policy())
            });

            if let Some(target) = item.target_count {
                quota.target_count = target;
            }
            if let Some(max) = item.max_per_skill {
                quota.max_per_skill = max;
            }
            if let Some(policy) = item.policy {
                quota.policy = policy;
            }
            for (code, ceiling) in item.difficulty_ceilings {
                let difficulty = Difficulty::from_code(&code).ok_or_else(|| unknown(&code))?;
                quota.difficulty_ceilings.insert(difficulty, ceiling);
            }

            tracing::debug!("配额覆盖: {} 模块 {} -> {:?}", section, module, quota);
            table.insert(section, module, quota);
        }
    }

    Ok(table)
}
