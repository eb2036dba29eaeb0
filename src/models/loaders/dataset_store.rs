use crate::error::{AppResult, FileError};
use crate::models::question::MergedQuestion;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// 以 questionId 为键的题库数据
pub type Dataset = BTreeMap<String, MergedQuestion>;

/// 将任意可序列化数据写成格式化 JSON
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let shown = path.display().to_string();
    let content =
        serde_json::to_string_pretty(value).map_err(|e| FileError::write_failed(&shown, e))?;

    fs::write(path, content)
        .await
        .map_err(|e| FileError::write_failed(&shown, e))?;

    tracing::debug!("已写入 {}", shown);
    Ok(())
}
