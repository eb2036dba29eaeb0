use serde::{Deserialize, Deserializer, Serialize};

use crate::models::detail::DetailPayload;

/// 题目难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "E")]
    Easy,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// 目录中使用的单字母代码
    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "E",
            Difficulty::Medium => "M",
            Difficulty::Hard => "H",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "E" | "e" => Some(Difficulty::Easy),
            "M" | "m" => Some(Difficulty::Medium),
            "H" | "h" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 详情查询方式
///
/// 每道题只会使用其中一种协议
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKey {
    /// POST 请求体携带 external_id
    ByExternalId(String),
    /// ibn 直接拼在资源路径里
    ByIbn(String),
}

impl LookupKey {
    pub fn value(&self) -> &str {
        match self {
            LookupKey::ByExternalId(id) | LookupKey::ByIbn(id) => id,
        }
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKey::ByExternalId(id) => write!(f, "external_id:{}", id),
            LookupKey::ByIbn(id) => write!(f, "ibn:{}", id),
        }
    }
}

/// 目录接口返回的一条题目摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    #[serde(rename = "questionId", default)]
    pub question_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "skill_cd", default)]
    pub skill_code: Option<String>,
    #[serde(default)]
    pub skill_desc: Option<String>,
    #[serde(default)]
    pub primary_class_cd: Option<String>,
    #[serde(default)]
    pub primary_class_cd_desc: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub ibn: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub score_band_range_cd: Option<i64>,
    #[serde(rename = "uId", default)]
    pub u_id: Option<String>,
    #[serde(rename = "updateDate", default)]
    pub update_date: Option<i64>,
    #[serde(rename = "createDate", default)]
    pub create_date: Option<i64>,
    #[serde(rename = "pPcc", default)]
    pub p_pcc: Option<String>,
}

impl CandidateSummary {
    /// 非空的 questionId
    pub fn id(&self) -> Option<&str> {
        non_empty(self.question_id.as_deref())
    }

    /// 选择详情查询方式：ibn 优先，其次 external_id，都没有则为 None
    pub fn lookup_key(&self) -> Option<LookupKey> {
        if let Some(ibn) = non_empty(self.ibn.as_deref()) {
            return Some(LookupKey::ByIbn(ibn.to_string()));
        }
        non_empty(self.external_id.as_deref()).map(|id| LookupKey::ByExternalId(id.to_string()))
    }

    /// 非空的知识点代码
    pub fn skill(&self) -> Option<&str> {
        non_empty(self.skill_code.as_deref())
    }
}

/// 空字符串或未知代码的难度视为缺失
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let code: Option<String> = Option::deserialize(deserializer)?;
    Ok(code.as_deref().and_then(Difficulty::from_code))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 合并后的完整题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedQuestion {
    pub id: String,
    #[serde(rename = "basicInfo")]
    pub basic_info: CandidateSummary,
    pub details: Option<DetailPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(ibn: Option<&str>, external_id: Option<&str>) -> CandidateSummary {
        CandidateSummary {
            question_id: Some("q1".to_string()),
            ibn: ibn.map(str::to_string),
            external_id: external_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_key_prefers_ibn() {
        let s = summary(Some("IBN1"), Some("ext-1"));
        assert_eq!(s.lookup_key(), Some(LookupKey::ByIbn("IBN1".to_string())));
    }

    #[test]
    fn test_lookup_key_skips_empty_ibn() {
        let s = summary(Some(""), Some("ext-1"));
        assert_eq!(
            s.lookup_key(),
            Some(LookupKey::ByExternalId("ext-1".to_string()))
        );
        assert_eq!(summary(None, None).lookup_key(), None);
        assert_eq!(summary(Some(" "), Some("")).lookup_key(), None);
    }

    #[test]
    fn test_deserialize_catalog_record() {
        let raw = r#"{
            "updateDate": 1691007959421,
            "pPcc": "SAT#2",
            "questionId": "bb6a7bf8",
            "skill_cd": "CID",
            "score_band_range_cd": 5,
            "uId": "a1b2",
            "skill_desc": "Central Ideas and Details",
            "createDate": 1691007959421,
            "program": "SAT",
            "primary_class_cd_desc": "Information and Ideas",
            "ibn": null,
            "external_id": "e8f4a7b8-3c1d",
            "primary_class_cd": "INI",
            "difficulty": "M"
        }"#;

        let s: CandidateSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(s.id(), Some("bb6a7bf8"));
        assert_eq!(s.difficulty, Some(Difficulty::Medium));
        assert_eq!(s.skill(), Some("CID"));
        assert_eq!(
            s.lookup_key(),
            Some(LookupKey::ByExternalId("e8f4a7b8-3c1d".to_string()))
        );
    }

    #[test]
    fn test_empty_or_unknown_difficulty_is_absent() {
        for raw in [
            r#"{"questionId":"a","difficulty":""}"#,
            r#"{"questionId":"a","difficulty":"X"}"#,
            r#"{"questionId":"a","difficulty":null}"#,
            r#"{"questionId":"a"}"#,
        ] {
            let s: CandidateSummary = serde_json::from_str(raw).unwrap();
            assert_eq!(s.difficulty, None);
            assert_eq!(s.id(), Some("a"));
        }

        let s: CandidateSummary = serde_json::from_str(r#"{"difficulty":"h"}"#).unwrap();
        assert_eq!(s.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_difficulty_codes() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_code(d.code()), Some(d));
        }
        assert_eq!(Difficulty::from_code("X"), None);
    }
}
