use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::quota::SelectionPolicy;

/// 考试部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// 阅读与写作
    Reading,
    /// 数学
    Math,
}

impl Section {
    /// 处理顺序
    pub const ALL: [Section; 2] = [Section::Reading, Section::Math];

    /// 目录接口的 test 参数
    pub fn test_code(self) -> u8 {
        match self {
            Section::Reading => 1,
            Section::Math => 2,
        }
    }

    /// 目录接口的 domain 参数
    pub fn domains(self) -> &'static str {
        match self {
            Section::Reading => "INI,CAS,EOI,SEC",
            Section::Math => "H,P,Q,S",
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Section::Reading => "reading",
            Section::Math => "math",
        }
    }

    /// 组卷策略：数学先覆盖全部知识点，阅读只按配额
    pub fn selection_policy(self) -> SelectionPolicy {
        match self {
            Section::Reading => SelectionPolicy::QuotaOnly,
            Section::Math => SelectionPolicy::CoverageFirst,
        }
    }

    /// 目录接口请求体
    pub fn catalog_request(self) -> Value {
        json!({
            "asmtEventId": 99,
            "test": self.test_code(),
            "domain": self.domains(),
        })
    }

    /// 从名称解析
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reading" | "rw" | "reading and writing" => Some(Section::Reading),
            "math" | "maths" => Some(Section::Math),
            _ => None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
