//! 题目详情
//!
//! 详情接口有两种返回形态：
//! - 列表形态：若干变体块，一般只用第一个
//! - 字典形态：扁平对象，直接携带题干、选项、答案
//!
//! 形态只由 JSON 结构决定，与查询协议无关（external_id 也可能返回字典形态）。

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// 题目详情
///
/// 结构与两种形态都对不上时保留原始 JSON（`Raw`），不丢弃已经取到的数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailPayload {
    ListStyle(Vec<VariantBlock>),
    DictStyle(DictDetail),
    Raw(Value),
}

impl<'de> Deserialize<'de> for DetailPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let typed = match &value {
            Value::Array(_) => Vec::<VariantBlock>::deserialize(&value).map(DetailPayload::ListStyle),
            Value::Object(_) => DictDetail::deserialize(&value).map(DetailPayload::DictStyle),
            other => {
                return Err(D::Error::custom(format!(
                    "详情应为数组或对象，实际为 {}",
                    json_kind(other)
                )))
            }
        };
        Ok(typed.unwrap_or_else(|e| {
            debug!("详情结构无法识别，保留原始数据: {}", e);
            DetailPayload::Raw(value)
        }))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// null 按默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 选项既可能是 `{ "a": {...} }`，也可能是数组或 null
fn lenient_choices<'de, D>(deserializer: D) -> Result<BTreeMap<String, AnswerChoice>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Choices {
        Keyed(BTreeMap<String, AnswerChoice>),
        Listed(Vec<AnswerChoice>),
    }

    Ok(match Option::<Choices>::deserialize(deserializer)? {
        Some(Choices::Keyed(map)) => map,
        Some(Choices::Listed(list)) => list
            .into_iter()
            .enumerate()
            .filter_map(|(i, choice)| option_letter(i).map(|c| (c.to_ascii_lowercase().to_string(), choice)))
            .collect(),
        None => BTreeMap::new(),
    })
}

/// 列表形态中的一个变体块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "lenient_choices")]
    pub choices: BTreeMap<String, AnswerChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

/// 字典形态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stimulus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem: Option<String>,
    #[serde(
        rename = "answerOptions",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub answer_options: Vec<AnswerOption>,
    #[serde(rename = "correctAnswerOption", default, skip_serializing_if = "Option::is_none")]
    pub correct_answer_option: Option<u32>,
    #[serde(rename = "correctAnswer", default, skip_serializing_if = "Option::is_none")]
    pub correct_answer_text: Option<String>,
    #[serde(rename = "correct_answer", default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl DetailPayload {
    /// 提取正确答案
    pub fn correct_answer(&self) -> Option<String> {
        match self {
            DetailPayload::ListStyle(blocks) => blocks
                .first()
                .and_then(|b| b.answer.as_ref())
                .and_then(|a| a.correct.clone().or_else(|| a.correct_choice.clone())),
            DetailPayload::DictStyle(d) => {
                if let Some(idx) = d.correct_answer_option {
                    return option_letter(idx as usize).map(|c| c.to_string());
                }
                if let Some(text) = &d.correct_answer_text {
                    return Some(text.clone());
                }
                d.correct_answer.as_ref().map(|list| list.join(", "))
            }
            DetailPayload::Raw(_) => None,
        }
    }

    /// 提取答案解析
    pub fn explanation(&self) -> Option<&str> {
        match self {
            DetailPayload::ListStyle(blocks) => {
                let first = blocks.first()?;
                first
                    .rationale
                    .as_deref()
                    .or_else(|| first.answer.as_ref().and_then(|a| a.rationale.as_deref()))
            }
            DetailPayload::DictStyle(d) => d.rationale.as_deref().or(d.explanation.as_deref()),
            DetailPayload::Raw(_) => None,
        }
    }

    /// 题干（列表形态下 stem 缺失时使用 prompt）
    pub fn stem(&self) -> Option<&str> {
        match self {
            DetailPayload::ListStyle(blocks) => {
                let first = blocks.first()?;
                first.stem.as_deref().or(first.prompt.as_deref())
            }
            DetailPayload::DictStyle(d) => d.stem.as_deref(),
            DetailPayload::Raw(_) => None,
        }
    }

    /// 阅读材料
    pub fn stimulus(&self) -> Option<&str> {
        match self {
            DetailPayload::ListStyle(blocks) => blocks.first()?.body.as_deref(),
            DetailPayload::DictStyle(d) => d.stimulus.as_deref(),
            DetailPayload::Raw(_) => None,
        }
    }

    /// 选择题选项，按 (字母, 内容) 返回；非选择题为空
    pub fn choices(&self) -> Vec<(String, String)> {
        match self {
            DetailPayload::ListStyle(blocks) => {
                let Some(answer) = blocks.first().and_then(|b| b.answer.as_ref()) else {
                    return Vec::new();
                };
                let is_mcq = matches!(answer.style.as_deref(), Some("MCQ") | Some("Multiple Choice"));
                if !is_mcq {
                    return Vec::new();
                }
                answer
                    .choices
                    .iter()
                    .map(|(k, v)| (k.to_uppercase(), v.body.clone()))
                    .collect()
            }
            DetailPayload::DictStyle(d) => d
                .answer_options
                .iter()
                .enumerate()
                .filter_map(|(i, opt)| option_letter(i).map(|c| (c.to_string(), opt.content.clone())))
                .collect(),
            DetailPayload::Raw(_) => Vec::new(),
        }
    }
}

fn option_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| (b'A' + i) as char)
}
