//! 详情获取服务 - 业务能力层
//!
//! 只负责"一道题一次请求"的能力，不关心批量与并发

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::{QbankClient, RawResponse};
use crate::error::{CatalogError, FetchError};
use crate::models::{CandidateSummary, DetailPayload, LookupKey, Section};

/// 单题详情获取能力
///
/// 每次调用恰好发出一次请求，不重试
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, key: &LookupKey) -> Result<DetailPayload, FetchError>;
}

/// 题目目录获取能力
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_catalog(&self, section: Section) -> Result<Vec<CandidateSummary>, CatalogError>;
}

#[async_trait]
impl DetailFetcher for QbankClient {
    async fn fetch_detail(&self, key: &LookupKey) -> Result<DetailPayload, FetchError> {
        match key {
            LookupKey::ByExternalId(id) => {
                let raw = self.post_external_id(id).await.map_err(FetchError::network)?;
                decode_external_id_response(raw)
            }
            LookupKey::ByIbn(ibn) => {
                let raw = self.get_ibn(ibn).await.map_err(FetchError::network)?;
                decode_ibn_response(raw)
            }
        }
    }
}

#[async_trait]
impl CatalogFetcher for QbankClient {
    async fn fetch_catalog(&self, section: Section) -> Result<Vec<CandidateSummary>, CatalogError> {
        let raw = self
            .post_catalog(&section.catalog_request())
            .await
            .map_err(|e| CatalogError::RequestFailed {
                section,
                source: Box::new(e),
            })?;
        decode_catalog_response(section, raw)
    }
}

/// external_id 协议：不检查状态码，响应体能解析即成功
pub fn decode_external_id_response(raw: RawResponse) -> Result<DetailPayload, FetchError> {
    serde_json::from_slice(&raw.body).map_err(FetchError::decode)
}

/// ibn 协议：必须是 200 且响应体能解析
pub fn decode_ibn_response(raw: RawResponse) -> Result<DetailPayload, FetchError> {
    if raw.status != StatusCode::OK {
        return Err(FetchError::Http {
            status: raw.status.as_u16(),
        });
    }
    serde_json::from_slice(&raw.body).map_err(FetchError::decode)
}

/// 目录响应：非 2xx 或无法解析为数组都视为失败
///
/// 数组中单条记录解析失败只跳过该条
pub fn decode_catalog_response(
    section: Section,
    raw: RawResponse,
) -> Result<Vec<CandidateSummary>, CatalogError> {
    if !raw.status.is_success() {
        return Err(CatalogError::BadStatus {
            section,
            status: raw.status.as_u16(),
        });
    }
    let records: Vec<Value> =
        serde_json::from_slice(&raw.body).map_err(|e| CatalogError::DecodeFailed {
            section,
            source: Box::new(e),
        })?;

    let total = records.len();
    let summaries: Vec<CandidateSummary> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| match CandidateSummary::deserialize(&record) {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!("[{}] 第 {} 条目录记录无法解析: {}", section, position, e);
                None
            }
        })
        .collect();

    let skipped = total - summaries.len();
    if skipped > 0 {
        warn!("[{}] ⚠️ 跳过 {} 条无法解析的目录记录", section, skipped);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_external_id_ignores_status() {
        let payload = assert_ok!(decode_external_id_response(raw(500, r#"{"stem":"s"}"#)));
        assert_eq!(payload.stem(), Some("s"));
    }

    #[test]
    fn test_external_id_non_json_is_decode_error() {
        let err = assert_err!(decode_external_id_response(raw(200, "<html>oops</html>")));
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_ibn_requires_200() {
        let err = assert_err!(decode_ibn_response(raw(404, r#"{"message":"missing"}"#)));
        assert!(matches!(err, FetchError::Http { status: 404 }));

        let payload = assert_ok!(decode_ibn_response(raw(200, r#"[{"prompt":"p"}]"#)));
        assert!(matches!(payload, DetailPayload::ListStyle(_)));
    }

    #[test]
    fn test_ibn_dict_body_is_accepted() {
        let payload = assert_ok!(decode_ibn_response(raw(200, r#"{"stem":"dict"}"#)));
        assert!(matches!(payload, DetailPayload::DictStyle(_)));
    }

    #[test]
    fn test_loose_detail_bodies_are_kept() {
        let payload = assert_ok!(decode_external_id_response(raw(
            200,
            r#"{"stem":"s","answerOptions":null}"#
        )));
        assert!(matches!(payload, DetailPayload::DictStyle(_)));

        let payload = assert_ok!(decode_ibn_response(raw(
            200,
            r#"[{"answer":{"choices":[],"correct":"a","correct_choice":"a"}}]"#
        )));
        assert_eq!(payload.correct_answer().as_deref(), Some("a"));

        let payload = assert_ok!(decode_ibn_response(raw(200, r#"{"correctAnswerOption":"x"}"#)));
        assert!(matches!(payload, DetailPayload::Raw(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        // 无法解析的地址在发送阶段失败，不会发出任何请求
        let client = QbankClient::new(crate::config::ClientSettings {
            catalog_url: "not a url".to_string(),
            external_id_detail_url: "not a url".to_string(),
            ibn_detail_base_url: "not-a-url".to_string(),
        })
        .unwrap();

        let err = assert_err!(
            client
                .fetch_detail(&LookupKey::ByExternalId("e1".to_string()))
                .await
        );
        assert!(matches!(err, FetchError::Network { .. }));

        let err = assert_err!(client.fetch_detail(&LookupKey::ByIbn("i1".to_string())).await);
        assert!(matches!(err, FetchError::Network { .. }));

        let err = assert_err!(client.fetch_catalog(Section::Math).await);
        assert!(matches!(err, CatalogError::RequestFailed { section: Section::Math, .. }));
    }

    #[test]
    fn test_catalog_decoding() {
        let ok = assert_ok!(decode_catalog_response(
            Section::Math,
            raw(200, r#"[{"questionId":"a","difficulty":"E","skill_cd":"H.A."}]"#)
        ));
        assert_eq!(ok.len(), 1);

        let err = assert_err!(decode_catalog_response(Section::Math, raw(503, "")));
        assert!(err.to_string().contains("math"));

        let err = assert_err!(decode_catalog_response(Section::Reading, raw(200, r#"{"a":1}"#)));
        assert!(matches!(err, CatalogError::DecodeFailed { section: Section::Reading, .. }));
    }

    #[test]
    fn test_bad_catalog_record_is_skipped() {
        let body = r#"[
            {"questionId":"a","difficulty":"E","skill_cd":"H.A."},
            {"questionId":"b","difficulty":"","skill_cd":"H.B."},
            {"questionId":"c","difficulty":"M","score_band_range_cd":"high"},
            "not a record"
        ]"#;

        let summaries = assert_ok!(decode_catalog_response(Section::Math, raw(200, body)));
        let ids: Vec<_> = summaries.iter().filter_map(|s| s.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(summaries[0].difficulty, Some(crate::models::Difficulty::Easy));
        assert_eq!(summaries[1].difficulty, None);
    }
}
