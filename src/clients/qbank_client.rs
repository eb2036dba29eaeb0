/// 题库 API 客户端
///
/// 封装目录接口和两种详情接口的 HTTP 调用，只负责收发，不做业务判断
use crate::config::ClientSettings;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

/// 一次 HTTP 调用的原始结果
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// 题库 API 客户端
#[derive(Clone)]
pub struct QbankClient {
    http: Client,
    settings: ClientSettings,
}

impl QbankClient {
    /// 创建新的题库客户端
    pub fn new(settings: ClientSettings) -> reqwest::Result<Self> {
        let http = Client::builder().default_headers(default_headers()).build()?;
        Ok(Self { http, settings })
    }

    /// 请求题目目录
    ///
    /// # 参数
    /// - `request_body`: 目录接口请求体（asmtEventId / test / domain）
    pub async fn post_catalog(&self, request_body: &Value) -> reqwest::Result<RawResponse> {
        debug!("请求目录: {} {}", self.settings.catalog_url, request_body);
        self.send(self.http.post(&self.settings.catalog_url).json(request_body))
            .await
    }

    /// 按 external_id 请求详情（POST，请求体携带 id）
    pub async fn post_external_id(&self, external_id: &str) -> reqwest::Result<RawResponse> {
        let body = json!({ "external_id": external_id });
        self.send(self.http.post(&self.settings.external_id_detail_url).json(&body))
            .await
    }

    /// 按 ibn 请求详情（GET，ibn 在路径中）
    pub async fn get_ibn(&self, ibn: &str) -> reqwest::Result<RawResponse> {
        self.send(self.http.get(self.ibn_url(ibn))).await
    }

    /// 构建 ibn 详情地址
    pub fn ibn_url(&self, ibn: &str) -> String {
        format!(
            "{}/{}.json",
            self.settings.ibn_detail_base_url.trim_end_matches('/'),
            ibn
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> reqwest::Result<RawResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64; rv:138.0) Gecko/20100101 Firefox/138.0",
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        ORIGIN,
        HeaderValue::from_static("https://satsuitequestionbank.collegeboard.org"),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://satsuitequestionbank.collegeboard.org/"),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ibn_url_joins_path() {
        let client = QbankClient::new(ClientSettings {
            ibn_detail_base_url: "https://example.test/disclosed/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.ibn_url("ABC123"), "https://example.test/disclosed/ABC123.json");
    }
}
