//! VTS 상태 엔드포인트 HTTP 클라이언트
//!
//! 타임아웃과 선택적 Host 헤더를 지원하는 비동기 HTTP 클라이언트입니다.
//! 재시도는 하지 않으며, 실패는 한 수집 주기 단위로 보고됩니다.

use reqwest::header::{HeaderMap, HeaderValue, HOST};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::parser::{parse_status, CollectResult, StatusDocument};
use crate::config::CollectorConfig;
use crate::error::CollectorError;

/// 상태 엔드포인트 HTTP 클라이언트
#[derive(Clone)]
pub struct StatusClient {
    client: Client,
    url: Url,
    timeout_ms: u64,
}

impl StatusClient {
    /// 새 클라이언트 생성
    ///
    /// # Arguments
    /// * `url` - 상태 엔드포인트 URL (예: "http://127.0.0.1:80/status/format/json")
    /// * `timeout_ms` - 요청 타임아웃 (밀리초)
    /// * `host_header` - 요청에 실어 보낼 Host 헤더 (SSL 인증서 검증용)
    ///
    /// # Example
    /// ```ignore
    /// let client = StatusClient::new("http://127.0.0.1/status/format/json", 5000, None)?;
    /// ```
    pub fn new(url: &str, timeout_ms: u64, host_header: Option<&str>) -> CollectResult<Self> {
        let url = Url::parse(url).map_err(|e| CollectorError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(host) = host_header {
            let value = HeaderValue::from_str(host)
                .map_err(|_| CollectorError::InvalidHostHeader(host.to_string()))?;
            headers.insert(HOST, value);
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(CollectorError::HttpClientInit)?;

        Ok(Self {
            client,
            url,
            timeout_ms,
        })
    }

    /// 수집 설정으로부터 클라이언트 생성
    pub fn from_config(config: &CollectorConfig) -> CollectResult<Self> {
        Self::new(
            &config.status_url(),
            config.timeout_ms,
            config.req_host_header.as_deref(),
        )
    }

    /// 요청 대상 URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// 상태 문서 원문 조회
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_raw(&self) -> CollectResult<String> {
        debug!("Requesting status document");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| match self.classify(e) {
                CollectorError::HttpRequest(e) => CollectorError::HttpResponse(e),
                other => other,
            })
    }

    /// 상태 문서 조회 및 디코딩
    pub async fn fetch_status(&self) -> CollectResult<StatusDocument> {
        let body = self.fetch_raw().await?;
        parse_status(&body)
    }

    fn classify(&self, err: reqwest::Error) -> CollectorError {
        match CollectorError::from(err) {
            CollectorError::Timeout(None) => CollectorError::timeout_with_duration(self.timeout_ms),
            other => other,
        }
    }
}
