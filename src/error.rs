//! Error types for nginx-vts-collector
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

use crate::transformer::MetricGroup;

/// 상태 문서 필수 필드 검증 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// 루트가 JSON 객체가 아님
    #[error("Status document root is not a JSON object")]
    NotAnObject,

    /// 필수 필드 누락
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// 필드 타입 불일치
    #[error("Field '{field}' has an invalid value (expected {expected})")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

/// 메트릭 그룹 단위 추출 실패
///
/// A failing group contributes no emissions; other groups are unaffected.
#[derive(Error, Debug)]
#[error("Failed to extract {group} metrics: {source}")]
pub struct GroupError {
    /// 실패한 그룹
    pub group: MetricGroup,
    /// 원인
    #[source]
    pub source: serde_json::Error,
}

/// Collector 모듈 에러 타입
#[derive(Error, Debug)]
pub enum CollectorError {
    /// HTTP 클라이언트 초기화 실패
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    /// 상태 엔드포인트 URL 생성 실패
    #[error("Invalid status URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 잘못된 Host 헤더 값
    #[error("Invalid Host header value '{0}'")]
    InvalidHostHeader(String),

    /// HTTP 요청 실패
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[source] reqwest::Error),

    /// HTTP 응답 읽기 실패
    #[error("Failed to read HTTP response: {0}")]
    HttpResponse(#[source] reqwest::Error),

    /// HTTP 상태 코드 에러
    #[error("HTTP error status: {0}")]
    HttpStatus(u16),

    /// JSON 파싱 에러
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// 필수 필드 검증 실패
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// 타임아웃
    /// The value is the configured timeout in milliseconds, if known.
    #[error("Request timed out{}", .0.map(|ms| format!(" after {}ms", ms)).unwrap_or_default())]
    Timeout(Option<u64>),

    /// 연결 실패
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl CollectorError {
    /// HTTP 상태 코드 추출
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CollectorError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// 문서 내용 문제인지 (전송 문제가 아닌지) 확인
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            CollectorError::JsonParse(_) | CollectorError::Schema(_)
        )
    }

    /// Create a Timeout error with known duration
    pub fn timeout_with_duration(ms: u64) -> Self {
        CollectorError::Timeout(Some(ms))
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration here;
            // use CollectorError::timeout_with_duration() when it is known.
            CollectorError::Timeout(None)
        } else if err.is_connect() {
            CollectorError::ConnectionFailed(err.to_string())
        } else if err.is_request() {
            CollectorError::HttpRequest(err)
        } else {
            CollectorError::HttpResponse(err)
        }
    }
}
