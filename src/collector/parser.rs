//! VTS JSON 상태 문서 파서
//!
//! nginx vhost traffic status 모듈의 JSON 응답을 파싱하여 내부 데이터 구조로 변환합니다.
//!
//! 필수 필드(`hostName`, `connections`)는 디코딩 시점에 검증하며,
//! `serverZones` / `upstreamZones`는 그룹별 추출 단계에서 타입을 확정합니다.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{CollectorError, SchemaError};

/// Collector 작업 결과 타입
pub type CollectResult<T> = Result<T, CollectorError>;

/// 연결 카운터 이름 (발행 순서 고정)
pub const CONNECTION_COUNTERS: [&str; 7] = [
    "active", "reading", "writing", "waiting", "handled", "accepted", "requests",
];

/// 디코딩된 상태 문서
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDocument {
    /// nginx 호스트명 (`hostName`)
    pub host_name: String,
    /// 연결 카운터 (`connections`)
    pub connections: Connections,
    /// 서버 존 원본 (`serverZones`, 없으면 None)
    pub server_zones: Option<Value>,
    /// 업스트림 존 원본 (`upstreamZones`, 없으면 None)
    pub upstream_zones: Option<Value>,
}

/// 연결 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connections {
    pub active: u64,
    pub reading: u64,
    pub writing: u64,
    pub waiting: u64,
    pub handled: u64,
    pub accepted: u64,
    pub requests: u64,
}

impl Connections {
    /// `CONNECTION_COUNTERS` 순서대로 (이름, 값) 반환
    pub fn counters(&self) -> [(&'static str, u64); 7] {
        [
            ("active", self.active),
            ("reading", self.reading),
            ("writing", self.writing),
            ("waiting", self.waiting),
            ("handled", self.handled),
            ("accepted", self.accepted),
            ("requests", self.requests),
        ]
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut values = [0u64; 7];
        for (slot, counter) in values.iter_mut().zip(CONNECTION_COUNTERS) {
            let field = format!("connections.{}", counter);
            *slot = match map.get(counter) {
                None | Some(Value::Null) => return Err(SchemaError::MissingField(field)),
                Some(v) => v.as_u64().ok_or(SchemaError::InvalidField {
                    field,
                    expected: "non-negative integer",
                })?,
            };
        }

        let [active, reading, writing, waiting, handled, accepted, requests] = values;
        Ok(Self {
            active,
            reading,
            writing,
            waiting,
            handled,
            accepted,
            requests,
        })
    }
}

/// 서버 존(virtual host) 통계
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStats {
    pub request_counter: u64,
    pub request_msec: u64,
    pub out_bytes: u64,
    pub in_bytes: u64,
    /// 응답 클래스 레이블 -> 건수 (키는 사전에 알 수 없음)
    pub responses: HashMap<String, u64>,
}

/// 업스트림 그룹 구성원
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamMember {
    /// 서버 식별자 (예: "10.0.0.1:80")
    pub server: String,
    pub request_counter: u64,
    pub request_msec: u64,
    pub response_msec: u64,
    pub out_bytes: u64,
    pub in_bytes: u64,
    pub down: bool,
    pub responses: HashMap<String, u64>,
}

impl StatusDocument {
    /// JSON 값에서 상태 문서 생성 (필수 필드 검증)
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let Value::Object(mut root) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let host_name = match root.remove("hostName") {
            None | Some(Value::Null) => {
                return Err(SchemaError::MissingField("hostName".to_string()))
            }
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(SchemaError::InvalidField {
                    field: "hostName".to_string(),
                    expected: "string",
                })
            }
        };

        let connections = match root.get("connections") {
            None | Some(Value::Null) => {
                return Err(SchemaError::MissingField("connections".to_string()))
            }
            Some(Value::Object(map)) => Connections::from_object(map)?,
            Some(_) => {
                return Err(SchemaError::InvalidField {
                    field: "connections".to_string(),
                    expected: "object",
                })
            }
        };

        Ok(Self {
            host_name,
            connections,
            server_zones: take_optional(&mut root, "serverZones"),
            upstream_zones: take_optional(&mut root, "upstreamZones"),
        })
    }
}

/// null은 필드 없음과 동일하게 취급
fn take_optional(root: &mut Map<String, Value>, key: &str) -> Option<Value> {
    root.remove(key).filter(|v| !v.is_null())
}

/// 상태 문서 파싱
pub fn parse_status(json: &str) -> CollectResult<StatusDocument> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| CollectorError::JsonParse(e.to_string()))?;

    Ok(StatusDocument::from_value(value)?)
}
