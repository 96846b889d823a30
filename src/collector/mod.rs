//! nginx VTS 상태 수집 모듈
//!
//! 상태 엔드포인트를 조회하고, 문서를 디코딩한 뒤 메트릭을 추출하여 발행합니다.
//!
//! # Example
//!
//! ```ignore
//! use nginx_vts_collector::collector::Collector;
//! use nginx_vts_collector::config::CollectorConfig;
//!
//! let collector = Collector::new(&CollectorConfig::default())?;
//! let mut sink = Vec::new();
//! let report = collector.collect(&mut sink).await?;
//! ```

mod client;
mod parser;

pub use client::StatusClient;
pub use parser::{
    parse_status, CollectResult, Connections, StatusDocument, UpstreamMember, ZoneStats,
    CONNECTION_COUNTERS,
};

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::CollectorConfig;
use crate::publisher::Publisher;
use crate::transformer::{extract_all, MetricGroup};

/// 한 수집 주기의 결과 요약
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 상태 문서의 호스트명
    pub host_name: String,
    /// 발행된 메트릭 수
    pub published: usize,
    /// 실패하여 건너뛴 그룹
    pub failed_groups: Vec<MetricGroup>,
    /// 소요 시간
    #[serde(skip)]
    pub duration: Duration,
}

impl CycleReport {
    /// 모든 그룹이 성공했는지 확인
    pub fn is_complete(&self) -> bool {
        self.failed_groups.is_empty()
    }
}

/// Collector 구조체 - 수집 주기 실행기
///
/// 주기 사이에 상태를 보관하지 않으므로 동시에 여러 주기를 실행해도 안전합니다.
#[derive(Clone)]
pub struct Collector {
    client: StatusClient,
}

impl Collector {
    /// 설정으로부터 Collector 생성
    pub fn new(config: &CollectorConfig) -> CollectResult<Self> {
        Ok(Self::with_client(StatusClient::from_config(config)?))
    }

    /// 기존 클라이언트로 Collector 생성
    pub fn with_client(client: StatusClient) -> Self {
        Self { client }
    }

    /// 클라이언트 참조 반환
    pub fn client(&self) -> &StatusClient {
        &self.client
    }

    /// 한 수집 주기 실행
    ///
    /// 조회/디코딩/필수 필드 오류는 `Err`로 반환되며 이 경우 아무것도 발행하지 않습니다.
    /// 그룹 단위 오류는 로그로 남기고 `CycleReport::failed_groups`에 기록합니다.
    #[instrument(skip(self, publisher), fields(url = %self.client.url()))]
    pub async fn collect<P: Publisher + ?Sized>(
        &self,
        publisher: &mut P,
    ) -> CollectResult<CycleReport> {
        let start = Instant::now();

        let doc = self.client.fetch_status().await?;
        let extraction = extract_all(&doc);

        for emission in &extraction.emissions {
            publisher.publish(emission);
        }

        let report = CycleReport {
            host_name: doc.host_name,
            published: extraction.emissions.len(),
            failed_groups: extraction.failures.iter().map(|f| f.group).collect(),
            duration: start.elapsed(),
        };

        if report.is_complete() {
            debug!(
                host = %report.host_name,
                published = report.published,
                duration_ms = report.duration.as_millis() as u64,
                "Collection cycle complete"
            );
        } else {
            info!(
                host = %report.host_name,
                published = report.published,
                failed_groups = ?report.failed_groups,
                "Collection cycle completed with skipped groups"
            );
        }

        Ok(report)
    }
}
