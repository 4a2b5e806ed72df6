//! # groupsync-core
//!
//! 그룹 동기화 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 배치 동기화 결과, 그룹별 동기화 상태 (serde Serialize/Deserialize)
//! - [`ports`]: 백엔드 동기화 게이트웨이 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::sync::{BatchSyncResult, SyncStatus};

    #[test]
    fn batch_result_wire_format() {
        let json = r#"{
            "totalCount": 10,
            "successCount": 9,
            "failureCount": 1,
            "successRate": 90.0,
            "durationMs": 1500,
            "startTime": "2026-02-12T10:00:00",
            "endTime": "2026-02-12T10:00:01.500"
        }"#;

        let result: BatchSyncResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_count, 10);
        assert_eq!(result.success_count, 9);
        assert!((result.success_rate - 90.0).abs() < f64::EPSILON);
        assert!(result.results.is_empty());
        assert!(result.is_consistent());
    }

    #[test]
    fn sync_status_screaming_case() {
        let status: SyncStatus = serde_json::from_str(r#""FAILED""#).unwrap();
        assert_eq!(status, SyncStatus::Failed);
        assert_eq!(
            serde_json::to_string(&SyncStatus::Pending).unwrap(),
            r#""PENDING""#
        );
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert_eq!(config.server.base_url, "http://localhost:8080");
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.server.request_timeout_ms, 15_000);
        assert_eq!(config.sync.history_limit, 10);
        assert_eq!(config.sync.alert_threshold, 3);
        assert_eq!(config.sync.default_min_failure_count, 1);
        assert!(config.validate().is_ok());
    }
}
