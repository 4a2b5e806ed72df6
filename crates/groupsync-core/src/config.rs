//! 애플리케이션 설정 구조체.
//!
//! 백엔드 서버 연결과 동기화 세션 동작을 정의한다.
//! [`crate::config_manager::ConfigManager`]를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;
use crate::models::sync::{ALERT_FAILURE_THRESHOLD, SYNC_HISTORY_LIMIT};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    pub server: ServerConfig,
    /// 동기화 세션 설정
    #[serde(default)]
    pub sync: SyncConfig,
}

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 백엔드 기본 URL (예: "http://localhost:8080")
    pub base_url: String,
    /// REST 경로 접두사
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Bearer 토큰 (없으면 Authorization 헤더 생략)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// 동기화 세션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 세션 내 배치 결과 이력 최대 개수
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// 알림 임계값 (표시용: 필터링은 백엔드가 수행)
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u32,
    /// 실패 재시도 기본 최소 실패 횟수
    #[serde(default = "default_min_failure_count")]
    pub default_min_failure_count: u32,
    /// 알림 목록 조회(멱등 GET) 재시도 횟수
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            alert_threshold: default_alert_threshold(),
            default_min_failure_count: default_min_failure_count(),
            read_retries: default_read_retries(),
        }
    }
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_history_limit() -> usize {
    SYNC_HISTORY_LIMIT
}

fn default_alert_threshold() -> u32 {
    ALERT_FAILURE_THRESHOLD
}

fn default_min_failure_count() -> u32 {
    1
}

fn default_read_retries() -> u32 {
    2
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:8080".to_string(),
                api_prefix: default_api_prefix(),
                request_timeout_ms: default_request_timeout_ms(),
                access_token: None,
            },
            sync: SyncConfig::default(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server.base_url.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "server.base_url".to_string(),
                message: "비어 있을 수 없습니다".to_string(),
            });
        }
        if self.sync.history_limit == 0 {
            return Err(CoreError::Validation {
                field: "sync.history_limit".to_string(),
                message: "1 이상이어야 합니다".to_string(),
            });
        }
        if self.sync.default_min_failure_count == 0 {
            return Err(CoreError::Validation {
                field: "sync.default_min_failure_count".to_string(),
                message: "1 이상이어야 합니다".to_string(),
            });
        }
        Ok(())
    }
}
