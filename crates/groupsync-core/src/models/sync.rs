//! 그룹 동기화 모델.
//!
//! 배치 동기화 결과와 그룹별 동기화 상태. 백엔드가 생성하며
//! 클라이언트에서는 수신 후 변경하지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp;

/// 알림 대상이 되는 연속 실패 횟수 임계값.
///
/// 백엔드가 알림 목록을 이 값으로 필터링해 보낸다. 클라이언트는 재필터링하지 않고
/// 표시용으로만 사용한다.
pub const ALERT_FAILURE_THRESHOLD: u32 = 3;

/// 세션 내 유지하는 배치 동기화 이력 최대 개수 (기본값)
pub const SYNC_HISTORY_LIMIT: usize = 10;

/// 그룹 동기화 상태
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// 동기화 성공
    Success,
    /// 동기화 실패
    Failed,
    /// 아직 동기화되지 않음
    #[default]
    Pending,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "SUCCESS"),
            SyncStatus::Failed => write!(f, "FAILED"),
            SyncStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// 배치 동기화(전체 트리거/실패 재시도) 한 번의 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncResult {
    /// 대상 그룹 수
    pub total_count: u32,
    /// 성공 그룹 수
    pub success_count: u32,
    /// 실패 그룹 수
    pub failure_count: u32,
    /// 성공률 (0-100, 대상이 없으면 0)
    #[serde(default)]
    pub success_rate: f64,
    /// 배치 소요 시간 (밀리초)
    pub duration_ms: u64,
    /// 배치 시작 시각
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    /// 배치 종료 시각
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Utc>,
    /// 그룹별 결과 요약
    #[serde(default)]
    pub results: Vec<GroupSyncSummary>,
}

impl BatchSyncResult {
    /// 전체 성공 여부
    pub fn is_all_success(&self) -> bool {
        self.failure_count == 0
    }

    /// 실패한 그룹 요약 목록
    pub fn failed_groups(&self) -> Vec<&GroupSyncSummary> {
        self.results
            .iter()
            .filter(|summary| summary.sync_status == SyncStatus::Failed)
            .collect()
    }

    /// 카운트로부터 다시 계산한 성공률 (0-100)
    pub fn computed_success_rate(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        f64::from(self.success_count) / f64::from(self.total_count) * 100.0
    }

    /// 카운트 합계와 시간 순서가 맞는지
    pub fn is_consistent(&self) -> bool {
        self.success_count.checked_add(self.failure_count) == Some(self.total_count)
            && self.end_time >= self.start_time
    }
}

/// 배치 결과 내 그룹별 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSyncSummary {
    /// 로컬 DB 행 ID (단일 동기화/리셋 경로 키)
    #[serde(deserialize_with = "deserialize_id")]
    pub group_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_name: String,
    pub sync_status: SyncStatus,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// 그룹별 동기화 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSyncStatus {
    /// 로컬 DB 행 ID. `/groups/sync/{id}`, `/groups/sync/{id}/reset` 경로 키
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    /// 채팅 플랫폼 그룹 번호 (표시용, 형식 보장 없음)
    #[serde(default, deserialize_with = "deserialize_platform_id")]
    pub group_id: String,
    /// 표시 이름 (동기화마다 바뀔 수 있음)
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_name: String,
    /// 최근 동기화 결과 (한 번도 동기화되지 않았으면 백엔드가 null을 보냄)
    #[serde(default, deserialize_with = "null_as_default")]
    pub sync_status: SyncStatus,
    /// 최근 동기화 시도 시각 (한 번도 없으면 None)
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub last_sync_time: Option<DateTime<Utc>>,
    /// 연속 실패 횟수 (성공 또는 수동 리셋 시 0)
    #[serde(default, deserialize_with = "null_as_default")]
    pub consecutive_failure_count: u32,
    /// 실패 사유 (FAILED일 때만)
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub active: Option<bool>,
    /// 마지막 실패 시각
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub last_failure_time: Option<DateTime<Utc>>,
}

impl GroupSyncStatus {
    /// 연속 실패 횟수가 임계값 이상인지
    pub fn needs_alert(&self, threshold: u32) -> bool {
        self.consecutive_failure_count >= threshold
    }

    pub fn is_failed(&self) -> bool {
        self.sync_status == SyncStatus::Failed
    }

    pub fn is_success(&self) -> bool {
        self.sync_status == SyncStatus::Success
    }
}

/// 명시적 null을 기본값으로 취급
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 플랫폼 그룹 번호: 문자열 그대로, 숫자는 문자열로, null은 빈 문자열
fn deserialize_platform_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPlatformId {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<RawPlatformId>::deserialize(deserializer)? {
        Some(RawPlatformId::Number(number)) => number.to_string(),
        Some(RawPlatformId::Text(text)) => text,
        None => String::new(),
    })
}

/// 행 ID: 숫자 또는 숫자 문자열 허용
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("잘못된 행 ID: {text}"))),
    }
}
