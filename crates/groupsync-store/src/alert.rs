//! 알림 추적기.
//!
//! 최근 알림 그룹 목록과 마지막 배치 결과 위의 읽기 전용 투영.
//! 어떤 그룹이 알림 대상인지는 백엔드가 결정하며 여기서는 다시 거르지 않는다.

use chrono::{DateTime, Utc};
use groupsync_core::error::CoreError;
use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus, ALERT_FAILURE_THRESHOLD};

use crate::orchestrator::SyncOrchestrator;
use crate::state::SyncSessionState;

/// 정상 판정 최소 성공률 (%)
const HEALTHY_SUCCESS_RATE: f64 = 90.0;

/// 저하 판정 최소 성공률 (%)
const DEGRADED_SUCCESS_RATE: f64 = 50.0;

/// 마지막 배치 성공률 기반 동기화 건강 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncHealth {
    /// 성공률 90% 이상
    Up,
    /// 성공률 50% 이상 90% 미만
    Degraded,
    /// 성공률 50% 미만
    Down,
    /// 세션 내 배치 동기화 없음
    Unknown,
}

impl SyncHealth {
    /// 성공률(0-100)로 분류
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= HEALTHY_SUCCESS_RATE {
            SyncHealth::Up
        } else if rate >= DEGRADED_SUCCESS_RATE {
            SyncHealth::Degraded
        } else {
            SyncHealth::Down
        }
    }
}

impl std::fmt::Display for SyncHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncHealth::Up => write!(f, "UP"),
            SyncHealth::Degraded => write!(f, "DEGRADED"),
            SyncHealth::Down => write!(f, "DOWN"),
            SyncHealth::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// 알림 추적기: 세션 스냅샷의 투영
#[derive(Debug, Clone)]
pub struct AlertTracker {
    alert_groups: Vec<GroupSyncStatus>,
    last_sync_result: Option<BatchSyncResult>,
    threshold: u32,
}

impl AlertTracker {
    /// 스냅샷으로부터 생성
    pub fn new(state: &SyncSessionState, threshold: u32) -> Self {
        Self {
            alert_groups: state.alert_groups.clone(),
            last_sync_result: state.last_sync_result.clone(),
            threshold,
        }
    }

    /// 알림 그룹이 하나라도 있는지
    pub fn has_alerts(&self) -> bool {
        !self.alert_groups.is_empty()
    }

    pub fn alert_count(&self) -> usize {
        self.alert_groups.len()
    }

    /// 백엔드가 보낸 순서 그대로의 알림 그룹 목록
    pub fn alert_groups(&self) -> &[GroupSyncStatus] {
        &self.alert_groups
    }

    /// 마지막 배치 종료 시각
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.last_sync_result.as_ref().map(|result| result.end_time)
    }

    /// 마지막 배치 성공률 (없으면 0)
    pub fn last_sync_success_rate(&self) -> f64 {
        self.last_sync_result
            .as_ref()
            .map(|result| result.success_rate)
            .unwrap_or(0.0)
    }

    /// 알림 임계값 (표시용)
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// 연속 실패가 가장 많은 그룹
    pub fn worst_group(&self) -> Option<&GroupSyncStatus> {
        self.alert_groups
            .iter()
            .max_by_key(|status| status.consecutive_failure_count)
    }

    pub fn health(&self) -> SyncHealth {
        match &self.last_sync_result {
            Some(result) => SyncHealth::from_success_rate(result.success_rate),
            None => SyncHealth::Unknown,
        }
    }

    /// 알림 확인: 그룹 실패 횟수를 리셋하고 알림 목록을 다시 조회
    ///
    /// `id`는 알림 항목의 행 ID(`GroupSyncStatus::id`). 플랫폼 그룹 번호를 넘기면
    /// 백엔드는 아무 행도 리셋하지 않고 성공으로 응답한다.
    pub async fn acknowledge(
        orchestrator: &SyncOrchestrator,
        id: i64,
    ) -> Result<AlertTracker, CoreError> {
        orchestrator.reset_failure_count(id).await?;
        Ok(orchestrator.alert_tracker())
    }
}

/// 기본 임계값(`ALERT_FAILURE_THRESHOLD`)으로 투영
impl From<&SyncSessionState> for AlertTracker {
    fn from(state: &SyncSessionState) -> Self {
        Self::new(state, ALERT_FAILURE_THRESHOLD)
    }
}
