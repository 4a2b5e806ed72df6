//! 동기화 세션 상태 스냅샷.
//!
//! 오케스트레이터만 상태를 변경하고, 표시 계층은 이 스냅샷만 읽는다.

use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus};

/// 세션 상태 (메모리 전용, 영속화하지 않음)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSessionState {
    /// 배치 동기화 호출이 진행 중인지
    pub sync_in_progress: bool,
    /// 가장 최근 배치 결과
    pub last_sync_result: Option<BatchSyncResult>,
    /// 현재 알림 그룹 목록 (조회 시마다 통째로 교체)
    pub alert_groups: Vec<GroupSyncStatus>,
    /// 배치 결과 이력 (최신이 앞)
    pub sync_history: Vec<BatchSyncResult>,
}

impl SyncSessionState {
    /// 세션 시작 후 배치 동기화가 한 번이라도 있었는지
    pub fn has_synced(&self) -> bool {
        self.last_sync_result.is_some()
    }
}
