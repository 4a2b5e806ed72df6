//! 그룹 동기화 게이트웨이 포트.
//!
//! 구현: `groupsync-network` crate (reqwest)
//!
//! 실제 그룹 조회/동기화는 백엔드가 메시징 게이트웨이를 상대로 수행한다.
//! 이 포트는 그 백엔드 REST 호출의 경계일 뿐 로직을 갖지 않는다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::sync::{BatchSyncResult, GroupSyncStatus};

/// 백엔드 그룹 동기화 API 클라이언트
///
/// 모든 메서드는 응답 봉투가 벗겨진 원본 페이로드를 반환한다.
/// 실패는 `CoreError::Gateway`로 보고한다.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// 모든 활성 그룹 동기화 (`POST /groups/sync/trigger`)
    async fn trigger_all(&self) -> Result<BatchSyncResult, CoreError>;

    /// 연속 실패 횟수가 `min_failure_count` 이상인 그룹 재시도
    /// (`POST /groups/sync/retry?minFailureCount=`)
    async fn retry_failed(&self, min_failure_count: u32) -> Result<BatchSyncResult, CoreError>;

    /// 단일 그룹 동기화 (`POST /groups/sync/{id}`)
    ///
    /// `id`는 로컬 DB 행 ID(`GroupSyncStatus::id`)이며 플랫폼 그룹 번호가 아니다.
    /// 동기화 실패도 `FAILED` 상태의 결과로 반환한다.
    async fn sync_one(&self, id: i64) -> Result<GroupSyncStatus, CoreError>;

    /// 알림 대상 그룹 목록 (`GET /groups/sync/alert`)
    ///
    /// 백엔드가 임계값으로 미리 필터링한 목록.
    async fn list_alerts(&self) -> Result<Vec<GroupSyncStatus>, CoreError>;

    /// 그룹 연속 실패 횟수 리셋 (`POST /groups/sync/{id}/reset`)
    ///
    /// 존재하지 않는 행 ID도 백엔드는 성공으로 응답한다.
    async fn reset_failure_count(&self, id: i64) -> Result<(), CoreError>;

    /// 클라이언트의 신규 그룹 발견 및 등록 (`POST /groups/sync/discover/{clientId}`)
    ///
    /// 새로 추가된 그룹 수를 반환한다. 중복 방지는 백엔드 책임.
    async fn discover_new(&self, client_id: i64) -> Result<u32, CoreError>;
}
