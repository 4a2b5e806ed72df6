//! 동기화 오케스트레이터.
//!
//! 배치 동기화(전체 트리거/실패 재시도)를 직렬화하고 결과를 기록하며,
//! 배치가 끝날 때마다 알림 그룹 목록을 새로 고친다.
//!
//! 배치 한 번의 순서는 항상 고정이다:
//! 진행 플래그 획득 → 게이트웨이 호출 → 이력/알림 갱신 → 플래그 해제.
//! 게이트웨이 호출이 실패하면 갱신 단계는 실행되지 않는다.

use groupsync_core::config::SyncConfig;
use groupsync_core::error::CoreError;
use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus, ALERT_FAILURE_THRESHOLD};
use groupsync_core::ports::sync_gateway::SyncGateway;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::alert::AlertTracker;
use crate::history::SyncHistory;
use crate::state::SyncSessionState;

/// 실패 재시도 기본 최소 실패 횟수
const DEFAULT_MIN_FAILURE_COUNT: u32 = 1;

/// 잠금 안에서 관리하는 세션 데이터
struct SessionData {
    last_sync_result: Option<BatchSyncResult>,
    alert_groups: Vec<GroupSyncStatus>,
    history: SyncHistory,
}

/// 배치 진행 플래그 RAII 가드: drop 시 어떤 경로로 빠져나가든 해제
struct BatchGuard<'a> {
    orchestrator: &'a SyncOrchestrator,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator
            .sync_in_progress
            .store(false, Ordering::Release);
        self.orchestrator.publish();
    }
}

/// 동기화 오케스트레이터
///
/// `Arc`로 공유해 여러 태스크에서 호출할 수 있다. 진행 플래그는 두 배치 연산만
/// 보호하며 단일 그룹 동기화, 리셋, 발견은 배치와 동시에 실행될 수 있다.
pub struct SyncOrchestrator {
    gateway: Arc<dyn SyncGateway>,
    sync_in_progress: AtomicBool,
    data: RwLock<SessionData>,
    default_min_failure_count: u32,
    alert_threshold: u32,
    state_tx: watch::Sender<SyncSessionState>,
}

impl SyncOrchestrator {
    /// 기본 설정(이력 10개, 최소 실패 1회)으로 생성
    pub fn new(gateway: Arc<dyn SyncGateway>) -> Self {
        let (state_tx, _) = watch::channel(SyncSessionState::default());
        Self {
            gateway,
            sync_in_progress: AtomicBool::new(false),
            data: RwLock::new(SessionData {
                last_sync_result: None,
                alert_groups: Vec::new(),
                history: SyncHistory::default(),
            }),
            default_min_failure_count: DEFAULT_MIN_FAILURE_COUNT,
            alert_threshold: ALERT_FAILURE_THRESHOLD,
            state_tx,
        }
    }

    /// 동기화 설정으로 생성
    pub fn from_config(gateway: Arc<dyn SyncGateway>, config: &SyncConfig) -> Self {
        Self::new(gateway)
            .with_history_limit(config.history_limit)
            .with_default_min_failure_count(config.default_min_failure_count)
            .with_alert_threshold(config.alert_threshold)
    }

    /// 이력 최대 개수 설정
    pub fn with_history_limit(self, limit: usize) -> Self {
        self.data.write().history = SyncHistory::new(limit);
        self
    }

    /// 실패 재시도 기본 최소 실패 횟수 설정
    pub fn with_default_min_failure_count(mut self, min_failure_count: u32) -> Self {
        self.default_min_failure_count = min_failure_count;
        self
    }

    /// 알림 임계값 설정 (표시용)
    pub fn with_alert_threshold(mut self, threshold: u32) -> Self {
        self.alert_threshold = threshold;
        self
    }

    // ── 배치 연산 ──

    /// 모든 활성 그룹 동기화
    ///
    /// 이미 배치가 진행 중이면 게이트웨이 호출 없이 `CoreError::ConcurrentSync`.
    pub async fn trigger_sync(&self) -> Result<BatchSyncResult, CoreError> {
        self.run_batch("전체 동기화", || self.gateway.trigger_all())
            .await
    }

    /// 연속 실패 그룹 재시도
    ///
    /// `min_failure_count`가 `None`이면 설정된 기본값(1)을 사용한다.
    pub async fn retry_failed_groups(
        &self,
        min_failure_count: Option<u32>,
    ) -> Result<BatchSyncResult, CoreError> {
        let min_failure_count = min_failure_count.unwrap_or(self.default_min_failure_count);
        self.run_batch("실패 그룹 재시도", || {
            self.gateway.retry_failed(min_failure_count)
        })
        .await
    }

    async fn run_batch<F, Fut>(&self, label: &str, call: F) -> Result<BatchSyncResult, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BatchSyncResult, CoreError>>,
    {
        let _guard = self.begin_batch(label)?;
        info!("{label} 시작");

        let result = match call().await {
            Ok(result) => result,
            Err(e) => {
                warn!("{label} 실패: {e}");
                return Err(e);
            }
        };

        info!(
            "{label} 완료: 전체={}, 성공={}, 실패={}, 성공률={:.1}%, 소요={}ms",
            result.total_count,
            result.success_count,
            result.failure_count,
            result.success_rate,
            result.duration_ms
        );
        if !result.is_consistent() {
            warn!(
                "배치 결과 카운트 불일치: total={}, success={}, failure={}",
                result.total_count, result.success_count, result.failure_count
            );
        }

        self.record_result(result.clone());
        self.fetch_alert_groups().await?;
        Ok(result)
    }

    /// 진행 플래그 획득 (compare-and-set)
    fn begin_batch(&self, label: &str) -> Result<BatchGuard<'_>, CoreError> {
        if self
            .sync_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("{label} 거부: 동기화가 이미 진행 중");
            return Err(CoreError::ConcurrentSync);
        }
        self.publish();
        Ok(BatchGuard { orchestrator: self })
    }

    fn record_result(&self, result: BatchSyncResult) {
        {
            let mut data = self.data.write();
            data.history.push(result.clone());
            data.last_sync_result = Some(result);
        }
        self.publish();
    }

    // ── 개별 연산 (진행 플래그와 무관) ──

    /// 단일 그룹 동기화: 이력/알림 목록은 건드리지 않는다
    pub async fn sync_single_group(&self, id: i64) -> Result<GroupSyncStatus, CoreError> {
        debug!("단일 그룹 동기화: id={id}");
        let status = self.gateway.sync_one(id).await?;
        debug!(
            "단일 그룹 동기화 결과: id={id}, group_id={}, status={}",
            status.group_id, status.sync_status
        );
        Ok(status)
    }

    /// 알림 그룹 목록 조회 후 통째로 교체
    pub async fn fetch_alert_groups(&self) -> Result<(), CoreError> {
        let alerts = self.gateway.list_alerts().await?;
        debug!("알림 그룹 갱신: {}개", alerts.len());
        self.data.write().alert_groups = alerts;
        self.publish();
        Ok(())
    }

    /// 그룹 실패 횟수 리셋 후 알림 목록 갱신
    ///
    /// 리셋이 실패하면 갱신 없이 에러를 전파한다.
    pub async fn reset_failure_count(&self, id: i64) -> Result<(), CoreError> {
        info!("그룹 실패 횟수 리셋: id={id}");
        self.gateway.reset_failure_count(id).await?;
        self.fetch_alert_groups().await
    }

    /// 클라이언트의 신규 그룹 발견: 새로 추가된 그룹 수 반환
    pub async fn discover_new_groups(&self, client_id: i64) -> Result<u32, CoreError> {
        let count = self.gateway.discover_new(client_id).await?;
        info!("신규 그룹 발견: client_id={client_id}, 추가={count}");
        Ok(count)
    }

    /// 시작 훅: 알림 목록을 한 번 조회
    pub async fn initialize(&self) -> Result<(), CoreError> {
        self.fetch_alert_groups().await
    }

    // ── 읽기 ──

    pub fn is_sync_in_progress(&self) -> bool {
        self.sync_in_progress.load(Ordering::Acquire)
    }

    pub fn last_sync_result(&self) -> Option<BatchSyncResult> {
        self.data.read().last_sync_result.clone()
    }

    pub fn alert_groups(&self) -> Vec<GroupSyncStatus> {
        self.data.read().alert_groups.clone()
    }

    /// 이력 (최신이 앞)
    pub fn sync_history(&self) -> Vec<BatchSyncResult> {
        self.data.read().history.to_vec()
    }

    /// 현재 세션 상태 스냅샷
    pub fn snapshot(&self) -> SyncSessionState {
        let data = self.data.read();
        SyncSessionState {
            sync_in_progress: self.is_sync_in_progress(),
            last_sync_result: data.last_sync_result.clone(),
            alert_groups: data.alert_groups.clone(),
            sync_history: data.history.to_vec(),
        }
    }

    /// 현재 상태 기반 알림 추적기
    pub fn alert_tracker(&self) -> AlertTracker {
        AlertTracker::new(&self.snapshot(), self.alert_threshold)
    }

    /// 상태 변경 수신기: 변경될 때마다 새 스냅샷을 받는다
    pub fn subscribe(&self) -> watch::Receiver<SyncSessionState> {
        self.state_tx.subscribe()
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }
}
