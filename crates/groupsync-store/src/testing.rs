//! 테스트용 게이트웨이 목(mock)과 픽스처.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use groupsync_core::error::{CoreError, GatewayError};
use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus, SyncStatus};
use groupsync_core::ports::sync_gateway::SyncGateway;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// 배치 결과 픽스처 (소요 1.5초)
pub fn batch_result(total: u32, success: u32) -> BatchSyncResult {
    let start = Utc.with_ymd_and_hms(2026, 2, 12, 10, 0, 0).unwrap();
    let success_rate = if total == 0 {
        0.0
    } else {
        f64::from(success) / f64::from(total) * 100.0
    };
    BatchSyncResult {
        total_count: total,
        success_count: success,
        failure_count: total - success,
        success_rate,
        duration_ms: 1_500,
        start_time: start,
        end_time: start + chrono::Duration::milliseconds(1_500),
        results: vec![],
    }
}

/// 알림 대상 그룹 픽스처 (플랫폼 그룹 번호는 행 ID와 다르게 `98765{id}`)
pub fn alert_status(id: i64, failures: u32) -> GroupSyncStatus {
    GroupSyncStatus {
        id,
        group_id: format!("98765{id}"),
        group_name: format!("测试群组{id}"),
        sync_status: SyncStatus::Failed,
        last_sync_time: Some(Utc.with_ymd_and_hms(2026, 2, 12, 10, 0, 0).unwrap()),
        consecutive_failure_count: failures,
        failure_reason: Some("连接超时".to_string()),
        member_count: None,
        enabled: Some(true),
        active: Some(true),
        last_failure_time: None,
    }
}

fn gateway_down() -> CoreError {
    GatewayError::Network("connection refused".to_string()).into()
}

/// 호출 횟수를 세고 응답을 조절할 수 있는 게이트웨이
#[derive(Default)]
pub struct MockGateway {
    /// 배치 호출이 꺼내 쓸 결과 (비면 10/10 성공)
    pub batch_results: Mutex<VecDeque<BatchSyncResult>>,
    pub alerts: Mutex<Vec<GroupSyncStatus>>,
    pub fail_batch: AtomicBool,
    pub fail_alerts: AtomicBool,
    pub fail_reset: AtomicBool,
    /// 설정 시 배치 호출이 `release` 알림까지 대기
    pub hold_batch: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    pub trigger_calls: AtomicUsize,
    pub retry_calls: AtomicUsize,
    pub last_min_failure_count: AtomicUsize,
    pub sync_one_calls: AtomicUsize,
    pub list_alert_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub discover_calls: AtomicUsize,
    pub discover_count: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_batch(&self, result: BatchSyncResult) {
        self.batch_results.lock().push_back(result);
    }

    pub fn set_alerts(&self, alerts: Vec<GroupSyncStatus>) {
        *self.alerts.lock() = alerts;
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn batch(&self) -> Result<BatchSyncResult, CoreError> {
        if self.hold_batch.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail_batch.load(Ordering::SeqCst) {
            return Err(gateway_down());
        }
        Ok(self
            .batch_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| batch_result(10, 10)))
    }
}

#[async_trait]
impl SyncGateway for MockGateway {
    async fn trigger_all(&self) -> Result<BatchSyncResult, CoreError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        self.batch().await
    }

    async fn retry_failed(&self, min_failure_count: u32) -> Result<BatchSyncResult, CoreError> {
        self.retry_calls.fetch_add(1, Ordering::SeqCst);
        self.last_min_failure_count
            .store(min_failure_count as usize, Ordering::SeqCst);
        self.batch().await
    }

    async fn sync_one(&self, id: i64) -> Result<GroupSyncStatus, CoreError> {
        self.sync_one_calls.fetch_add(1, Ordering::SeqCst);
        let mut status = alert_status(id, 0);
        status.sync_status = SyncStatus::Success;
        status.failure_reason = None;
        Ok(status)
    }

    async fn list_alerts(&self) -> Result<Vec<GroupSyncStatus>, CoreError> {
        self.list_alert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_alerts.load(Ordering::SeqCst) {
            return Err(gateway_down());
        }
        Ok(self.alerts.lock().clone())
    }

    async fn reset_failure_count(&self, id: i64) -> Result<(), CoreError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reset.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend {
                code: 500,
                message: "重置失败".to_string(),
            }
            .into());
        }
        self.alerts.lock().retain(|status| status.id != id);
        Ok(())
    }

    async fn discover_new(&self, _client_id: i64) -> Result<u32, CoreError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.discover_count.load(Ordering::SeqCst) as u32)
    }
}
