//! 배치 동기화 이력.
//!
//! 세션 내 배치 결과를 최신순으로 최대 `limit`개 보관한다 (메모리 전용).

use groupsync_core::models::sync::BatchSyncResult;
use std::collections::VecDeque;

/// 배치 결과 이력 (최신이 앞, 가장 오래된 항목부터 축출)
#[derive(Debug, Clone)]
pub struct SyncHistory {
    entries: VecDeque<BatchSyncResult>,
    limit: usize,
}

impl SyncHistory {
    /// 새 이력 생성 (`limit`은 최소 1)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// 최신 결과를 맨 앞에 추가
    pub fn push(&mut self, result: BatchSyncResult) {
        if self.entries.len() >= self.limit {
            self.entries.pop_back();
        }
        self.entries.push_front(result);
    }

    /// 최신순 복제본
    pub fn to_vec(&self) -> Vec<BatchSyncResult> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for SyncHistory {
    fn default() -> Self {
        Self::new(groupsync_core::models::sync::SYNC_HISTORY_LIMIT)
    }
}

/// 이력 통계 (콘솔 상태 화면에 표시)
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub batches: u32,
    pub total_groups: u64,
    pub total_failures: u64,
    /// 배치별 성공률 평균 (0-100)
    pub average_success_rate: f64,
    pub average_duration_ms: u64,
}

impl HistoryStats {
    /// 배치 결과 목록 합산 (스냅샷의 `sync_history`에 그대로 사용)
    pub fn from_results(results: &[BatchSyncResult]) -> Self {
        let batches = results.len() as u32;
        let mut total_groups = 0u64;
        let mut total_failures = 0u64;
        let mut total_duration_ms = 0u64;
        let mut rate_sum = 0.0;

        for result in results {
            total_groups += u64::from(result.total_count);
            total_failures += u64::from(result.failure_count);
            total_duration_ms += result.duration_ms;
            rate_sum += result.success_rate;
        }

        let (average_success_rate, average_duration_ms) = if batches == 0 {
            (0.0, 0)
        } else {
            (
                rate_sum / f64::from(batches),
                total_duration_ms / u64::from(batches),
            )
        };

        Self {
            batches,
            total_groups,
            total_failures,
            average_success_rate,
            average_duration_ms,
        }
    }
}
