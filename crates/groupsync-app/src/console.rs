//! 콘솔 출력.
//!
//! 오케스트레이터/알림 추적기 상태를 사람이 읽는 텍스트로 그린다.

use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus};
use groupsync_store::alert::AlertTracker;
use groupsync_store::history::HistoryStats;
use groupsync_store::state::SyncSessionState;
use std::fmt::Write;

/// 시각 표시 형식
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// 세션 상태 요약
pub fn render_status(state: &SyncSessionState, tracker: &AlertTracker) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "그룹 동기화 상태");
    let _ = writeln!(
        out,
        "  진행 중: {}",
        if state.sync_in_progress { "예" } else { "아니오" }
    );

    match tracker.last_sync_time() {
        Some(time) => {
            let _ = writeln!(out, "  마지막 동기화: {}", time.format(TIME_FORMAT));
            let _ = writeln!(
                out,
                "  성공률: {:.1}% ({})",
                tracker.last_sync_success_rate(),
                tracker.health()
            );
        }
        None => {
            let _ = writeln!(out, "  마지막 동기화: 없음");
        }
    }

    if let Some(result) = &state.last_sync_result {
        out.push_str(&render_batch(result));
    }

    out.push_str(&render_alerts(tracker));

    if state.sync_history.len() > 1 {
        let stats = HistoryStats::from_results(&state.sync_history);
        let _ = writeln!(
            out,
            "  최근 이력 ({}건): 그룹 {}개 중 실패 {}건, 평균 성공률 {:.1}%, 평균 소요 {}ms",
            stats.batches,
            stats.total_groups,
            stats.total_failures,
            stats.average_success_rate,
            stats.average_duration_ms
        );
        for result in &state.sync_history {
            let _ = writeln!(
                out,
                "    {} 전체={} 실패={} 성공률={:.1}%",
                result.end_time.format(TIME_FORMAT),
                result.total_count,
                result.failure_count,
                result.success_rate
            );
        }
    }
    out
}

/// 배치 결과 한 건
pub fn render_batch(result: &BatchSyncResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  전체/성공/실패: {}/{}/{}, 소요 {}ms",
        result.total_count, result.success_count, result.failure_count, result.duration_ms
    );
    for failed in result.failed_groups() {
        let _ = writeln!(
            out,
            "    실패: [{}] {}: {}",
            failed.group_id,
            failed.group_name,
            failed.failure_reason.as_deref().unwrap_or("사유 없음")
        );
    }
    out
}

/// 알림 그룹 목록
pub fn render_alerts(tracker: &AlertTracker) -> String {
    let mut out = String::new();
    if !tracker.has_alerts() {
        let _ = writeln!(out, "  알림 그룹: 없음");
        return out;
    }

    let _ = writeln!(
        out,
        "  알림 그룹: {}개 (연속 실패 ≥ {})",
        tracker.alert_count(),
        tracker.threshold()
    );
    for status in tracker.alert_groups() {
        let _ = writeln!(out, "    - {}", render_group_line(status));
    }
    out
}

/// 그룹 상태 한 줄
///
/// 맨 앞 `[id]`가 `sync`/`reset` 명령에 넘길 행 ID. 플랫폼 그룹 번호는 괄호 안에 표시.
pub fn render_group_line(status: &GroupSyncStatus) -> String {
    let mut line = format!("[{}] {}", status.id, status.group_name);
    if !status.group_id.is_empty() {
        let _ = write!(line, " (그룹 번호 {})", status.group_id);
    }
    let _ = write!(
        line,
        " {} 연속 실패 {}회",
        status.sync_status, status.consecutive_failure_count
    );
    if let Some(reason) = &status.failure_reason {
        let _ = write!(line, ": {reason}");
    }
    if let Some(time) = status.last_sync_time {
        let _ = write!(line, " (마지막 시도 {})", time.format(TIME_FORMAT));
    }
    line
}
