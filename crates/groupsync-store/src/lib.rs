//! # groupsync-store
//!
//! 그룹 동기화 세션 상태.
//! 배치 동기화(전체 트리거/실패 재시도)를 한 번에 하나만 실행하고,
//! 결과 이력(최근 N개)과 알림 그룹 목록을 메모리에 유지한다.
//! 알림 추적기는 세션 상태 위의 읽기 전용 투영이다.

pub mod alert;
pub mod history;
pub mod orchestrator;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
