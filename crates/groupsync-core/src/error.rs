//! 그룹 동기화 핵심 에러 타입.
//!
//! 로컬 동시성 위반(`ConcurrentSync`)과 게이트웨이 호출 실패(`Gateway`)를
//! 구분한다. 게이트웨이 에러는 오케스트레이터가 해석하지 않고 그대로 전파한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 배치 동기화가 이미 진행 중 (대기열 없음, 호출자가 나중에 재시도)
    #[error("동기화가 이미 진행 중입니다")]
    ConcurrentSync,

    /// 백엔드 게이트웨이 호출 실패
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 게이트웨이 호출 실패 여부
    pub fn is_gateway(&self) -> bool {
        matches!(self, CoreError::Gateway(_))
    }
}

/// 게이트웨이(백엔드 REST) 호출 에러.
///
/// 네트워크 실패, 비정상 HTTP 상태, 응답 봉투(envelope)의 실패 코드를 모두 포함한다.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 인증/권한 실패 (401, 403)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스를 찾을 수 없음 (404)
    #[error("리소스 미발견: {0}")]
    NotFound(String),

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 기타 비정상 HTTP 상태
    #[error("API 에러 ({status}): {body}")]
    Status {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },

    /// 백엔드가 응답 봉투에 실패 코드를 담아 보냄
    #[error("백엔드 에러 (code={code}): {message}")]
    Backend {
        /// 봉투 응답 코드
        code: i32,
        /// 봉투 메시지
        message: String,
    },

    /// 응답 본문 파싱 실패
    #[error("응답 파싱 실패: {0}")]
    Decode(String),
}
