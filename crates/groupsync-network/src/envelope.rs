//! 백엔드 응답 봉투.
//!
//! 모든 REST 응답은 `{ code, message, data, timestamp, traceId }` 형태로 감싸져 온다.
//! 게이트웨이는 모든 호출에서 이 봉투를 명시적으로 벗겨 원본 페이로드만 넘긴다.

use groupsync_core::error::GatewayError;
use serde::Deserialize;
use tracing::debug;

/// 성공 응답 코드
pub const SUCCESS_CODE: i32 = 200;

/// 응답 봉투
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// 응답 코드 (200 = 성공)
    pub code: i32,
    /// 응답 메시지
    pub message: Option<String>,
    /// 페이로드 (누락 시 None)
    pub data: Option<T>,
    /// 서버 응답 시각 (원문 그대로)
    pub timestamp: Option<String>,
    /// 요청 추적 ID
    pub trace_id: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// 성공 코드 여부
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// 페이로드 추출: 실패 코드거나 data가 없으면 에러
    pub fn into_data(self) -> Result<T, GatewayError> {
        if !self.is_success() {
            return Err(self.into_backend_error());
        }
        self.data
            .ok_or_else(|| GatewayError::Decode("응답에 data가 없습니다".to_string()))
    }

    /// 성공 여부만 확인 (data 무시)
    pub fn into_unit(self) -> Result<(), GatewayError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self.into_backend_error())
        }
    }

    /// 실패 코드라도 data가 실려 있으면 그대로 추출
    ///
    /// 단일 그룹 동기화는 실패 시 `code=500`과 함께 실패 상태 페이로드를 보낸다.
    pub fn into_payload(self) -> Result<T, GatewayError> {
        if self.is_success() {
            return self.into_data();
        }
        match self.data {
            Some(data) => {
                debug!(
                    "실패 코드 응답에서 페이로드 사용: code={}, message={:?}",
                    self.code, self.message
                );
                Ok(data)
            }
            None => Err(self.into_backend_error()),
        }
    }

    fn into_backend_error(self) -> GatewayError {
        if let Some(trace_id) = &self.trace_id {
            debug!("백엔드 실패 응답: code={}, traceId={trace_id}", self.code);
        }
        GatewayError::Backend {
            code: self.code,
            message: self.message.unwrap_or_else(|| "요청 실패".to_string()),
        }
    }
}
