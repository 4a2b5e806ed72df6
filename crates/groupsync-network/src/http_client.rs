//! HTTP REST 게이트웨이.
//!
//! `SyncGateway` 포트 구현. Bearer 토큰 주입, 상태 코드별 에러 매핑,
//! 응답 봉투 해제. 재시도는 멱등 조회(알림 목록)에만 적용한다.

use async_trait::async_trait;
use groupsync_core::config::AppConfig;
use groupsync_core::error::{CoreError, GatewayError};
use groupsync_core::models::sync::{BatchSyncResult, GroupSyncStatus};
use groupsync_core::ports::sync_gateway::SyncGateway;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::envelope::ApiEnvelope;

/// 기본 조회 재시도 횟수
const DEFAULT_READ_RETRIES: u32 = 2;

/// Retry-After 헤더가 없을 때 기본 대기 시간 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 간격 상한
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 재시도 가능한 에러인지 판별
fn is_retryable(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::Gateway(
            GatewayError::Network(_)
                | GatewayError::ServiceUnavailable(_)
                | GatewayError::RateLimit { .. }
        )
    )
}

/// REST 게이트웨이: `SyncGateway` 포트 구현
pub struct HttpSyncGateway {
    client: reqwest::Client,
    /// `{base_url}{api_prefix}` (끝 슬래시 제거)
    base_url: String,
    access_token: Option<String>,
    read_retries: u32,
    retry_delay: Duration,
}

impl HttpSyncGateway {
    /// 새 게이트웨이 생성
    pub fn new(base_url: &str, api_prefix: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        let prefix = api_prefix.trim_end_matches('/');
        let prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };

        Ok(Self {
            client,
            base_url: format!("{}{}", base_url.trim_end_matches('/'), prefix),
            access_token: None,
            read_retries: DEFAULT_READ_RETRIES,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// 애플리케이션 설정으로 생성
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let gateway = Self::new(
            &config.server.base_url,
            &config.server.api_prefix,
            config.server.request_timeout(),
        )?
        .with_read_retries(config.sync.read_retries);

        Ok(match &config.server.access_token {
            Some(token) => gateway.with_access_token(token),
            None => gateway,
        })
    }

    /// Bearer 토큰 설정
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// 조회 재시도 횟수 설정
    pub fn with_read_retries(mut self, read_retries: u32) -> Self {
        self.read_retries = read_retries;
        self
    }

    /// 첫 재시도 대기 시간 설정 (이후 2배씩 증가)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// 요청 빌더 반환 (토큰이 있으면 Authorization 헤더 포함)
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    ///
    /// 에러 본문이 응답 봉투면 봉투 메시지를 사용한다.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

        let raw = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });
        let text = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&raw)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or(raw);

        let status_code = status.as_u16();
        Err(match status_code {
            401 | 403 => GatewayError::Auth(format!("인증 실패 ({status_code}): {text}")),
            404 => GatewayError::NotFound(text),
            429 => GatewayError::RateLimit {
                retry_after_secs: retry_after,
            },
            503 => GatewayError::ServiceUnavailable(text),
            _ => GatewayError::Status {
                status: status_code,
                body: text,
            },
        })
    }

    /// 요청 전송 → 상태 확인 → 봉투 파싱
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<ApiEnvelope<T>, CoreError> {
        debug!("게이트웨이 요청: {method} {path}");

        let resp = self
            .request(method, path)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("요청 실패 ({path}): {e}")))?;

        let resp = Self::check_response(resp).await?;
        let envelope = resp
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| GatewayError::Decode(format!("{path}: {e}")))?;

        debug!(
            "게이트웨이 응답: {path} code={} traceId={:?}",
            envelope.code, envelope.trace_id
        );
        Ok(envelope)
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: delay → 2×delay → … (최대 30초)
    ///
    /// 429의 Retry-After는 현재 backoff 간격보다 짧을 때만 따른다.
    /// 더 긴 대기 요청은 마지막 시도의 `RateLimit` 에러로 호출자에게 전달된다.
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) || attempt >= self.read_retries {
                        return Err(e);
                    }

                    attempt += 1;
                    let wait = match &e {
                        CoreError::Gateway(GatewayError::RateLimit { retry_after_secs }) => {
                            Duration::from_secs(*retry_after_secs).min(delay)
                        }
                        _ => delay,
                    };
                    warn!(
                        "요청 실패 (시도 {}/{}): {e}, {wait:?} 후 재시도",
                        attempt,
                        self.read_retries + 1
                    );

                    tokio::time::sleep(wait).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
            }
        }
    }
}

#[async_trait]
impl SyncGateway for HttpSyncGateway {
    async fn trigger_all(&self) -> Result<BatchSyncResult, CoreError> {
        let envelope = self
            .send_envelope::<BatchSyncResult>(reqwest::Method::POST, "/groups/sync/trigger")
            .await?;
        Ok(envelope.into_data()?)
    }

    async fn retry_failed(&self, min_failure_count: u32) -> Result<BatchSyncResult, CoreError> {
        let path = format!("/groups/sync/retry?minFailureCount={min_failure_count}");
        let envelope = self
            .send_envelope::<BatchSyncResult>(reqwest::Method::POST, &path)
            .await?;
        Ok(envelope.into_data()?)
    }

    async fn sync_one(&self, id: i64) -> Result<GroupSyncStatus, CoreError> {
        let path = format!("/groups/sync/{id}");
        let envelope = self
            .send_envelope::<GroupSyncStatus>(reqwest::Method::POST, &path)
            .await?;
        Ok(envelope.into_payload()?)
    }

    async fn list_alerts(&self) -> Result<Vec<GroupSyncStatus>, CoreError> {
        self.execute_with_retry(|| async {
            let envelope = self
                .send_envelope::<Vec<GroupSyncStatus>>(reqwest::Method::GET, "/groups/sync/alert")
                .await?;
            Ok(envelope.into_data()?)
        })
        .await
    }

    async fn reset_failure_count(&self, id: i64) -> Result<(), CoreError> {
        let path = format!("/groups/sync/{id}/reset");
        let envelope = self
            .send_envelope::<serde_json::Value>(reqwest::Method::POST, &path)
            .await?;
        Ok(envelope.into_unit()?)
    }

    async fn discover_new(&self, client_id: i64) -> Result<u32, CoreError> {
        let path = format!("/groups/sync/discover/{client_id}");
        let envelope = self
            .send_envelope::<u32>(reqwest::Method::POST, &path)
            .await?;
        Ok(envelope.into_data()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsync_core::models::sync::SyncStatus;
    use mockito::Matcher;

    const BATCH_BODY: &str = r#"{
        "code": 200,
        "message": "操作成功",
        "data": {
            "totalCount": 10,
            "successCount": 9,
            "failureCount": 1,
            "successRate": 90.0,
            "durationMs": 1500,
            "startTime": "2026-02-12T10:00:00",
            "endTime": "2026-02-12T10:00:01.500",
            "results": []
        },
        "timestamp": "2026-02-12T10:00:01.600"
    }"#;

    fn gateway(server: &mockito::ServerGuard) -> HttpSyncGateway {
        HttpSyncGateway::new(&server.url(), "/api", Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    #[test]
    fn gateway_creation() {
        let gw = HttpSyncGateway::new("http://localhost:8080/", "api/", Duration::from_secs(15))
            .unwrap();
        assert_eq!(gw.base_url, "http://localhost:8080/api");
        assert_eq!(gw.read_retries, DEFAULT_READ_RETRIES);
        assert!(gw.access_token.is_none());
    }

    #[test]
    fn from_config_applies_token_and_retries() {
        let mut config = AppConfig::default_config();
        config.server.access_token = Some("jwt".to_string());
        config.sync.read_retries = 4;

        let gw = HttpSyncGateway::from_config(&config).unwrap();
        assert_eq!(gw.base_url, "http://localhost:8080/api");
        assert_eq!(gw.access_token.as_deref(), Some("jwt"));
        assert_eq!(gw.read_retries, 4);
    }

    #[test]
    fn is_retryable_errors() {
        assert!(is_retryable(&GatewayError::Network("x".into()).into()));
        assert!(is_retryable(&GatewayError::ServiceUnavailable("x".into()).into()));
        assert!(is_retryable(
            &GatewayError::RateLimit {
                retry_after_secs: 1
            }
            .into()
        ));
        assert!(!is_retryable(&GatewayError::Auth("x".into()).into()));
        assert!(!is_retryable(&CoreError::ConcurrentSync));
    }

    #[tokio::test]
    async fn trigger_all_unwraps_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/trigger")
            .match_header("authorization", "Bearer admin_jwt")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BATCH_BODY)
            .create_async()
            .await;

        let gw = gateway(&server).with_access_token("admin_jwt");
        let result = gw.trigger_all().await.unwrap();
        assert_eq!(result.total_count, 10);
        assert_eq!(result.duration_ms, 1_500);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn retry_failed_sends_min_failure_count() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/retry")
            .match_query(Matcher::UrlEncoded(
                "minFailureCount".into(),
                "3".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BATCH_BODY)
            .create_async()
            .await;

        let result = gateway(&server).retry_failed(3).await.unwrap();
        assert_eq!(result.failure_count, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sync_one_returns_failed_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":500,"message":"连接超时","data":{
                    "id":42,"groupId":"987654","groupName":"测试群组",
                    "syncStatus":"FAILED","consecutiveFailureCount":2,
                    "failureReason":"连接超时"}}"#,
            )
            .create_async()
            .await;

        let status = gateway(&server).sync_one(42).await.unwrap();
        assert_eq!(status.id, 42);
        assert_eq!(status.group_id, "987654");
        assert_eq!(status.sync_status, SyncStatus::Failed);
        assert_eq!(status.failure_reason.as_deref(), Some("连接超时"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sync_one_missing_group_is_backend_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/groups/sync/404")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":500,"message":"群组不存在"}"#)
            .create_async()
            .await;

        let err = gateway(&server).sync_one(404).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Gateway(GatewayError::Backend { code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn list_alerts_retries_on_503() {
        let mut server = mockito::Server::new_async().await;
        let unavailable = server
            .mock("GET", "/api/groups/sync/alert")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(2)
            .create_async()
            .await;

        // 재시도 1회 포함 총 2회 요청
        let gw = gateway(&server).with_read_retries(1);
        let err = gw.list_alerts().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Gateway(GatewayError::ServiceUnavailable(_))
        ));
        unavailable.assert_async().await;
        unavailable.remove_async().await;

        let ok = server
            .mock("GET", "/api/groups/sync/alert")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":200,"data":[{"id":1,"groupId":"987651","groupName":"测试群组1",
                    "syncStatus":"FAILED","consecutiveFailureCount":3,
                    "failureReason":"连接超时"}]}"#,
            )
            .create_async()
            .await;

        let alerts = gw.list_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].consecutive_failure_count, 3);
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn reset_accepts_null_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/7/reset")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"message":"操作成功"}"#)
            .create_async()
            .await;

        assert!(gateway(&server).reset_failure_count(7).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn discover_new_returns_count() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/discover/42")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"message":"成功发现并添加 5 个新群组","data":5}"#)
            .create_async()
            .await;

        assert_eq!(gateway(&server).discover_new(42).await.unwrap(), 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_maps_to_auth_with_envelope_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/groups/sync/trigger")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":403,"message":"无权限访问"}"#)
            .create_async()
            .await;

        let err = gateway(&server).trigger_all().await.unwrap_err();
        match err {
            CoreError::Gateway(GatewayError::Auth(message)) => assert!(message.contains("无权限访问")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/groups/sync/trigger")
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let err = gateway(&server).trigger_all().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Gateway(GatewayError::RateLimit {
                retry_after_secs: 7
            })
        ));
    }

    #[tokio::test]
    async fn rate_limit_wait_capped_by_backoff() {
        let mut server = mockito::Server::new_async().await;
        // Retry-After 없음 → 기본 60초로 보고되지만 대기는 backoff 간격만큼
        let mock = server
            .mock("GET", "/api/groups/sync/alert")
            .with_status(429)
            .with_body("Too Many Requests")
            .expect(3)
            .create_async()
            .await;

        let gw = gateway(&server).with_read_retries(2);
        let err = tokio::time::timeout(Duration::from_secs(5), gw.list_alerts())
            .await
            .expect("backoff 간격을 넘어 대기함")
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Gateway(GatewayError::RateLimit {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn batch_operations_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/groups/sync/trigger")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(1)
            .create_async()
            .await;

        let gw = gateway(&server).with_read_retries(3);
        assert!(gw.trigger_all().await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/groups/sync/discover/1")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = gateway(&server).discover_new(1).await.unwrap_err();
        assert!(matches!(err, CoreError::Gateway(GatewayError::Decode(_))));
    }
}
