//! # groupsync-network
//!
//! 백엔드 REST 어댑터.
//! `SyncGateway` 포트를 reqwest로 구현하며, 응답 봉투(envelope) 해제와
//! HTTP 상태 코드별 에러 매핑, Bearer 토큰 주입을 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use groupsync_network::http_client::HttpSyncGateway;
//!
//! let gateway = HttpSyncGateway::from_config(&config)?;
//! let result = gateway.trigger_all().await?;
//! ```

pub mod envelope;
pub mod http_client;
