//! `config` 하위 명령.
//!
//! 설정 파일 조회 및 영구 변경. 백엔드 연결 없이 동작한다.

use clap::{Args, Subcommand};
use groupsync_core::config::AppConfig;
use groupsync_core::config_manager::ConfigManager;
use groupsync_core::error::CoreError;
use std::fmt::Write;
use std::path::Path;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// 현재 설정 표시 (기본)
    Show,
    /// 설정 값 변경 후 파일에 저장
    Set(ConfigSettings),
}

/// 저장할 설정 값 (지정한 항목만 변경)
#[derive(Args, Debug, Default)]
pub struct ConfigSettings {
    /// 백엔드 기본 URL
    #[arg(long)]
    pub base_url: Option<String>,
    /// REST 경로 접두사
    #[arg(long)]
    pub api_prefix: Option<String>,
    /// 요청 타임아웃 (밀리초)
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
    /// Bearer 토큰 저장
    #[arg(long)]
    pub access_token: Option<String>,
    /// 저장된 토큰 삭제
    #[arg(long, conflicts_with = "access_token")]
    pub clear_access_token: bool,
    /// 이력 최대 개수
    #[arg(long)]
    pub history_limit: Option<usize>,
    /// 알림 임계값 (표시용)
    #[arg(long)]
    pub alert_threshold: Option<u32>,
    /// `retry` 기본 최소 실패 횟수
    #[arg(long)]
    pub default_min_failure_count: Option<u32>,
    /// 알림 목록 조회 재시도 횟수
    #[arg(long)]
    pub read_retries: Option<u32>,
}

impl ConfigSettings {
    /// 변경할 항목이 하나도 없는지
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.api_prefix.is_none()
            && self.request_timeout_ms.is_none()
            && self.access_token.is_none()
            && !self.clear_access_token
            && self.history_limit.is_none()
            && self.alert_threshold.is_none()
            && self.default_min_failure_count.is_none()
            && self.read_retries.is_none()
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(api_prefix) = &self.api_prefix {
            config.server.api_prefix = api_prefix.clone();
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.server.request_timeout_ms = timeout;
        }
        if let Some(token) = &self.access_token {
            config.server.access_token = Some(token.clone());
        }
        if self.clear_access_token {
            config.server.access_token = None;
        }
        if let Some(limit) = self.history_limit {
            config.sync.history_limit = limit;
        }
        if let Some(threshold) = self.alert_threshold {
            config.sync.alert_threshold = threshold;
        }
        if let Some(count) = self.default_min_failure_count {
            config.sync.default_min_failure_count = count;
        }
        if let Some(retries) = self.read_retries {
            config.sync.read_retries = retries;
        }
    }
}

/// 하위 명령 실행 후 출력할 텍스트 반환
///
/// 검증에 실패한 변경은 저장하지 않는다.
pub fn run(manager: &ConfigManager, action: ConfigAction) -> Result<String, CoreError> {
    match action {
        ConfigAction::Show => Ok(render(manager.config_path(), &manager.get())),
        ConfigAction::Set(settings) => {
            if settings.is_empty() {
                return Err(CoreError::Validation {
                    field: "config set".to_string(),
                    message: "변경할 값을 하나 이상 지정하세요".to_string(),
                });
            }
            let config = manager.update_with(|config| settings.apply(config))?;
            info!("설정 저장: {}", manager.config_path().display());
            Ok(render(manager.config_path(), &config))
        }
    }
}

/// 설정 요약 (토큰 값은 표시하지 않음)
pub fn render(path: &Path, config: &AppConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "설정 파일: {}", path.display());
    let _ = writeln!(out, "  server.base_url: {}", config.server.base_url);
    let _ = writeln!(out, "  server.api_prefix: {}", config.server.api_prefix);
    let _ = writeln!(
        out,
        "  server.request_timeout_ms: {}",
        config.server.request_timeout_ms
    );
    let _ = writeln!(
        out,
        "  server.access_token: {}",
        if config.server.access_token.is_some() {
            "(설정됨)"
        } else {
            "(없음)"
        }
    );
    let _ = writeln!(out, "  sync.history_limit: {}", config.sync.history_limit);
    let _ = writeln!(out, "  sync.alert_threshold: {}", config.sync.alert_threshold);
    let _ = writeln!(
        out,
        "  sync.default_min_failure_count: {}",
        config.sync.default_min_failure_count
    );
    let _ = writeln!(out, "  sync.read_retries: {}", config.sync.read_retries);
    out
}
