//! # groupsync-app
//!
//! 그룹 동기화 관리 콘솔 바이너리 진입점.
//! 설정 로드, 어댑터 와이어링, 사용자 명령을 오케스트레이터로 전달한다.

mod config_cmd;
mod console;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config_cmd::ConfigAction;
use groupsync_core::config::AppConfig;
use groupsync_core::config_manager::ConfigManager;
use groupsync_core::error::CoreError;
use groupsync_network::http_client::HttpSyncGateway;
use groupsync_store::alert::AlertTracker;
use groupsync_store::orchestrator::SyncOrchestrator;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 토큰 환경변수
const ACCESS_TOKEN_ENV: &str = "GROUPSYNC_ACCESS_TOKEN";

/// 채팅 그룹 동기화 관리 콘솔
#[derive(Parser, Debug)]
#[command(name = "groupsync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 백엔드 URL 지정 (기본: 설정 파일, 없으면 http://localhost:8080)
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// Bearer 토큰 (GROUPSYNC_ACCESS_TOKEN 환경변수로도 지정 가능)
    #[arg(long, global = true)]
    token: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼별 설정 디렉토리)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Sync(SyncCommand),
    /// 설정 파일 조회/변경 (백엔드 연결 없음)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug)]
enum SyncCommand {
    /// 동기화 상태와 알림 그룹 표시 (기본)
    Status,
    /// 모든 활성 그룹 즉시 동기화
    Trigger,
    /// 연속 실패 그룹 재시도
    Retry {
        /// 최소 연속 실패 횟수 (기본: 설정값)
        #[arg(long, short = 'm')]
        min_failure_count: Option<u32>,
    },
    /// 단일 그룹 동기화
    Sync {
        /// 그룹 행 ID (`status`/`alerts` 출력의 `[id]`, 플랫폼 그룹 번호 아님)
        id: i64,
    },
    /// 알림 그룹 목록
    Alerts,
    /// 그룹 연속 실패 횟수 리셋
    Reset {
        /// 그룹 행 ID (`status`/`alerts` 출력의 `[id]`, 플랫폼 그룹 번호 아님)
        id: i64,
        /// 확인 없이 실행
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// 클라이언트의 신규 그룹 발견
    Discover { client_id: i64 },
}

/// 설정 파일 열기 (`--config` 또는 플랫폼 기본 경로)
fn open_config(args: &Args) -> Result<ConfigManager> {
    match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")
}

/// 설정 로드 + CLI/환경변수 오버라이드
fn effective_config(manager: &ConfigManager, args: &Args) -> Result<AppConfig> {
    let mut config = manager.get();
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(token) = args
        .token
        .clone()
        .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
    {
        config.server.access_token = Some(token);
    }
    config.validate().context("설정 검증 실패")?;
    Ok(config)
}

/// 사용자 확인 (y/N)
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn run(orchestrator: &SyncOrchestrator, command: SyncCommand) -> Result<()> {
    match command {
        SyncCommand::Status => {}
        SyncCommand::Alerts => {
            print!("{}", console::render_alerts(&orchestrator.alert_tracker()));
            return Ok(());
        }
        SyncCommand::Trigger => {
            let result = orchestrator.trigger_sync().await?;
            println!("동기화 완료");
            print!("{}", console::render_batch(&result));
        }
        SyncCommand::Retry { min_failure_count } => {
            let result = orchestrator.retry_failed_groups(min_failure_count).await?;
            println!("재시도 완료");
            print!("{}", console::render_batch(&result));
        }
        SyncCommand::Sync { id } => {
            let status = orchestrator.sync_single_group(id).await?;
            println!("{}", console::render_group_line(&status));
            return Ok(());
        }
        SyncCommand::Reset { id, yes } => {
            if !yes && !confirm(&format!("그룹 [{id}]의 연속 실패 횟수를 리셋할까요?"))? {
                println!("취소됨");
                return Ok(());
            }
            let tracker = AlertTracker::acknowledge(orchestrator, id).await?;
            println!("리셋 완료");
            print!("{}", console::render_alerts(&tracker));
            return Ok(());
        }
        SyncCommand::Discover { client_id } => {
            let count = orchestrator.discover_new_groups(client_id).await?;
            println!("신규 그룹 {count}개 추가");
            return Ok(());
        }
    }

    let state = orchestrator.snapshot();
    print!("{}", console::render_status(&state, &orchestrator.alert_tracker()));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    let log_filter = format!(
        "groupsync={},groupsync_app={},groupsync_core={},groupsync_network={},groupsync_store={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let manager = open_config(&args)?;
    let command = match args.command.take() {
        Some(Command::Config { action }) => {
            let text = config_cmd::run(&manager, action.unwrap_or(ConfigAction::Show))
                .context("설정 변경 실패")?;
            print!("{text}");
            return Ok(());
        }
        Some(Command::Sync(command)) => command,
        None => SyncCommand::Status,
    };

    let config = effective_config(&manager, &args)?;
    info!("백엔드: {}{}", config.server.base_url, config.server.api_prefix);

    // ── 어댑터 생성 (DI 와이어링) ──
    let gateway = Arc::new(HttpSyncGateway::from_config(&config)?);
    let orchestrator = SyncOrchestrator::from_config(gateway, &config.sync);

    if let Err(e) = orchestrator.initialize().await {
        warn!("초기 알림 목록 조회 실패: {e}");
    }

    run(&orchestrator, command).await.map_err(|e| {
        if matches!(e.downcast_ref::<CoreError>(), Some(CoreError::ConcurrentSync)) {
            anyhow!("동기화가 이미 진행 중입니다. 잠시 후 다시 시도하세요")
        } else {
            e
        }
    })
}
