//! # trafficdesk-app
//!
//! trafficdesk 바이너리 진입점.
//! DI 와이어링, 민원 API 서버 실행, 필터 브라우징 CLI, 라이프사이클 관리.

mod browse;
mod lifecycle;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trafficdesk_core::config::AppConfig;
use trafficdesk_core::config_manager::{project_dirs, ConfigManager};
use trafficdesk_core::filter_sync::FilterChange;
use trafficdesk_core::models::filter::{ComplaintStatus, ProblemCategory};
use trafficdesk_core::session::SessionOptions;
use trafficdesk_network::geocoder::GeocodeBeatClient;
use trafficdesk_network::http_client::HttpSearchClient;
use trafficdesk_network::mail_relay::MailRelayClient;
use trafficdesk_storage::sqlite::SqliteStorage;
use trafficdesk_web::WebServer;

use crate::browse::BrowseRequest;
use crate::lifecycle::LifecycleManager;

/// 교통 민원 접수·관리 도구
#[derive(Parser, Debug)]
#[command(name = "trafficdesk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 민원 API 서버 실행 (검색 / 접수·수정 / 비트별 집계)
    Serve(ServeArgs),
    /// 필터를 적용해 민원 목록 한 페이지 조회
    Browse(BrowseArgs),
}

#[derive(ClapArgs, Debug)]
struct ServeArgs {
    /// 바인드 포트 (사용 중이면 다음 포트 시도)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 스테이지 경로 (예: /Development, 빈 값이면 루트)
    #[arg(long)]
    stage: Option<String>,

    /// SQLite DB 파일 경로
    #[arg(long)]
    db: Option<PathBuf>,

    /// 외부 접속 허용 (0.0.0.0 바인드)
    #[arg(long)]
    allow_external: bool,

    /// 접수 시 지오코더로 비트 조회
    #[arg(long)]
    geocode: bool,

    /// 메일 릴레이로 선택 민원 메일 발송 활성화
    #[arg(long)]
    mail: bool,
}

#[derive(ClapArgs, Debug)]
#[command(group(ArgGroup::new("filter").multiple(false)))]
struct BrowseArgs {
    /// 검색 API 기본 URL (스테이지 포함)
    #[arg(long, short = 's')]
    server: Option<String>,

    /// 공유 URL 쿼리 (예: "filter=beatNumber&beatNumber=B1")
    #[arg(long, short = 'q', default_value = "")]
    query: String,

    /// 비트 번호 (반복 가능)
    #[arg(long = "beat", group = "filter")]
    beats: Vec<String>,

    /// 문제 유형 (반복 가능)
    #[arg(long = "category", group = "filter")]
    categories: Vec<ProblemCategory>,

    /// 민원 상태 (Open, Closed, Follow-Up, Red-Star)
    #[arg(long, group = "filter")]
    status: Option<ComplaintStatus>,

    /// 날짜 범위 `YYYY-MM-DD..YYYY-MM-DD`
    #[arg(long, group = "filter", value_parser = parse_date_range)]
    dates: Option<(NaiveDate, NaiveDate)>,

    /// 시간대 `ISO..ISO` (시각 부분만 의미)
    #[arg(long, group = "filter", value_parser = parse_time_range)]
    times: Option<(DateTime<Utc>, DateTime<Utc>)>,

    /// 페이지 (1부터)
    #[arg(long, default_value = "1")]
    page: usize,

    /// 더 최근 요청 뒤에 도착한 응답 무시
    #[arg(long)]
    discard_stale: bool,

    /// 표시된 페이지에서 선택할 민원 ID (반복 가능)
    #[arg(long = "select", value_name = "ID")]
    select: Vec<String>,

    /// 선택한 민원을 보낼 시 직원 메일 주소
    #[arg(long, value_name = "ADDR", requires = "select")]
    email_to: Option<String>,
}

fn split_range(value: &str) -> Result<(&str, &str), String> {
    value
        .split_once("..")
        .ok_or_else(|| format!("`시작..종료` 형식이 아님: {value}"))
}

fn parse_date_range(value: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let (start, end) = split_range(value)?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("{s}: {e}"))
    };
    Ok((parse(start)?, parse(end)?))
}

fn parse_time_range(value: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let (start, end) = split_range(value)?;
    let parse = |s: &str| {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("{s}: {e}"))
    };
    Ok((parse(start)?, parse(end)?))
}

impl BrowseArgs {
    fn filter(&self) -> Option<FilterChange> {
        if !self.beats.is_empty() {
            Some(FilterChange::beat_numbers(self.beats.iter().cloned()))
        } else if !self.categories.is_empty() {
            Some(FilterChange::problem_categories(self.categories.iter().copied()))
        } else if let Some(status) = self.status {
            Some(FilterChange::ComplaintStatus(Some(status)))
        } else if let Some((start, end)) = self.dates {
            Some(FilterChange::date_range(Some(start), Some(end)))
        } else {
            self.times
                .map(|(start, end)| FilterChange::time_range(Some(start), Some(end)))
        }
    }

    fn to_request(&self) -> BrowseRequest {
        BrowseRequest {
            query: self.query.clone(),
            filter: self.filter(),
            page_index: self.page.saturating_sub(1),
            select: self.select.clone(),
            options: SessionOptions {
                discard_stale_responses: self.discard_stale,
            },
        }
    }
}

/// 설정 로드 (실패 시 기본값)
fn load_config(path: Option<&Path>) -> AppConfig {
    let manager = match path {
        Some(p) => ConfigManager::with_path(p.to_path_buf()),
        None => ConfigManager::new(),
    };
    match manager {
        Ok(m) => {
            info!("설정 로드: {}", m.config_path().display());
            m.get()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본값 사용: {e}");
            AppConfig::default_config()
        }
    }
}

/// 데이터베이스 경로 결정 (CLI 인자 → 설정 → 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.trafficdesk.trafficdesk/trafficdesk.db`
/// - Windows: `%APPDATA%\trafficdesk\trafficdesk\data\trafficdesk.db`
/// - Linux: `~/.local/share/trafficdesk/trafficdesk.db`
fn resolve_db_path(cli: Option<&Path>, config: &AppConfig) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| config.storage.db_path.clone())
        .or_else(|| {
            project_dirs().map(|p| p.data_dir().join("trafficdesk.db"))
        })
        .unwrap_or_else(|| PathBuf::from("./trafficdesk.db"))
}

/// 배너 출력
fn print_banner() {
    println!();
    println!("╔══════════════════════════════════════════╗");
    println!("║   TRAFFICDESK — 교통 민원 접수·관리 서버   ║");
    println!("╚══════════════════════════════════════════╝");
    println!();
}

async fn run_serve(args: ServeArgs, mut config: AppConfig) -> Result<()> {
    print_banner();

    // CLI 인자로 설정 오버라이드
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(stage) = args.stage {
        config.web.stage_path = stage;
    }
    if args.allow_external {
        config.web.allow_external = true;
    }
    if args.geocode {
        config.geocoder.enabled = true;
    }
    if args.mail {
        config.mail.enabled = true;
    }

    let db_path = resolve_db_path(args.db.as_deref(), &config);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("DB 디렉토리 생성 실패: {}", parent.display()))?;
        }
    }
    let storage = Arc::new(
        SqliteStorage::open(&db_path, &config.storage.table_name)
            .with_context(|| format!("DB 열기 실패: {}", db_path.display()))?,
    );
    info!(
        "저장소: {} (table={})",
        db_path.display(),
        config.storage.table_name
    );

    let mut web_server = WebServer::new(storage, config.web.clone());
    if config.geocoder.enabled {
        let locator = GeocodeBeatClient::new(
            &config.geocoder.url,
            &config.geocoder.city,
            config.geocoder.min_score,
            config.request_timeout(),
        )
        .context("지오코더 클라이언트 생성 실패")?;
        web_server = web_server.with_beat_locator(Arc::new(locator));
        info!("지오코더: {} (city={})", config.geocoder.url, config.geocoder.city);
    }
    if config.mail.enabled {
        let mailer = MailRelayClient::new(
            &config.mail.relay_url,
            &config.mail.from_address,
            config.mail.api_key.clone(),
            config.request_timeout(),
        )
        .context("메일 릴레이 클라이언트 생성 실패")?;
        web_server = web_server.with_mailer(Arc::new(mailer));
        info!("메일 릴레이: {}", config.mail.relay_url);
    }

    let lifecycle = LifecycleManager::new();
    let shutdown_rx = lifecycle.subscribe();
    info!("민원 API: {}", web_server.url());
    let mut server = tokio::spawn(async move { web_server.run(shutdown_rx).await });

    info!("trafficdesk 서버 실행 중 (Ctrl+C로 종료)");
    // 시그널 수신 시 서버의 graceful shutdown 완료까지 대기
    let finished = tokio::select! {
        _ = lifecycle.wait_for_signal() => None,
        result = &mut server => Some(result),
    };
    let result = match finished {
        Some(result) => result,
        None => server.await,
    };

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("웹 서버 오류: {e}");
            return Err(e).context("웹 서버 실행 실패");
        }
        Err(e) => return Err(e).context("웹 서버 태스크 실패"),
    }

    info!("trafficdesk 서버 종료");
    Ok(())
}

async fn run_browse(args: BrowseArgs, config: AppConfig) -> Result<()> {
    let base_url = args
        .server
        .clone()
        .unwrap_or_else(|| config.server.base_url.clone());
    let client = Arc::new(
        HttpSearchClient::new(
            &base_url,
            &config.server.search_path,
            config.request_timeout(),
        )
        .context("검색 클라이언트 생성 실패")?
        .with_email_path(&config.server.email_path),
    );
    info!("검색 API: {}", client.endpoint());

    let mut engine = browse::browse(client.clone(), &args.to_request()).await;
    print!("{}", browse::render(&engine));

    if let Some(send_to) = args.email_to.as_deref() {
        let response = browse::email_selection(&mut engine, &client, send_to)
            .await
            .context("선택 민원 메일 발송 실패")?;
        println!("메일: {}", response.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화
    let log_filter = format!(
        "trafficdesk={lvl},trafficdesk_app={lvl},trafficdesk_core={lvl},trafficdesk_network={lvl},trafficdesk_storage={lvl},trafficdesk_web={lvl},tower_http={lvl}",
        lvl = args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(args.config.as_deref());

    match args.command {
        Command::Serve(serve) => run_serve(serve, config).await,
        Command::Browse(browse) => run_browse(browse, config).await,
    }
}
