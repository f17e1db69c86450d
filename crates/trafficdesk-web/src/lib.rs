//! # trafficdesk-web
//!
//! 민원 REST API 서버.
//! Axum 기반, 스테이지 경로(기본 `/Development`) 아래에 API를 노출한다.
//!
//! ## 엔드포인트
//! - `PUT|POST /{stage}/db-filter-query-api` — 필터 검색 + 상태별 집계 + 페이지
//! - `PUT|POST /{stage}/` — 민원 접수 / 속성 수정 (`isUpdate`)
//! - `GET /{stage}/beat-open-cases` — 비트별 Open 민원 수
//! - `POST /{stage}/send-email` — 선택 민원 메일 발송

pub mod error;
pub mod handlers;
pub mod intake;
pub mod routes;

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use trafficdesk_core::config::WebConfig;
use trafficdesk_core::ports::geocoder::BeatLocator;
use trafficdesk_core::ports::mailer::ComplaintMailer;
use trafficdesk_core::ports::storage::ComplaintStore;

use crate::intake::ComplaintIntake;

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 민원 저장소
    pub store: Arc<dyn ComplaintStore>,
    /// 접수/수정 서비스
    pub intake: Arc<ComplaintIntake>,
    /// 메일 발송 (미구성이면 503)
    pub mailer: Option<Arc<dyn ComplaintMailer>>,
}

/// 민원 API 서버
pub struct WebServer {
    config: WebConfig,
    store: Arc<dyn ComplaintStore>,
    locator: Option<Arc<dyn BeatLocator>>,
    mailer: Option<Arc<dyn ComplaintMailer>>,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(store: Arc<dyn ComplaintStore>, config: WebConfig) -> Self {
        Self {
            config,
            store,
            locator: None,
            mailer: None,
        }
    }

    /// 접수 시 비트 조회에 쓸 지오코더 설정
    pub fn with_beat_locator(mut self, locator: Arc<dyn BeatLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// 선택 민원 메일 발송에 쓸 메일러 설정
    pub fn with_mailer(mut self, mailer: Arc<dyn ComplaintMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            intake: Arc::new(ComplaintIntake::new(
                self.store.clone(),
                self.locator.clone(),
            )),
            mailer: self.mailer.clone(),
        }
    }

    /// 라우터 구성 (CORS + 요청 트레이싱)
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::api_routes(&self.config.stage_path)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state())
    }

    /// 리스너 바인드
    ///
    /// 기본 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도합니다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환합니다.
    /// 포트 0은 OS가 빈 포트를 고른다.
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            let port = base_port.saturating_add(attempt);

            // 포트 오버플로우 체크
            if port < base_port && attempt > 0 {
                break;
            }

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{} — {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    return Ok(listener);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                    warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 바인드된 리스너로 서버 실행 (종료 신호까지)
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr = listener.local_addr()?;
        info!(
            "민원 API 서버 시작: http://{}{}",
            addr,
            routes::normalize_stage(&self.config.stage_path)
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                loop {
                    if *shutdown_rx.borrow() {
                        info!("웹 서버 종료 신호 수신");
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("민원 API 서버 종료");
        Ok(())
    }

    /// 서버 실행
    ///
    /// # Arguments
    /// * `shutdown_rx` - 종료 신호 수신 채널
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_rx).await
    }

    /// 서버 기본 URL (스테이지 경로 포함)
    pub fn url(&self) -> String {
        format!(
            "http://localhost:{}{}",
            self.config.port,
            routes::normalize_stage(&self.config.stage_path)
        )
    }
}
