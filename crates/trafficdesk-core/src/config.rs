//! 애플리케이션 설정 구조체.
//!
//! 검색 API 서버, 로컬 REST 서버, 민원 저장소, 비트 지오코더, 메일 릴레이 설정을 정의한다.
//! `ConfigManager`가 JSON 파일로 저장/로드한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::search::COMPLAINTS_TABLE;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 검색 API 서버 연결 설정
    pub server: ServerConfig,
    /// REST 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 민원 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 비트 지오코더 설정
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    /// 선택 민원 메일 발송 설정
    #[serde(default)]
    pub mail: MailConfig,
}

// ============================================================
// 서버 설정
// ============================================================

/// 검색 API 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API 서버 기본 URL (스테이지 경로 포함, 예: "http://localhost:9090/Development")
    pub base_url: String,
    /// 검색 엔드포인트 경로
    #[serde(default = "default_search_path")]
    pub search_path: String,
    /// 선택 민원 메일 발송 엔드포인트 경로
    #[serde(default = "default_email_path")]
    pub email_path: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// ============================================================
// REST 서버 설정
// ============================================================

/// REST 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 포트 (기본: 9090)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 모든 라우트 앞에 붙는 스테이지 경로
    #[serde(default = "default_stage_path")]
    pub stage_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
            stage_path: default_stage_path(),
        }
    }
}

// ============================================================
// 저장소 설정
// ============================================================

/// 민원 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite DB 파일 경로 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// 검색 요청의 `tableName`과 일치해야 하는 테이블 식별자
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            table_name: default_table_name(),
        }
    }
}

// ============================================================
// 지오코더 설정
// ============================================================

/// 비트 지오코더 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// 접수 시 비트 조회 여부
    #[serde(default)]
    pub enabled: bool,
    /// `findAddressCandidates` 엔드포인트 URL
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    /// 요청에 포함할 도시명
    #[serde(default = "default_geocoder_city")]
    pub city: String,
    /// 후보 채택 최소 점수 (초과해야 채택)
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_geocoder_url(),
            city: default_geocoder_city(),
            min_score: default_min_score(),
        }
    }
}

// ============================================================
// 메일 설정
// ============================================================

/// 메일 릴레이 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// `send-email` 엔드포인트 활성화 여부
    #[serde(default)]
    pub enabled: bool,
    /// 릴레이 HTTP API URL
    #[serde(default)]
    pub relay_url: String,
    /// 발신 주소
    #[serde(default = "default_mail_from")]
    pub from_address: String,
    /// 릴레이 API 키 (Bearer)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: String::new(),
            from_address: default_mail_from(),
            api_key: None,
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:9090/Development".to_string(),
                search_path: default_search_path(),
                email_path: default_email_path(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            web: WebConfig::default(),
            storage: StorageConfig::default(),
            geocoder: GeocoderConfig::default(),
            mail: MailConfig::default(),
        }
    }

    /// 서버 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_search_path() -> String {
    "/db-filter-query-api".to_string()
}
fn default_email_path() -> String {
    "/send-email".to_string()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_web_port() -> u16 {
    9090
}
fn default_stage_path() -> String {
    "/Development".to_string()
}
fn default_table_name() -> String {
    COMPLAINTS_TABLE.to_string()
}
fn default_geocoder_url() -> String {
    "https://gistest.chandleraz.gov/appsanonymous/rest/services/Geocoders/PoliceBeat_Composite/GeocodeServer/findAddressCandidates".to_string()
}
fn default_geocoder_city() -> String {
    "chandler".to_string()
}
fn default_min_score() -> f64 {
    0.8
}
fn default_mail_from() -> String {
    "noreply@chandleraz.gov".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default_config();
        assert_eq!(config.server.search_path, "/db-filter-query-api");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.stage_path, "/Development");
        assert_eq!(config.storage.table_name, "Complaints_table");
        assert!(!config.geocoder.enabled);
        assert_eq!(config.geocoder.city, "chandler");
        assert_eq!(config.server.email_path, "/send-email");
        assert!(!config.mail.enabled);
        assert!(config.mail.api_key.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"base_url": "https://api.example.com/Prod"}}"#)
                .unwrap();
        assert_eq!(config.server.base_url, "https://api.example.com/Prod");
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.web.port, 9090);
        assert!((config.geocoder.min_score - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.mail.from_address, "noreply@chandleraz.gov");
    }
}
