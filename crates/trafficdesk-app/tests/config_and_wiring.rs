//! 설정 및 DI 와이어링 통합 테스트.
//!
//! AppConfig → 어댑터 생성 검증.

use std::sync::Arc;
use tempfile::TempDir;
use trafficdesk_core::config::AppConfig;
use trafficdesk_core::config_manager::ConfigManager;
use trafficdesk_core::models::complaint::Complaint;
use trafficdesk_core::models::search::SearchRequest;
use trafficdesk_core::ports::storage::ComplaintStore;
use trafficdesk_network::geocoder::GeocodeBeatClient;
use trafficdesk_network::http_client::HttpSearchClient;
use trafficdesk_network::mail_relay::MailRelayClient;
use trafficdesk_storage::sqlite::SqliteStorage;
use trafficdesk_web::WebServer;

#[test]
fn config_defaults_are_valid() {
    let config = AppConfig::default_config();

    // 서버 설정
    assert!(!config.server.base_url.is_empty());
    assert!(config.server.search_path.starts_with('/'));
    assert!(config.server.request_timeout_ms > 0);

    // 웹 설정
    assert!(config.web.port > 0);
    assert!(!config.web.allow_external);

    // 저장소 설정
    assert_eq!(config.storage.table_name, "Complaints_table");

    // 지오코더 설정
    assert!(!config.geocoder.enabled);
    assert!(config.geocoder.min_score > 0.0);
}

#[test]
fn config_duration_conversions() {
    let config = AppConfig::default_config();
    assert_eq!(
        config.request_timeout().as_millis(),
        config.server.request_timeout_ms as u128
    );
}

#[test]
fn all_adapters_instantiate_from_config() {
    let config = AppConfig::default_config();

    let search = HttpSearchClient::new(
        &config.server.base_url,
        &config.server.search_path,
        config.request_timeout(),
    )
    .unwrap();
    assert_eq!(
        search.endpoint(),
        "http://localhost:9090/Development/db-filter-query-api"
    );

    let _locator = GeocodeBeatClient::new(
        &config.geocoder.url,
        &config.geocoder.city,
        config.geocoder.min_score,
        config.request_timeout(),
    )
    .unwrap();

    let storage = Arc::new(SqliteStorage::open_in_memory(&config.storage.table_name).unwrap());
    let server = WebServer::new(storage, config.web.clone());
    assert_eq!(server.url(), "http://localhost:9090/Development");
}

#[test]
fn mail_relay_requires_url() {
    let mut config = AppConfig::default_config();
    assert!(MailRelayClient::new(
        &config.mail.relay_url,
        &config.mail.from_address,
        None,
        config.request_timeout(),
    )
    .is_err());

    config.mail.relay_url = "https://relay.example.com/v1/send".to_string();
    let mailer = MailRelayClient::new(
        &config.mail.relay_url,
        &config.mail.from_address,
        config.mail.api_key.clone(),
        config.request_timeout(),
    )
    .unwrap();

    let storage = Arc::new(SqliteStorage::open_in_memory(&config.storage.table_name).unwrap());
    let _server = WebServer::new(storage, config.web.clone()).with_mailer(Arc::new(mailer));
}

#[test]
fn config_serde_roundtrip() {
    let config = AppConfig::default_config();

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: AppConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized.server.base_url, config.server.base_url);
    assert_eq!(deserialized.web.stage_path, config.web.stage_path);
    assert_eq!(deserialized.storage.table_name, config.storage.table_name);
    assert_eq!(deserialized.geocoder.url, config.geocoder.url);
    assert_eq!(deserialized.mail.from_address, config.mail.from_address);

    // mail 섹션이 없는 이전 설정 파일도 로드된다
    let mut legacy: serde_json::Value = serde_json::from_str(&json).unwrap();
    legacy.as_object_mut().unwrap().remove("mail");
    let legacy: AppConfig = serde_json::from_value(legacy).unwrap();
    assert!(!legacy.mail.enabled);
}

#[test]
fn config_manager_persists_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let manager = ConfigManager::with_path(path.clone()).unwrap();
    assert!(path.exists());

    manager
        .update_with(|c| {
            c.web.port = 8123;
            c.geocoder.enabled = true;
        })
        .unwrap();

    let reopened = ConfigManager::with_path(path).unwrap();
    let config = reopened.get();
    assert_eq!(config.web.port, 8123);
    assert!(config.geocoder.enabled);
    assert_eq!(config.storage.table_name, "Complaints_table");
}

#[tokio::test]
async fn file_storage_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("trafficdesk.db");

    {
        let storage = SqliteStorage::open(&db, "Complaints_table").unwrap();
        storage
            .insert_complaint(&Complaint {
                complaint_id: "ab12cd34".to_string(),
                beat_number: "B1".to_string(),
                complaint_status: "Open".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let storage = SqliteStorage::open(&db, "Complaints_table").unwrap();
    assert!(storage.complaint_exists("ab12cd34").await.unwrap());
    let resp = storage.search(&SearchRequest::unfiltered(1)).await.unwrap();
    assert_eq!(resp.total_complaint, 1);
    assert_eq!(storage.open_cases_per_beat().await.unwrap().get("B1"), Some(&1));
}
