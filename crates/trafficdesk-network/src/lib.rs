//! # trafficdesk-network
//!
//! HTTP 어댑터.
//! 민원 검색 API(`ComplaintSearch` 포트), 비트 지오코더(`BeatLocator` 포트),
//! 메일 릴레이(`ComplaintMailer` 포트)를 reqwest로 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use trafficdesk_network::http_client::HttpSearchClient;
//! use trafficdesk_network::geocoder::GeocodeBeatClient;
//! use trafficdesk_network::mail_relay::MailRelayClient;
//! ```

pub mod geocoder;
pub mod http_client;
pub mod mail_relay;
