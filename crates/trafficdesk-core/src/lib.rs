//! # trafficdesk-core
//!
//! 교통 민원 도메인 모델, 포트(trait) 정의, 필터 동기화 엔진, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`filter_sync`] — 필터 상태 ⇄ URL ⇄ 검색 페이로드 순수 함수
//! - [`session`] — 브라우징 세션 저장소
//! - [`engine`] — 필터 동기화 오케스트레이터
//! - [`city_time`] — 시 현지 시각 변환
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod city_time;
pub mod config;
pub mod config_manager;
pub mod engine;
pub mod error;
pub mod filter_sync;
pub mod models;
pub mod ports;
pub mod session;
