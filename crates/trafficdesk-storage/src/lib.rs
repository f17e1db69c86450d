//! # trafficdesk-storage
//!
//! 로컬 저장소 어댑터.
//! SQLite 기반 민원 테이블 저장, 검색 요청 평가, 스키마 마이그레이션을 담당한다.
//!
//! ## 모듈
//! - `sqlite`: 민원 저장소 (`ComplaintStore` 구현)
//! - `migration`: 스키마 마이그레이션

pub mod migration;
pub mod sqlite;
