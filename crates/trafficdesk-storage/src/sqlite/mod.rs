//! SQLite 저장소 어댑터.
//!
//! `ComplaintStore` 포트 구현.
//!
//! # 모듈 구조
//! - `complaints`: 민원 저장, 존재 확인, 속성 수정, 비트별 집계
//! - `search`: 검색 요청 평가 (필터 조건, 상태별 집계, 페이지 분할)

mod complaints;
mod search;

use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;
use trafficdesk_core::error::CoreError;
use trafficdesk_core::models::complaint::{BeatOpenCases, Complaint, UpdatableAttribute};
use trafficdesk_core::models::search::{SearchRequest, SearchResponse};
use trafficdesk_core::ports::storage::ComplaintStore;

use crate::migration;

/// SQLite 저장소 — `ComplaintStore` 포트 구현
pub struct SqliteStorage {
    pub(super) conn: Mutex<Connection>,
    /// 검색 요청의 `tableName`이 일치해야 하는 식별자
    pub(super) table_name: String,
}

impl SqliteStorage {
    /// 파일 기반 SQLite 저장소 생성
    pub fn open(path: &Path, table_name: &str) -> Result<Self, CoreError> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Internal(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA cache_size=8000;
            PRAGMA temp_store=MEMORY;
            ",
        )
        .map_err(|e| CoreError::Internal(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Internal(format!("마이그레이션 실패: {e}")))?;

        info!("SQLite 저장소 초기화: {} (table={table_name})", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            table_name: table_name.to_string(),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory(table_name: &str) -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Internal(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Internal(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            table_name: table_name.to_string(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|e| CoreError::Internal(format!("잠금 획득 실패: {e}")))
    }
}

#[async_trait]
impl ComplaintStore for SqliteStorage {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError> {
        self.search_complaints(request)
    }

    async fn insert_complaint(&self, complaint: &Complaint) -> Result<(), CoreError> {
        self.save_complaint(complaint)
    }

    async fn complaint_exists(&self, complaint_id: &str) -> Result<bool, CoreError> {
        self.has_complaint(complaint_id)
    }

    async fn update_attribute(
        &self,
        complaint_id: &str,
        attribute: UpdatableAttribute,
        value: &str,
    ) -> Result<Complaint, CoreError> {
        self.set_attribute(complaint_id, attribute, value)
    }

    async fn open_cases_per_beat(&self) -> Result<BeatOpenCases, CoreError> {
        self.count_open_by_beat()
    }
}
