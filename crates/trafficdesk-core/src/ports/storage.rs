//! 민원 저장소 포트.
//!
//! 구현: `trafficdesk-storage` crate (rusqlite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::complaint::{BeatOpenCases, Complaint, UpdatableAttribute};
use crate::models::search::{SearchRequest, SearchResponse};

/// 민원 테이블 저장소
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// 검색 요청 평가 (필터 + 상태별 집계 + 페이지 분할)
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError>;

    /// 민원 레코드 저장
    async fn insert_complaint(&self, complaint: &Complaint) -> Result<(), CoreError>;

    /// 민원 ID 존재 여부
    async fn complaint_exists(&self, complaint_id: &str) -> Result<bool, CoreError>;

    /// 단일 속성 수정 후 수정된 레코드 반환
    async fn update_attribute(
        &self,
        complaint_id: &str,
        attribute: UpdatableAttribute,
        value: &str,
    ) -> Result<Complaint, CoreError>;

    /// 비트별 Open 민원 수 (민원이 있는 모든 비트 포함)
    async fn open_cases_per_beat(&self) -> Result<BeatOpenCases, CoreError>;
}
