//! 민원 검색 포트.
//!
//! 구현: `trafficdesk-network` crate (reqwest, `PUT /db-filter-query-api`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::search::{SearchRequest, SearchResponse};

/// 페이지 단위 민원 검색 서비스
#[async_trait]
pub trait ComplaintSearch: Send + Sync {
    /// 필터 페이로드로 한 페이지 검색
    ///
    /// 네트워크/HTTP 실패는 `CoreError`로 반환하며, 재시도하지 않는다.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, CoreError>;
}
