//! 비트 위치 조회 포트.
//!
//! 구현: `trafficdesk-network` crate (지오코더 REST 서비스)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::complaint::BeatMatch;

/// 주소/교차로 문자열에서 순찰 비트를 찾는 서비스
#[async_trait]
pub trait BeatLocator: Send + Sync {
    /// 위치 문자열로 비트 조회. 신뢰할 만한 후보가 없으면 `None`.
    async fn locate(&self, location: &str) -> Result<Option<BeatMatch>, CoreError>;
}
