//! 메일 발송 포트.
//!
//! 구현: `trafficdesk-network` crate (메일 릴레이 HTTP API)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::mail::OutgoingMail;

/// 구성된 메일을 수신자에게 전달하는 서비스
#[async_trait]
pub trait ComplaintMailer: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), CoreError>;
}
